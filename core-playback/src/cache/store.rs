//! # Audio Cache Store
//!
//! Content-addressable disk cache mapping media URLs to local files.
//!
//! - Files are named by the lowercase hex SHA-256 of the URL
//! - Downloads run one at a time on a dedicated worker task
//! - Downloads land in `<hash>.temp` and are renamed into place when complete
//! - Total size is kept under a byte budget by evicting the oldest mtime first
//!
//! Lookups (`is_cached`, `cached_path`, `playback_path`) are synchronous and
//! never wait on the worker.

use crate::cache::{
    config::{CacheConfig, TEMP_SUFFIX},
    stats::{CacheStats, EvictionReport},
};
use crate::error::{PlaybackError, Result};
use bridge_traits::{BridgeError, TrackResolver};
use core_runtime::events::{CacheEvent, EventBus, PlayerEvent};
use core_runtime::logging::{redact_url, strip_path};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

/// Cache file name for a URL.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Refresh a file's modification time to now.
fn touch(path: &Path) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new().write(true).open(path)?;
    file.set_modified(SystemTime::now())
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with(TEMP_SUFFIX))
}

/// One completed cache file as seen on disk.
#[derive(Debug, Clone)]
struct DiskEntry {
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

enum CacheJob {
    Download {
        url: String,
        reply: oneshot::Sender<Result<PathBuf>>,
    },
    Sweep {
        reply: oneshot::Sender<Result<EvictionReport>>,
    },
    Clear {
        reply: oneshot::Sender<Result<usize>>,
    },
}

/// Handle to a queued cache fill.
///
/// Dropping the handle does not cancel the download.
#[derive(Debug)]
pub struct PendingCache {
    state: PendingState,
}

#[derive(Debug)]
enum PendingState {
    Ready(Result<PathBuf>),
    Queued(oneshot::Receiver<Result<PathBuf>>),
}

impl PendingCache {
    fn ready(result: Result<PathBuf>) -> Self {
        Self {
            state: PendingState::Ready(result),
        }
    }

    fn queued(receiver: oneshot::Receiver<Result<PathBuf>>) -> Self {
        Self {
            state: PendingState::Queued(receiver),
        }
    }

    /// Whether the result was known without queueing a download.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, PendingState::Ready(_))
    }

    /// Wait for the final path of the cached file.
    pub async fn wait(self) -> Result<PathBuf> {
        match self.state {
            PendingState::Ready(result) => result,
            PendingState::Queued(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(PlaybackError::WorkerStopped)),
        }
    }
}

struct StoreInner {
    config: CacheConfig,
    resolver: Arc<dyn TrackResolver>,
    event_bus: Option<EventBus>,
}

/// Disk-backed audio cache.
///
/// Cloning yields another handle to the same directory and worker. The
/// worker exits once every handle is dropped.
#[derive(Clone)]
pub struct AudioCacheStore {
    inner: Arc<StoreInner>,
    jobs: mpsc::UnboundedSender<CacheJob>,
}

impl std::fmt::Debug for AudioCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioCacheStore")
            .field("config", &self.inner.config)
            .field("worker_alive", &!self.jobs.is_closed())
            .finish()
    }
}

impl AudioCacheStore {
    /// Open the cache directory and start the download worker.
    ///
    /// Creates the directory, deletes `.temp` files left behind by an
    /// interrupted download and runs an initial eviction sweep.
    ///
    /// Must be called from within a Tokio runtime.
    #[instrument(skip(resolver, event_bus), fields(dir = %config.cache_dir.display()))]
    pub async fn open(
        config: CacheConfig,
        resolver: Arc<dyn TrackResolver>,
        event_bus: Option<EventBus>,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::Config)?;

        tokio::fs::create_dir_all(&config.cache_dir)
            .await
            .map_err(|e| {
                error!("Failed to create cache directory: {}", e);
                PlaybackError::CacheError(format!("Cannot create cache directory: {}", e))
            })?;

        let inner = Arc::new(StoreInner {
            config,
            resolver,
            event_bus,
        });

        let orphans = inner.remove_orphan_temp_files().await?;
        if orphans > 0 {
            info!(orphans, "Removed interrupted downloads");
        }

        let report = inner.sweep().await?;
        debug!(
            files_removed = report.files_removed,
            bytes_remaining = report.bytes_remaining,
            "Initial sweep finished"
        );

        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(Arc::clone(&inner), receiver));

        info!(
            max_bytes = inner.config.max_cache_size_bytes,
            "Audio cache ready"
        );

        Ok(Self { inner, jobs })
    }

    /// Directory holding the cache files.
    pub fn cache_dir(&self) -> &Path {
        &self.inner.config.cache_dir
    }

    /// Configured budget in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.inner.config.max_cache_size_bytes
    }

    /// Whether a completed file exists for `url`.
    pub fn is_cached(&self, url: &str) -> bool {
        self.cached_path(url).is_some()
    }

    /// Path of the completed file for `url`, without refreshing recency.
    pub fn cached_path(&self, url: &str) -> Option<PathBuf> {
        if url.is_empty() {
            return None;
        }

        let path = self.inner.final_path(url);
        path.is_file().then_some(path)
    }

    /// Path of the completed file for `url`, marking it as recently used.
    pub fn playback_path(&self, url: &str) -> Option<PathBuf> {
        let path = self.cached_path(url)?;
        if let Err(e) = touch(&path) {
            // Still servable; only its eviction order is stale.
            warn!(file = %strip_path(&path.to_string_lossy()), "Failed to refresh mtime: {}", e);
        }
        Some(path)
    }

    /// Make sure `url` ends up in the cache.
    ///
    /// Resolves immediately when the file already exists. Otherwise the
    /// download is queued behind any other pending job.
    pub fn cache_async(&self, url: &str) -> PendingCache {
        if url.is_empty() {
            return PendingCache::ready(Err(PlaybackError::MissingUrl(
                "empty url".to_string(),
            )));
        }

        if let Some(path) = self.cached_path(url) {
            return PendingCache::ready(Ok(path));
        }

        let (reply, receiver) = oneshot::channel();
        let job = CacheJob::Download {
            url: url.to_string(),
            reply,
        };

        if self.jobs.send(job).is_err() {
            return PendingCache::ready(Err(PlaybackError::WorkerStopped));
        }

        debug!(url = %redact_url(url), "Queued cache fill");
        PendingCache::queued(receiver)
    }

    /// Cache `url` and wait for the final path.
    pub async fn cache(&self, url: &str) -> Result<PathBuf> {
        self.cache_async(url).wait().await
    }

    /// Run an eviction sweep on the worker.
    pub async fn sweep(&self) -> Result<EvictionReport> {
        let (reply, receiver) = oneshot::channel();
        self.submit(CacheJob::Sweep { reply }, receiver).await
    }

    /// Delete every cache file. Returns the number of files removed.
    pub async fn clear(&self) -> Result<usize> {
        let (reply, receiver) = oneshot::channel();
        self.submit(CacheJob::Clear { reply }, receiver).await
    }

    /// Current entry count and size.
    pub async fn stats(&self) -> Result<CacheStats> {
        let entries = self.inner.list_entries().await?;

        Ok(CacheStats {
            entry_count: entries.len(),
            total_bytes: entries.iter().map(|entry| entry.size).sum(),
            max_bytes: self.inner.config.max_cache_size_bytes,
            calculated_at: chrono::Utc::now().timestamp(),
        })
    }

    async fn submit<T>(&self, job: CacheJob, receiver: oneshot::Receiver<Result<T>>) -> Result<T> {
        self.jobs
            .send(job)
            .map_err(|_| PlaybackError::WorkerStopped)?;
        receiver
            .await
            .unwrap_or_else(|_| Err(PlaybackError::WorkerStopped))
    }
}

async fn run_worker(inner: Arc<StoreInner>, mut jobs: mpsc::UnboundedReceiver<CacheJob>) {
    debug!("Cache worker started");

    while let Some(job) = jobs.recv().await {
        match job {
            CacheJob::Download { url, reply } => {
                let result = inner.download(&url).await;
                let _ = reply.send(result);
            }
            CacheJob::Sweep { reply } => {
                let _ = reply.send(inner.sweep().await);
            }
            CacheJob::Clear { reply } => {
                let _ = reply.send(inner.clear().await);
            }
        }
    }

    debug!("Cache worker stopped");
}

impl StoreInner {
    fn final_path(&self, url: &str) -> PathBuf {
        self.config.cache_dir.join(cache_key(url))
    }

    fn temp_path(&self, url: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}{}", cache_key(url), TEMP_SUFFIX))
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(PlayerEvent::Cache(event)).ok();
        }
    }

    #[instrument(skip(self, url), fields(url = %redact_url(url)))]
    async fn download(&self, url: &str) -> Result<PathBuf> {
        let final_path = self.final_path(url);

        // Another job may have fetched the same URL while this one waited.
        if final_path.is_file() {
            debug!("Already cached, skipping download");
            return Ok(final_path);
        }

        let temp_path = self.temp_path(url);
        let key = cache_key(url);

        match self.fetch_to(url, &temp_path, &final_path).await {
            Ok(bytes) => {
                info!(bytes, "Track cached");
                self.emit(CacheEvent::Stored { key, bytes });

                match self.sweep().await {
                    Ok(report) if !report.is_noop() => debug!(
                        files_removed = report.files_removed,
                        "Post-download sweep evicted entries"
                    ),
                    Ok(_) => {}
                    Err(e) => warn!("Post-download sweep failed: {}", e),
                }

                Ok(final_path)
            }
            Err(e) => {
                warn!("Caching failed: {}", e);
                if let Err(remove_err) = tokio::fs::remove_file(&temp_path).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        error!("Failed to delete temp file: {}", remove_err);
                    }
                }
                self.emit(CacheEvent::Failed {
                    key,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_to(&self, url: &str, temp_path: &Path, final_path: &Path) -> Result<u64> {
        let mut stream = self
            .resolver
            .download_stream(url.to_string())
            .await
            .map_err(|e| match e {
                BridgeError::HttpStatus { .. } => PlaybackError::Bridge(e),
                other => PlaybackError::SourceUnavailable(other.to_string()),
            })?;

        let mut file = tokio::fs::File::create(temp_path).await?;
        let mut buffer = vec![0u8; self.config.copy_buffer_bytes];
        let mut total = 0u64;

        loop {
            let read = stream
                .read(&mut buffer)
                .await
                .map_err(|e| PlaybackError::StreamingFailed(e.to_string()))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read]).await?;
            total += read as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(temp_path, final_path).await?;
        touch(final_path)?;

        Ok(total)
    }

    async fn list_entries(&self) -> Result<Vec<DiskEntry>> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.config.cache_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if is_temp_file(&path) {
                continue;
            }

            // Entry may vanish between listing and stat.
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            entries.push(DiskEntry {
                path,
                size: metadata.len(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(entries)
    }

    async fn remove_orphan_temp_files(&self) -> Result<usize> {
        let mut removed = 0;
        let mut dir = tokio::fs::read_dir(&self.config.cache_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if !is_temp_file(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(file = %strip_path(&path.to_string_lossy()), "Failed to remove orphan: {}", e),
            }
        }

        Ok(removed)
    }

    /// Delete oldest-mtime entries until the total fits the budget.
    async fn sweep(&self) -> Result<EvictionReport> {
        let mut entries = self.list_entries().await?;
        let total: u64 = entries.iter().map(|entry| entry.size).sum();
        let budget = self.config.max_cache_size_bytes;

        let mut report = EvictionReport {
            bytes_remaining: total,
            ..Default::default()
        };

        if total <= budget {
            return Ok(report);
        }

        info!(total, budget, "Cache over budget, evicting");
        entries.sort_by_key(|entry| entry.modified);

        for entry in entries {
            if report.bytes_remaining <= budget {
                break;
            }

            match tokio::fs::remove_file(&entry.path).await {
                Ok(()) => {
                    debug!(file = %strip_path(&entry.path.to_string_lossy()), size = entry.size, "Evicted");
                    report.files_removed += 1;
                    report.bytes_freed += entry.size;
                    report.bytes_remaining -= entry.size;
                }
                Err(e) => {
                    warn!(file = %strip_path(&entry.path.to_string_lossy()), "Eviction failed: {}", e)
                }
            }
        }

        if report.bytes_remaining > budget {
            warn!(
                bytes_remaining = report.bytes_remaining,
                "Cache still over budget after sweep"
            );
        }

        self.emit(CacheEvent::Evicted {
            files_removed: report.files_removed,
            bytes_freed: report.bytes_freed,
            bytes_remaining: report.bytes_remaining,
        });

        Ok(report)
    }

    async fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        let mut dir = tokio::fs::read_dir(&self.config.cache_dir).await?;

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(file = %strip_path(&path.to_string_lossy()), "Failed to remove: {}", e),
            }
        }

        info!(removed, "Cache cleared");
        self.emit(CacheEvent::Cleared {
            files_removed: removed,
        });

        Ok(removed)
    }
}
