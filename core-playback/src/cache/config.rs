//! Cache configuration

use std::path::PathBuf;

/// Default cache budget: 100 MB.
pub const DEFAULT_MAX_CACHE_BYTES: u64 = 100 * 1024 * 1024;

/// Default chunk size used when copying a download stream to disk.
pub const DEFAULT_COPY_BUFFER_BYTES: usize = 8 * 1024;

/// Suffix of in-progress downloads. Files carrying it are never served.
pub const TEMP_SUFFIX: &str = ".temp";

/// Configuration for the audio cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding cache files. Created on open.
    pub cache_dir: PathBuf,

    /// Maximum total size of cache files in bytes (default: 100 MB)
    pub max_cache_size_bytes: u64,

    /// Read buffer for download copies (default: 8 KB)
    pub copy_buffer_bytes: usize,
}

impl CacheConfig {
    /// Create a configuration for `cache_dir` with default values.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            max_cache_size_bytes: DEFAULT_MAX_CACHE_BYTES,
            copy_buffer_bytes: DEFAULT_COPY_BUFFER_BYTES,
        }
    }

    /// Set maximum cache size.
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_cache_size_bytes = bytes;
        self
    }

    /// Set the copy buffer size.
    pub fn with_copy_buffer(mut self, bytes: usize) -> Self {
        self.copy_buffer_bytes = bytes;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err("cache_dir cannot be empty".to_string());
        }

        if self.max_cache_size_bytes == 0 {
            return Err("max_cache_size_bytes must be greater than 0".to_string());
        }

        if self.copy_buffer_bytes == 0 {
            return Err("copy_buffer_bytes must be greater than 0".to_string());
        }

        Ok(())
    }
}
