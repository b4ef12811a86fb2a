//! Tests for the playback queue controller
//!
//! Drives the controller against a scripted engine that reports its
//! callbacks the way a native player would.

use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, BridgeError, ByteStream, EngineEvent, EngineEventSink, EngineState,
    MediaEngine, MediaSource, RepeatMode, TrackResolver,
};
use core_playback::cache::{AudioCacheStore, CacheConfig};
use core_playback::{
    CommandOutcome, ControllerConfig, PlaybackQueueController, Track, TransportState,
};
use core_runtime::events::{EventBus, PlaybackEvent, PlayerEvent};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

const WAIT: Duration = Duration::from_secs(2);

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct FakeEngine {
    sink: Mutex<Option<EngineEventSink>>,
    loaded: Mutex<Vec<MediaSource>>,
    repeat_modes: Mutex<Vec<RepeatMode>>,
    seeks: Mutex<Vec<u64>>,
    load_delay: Mutex<Duration>,
    playing: AtomicBool,
    /// Report `Ready` before `IsPlayingChanged(true)`, as ExoPlayer does.
    ready_first: AtomicBool,
    fail_loads: AtomicBool,
    position: AtomicU64,
    stops: AtomicUsize,
}

impl FakeEngine {
    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.emit(event);
        }
    }

    fn loads(&self) -> Vec<MediaSource> {
        self.loaded.lock().clone()
    }

    fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock() = delay;
    }

    /// The loaded source played to its end.
    fn finish_track(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.emit(EngineEvent::IsPlayingChanged(false));
        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Ended));
    }

    fn fail(&self, message: &str) {
        self.playing.store(false, Ordering::SeqCst);
        self.emit(EngineEvent::Error {
            message: message.to_string(),
        });
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn load_source(&self, source: MediaSource) -> BridgeResult<()> {
        let delay = *self.load_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(BridgeError::Engine("source unsupported".to_string()));
        }
        self.loaded.lock().push(source);
        self.position.store(0, Ordering::SeqCst);
        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Buffering));
        Ok(())
    }

    async fn prepare(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.playing.store(true, Ordering::SeqCst);
        if self.ready_first.load(Ordering::SeqCst) {
            self.emit(EngineEvent::PlaybackStateChanged(EngineState::Ready));
            self.emit(EngineEvent::IsPlayingChanged(true));
        } else {
            self.emit(EngineEvent::IsPlayingChanged(true));
            self.emit(EngineEvent::PlaybackStateChanged(EngineState::Ready));
        }
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.playing.store(false, Ordering::SeqCst);
        self.emit(EngineEvent::IsPlayingChanged(false));
        Ok(())
    }

    async fn stop(&self) -> BridgeResult<()> {
        self.playing.store(false, Ordering::SeqCst);
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Idle));
        Ok(())
    }

    async fn seek_to(&self, position_ms: u64) -> BridgeResult<()> {
        self.seeks.lock().push(position_ms);
        self.position.store(position_ms, Ordering::SeqCst);
        Ok(())
    }

    async fn current_position(&self) -> BridgeResult<u64> {
        Ok(self.position.load(Ordering::SeqCst))
    }

    async fn duration(&self) -> BridgeResult<Option<u64>> {
        Ok(Some(180_000))
    }

    async fn is_playing(&self) -> BridgeResult<bool> {
        Ok(self.playing.load(Ordering::SeqCst))
    }

    async fn set_repeat_mode(&self, mode: RepeatMode) -> BridgeResult<()> {
        self.repeat_modes.lock().push(mode);
        Ok(())
    }

    fn set_event_sink(&self, sink: EngineEventSink) {
        *self.sink.lock() = Some(sink);
    }
}

#[derive(Default)]
struct StaticResolver {
    calls: AtomicUsize,
}

#[async_trait]
impl TrackResolver for StaticResolver {
    async fn download_stream(&self, _url: String) -> BridgeResult<ByteStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stream: ByteStream = Box::new(Cursor::new(vec![7u8; 256]));
        Ok(stream)
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    controller: PlaybackQueueController,
    engine: Arc<FakeEngine>,
    resolver: Arc<StaticResolver>,
    bus: EventBus,
    _dir: TempDir,
}

fn test_config() -> ControllerConfig {
    ControllerConfig::default()
        .with_position_interval(Duration::from_millis(20))
        .with_error_recovery_delay(Duration::from_millis(50))
}

async fn harness_with(config: ControllerConfig) -> Harness {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(FakeEngine::default());
    let resolver = Arc::new(StaticResolver::default());
    let bus = EventBus::new(256);

    let cache = AudioCacheStore::open(
        CacheConfig::new(dir.path()),
        resolver.clone(),
        Some(bus.clone()),
    )
    .await
    .unwrap();

    let controller = PlaybackQueueController::new(engine.clone(), cache, config, bus.clone())
        .await
        .unwrap();

    Harness {
        controller,
        engine,
        resolver,
        bus,
        _dir: dir,
    }
}

async fn harness() -> Harness {
    harness_with(test_config()).await
}

fn track(i: usize) -> Track {
    Track::new(format!("t{}", i), format!("Song {}", i), "Artist")
        .with_url(format!("https://cdn.example.com/{}.mp3?sig=s{}", i, i))
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n).map(track).collect()
}

async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, predicate: impl FnMut(&T) -> bool) -> T {
    let value = tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for signal")
        .expect("publisher dropped");
    T::clone(&value)
}

async fn wait_for_state(harness: &Harness, state: TransportState) {
    let mut rx = harness.controller.observers().transport_state;
    wait_for(&mut rx, |current| *current == state).await;
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Queue replacement
// ============================================================================

#[tokio::test]
async fn test_play_single_streams_and_fills_cache() {
    let h = harness().await;
    let t = track(1);
    let url = t.url().unwrap().to_string();

    assert_eq!(h.controller.play_single(t).await, CommandOutcome::Executed);
    wait_for_state(&h, TransportState::Playing).await;

    assert_eq!(
        h.engine.loads(),
        vec![MediaSource::RemoteStream { url: url.clone() }]
    );
    assert!(h.controller.is_playing());
    assert_eq!(h.controller.current_index(), Some(0));

    let cache = h.controller.cache().clone();
    eventually(|| cache.is_cached(&url)).await;
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cached_track_loads_local_file() {
    let h = harness().await;
    let t = track(2);
    let url = t.url().unwrap().to_string();
    let path = h.controller.cache().cache(&url).await.unwrap();

    h.controller.play_single(t).await;
    wait_for_state(&h, TransportState::Playing).await;

    assert_eq!(h.engine.loads(), vec![MediaSource::LocalFile { path }]);
    assert_eq!(h.resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_download_before_play_when_streaming_disabled() {
    let h = harness_with(test_config().with_stream_while_caching(false)).await;
    let t = track(3);
    let url = t.url().unwrap().to_string();

    h.controller.play_single(t).await;
    wait_for_state(&h, TransportState::Playing).await;

    let expected = h.controller.cache().cached_path(&url).unwrap();
    assert_eq!(h.engine.loads(), vec![MediaSource::LocalFile { path: expected }]);
}

#[tokio::test]
async fn test_play_single_without_url_is_refused() {
    let h = harness().await;
    let mut events = h.controller.events();

    let outcome = h
        .controller
        .play_single(Track::new("silent", "No URL", "Artist").with_url(""))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(outcome, CommandOutcome::Unchanged);
    assert_eq!(h.controller.transport_state(), TransportState::Idle);
    assert!(h.controller.queue().is_empty());
    assert!(h.engine.loads().is_empty());

    while let Some(Ok(event)) = events.try_recv() {
        if let PlayerEvent::Playback(PlaybackEvent::StateChanged { state, .. }) = event {
            assert_ne!(state, "preparing");
            assert_ne!(state, "playing");
        }
    }
}

#[tokio::test]
async fn test_play_queue_with_empty_list_is_noop() {
    let h = harness().await;
    h.controller.play_queue(tracks(3), 1).await;

    assert_eq!(
        h.controller.play_queue(Vec::new(), 0).await,
        CommandOutcome::Unchanged
    );
    assert_eq!(h.controller.queue().len(), 3);
    assert_eq!(h.controller.current_index(), Some(1));
}

#[tokio::test]
async fn test_play_queue_out_of_range_starts_at_zero() {
    let h = harness().await;
    h.controller.play_queue(tracks(3), 9).await;

    assert_eq!(h.controller.current_index(), Some(0));
    assert_eq!(h.controller.current_track().unwrap().id, "t0");
}

#[tokio::test]
async fn test_unplayable_entries_are_skipped() {
    let h = harness().await;
    let queue = vec![
        Track::new("a", "No URL", "Artist"),
        Track::new("b", "Blank URL", "Artist").with_url("  "),
        track(2),
    ];

    h.controller.play_queue(queue, 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    assert_eq!(h.controller.current_index(), Some(2));
    assert_eq!(h.engine.loads().len(), 1);
}

#[tokio::test]
async fn test_queue_without_playable_tracks_enters_error() {
    let h = harness().await;
    let queue = vec![
        Track::new("a", "No URL", "Artist"),
        Track::new("b", "No URL", "Artist"),
    ];

    h.controller.play_queue(queue, 0).await;

    assert_eq!(h.controller.transport_state(), TransportState::Error);
    assert!(h.engine.loads().is_empty());
}

// ============================================================================
// Queue editing
// ============================================================================

#[tokio::test]
async fn test_add_to_empty_queue_starts_playback() {
    let h = harness().await;

    h.controller.add_to_queue(track(0)).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.add_to_queue(track(2)).await;
    h.controller.queue_next(track(1)).await;

    let ids: Vec<String> = h.controller.queue().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t0", "t1", "t2"]);
    assert_eq!(h.controller.current_index(), Some(0));
    assert_eq!(h.engine.loads().len(), 1);
}

#[tokio::test]
async fn test_remove_current_starts_replacement() {
    let h = harness().await;
    h.controller.play_queue(tracks(3), 1).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.remove_at(1).await;

    assert_eq!(h.controller.current_track().unwrap().id, "t2");
    assert_eq!(h.engine.loads().len(), 2);

    assert_eq!(h.controller.remove_at(7).await, CommandOutcome::Unchanged);
}

#[tokio::test]
async fn test_clear_queue_stops_engine() {
    let h = harness().await;
    h.controller.play_queue(tracks(2), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.clear_queue().await;

    assert!(h.controller.queue().is_empty());
    assert_eq!(h.controller.current_index(), None);
    assert_eq!(h.controller.transport_state(), TransportState::Idle);
    assert_eq!(h.engine.stops.load(Ordering::SeqCst), 1);
    assert!(h.controller.observers().current_track.borrow().is_none());
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_concurrent_skips_move_cursor_once() {
    let h = harness().await;
    h.controller.play_queue(tracks(5), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.set_load_delay(Duration::from_millis(100));
    let (first, second) = tokio::join!(h.controller.skip_to_next(), h.controller.skip_to_next());

    let mut outcomes = vec![first, second];
    outcomes.sort_by_key(|outcome| *outcome == CommandOutcome::Busy);
    assert_eq!(outcomes, vec![CommandOutcome::Executed, CommandOutcome::Busy]);
    assert_eq!(h.controller.current_index(), Some(1));
}

#[tokio::test]
async fn test_skip_stops_at_queue_edges() {
    let h = harness().await;
    h.controller.play_queue(tracks(2), 0).await;

    assert_eq!(h.controller.skip_to_previous().await, CommandOutcome::Unchanged);
    assert_eq!(h.controller.skip_to_next().await, CommandOutcome::Executed);
    assert_eq!(h.controller.skip_to_next().await, CommandOutcome::Unchanged);
    assert_eq!(h.controller.skip_to_previous().await, CommandOutcome::Executed);
    assert_eq!(h.controller.current_index(), Some(0));

    assert_eq!(h.controller.skip_to_index(1).await, CommandOutcome::Executed);
    assert_eq!(h.controller.skip_to_index(5).await, CommandOutcome::Unchanged);
    assert_eq!(h.controller.current_index(), Some(1));
}

#[tokio::test]
async fn test_toggle_play_pause() {
    let h = harness().await;
    assert_eq!(h.controller.toggle_play_pause().await, CommandOutcome::Unchanged);

    h.controller.play_single(track(0)).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.toggle_play_pause().await;
    wait_for_state(&h, TransportState::Paused).await;
    assert!(!h.controller.refresh_play_state().await);

    h.controller.toggle_play_pause().await;
    wait_for_state(&h, TransportState::Playing).await;
    assert_eq!(h.engine.loads().len(), 1);
}

#[tokio::test]
async fn test_ready_before_playing_skips_paused() {
    let h = harness().await;
    h.engine.ready_first.store(true, Ordering::SeqCst);
    let mut events = h.bus.subscribe();

    h.controller.play_single(track(0)).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.toggle_play_pause().await;
    wait_for_state(&h, TransportState::Paused).await;
    h.controller.toggle_play_pause().await;
    wait_for_state(&h, TransportState::Playing).await;

    let mut states = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlayerEvent::Playback(PlaybackEvent::StateChanged { state, .. }) = event {
            states.push(state);
        }
    }
    assert_eq!(states, vec!["preparing", "playing", "paused", "playing"]);
}

#[tokio::test]
async fn test_seek_is_forwarded() {
    let h = harness().await;
    assert_eq!(h.controller.seek_to(1_000).await, CommandOutcome::Executed);
    assert_eq!(*h.controller.observers().position_ms.borrow(), 0);

    h.controller.play_single(track(0)).await;
    assert_eq!(h.controller.seek_to(42_000).await, CommandOutcome::Executed);

    assert_eq!(*h.engine.seeks.lock(), vec![1_000, 42_000]);
    assert_eq!(h.controller.position_ms().await, 42_000);
    assert_eq!(h.controller.duration_ms().await, Some(180_000));
    assert_eq!(*h.controller.observers().position_ms.borrow(), 42_000);
}

// ============================================================================
// Modes
// ============================================================================

#[tokio::test]
async fn test_shuffle_keeps_current_track_first() {
    let h = harness().await;
    h.controller.play_queue(tracks(10), 4).await;
    wait_for_state(&h, TransportState::Playing).await;

    assert!(h.controller.toggle_shuffle());

    assert_eq!(h.controller.current_index(), Some(0));
    assert_eq!(h.controller.current_track().unwrap().id, "t4");
    assert_eq!(h.controller.queue().len(), 10);
    assert_eq!(h.engine.loads().len(), 1);
    assert!(h.controller.is_playing());

    let order = h.controller.queue();
    assert!(!h.controller.toggle_shuffle());
    assert_eq!(h.controller.queue(), order);
    assert!(!*h.controller.observers().shuffle_enabled.borrow());
}

#[tokio::test]
async fn test_repeat_mode_cycles_back_after_three_toggles() {
    let h = harness().await;
    let start = h.controller.repeat_mode();

    h.controller.toggle_repeat_mode().await;
    h.controller.toggle_repeat_mode().await;
    let last = h.controller.toggle_repeat_mode().await;

    assert_eq!(last, start);
    assert_eq!(
        *h.engine.repeat_modes.lock(),
        vec![RepeatMode::Off, RepeatMode::One, RepeatMode::All, RepeatMode::Off]
    );
}

// ============================================================================
// Engine callbacks
// ============================================================================

#[tokio::test]
async fn test_ended_advances_then_goes_idle() {
    let h = harness().await;
    h.controller.play_queue(tracks(2), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.finish_track();
    eventually(|| h.engine.loads().len() == 2).await;
    wait_for_state(&h, TransportState::Playing).await;
    assert_eq!(h.controller.current_index(), Some(1));

    h.engine.finish_track();
    wait_for_state(&h, TransportState::Idle).await;
    assert_eq!(h.controller.current_index(), Some(1));
    assert_eq!(h.engine.loads().len(), 2);
}

#[tokio::test]
async fn test_repeat_all_wraps_and_repeat_one_replays() {
    let h = harness().await;
    h.controller.play_queue(tracks(2), 1).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.controller.toggle_repeat_mode().await;
    assert_eq!(h.controller.repeat_mode(), RepeatMode::One);
    h.engine.finish_track();
    eventually(|| h.engine.loads().len() == 2).await;
    assert_eq!(h.controller.current_index(), Some(1));

    h.controller.toggle_repeat_mode().await;
    assert_eq!(h.controller.repeat_mode(), RepeatMode::All);
    wait_for_state(&h, TransportState::Playing).await;
    h.engine.finish_track();
    eventually(|| h.engine.loads().len() == 3).await;
    assert_eq!(h.controller.current_index(), Some(0));
}

#[tokio::test]
async fn test_engine_error_advances_after_delay() {
    let h = harness().await;
    let mut events = h.controller.events().filter(|event| {
        matches!(event, PlayerEvent::Playback(PlaybackEvent::Error { .. }))
    });

    h.controller.play_queue(tracks(3), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.fail("decoder init failed");
    wait_for_state(&h, TransportState::Error).await;
    assert_eq!(h.controller.current_index(), Some(0));

    match tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap() {
        PlayerEvent::Playback(PlaybackEvent::Error {
            track_id,
            recoverable,
            ..
        }) => {
            assert_eq!(track_id.as_deref(), Some("t0"));
            assert!(recoverable);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    wait_for_state(&h, TransportState::Playing).await;
    assert_eq!(h.controller.current_index(), Some(1));
}

#[tokio::test]
async fn test_error_on_last_track_stays_in_error() {
    let h = harness().await;
    h.controller.play_single(track(0)).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.fail("network lost");
    wait_for_state(&h, TransportState::Error).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(h.controller.transport_state(), TransportState::Error);
    assert_eq!(h.engine.loads().len(), 1);
}

#[tokio::test]
async fn test_failed_load_releases_transport_guard() {
    let h = harness().await;
    h.controller.play_queue(tracks(4), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.fail_loads.store(true, Ordering::SeqCst);
    assert_eq!(h.controller.skip_to_next().await, CommandOutcome::Executed);
    assert_eq!(h.controller.transport_state(), TransportState::Error);
    assert_eq!(h.controller.current_index(), Some(1));

    h.engine.fail_loads.store(false, Ordering::SeqCst);
    assert_eq!(h.controller.skip_to_next().await, CommandOutcome::Executed);
    assert_eq!(h.controller.current_index(), Some(2));
    wait_for_state(&h, TransportState::Playing).await;

    // The retry scheduled by the failed load finds the player healthy.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(h.controller.current_index(), Some(2));
    assert_eq!(h.engine.loads().len(), 2);
}

#[tokio::test]
async fn test_failed_load_recovers_to_next_track() {
    let h = harness().await;
    h.controller.play_queue(tracks(3), 0).await;
    wait_for_state(&h, TransportState::Playing).await;

    h.engine.fail_loads.store(true, Ordering::SeqCst);
    h.controller.skip_to_next().await;
    assert_eq!(h.controller.transport_state(), TransportState::Error);

    h.engine.fail_loads.store(false, Ordering::SeqCst);
    wait_for_state(&h, TransportState::Playing).await;
    assert_eq!(h.controller.current_index(), Some(2));
    assert_eq!(h.engine.loads().len(), 2);
}

// ============================================================================
// Publisher
// ============================================================================

#[tokio::test]
async fn test_position_published_only_while_playing() {
    let h = harness().await;
    let mut position = h.controller.observers().position_ms;

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(*position.borrow(), 0);

    h.controller.play_single(track(0)).await;
    wait_for_state(&h, TransportState::Playing).await;
    h.engine.position.store(5_000, Ordering::SeqCst);
    wait_for(&mut position, |ms| *ms == 5_000).await;

    h.controller.toggle_play_pause().await;
    wait_for_state(&h, TransportState::Paused).await;
    h.engine.position.store(9_000, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(*position.borrow(), 5_000);
}

#[tokio::test]
async fn test_track_change_reaches_event_bus() {
    let h = harness().await;
    let mut events = h.bus.subscribe();

    h.controller.play_queue(tracks(2), 1).await;

    let mut saw_track = false;
    let mut saw_queue = false;
    while let Ok(event) = events.try_recv() {
        match event {
            PlayerEvent::Playback(PlaybackEvent::TrackChanged { track_id, index, .. }) => {
                assert_eq!(track_id.as_deref(), Some("t1"));
                assert_eq!(index, Some(1));
                saw_track = true;
            }
            PlayerEvent::Playback(PlaybackEvent::QueueChanged { length, current_index }) => {
                assert_eq!(length, 2);
                assert_eq!(current_index, Some(1));
                saw_queue = true;
            }
            _ => {}
        }
    }
    assert!(saw_track && saw_queue);
}

#[tokio::test]
async fn test_shutdown_stops_engine() {
    let h = harness().await;
    h.controller.play_single(track(0)).await;

    h.controller.shutdown().await;

    assert_eq!(h.engine.stops.load(Ordering::SeqCst), 1);
    assert_eq!(h.controller.transport_state(), TransportState::Idle);
    assert_eq!(
        h.controller.play_single(track(1)).await,
        CommandOutcome::Unchanged
    );
    assert_eq!(
        h.controller.play_queue(tracks(3), 2).await,
        CommandOutcome::Unchanged
    );
    assert_eq!(
        h.controller.add_to_queue(track(4)).await,
        CommandOutcome::Unchanged
    );

    let ids: Vec<String> = h.controller.queue().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["t0"]);
    assert_eq!(h.controller.current_index(), Some(0));
    assert_eq!(h.engine.loads().len(), 1);
}
