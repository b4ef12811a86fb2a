//! End-to-end tests for the playback façade.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::ByteStream;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CacheEvent, PlaybackEvent, PlayerEvent};
use core_service::{
    CommandOutcome, CoreError, EngineEvent, EngineEventSink, EngineState, MediaEngine,
    MediaSource, PlaybackManager, RepeatMode, Track, TrackResolver, TransportState,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingEngine {
    sink: Mutex<Option<EngineEventSink>>,
    loaded: Mutex<Vec<MediaSource>>,
}

impl RecordingEngine {
    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = self.sink.lock().as_ref() {
            sink.emit(event);
        }
    }
}

#[async_trait]
impl MediaEngine for RecordingEngine {
    async fn load_source(&self, source: MediaSource) -> BridgeResult<()> {
        self.loaded.lock().push(source);
        Ok(())
    }
    async fn prepare(&self) -> BridgeResult<()> {
        Ok(())
    }
    async fn play(&self) -> BridgeResult<()> {
        self.emit(EngineEvent::IsPlayingChanged(true));
        self.emit(EngineEvent::PlaybackStateChanged(EngineState::Ready));
        Ok(())
    }
    async fn pause(&self) -> BridgeResult<()> {
        self.emit(EngineEvent::IsPlayingChanged(false));
        Ok(())
    }
    async fn stop(&self) -> BridgeResult<()> {
        Ok(())
    }
    async fn seek_to(&self, _position_ms: u64) -> BridgeResult<()> {
        Ok(())
    }
    async fn current_position(&self) -> BridgeResult<u64> {
        Ok(0)
    }
    async fn duration(&self) -> BridgeResult<Option<u64>> {
        Ok(None)
    }
    async fn is_playing(&self) -> BridgeResult<bool> {
        Ok(false)
    }
    async fn set_repeat_mode(&self, _mode: RepeatMode) -> BridgeResult<()> {
        Ok(())
    }
    fn set_event_sink(&self, sink: EngineEventSink) {
        *self.sink.lock() = Some(sink);
    }
}

struct BytesResolver;

#[async_trait]
impl TrackResolver for BytesResolver {
    async fn download_stream(&self, _url: String) -> BridgeResult<ByteStream> {
        let stream: ByteStream = Box::new(std::io::Cursor::new(vec![1u8; 512]));
        Ok(stream)
    }
}

async fn manager(dir: &TempDir) -> (PlaybackManager, Arc<RecordingEngine>) {
    let engine = Arc::new(RecordingEngine::default());
    let config = CoreConfig::builder()
        .cache_dir(dir.path())
        .cache_size_mb(1)
        .media_engine(engine.clone())
        .track_resolver(Arc::new(BytesResolver))
        .position_interval(Duration::from_millis(20))
        .build()
        .unwrap();

    (PlaybackManager::new(config).await.unwrap(), engine)
}

#[tokio::test]
async fn test_play_then_replay_from_cache() {
    let dir = TempDir::new().unwrap();
    let (player, engine) = manager(&dir).await;
    let mut events = player.subscribe_events();

    let track = Track::new("1", "Song", "Artist").with_url("https://cdn.example.com/1.mp3");
    assert_eq!(
        player.controller().play_single(track.clone()).await,
        CommandOutcome::Executed
    );

    // The first play streams and fills the cache in the background.
    let stored = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(PlayerEvent::Cache(CacheEvent::Stored { bytes, .. })) = events.recv().await {
                return bytes;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(stored, 512);

    player.controller().play_single(track).await;

    let loads = engine.loaded.lock().clone();
    assert_eq!(loads.len(), 2);
    assert!(loads[0].is_remote());
    assert!(!loads[1].is_remote());

    let stats = player.cache_stats().await.unwrap();
    assert_eq!(stats.entry_count, 1);
    assert_eq!(stats.max_bytes, 1024 * 1024);
}

#[tokio::test]
async fn test_playback_settings_reach_controller() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let config = CoreConfig::builder()
        .cache_dir(dir.path())
        .media_engine(engine.clone())
        .track_resolver(Arc::new(BytesResolver))
        .initial_repeat_mode(RepeatMode::All)
        .stream_while_caching(false)
        .build()
        .unwrap();
    let player = PlaybackManager::new(config).await.unwrap();

    assert_eq!(player.controller().repeat_mode(), RepeatMode::All);

    let track = Track::new("1", "Song", "Artist").with_url("https://cdn.example.com/1.mp3");
    player.controller().play_single(track).await;

    // Downloaded before the engine sees it.
    let loads = engine.loaded.lock().clone();
    assert_eq!(loads.len(), 1);
    assert!(!loads[0].is_remote());
    assert_eq!(player.cache_stats().await.unwrap().entry_count, 1);
}

#[tokio::test]
async fn test_observers_follow_engine() {
    let dir = TempDir::new().unwrap();
    let (player, _engine) = manager(&dir).await;
    let mut state = player.observers().transport_state;
    let mut events = player
        .subscribe_events()
        .filter(|event| matches!(event, PlayerEvent::Playback(PlaybackEvent::TrackChanged { .. })));

    player
        .controller()
        .play_queue(
            vec![
                Track::new("a", "A", "Artist").with_url("https://cdn.example.com/a.mp3"),
                Track::new("b", "B", "Artist").with_url("https://cdn.example.com/b.mp3"),
            ],
            1,
        )
        .await;

    tokio::time::timeout(
        Duration::from_secs(2),
        state.wait_for(|s| *s == TransportState::Playing),
    )
    .await
    .unwrap()
    .unwrap();

    match events.recv().await.unwrap() {
        PlayerEvent::Playback(PlaybackEvent::TrackChanged { track_id, .. }) => {
            assert_eq!(track_id.as_deref(), Some("b"))
        }
        other => panic!("unexpected event: {:?}", other),
    }

    player.shutdown().await;
    assert_eq!(player.controller().transport_state(), TransportState::Idle);
}

#[tokio::test]
async fn test_clear_cache_through_facade() {
    let dir = TempDir::new().unwrap();
    let (player, _engine) = manager(&dir).await;

    player
        .cache()
        .cache("https://cdn.example.com/x.mp3")
        .await
        .unwrap();
    assert_eq!(player.clear_cache().await.unwrap(), 1);
    assert_eq!(player.cache_stats().await.unwrap().entry_count, 0);
}

#[tokio::test]
async fn test_missing_engine_is_reported() {
    let err: CoreError = CoreConfig::builder()
        .cache_dir("/tmp/midnight-cache")
        .track_resolver(Arc::new(BytesResolver))
        .build()
        .err()
        .unwrap()
        .into();

    match err {
        CoreError::CapabilityMissing { capability, .. } => assert_eq!(capability, "MediaEngine"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_cache_size_is_config_error() {
    let err: CoreError = CoreConfig::builder()
        .cache_dir("/tmp/midnight-cache")
        .cache_size_mb(0)
        .media_engine(Arc::new(RecordingEngine::default()))
        .track_resolver(Arc::new(BytesResolver))
        .build()
        .err()
        .unwrap()
        .into();

    assert!(matches!(err, CoreError::Config(_)));
}
