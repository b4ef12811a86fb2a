//! # Player State Publisher
//!
//! Fans controller state out to observers in two shapes:
//!
//! - `watch` channels for continuous values. A new subscriber sees the
//!   latest value immediately, which is what a UI binding wants.
//! - The runtime [`EventBus`] for discrete transitions.
//!
//! Also hosts the position sampler, which polls the engine on a fixed
//! interval while something is playing.

use crate::track::{Track, TransportState};
use bridge_traits::{MediaEngine, RepeatMode};
use core_runtime::events::{EventBus, EventStream, PlaybackEvent, PlayerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Receiving side of every player signal.
///
/// Each field replays its last value on subscription.
#[derive(Debug, Clone)]
pub struct PlayerObservers {
    pub current_track: watch::Receiver<Option<Track>>,
    pub is_playing: watch::Receiver<bool>,
    pub position_ms: watch::Receiver<u64>,
    pub shuffle_enabled: watch::Receiver<bool>,
    pub repeat_mode: watch::Receiver<RepeatMode>,
    pub transport_state: watch::Receiver<TransportState>,
}

/// Sending side of the player signals.
pub struct Publisher {
    current_track: watch::Sender<Option<Track>>,
    is_playing: watch::Sender<bool>,
    position_ms: watch::Sender<u64>,
    shuffle_enabled: watch::Sender<bool>,
    repeat_mode: watch::Sender<RepeatMode>,
    transport_state: watch::Sender<TransportState>,
    bus: EventBus,
}

/// Replace the value and notify only when it differs.
fn set_if_changed<T: PartialEq>(sender: &watch::Sender<T>, value: T) -> bool {
    sender.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    })
}

impl Publisher {
    pub fn new(bus: EventBus, repeat_mode: RepeatMode) -> Self {
        Self {
            current_track: watch::Sender::new(None),
            is_playing: watch::Sender::new(false),
            position_ms: watch::Sender::new(0),
            shuffle_enabled: watch::Sender::new(false),
            repeat_mode: watch::Sender::new(repeat_mode),
            transport_state: watch::Sender::new(TransportState::Idle),
            bus,
        }
    }

    pub fn observers(&self) -> PlayerObservers {
        PlayerObservers {
            current_track: self.current_track.subscribe(),
            is_playing: self.is_playing.subscribe(),
            position_ms: self.position_ms.subscribe(),
            shuffle_enabled: self.shuffle_enabled.subscribe(),
            repeat_mode: self.repeat_mode.subscribe(),
            transport_state: self.transport_state.subscribe(),
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn events(&self) -> EventStream {
        EventStream::new(self.bus.subscribe())
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        self.bus.emit(PlayerEvent::Playback(event)).ok();
    }

    pub fn is_playing(&self) -> bool {
        *self.is_playing.borrow()
    }

    pub fn current_track_id(&self) -> Option<String> {
        self.current_track
            .borrow()
            .as_ref()
            .map(|track| track.id.clone())
    }

    /// Publish the current entry. Compares by track id.
    pub fn publish_track(&self, entry: Option<(usize, Track)>) {
        let index = entry.as_ref().map(|(index, _)| *index);
        let track = entry.map(|(_, track)| track);

        let event = PlaybackEvent::TrackChanged {
            track_id: track.as_ref().map(|t| t.id.clone()),
            title: track.as_ref().map(|t| t.title.clone()),
            index,
        };

        if set_if_changed(&self.current_track, track) {
            self.position_ms.send_replace(0);
            self.emit(event);
        }
    }

    pub fn publish_state(&self, state: TransportState) {
        if set_if_changed(&self.transport_state, state) {
            set_if_changed(&self.is_playing, state.is_playing());
            self.emit(PlaybackEvent::StateChanged {
                state: state.as_str().to_string(),
                is_playing: state.is_playing(),
            });
        }
    }

    pub fn publish_position(&self, track_id: &str, position_ms: u64, duration_ms: Option<u64>) {
        self.position_ms.send_replace(position_ms);
        self.emit(PlaybackEvent::PositionChanged {
            track_id: track_id.to_string(),
            position_ms,
            duration_ms,
        });
    }

    pub fn publish_shuffle(&self, enabled: bool) {
        if set_if_changed(&self.shuffle_enabled, enabled) {
            self.emit(PlaybackEvent::ShuffleChanged { enabled });
        }
    }

    pub fn publish_repeat(&self, mode: RepeatMode) {
        if set_if_changed(&self.repeat_mode, mode) {
            self.emit(PlaybackEvent::RepeatModeChanged { mode });
        }
    }

    pub fn publish_queue(&self, length: usize, current_index: Option<usize>) {
        self.emit(PlaybackEvent::QueueChanged {
            length,
            current_index,
        });
    }

    pub fn publish_error(&self, track_id: Option<String>, message: String, recoverable: bool) {
        self.emit(PlaybackEvent::Error {
            track_id,
            message,
            recoverable,
        });
    }
}

/// Start sampling the engine position every `interval`.
///
/// Only reads from the engine. Ticks are skipped while nothing is playing.
pub fn spawn_position_sampler(
    engine: Arc<dyn MediaEngine>,
    publisher: Arc<Publisher>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval_ms = interval.as_millis() as u64, "Position sampler started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if !publisher.is_playing() {
                continue;
            }
            let Some(track_id) = publisher.current_track_id() else {
                continue;
            };

            match engine.current_position().await {
                Ok(position) => {
                    let duration = engine.duration().await.unwrap_or(None);
                    publisher.publish_position(&track_id, position, duration);
                }
                Err(e) => trace!("Position read failed: {}", e),
            }
        }

        debug!("Position sampler stopped");
    })
}
