//! Broadcast channel fan-out towards admin WebSocket sessions.
//!
//! Publishing is fire-and-forget: a send with no subscribers is normal
//! (no admin connected) and slow subscribers that lag behind the channel
//! capacity lose the oldest events rather than applying backpressure to
//! the write path.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::ports::GameEventPublisher;
use crate::domain::GameEvent;

/// Events buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Publisher backed by a `tokio::sync::broadcast` channel.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<GameEvent>,
}

impl BroadcastPublisher {
    /// Create a publisher with the default buffer capacity.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Open a subscription receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEventPublisher for BroadcastPublisher {
    fn publish(&self, event: GameEvent) {
        if self.sender.send(event).is_err() {
            // No subscribers attached; the event is intentionally dropped.
            debug!("game event published with no admin observers");
        }
    }
}
