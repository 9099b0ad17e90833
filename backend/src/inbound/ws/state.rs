//! Shared WebSocket adapter state.
//!
//! The entry point needs the concrete broadcast publisher rather than the
//! publish-only port: joined sessions open their own subscriptions.

use crate::outbound::broadcast::BroadcastPublisher;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub events: BroadcastPublisher,
}

impl WsState {
    /// Construct state over the event fan-out channel.
    pub fn new(events: BroadcastPublisher) -> Self {
        Self { events }
    }
}
