//! Per-connection WebSocket handler.
//!
//! Keeps WebSocket framing and heartbeats at the edge while the domain
//! publishes events without knowing who is listening. The public contract
//! pings every 5s and considers a connection idle after 10s without client
//! traffic. A connection receives no events until it sends the
//! `admin-join` control message; events published before joining are not
//! replayed. Tests shorten the intervals to speed up feedback.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast;
use tokio::time;
use tracing::warn;

use crate::domain::GameEvent;
use crate::inbound::ws::messages::{ClientCommand, ServerFrame};
use crate::outbound::broadcast::BroadcastPublisher;

/// Time between heartbeats to the client.
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    events: BroadcastPublisher,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(events).run(session, stream).await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
    EventFeedClosed,
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

/// Await the next admin event, or park forever while not joined.
async fn next_event(
    feed: &mut Option<broadcast::Receiver<GameEvent>>,
) -> Result<GameEvent, broadcast::error::RecvError> {
    match feed {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

struct WsSession {
    events: BroadcastPublisher,
}

impl WsSession {
    fn new(events: BroadcastPublisher) -> Self {
        Self { events }
    }

    async fn run(&self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);
        let mut admin_feed: Option<broadcast::Receiver<GameEvent>> = None;

        loop {
            let result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(
                        &mut session,
                        &mut admin_feed,
                        &mut last_heartbeat,
                        message,
                    )
                    .await
                }
                event = next_event(&mut admin_feed) => {
                    self.handle_admin_event(&mut session, event).await
                }
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = self.close_action_for(&error);
                self.close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        admin_feed: &mut Option<broadcast::Receiver<GameEvent>>,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => {
                self.handle_message(session, admin_feed, last_heartbeat, message)
                    .await
            }
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        admin_feed: &mut Option<broadcast::Receiver<GameEvent>>,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, admin_feed, text.as_ref())
                    .await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &self,
        session: &mut Session,
        admin_feed: &mut Option<broadcast::Receiver<GameEvent>>,
        text: &str,
    ) -> Result<(), SessionError> {
        let command = match serde_json::from_str::<ClientCommand>(text) {
            Ok(command) => command,
            Err(error) => {
                warn!(error = %error, "rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        match command {
            ClientCommand::AdminJoin => {
                if admin_feed.is_none() {
                    *admin_feed = Some(self.events.subscribe());
                }
                self.send_frame(session, &ServerFrame::AdminJoined)
                    .await
                    .map_err(SessionError::Network)
            }
        }
    }

    async fn handle_admin_event(
        &self,
        session: &mut Session,
        event: Result<GameEvent, broadcast::error::RecvError>,
    ) -> Result<(), SessionError> {
        match event {
            Ok(event) => self
                .send_frame(session, &ServerFrame::from(event))
                .await
                .map_err(SessionError::Network),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // The session fell behind; newer events still flow.
                warn!(skipped, "admin session lagged behind the event feed");
                Ok(())
            }
            Err(broadcast::error::RecvError::Closed) => Err(SessionError::EventFeedClosed),
        }
    }

    async fn send_frame(&self, session: &mut Session, frame: &ServerFrame) -> Result<(), Closed> {
        match serde_json::to_string(frame) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                warn!(error = %error, "failed to serialize WebSocket frame");
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::EventFeedClosed => {
                warn!("event feed closed; closing admin connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::EventFeedClosed => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("server shutting down".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
