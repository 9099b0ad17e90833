//! WebSocket session handler tests.

use super::*;
use crate::domain::{GameCompletedEvent, GameEvent, StatsUpdatedEvent, UserId};
use crate::inbound::ws;
use crate::inbound::ws::state::WsState;
use crate::outbound::broadcast::BroadcastPublisher;
use actix_web::{dev::Server, dev::ServerHandle, App, HttpServer};
use awc::{ws::Codec, ws::Frame, ws::Message, BoxedSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use rstest::{fixture, rstest};
use serde_json::Value;
use std::time::Duration;

#[fixture]
fn publisher() -> BroadcastPublisher {
    BroadcastPublisher::new()
}

#[fixture]
async fn start_ws_server(publisher: BroadcastPublisher) -> (String, Server, BroadcastPublisher) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let ws_state = WsState::new(publisher.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(ws_state.clone()))
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server, publisher)
}

#[fixture]
async fn ws_client(
    #[future] start_ws_server: (String, Server, BroadcastPublisher),
) -> (
    actix_codec::Framed<BoxedSocket, Codec>,
    ServerHandle,
    BroadcastPublisher,
) {
    let (url, server, publisher) = start_ws_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/ws"))
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle, publisher)
}

fn completed_event(username: &str, score: i32) -> GameEvent {
    GameEvent::GameCompleted(GameCompletedEvent {
        user_id: UserId::random(),
        employee_number: None,
        username: username.to_owned(),
        score,
        level: 1,
        lines_cleared: 0,
        game_duration_secs: 0,
        timestamp: Utc::now(),
        is_new_high_score: true,
    })
}

async fn next_text_frame(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) -> Value {
    let payload = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let frame = socket.next().await.expect("response frame").expect("frame");
            match frame {
                Frame::Text(bytes) => return bytes.to_vec(),
                Frame::Ping(_) | Frame::Pong(_) => continue,
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("text frame within timeout");
    serde_json::from_slice(&payload).expect("json frame")
}

async fn join_as_admin(socket: &mut actix_codec::Framed<BoxedSocket, Codec>) {
    socket
        .send(Message::Text(r#"{"type":"admin-join"}"#.into()))
        .await
        .expect("send join");
    let ack = next_text_frame(socket).await;
    assert_eq!(ack.get("type").and_then(Value::as_str), Some("adminJoined"));
}

#[rstest]
#[actix_rt::test]
async fn joined_session_receives_game_events(
    #[future] ws_client: (
        actix_codec::Framed<BoxedSocket, Codec>,
        ServerHandle,
        BroadcastPublisher,
    ),
) {
    let (mut socket, _server, publisher) = ws_client.await;
    join_as_admin(&mut socket).await;

    use crate::domain::ports::GameEventPublisher;
    publisher.publish(completed_event("Alice", 1234));

    let frame = next_text_frame(&mut socket).await;
    assert_eq!(
        frame.get("type").and_then(Value::as_str),
        Some("gameCompleted")
    );
    assert_eq!(frame.get("username").and_then(Value::as_str), Some("Alice"));
    assert_eq!(frame.get("score").and_then(Value::as_i64), Some(1234));
    assert_eq!(
        frame.get("isNewHighScore").and_then(Value::as_bool),
        Some(true)
    );
}

#[rstest]
#[actix_rt::test]
async fn events_before_joining_are_not_replayed(
    #[future] ws_client: (
        actix_codec::Framed<BoxedSocket, Codec>,
        ServerHandle,
        BroadcastPublisher,
    ),
) {
    let (mut socket, _server, publisher) = ws_client.await;

    use crate::domain::ports::GameEventPublisher;
    publisher.publish(completed_event("Early", 1));

    join_as_admin(&mut socket).await;
    publisher.publish(GameEvent::StatsUpdated(StatsUpdatedEvent {
        total_games: 2,
        user_high_score: 50,
    }));

    let frame = next_text_frame(&mut socket).await;
    assert_eq!(
        frame.get("type").and_then(Value::as_str),
        Some("statsUpdated"),
        "the pre-join event must not be delivered"
    );
    assert_eq!(frame.get("totalGames").and_then(Value::as_i64), Some(2));
}

#[rstest]
#[actix_rt::test]
async fn closes_on_malformed_json(
    #[future] ws_client: (
        actix_codec::Framed<BoxedSocket, Codec>,
        ServerHandle,
        BroadcastPublisher,
    ),
) {
    let (mut socket, _server, _publisher) = ws_client.await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let frame = socket.next().await.expect("response frame").expect("frame");
    match frame {
        Frame::Close(reason) => {
            assert_eq!(reason.expect("reason").code, CloseCode::Policy);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_client_messages(
    #[future] ws_client: (
        actix_codec::Framed<BoxedSocket, Codec>,
        ServerHandle,
        BroadcastPublisher,
    ),
) {
    let (mut socket, _server, _publisher) = ws_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            let frame = frame.expect("frame");
            match frame {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
