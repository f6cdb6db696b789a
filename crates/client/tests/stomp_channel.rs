//! Channels against an in-process STOMP broker over a real WebSocket.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use baduk_client::{
    ChannelError, ChatChannel, ClientConfig, ConnectionState, FnSink, GameChannel, LobbyChannel,
    ServiceEndpoints, TransportError,
};
use baduk_protocol::{Command, Frame};

#[derive(Clone, Copy)]
enum BrokerMode {
    /// Accept CONNECT and echo TALK messages back to the room.
    Echo,
    /// Answer CONNECT with an ERROR frame.
    Reject,
    /// Complete the WebSocket upgrade but never answer CONNECT.
    Silent,
    /// Accept CONNECT, then answer the first SEND with an ERROR frame.
    ErrorOnSend,
}

/// Frames the broker received, in order.
#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<Frame>>>);

impl Received {
    fn all(&self) -> Vec<Frame> {
        self.0.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<Command> {
        self.all().into_iter().map(|f| f.command).collect()
    }

    fn sends_to(&self, destination: &str) -> Vec<Value> {
        self.all()
            .into_iter()
            .filter(|f| f.command == Command::Send && f.get_header("destination") == Some(destination))
            .map(|f| serde_json::from_str(&f.body).unwrap())
            .collect()
    }
}

async fn start_broker(mode: BrokerMode) -> (String, Received) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws-chat/websocket", listener.local_addr().unwrap());
    let received = Received::default();
    let log = received.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let log = log.clone();
            tokio::spawn(async move {
                let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                serve(ws, mode, log).await;
            });
        }
    });

    (url, received)
}

async fn serve(
    ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    mode: BrokerMode,
    log: Received,
) {
    let (mut write, mut read) = ws.split();
    let mut subscription: Option<(String, String)> = None;
    let mut message_id = 0;

    while let Some(Ok(msg)) = read.next().await {
        let Message::Text(text) = msg else { continue };
        let Ok(Some(frame)) = Frame::decode(&text) else { continue };
        log.0.lock().unwrap().push(frame.clone());

        let reply = match (frame.command, mode) {
            (Command::Connect, BrokerMode::Echo | BrokerMode::ErrorOnSend) => {
                Some(Frame::new(Command::Connected).header("version", "1.2"))
            }
            (Command::Connect, BrokerMode::Reject) => Some(
                Frame::new(Command::Error)
                    .header("message", "room is closed")
                    .with_body("room is closed"),
            ),
            (Command::Connect, BrokerMode::Silent) => None,
            (Command::Subscribe, _) => {
                subscription = Some((
                    frame.get_header("id").unwrap_or_default().to_string(),
                    frame.get_header("destination").unwrap_or_default().to_string(),
                ));
                None
            }
            (Command::Send, BrokerMode::ErrorOnSend) => Some(
                Frame::new(Command::Error)
                    .header("message", "boom")
                    .with_body("boom"),
            ),
            (Command::Send, _) => {
                let body: Value = serde_json::from_str(&frame.body).unwrap_or(Value::Null);
                match (&subscription, body["type"].as_str()) {
                    (Some((id, destination)), Some("TALK")) => {
                        message_id += 1;
                        Some(
                            Frame::new(Command::Message)
                                .header("subscription", id.as_str())
                                .header("destination", destination.as_str())
                                .header("message-id", message_id.to_string())
                                .with_body(frame.body.clone()),
                        )
                    }
                    _ => None,
                }
            }
            (Command::Disconnect, _) => break,
            _ => None,
        };

        if let Some(reply) = reply {
            if write.send(Message::Text(reply.encode())).await.is_err() {
                break;
            }
        }
    }
}

fn config_for(url: &str) -> ClientConfig {
    let endpoints = ServiceEndpoints {
        ws_url: url.to_string(),
        api_base: "http://127.0.0.1:1/api".to_string(),
    };
    ClientConfig {
        chat: endpoints.clone(),
        game: endpoints,
        connect_timeout: Some(Duration::from_secs(5)),
        request_timeout: None,
    }
}

fn collecting_sink() -> (Arc<FnSink<impl Fn(Value) + Send + Sync>>, Arc<Mutex<Vec<Value>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let store = Arc::clone(&events);
    let sink = FnSink::new(move |event| store.lock().unwrap().push(event));
    (Arc::new(sink), events)
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met within 5s");
}

#[tokio::test]
async fn test_chat_round_trip() {
    let (url, received) = start_broker(BrokerMode::Echo).await;
    let (sink, events) = collecting_sink();
    let chat = ChatChannel::new(&config_for(&url), "room-7", "alice", sink).unwrap();

    chat.connect().await.unwrap();
    assert!(chat.is_connected());
    assert_eq!(chat.state(), ConnectionState::Connected);

    eventually(|| received.sends_to("/app/chat.sendMessage").len() == 1).await;
    let frames = received.all();
    assert_eq!(frames[0].command, Command::Connect);
    assert_eq!(frames[1].command, Command::Subscribe);
    assert_eq!(frames[1].get_header("destination"), Some("/topic/chat/room/room-7"));
    assert_eq!(frames[1].get_header("username"), Some("alice"));
    assert_eq!(
        received.sends_to("/app/chat.sendMessage")[0],
        json!({"type": "ENTER", "roomId": "room-7", "sender": "alice", "message": ""})
    );

    chat.send_message("good game").unwrap();
    eventually(|| !events.lock().unwrap().is_empty()).await;
    assert_eq!(
        events.lock().unwrap()[0],
        json!({"type": "TALK", "roomId": "room-7", "sender": "alice", "message": "good game"})
    );

    chat.disconnect();
    eventually(|| received.commands().last() == Some(&Command::Disconnect)).await;
    let bodies = received.sends_to("/app/chat.sendMessage");
    assert_eq!(bodies.len(), 3);
    assert_eq!(bodies[2]["type"], "LEAVE");
    assert!(!chat.is_connected());
    assert_eq!(chat.send_message("anyone?"), Err(ChannelError::NotConnected));
}

#[tokio::test]
async fn test_game_join_move_and_negotiation() {
    let (url, received) = start_broker(BrokerMode::Echo).await;
    let (sink, _) = collecting_sink();
    let game = GameChannel::new(&config_for(&url), "g-1", "bob", sink).unwrap();

    game.connect().await.unwrap();
    game.play_move(4, 4).unwrap();
    game.request_undo().unwrap();
    assert!(game.play_move(20, 1).is_err());
    game.disconnect();

    eventually(|| received.commands().last() == Some(&Command::Disconnect)).await;
    let destinations: Vec<String> = received
        .all()
        .into_iter()
        .filter(|f| f.command == Command::Send)
        .filter_map(|f| f.get_header("destination").map(str::to_string))
        .collect();
    assert_eq!(
        destinations,
        vec![
            "/app/game/join",
            "/app/game/move",
            "/app/game/request/undo",
            "/app/game/leave",
        ]
    );
    assert_eq!(
        received.sends_to("/app/game/move")[0],
        json!({"gameId": "g-1", "username": "bob", "x": 4, "y": 4})
    );
}

#[tokio::test]
async fn test_lobby_requests_snapshot() {
    let (url, received) = start_broker(BrokerMode::Echo).await;
    let (sink, _) = collecting_sink();
    let lobby = LobbyChannel::new(&config_for(&url), sink);

    lobby.connect().await.unwrap();

    eventually(|| received.sends_to("/app/lobby.subscribe").len() == 1).await;
    let subscribe = received
        .all()
        .into_iter()
        .find(|f| f.command == Command::Subscribe)
        .unwrap();
    assert_eq!(subscribe.get_header("destination"), Some("/topic/lobby"));
    assert_eq!(subscribe.get_header("username"), None);
    lobby.disconnect();
}

#[tokio::test]
async fn test_broker_rejection_fails_connect() {
    let (url, _) = start_broker(BrokerMode::Reject).await;
    let (sink, _) = collecting_sink();
    let chat = ChatChannel::new(&config_for(&url), "room-7", "alice", sink).unwrap();

    let err = chat.connect().await.unwrap_err();

    assert_eq!(
        err,
        ChannelError::ConnectFailed(TransportError::Rejected("room is closed".to_string()))
    );
    assert!(!chat.is_connected());
    assert_eq!(chat.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_error_after_connect_marks_channel_failed() {
    let (url, received) = start_broker(BrokerMode::ErrorOnSend).await;
    let (sink, _) = collecting_sink();
    let chat = ChatChannel::new(&config_for(&url), "room-7", "alice", sink).unwrap();

    chat.connect().await.unwrap();
    eventually(|| !chat.is_connected()).await;

    assert_eq!(chat.state(), ConnectionState::Failed);
    assert_eq!(chat.send_message("still there?"), Err(ChannelError::NotConnected));
    assert_eq!(received.sends_to("/app/chat.sendMessage").len(), 1);

    chat.disconnect();
    assert_eq!(chat.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_silent_broker_times_out() {
    let (url, _) = start_broker(BrokerMode::Silent).await;
    let (sink, _) = collecting_sink();
    let mut config = config_for(&url);
    config.connect_timeout = Some(Duration::from_millis(200));
    let game = GameChannel::new(&config, "g-1", "bob", sink).unwrap();

    assert_eq!(
        game.connect().await,
        Err(ChannelError::ConnectFailed(TransportError::Timeout(200)))
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws-chat/websocket", listener.local_addr().unwrap());
    drop(listener);

    let (sink, _) = collecting_sink();
    let lobby = LobbyChannel::new(&config_for(&url), sink);

    let err = lobby.connect().await.unwrap_err();
    assert!(matches!(
        err,
        ChannelError::ConnectFailed(TransportError::Connect(_))
    ));
    assert_eq!(lobby.request_room_list(), Err(ChannelError::NotConnected));
}
