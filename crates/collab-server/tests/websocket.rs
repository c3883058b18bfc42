//! End-to-end tests: a real server on an ephemeral port, real WebSocket clients.

use collab_server::config::Config;
use collab_server::server;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(2);

/// Start a server on a free port, return its ws:// URL.
async fn start_server(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        server::serve(listener, config).await.unwrap();
    });
    format!("ws://127.0.0.1:{port}")
}

async fn connect(url: &str) -> Ws {
    let (ws, _response) = connect_async(url).await.expect("should connect");
    ws
}

async fn send(ws: &mut Ws, text: &str) {
    ws.send(Message::Text(text.to_string().into())).await.unwrap();
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let msg = timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// The server should close this connection without sending more data.
async fn expect_closed(ws: &mut Ws) {
    loop {
        match timeout(WAIT, ws.next()).await.expect("timed out waiting for close") {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Text(text))) => panic!("unexpected frame {}", text.as_str()),
            Some(Ok(_)) => continue,
        }
    }
}

/// Usernames in a presence frame, sorted (map order is not meaningful here).
fn usernames(frame: &Value) -> Vec<String> {
    let mut names: Vec<String> = frame["data"]["users"]
        .as_object()
        .expect("users should be an object")
        .values()
        .map(|p| p["username"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn join_edit_and_leave_reach_everyone() {
    let url = start_server(Config::default()).await;

    let mut alice = connect(&url).await;
    send(&mut alice, r#"{"type":"userevent","username":"alice"}"#).await;
    let joined = next_json(&mut alice).await;
    assert_eq!(joined["type"], "userevent");
    assert_eq!(usernames(&joined), vec!["alice"]);
    assert_eq!(joined["data"]["userActivity"], json!(["alice joined to edit the document"]));

    let mut bob = connect(&url).await;
    send(&mut bob, r#"{"type":"userevent","username":"bob"}"#).await;
    let joined_a = next_json(&mut alice).await;
    let joined_b = next_json(&mut bob).await;
    assert_eq!(joined_a, joined_b);
    assert_eq!(usernames(&joined_b), vec!["alice", "bob"]);

    send(&mut bob, r#"{"type":"contentchange","content":"hello"}"#).await;
    for ws in [&mut alice, &mut bob] {
        let frame = next_json(ws).await;
        assert_eq!(
            frame,
            json!({
                "type": "contentchange",
                "data": {
                    "editorContent": "hello",
                    "userActivity": [
                        "alice joined to edit the document",
                        "bob joined to edit the document"
                    ]
                }
            })
        );
    }

    alice.close(None).await.unwrap();
    let left = next_json(&mut bob).await;
    assert_eq!(left["type"], "userevent");
    assert_eq!(usernames(&left), vec!["bob"]);
    assert_eq!(
        left["data"]["userActivity"].as_array().unwrap().last().unwrap(),
        "alice left the document"
    );
}

#[tokio::test]
async fn unrecognized_type_is_not_broadcast() {
    let url = start_server(Config::default()).await;

    let mut alice = connect(&url).await;
    send(&mut alice, r#"{"type":"userevent","username":"alice"}"#).await;
    next_json(&mut alice).await;

    send(&mut alice, r#"{"type":"cursor","line":4}"#).await;
    send(&mut alice, r#"{"type":"contentchange","content":"still connected"}"#).await;

    // The first thing back is the content change; the cursor frame vanished.
    let frame = next_json(&mut alice).await;
    assert_eq!(frame["type"], "contentchange");
    assert_eq!(frame["data"]["editorContent"], "still connected");
}

#[tokio::test]
async fn malformed_message_disconnects_sender_and_announces_it() {
    let url = start_server(Config::default()).await;

    let mut alice = connect(&url).await;
    send(&mut alice, r#"{"type":"userevent","username":"alice"}"#).await;
    next_json(&mut alice).await;

    let mut bob = connect(&url).await;
    send(&mut bob, r#"{"type":"userevent","username":"bob"}"#).await;
    next_json(&mut alice).await;
    next_json(&mut bob).await;

    send(&mut bob, "this is not json").await;

    let left = next_json(&mut alice).await;
    assert_eq!(usernames(&left), vec!["alice"]);
    assert_eq!(
        left["data"]["userActivity"].as_array().unwrap().last().unwrap(),
        "bob left the document"
    );
    expect_closed(&mut bob).await;
}

#[tokio::test]
async fn binary_frames_carry_envelopes_too() {
    let url = start_server(Config::default()).await;

    let mut alice = connect(&url).await;
    alice
        .send(Message::Binary(
            br#"{"type":"userevent","username":"alice"}"#.to_vec().into(),
        ))
        .await
        .unwrap();
    let joined = next_json(&mut alice).await;
    assert_eq!(joined["type"], "userevent");
    assert_eq!(usernames(&joined), vec!["alice"]);

    let mut bob = connect(&url).await;
    send(&mut bob, r#"{"type":"userevent","username":"bob"}"#).await;
    next_json(&mut alice).await;
    next_json(&mut bob).await;

    // Not UTF-8: the sender is dropped like any other malformed frame.
    bob.send(Message::Binary(vec![0xff, 0xfe, 0x00].into()))
        .await
        .unwrap();

    let left = next_json(&mut alice).await;
    assert_eq!(usernames(&left), vec!["alice"]);
    assert_eq!(
        left["data"]["userActivity"].as_array().unwrap().last().unwrap(),
        "bob left the document"
    );
    expect_closed(&mut bob).await;
}

#[tokio::test]
async fn anonymous_departure_uses_connection_id() {
    let url = start_server(Config::default()).await;

    let mut alice = connect(&url).await;
    send(&mut alice, r#"{"type":"userevent","username":"alice"}"#).await;
    next_json(&mut alice).await;

    let mut lurker = connect(&url).await;
    // Make sure the lurker is registered before it leaves.
    send(&mut lurker, r#"{"type":"contentchange","content":"draft"}"#).await;
    next_json(&mut alice).await;
    lurker.close(None).await.unwrap();

    let left = next_json(&mut alice).await;
    let last = left["data"]["userActivity"]
        .as_array()
        .unwrap()
        .last()
        .unwrap()
        .as_str()
        .unwrap()
        .to_string();
    let name = last.strip_suffix(" left the document").expect("departure entry");
    // Hyphenated UUID.
    assert_eq!(name.len(), 36);
    assert_eq!(name.matches('-').count(), 4);
    assert_eq!(usernames(&left), vec!["alice"]);
}

#[tokio::test]
async fn connections_beyond_max_clients_are_refused() {
    let url = start_server(Config {
        max_clients: 1,
        ..Config::default()
    })
    .await;

    let mut first = connect(&url).await;
    assert!(connect_async(&url).await.is_err(), "second client should be refused");

    // The first client is unaffected.
    send(&mut first, r#"{"type":"userevent","username":"solo"}"#).await;
    assert_eq!(usernames(&next_json(&mut first).await), vec!["solo"]);
}

#[tokio::test]
async fn activity_log_is_bounded() {
    let url = start_server(Config {
        activity_log_capacity: 2,
        ..Config::default()
    })
    .await;

    let mut ws = connect(&url).await;
    for name in ["a", "b", "c"] {
        send(&mut ws, &format!(r#"{{"type":"userevent","username":"{name}"}}"#)).await;
        next_json(&mut ws).await;
    }
    send(&mut ws, r#"{"type":"contentchange","content":""}"#).await;

    let frame = next_json(&mut ws).await;
    assert_eq!(
        frame["data"]["userActivity"],
        json!(["b joined to edit the document", "c joined to edit the document"])
    );
}
