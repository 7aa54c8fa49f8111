#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use trivia_client::{ClientError, ConnectionStatus, SessionState, TriviaClient};

pub const WAIT: Duration = Duration::from_secs(5);

pub type ServerConn = WebSocketStream<TcpStream>;

/// A WebSocket server on a random local port that hands every accepted
/// connection to the test.
pub struct TestServer {
    pub port: u16,
    conns: mpsc::UnboundedReceiver<ServerConn>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_handshake_delay(Duration::ZERO).await
    }

    /// Accept TCP right away but hold the WebSocket handshake for `delay`.
    pub async fn start_with_handshake_delay(delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
        let port = listener.local_addr().expect("local addr").port();
        let (tx, conns) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };
                if tx.send(ws).is_err() {
                    break;
                }
            }
        });

        Self { port, conns }
    }

    pub async fn accept(&mut self) -> ServerConn {
        timeout(WAIT, self.conns.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("test server stopped")
    }
}

pub async fn connect(client: &TriviaClient, server: &mut TestServer) -> ServerConn {
    client
        .connect("127.0.0.1", server.port, "/trivia")
        .await
        .expect("connect should succeed");
    server.accept().await
}

pub async fn send_json(conn: &mut ServerConn, value: Value) {
    conn.send(Message::Text(value.to_string().into()))
        .await
        .expect("server send");
}

pub async fn send_frame(conn: &mut ServerConn, msg: Message) {
    conn.send(msg).await.expect("server send");
}

pub async fn send_text(conn: &mut ServerConn, text: &str) {
    conn.send(Message::Text(text.to_string().into()))
        .await
        .expect("server send");
}

/// Next JSON text frame the client sent.
pub async fn recv_json(conn: &mut ServerConn) -> Value {
    loop {
        let msg = timeout(WAIT, conn.next())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client closed the connection")
            .expect("websocket error");

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("client sent invalid JSON");
        }
    }
}

/// Wait until the server side sees the connection go away.
pub async fn wait_closed(conn: &mut ServerConn) {
    timeout(WAIT, async {
        loop {
            match conn.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await
    .expect("timed out waiting for the client to close");
}

pub async fn wait_state(
    client: &TriviaClient,
    pred: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    let mut rx = client.state();
    let state = timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("client dropped");
    (*state).clone()
}

pub async fn wait_status(client: &TriviaClient, pred: impl FnMut(&ConnectionStatus) -> bool) {
    let mut rx = client.status();
    timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for status")
        .expect("client dropped");
}

pub async fn wait_error(
    client: &TriviaClient,
    mut pred: impl FnMut(&ClientError) -> bool,
) -> ClientError {
    let mut rx = client.last_error();
    let err = timeout(WAIT, rx.wait_for(|e| e.as_ref().is_some_and(&mut pred)))
        .await
        .expect("timed out waiting for an error")
        .expect("client dropped");
    err.clone().expect("error is set")
}

pub fn question(id: &str, time_limit: Option<u32>) -> Value {
    let mut q = serde_json::json!({
        "type": "Question",
        "id": id,
        "question": format!("Question {}", id),
        "options": ["A", "B", "C"],
        "index": 1,
        "total": 5,
        "category": "SCIENCE",
    });
    if let Some(secs) = time_limit {
        q["timeLimit"] = secs.into();
    }
    q
}
