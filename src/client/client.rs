//! WebSocket client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::config::{server_url, ClientConfig};
use crate::error::ClientError;
use crate::protocol::{
    decode, encode, validate_answer, validate_create_trivia, Answer, ClientMessage, CreateTrivia,
};

use super::state::SessionState;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Identifies one connection attempt and, once it succeeds, its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether the client currently has a server session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected { session: SessionId },
}

/// Tasks and outbound channel of the live connection.
struct ActiveSession {
    id: SessionId,
    outbound: mpsc::UnboundedSender<Message>,
    send_task: JoinHandle<()>,
    recv_task: JoinHandle<()>,
}

impl ActiveSession {
    fn shutdown(self) {
        self.recv_task.abort();
        self.send_task.abort();
    }
}

/// Connection bookkeeping. Guarded by one lock so that replacing a session
/// and applying a frame never interleave.
#[derive(Default)]
struct Slot {
    /// Newest `connect` call still waiting for its handshake.
    pending: Option<SessionId>,
    active: Option<ActiveSession>,
}

struct Inner {
    slot: Mutex<Slot>,
    state: watch::Sender<SessionState>,
    status: watch::Sender<ConnectionStatus>,
    last_error: watch::Sender<Option<ClientError>>,
}

impl Inner {
    fn record_error(&self, err: ClientError) -> ClientError {
        self.last_error.send_replace(Some(err.clone()));
        err
    }
}

/// Client for a remote trivia server.
///
/// Cheap to clone; clones share the same connection and state.
#[derive(Clone)]
pub struct TriviaClient {
    inner: Arc<Inner>,
}

impl Default for TriviaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TriviaClient {
    /// Create a disconnected client with empty state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::new());
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        let (last_error, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::default()),
                state,
                status,
                last_error,
            }),
        }
    }

    /// Subscribe to session state changes.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to connection status changes.
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// Subscribe to the most recent error.
    pub fn last_error(&self) -> watch::Receiver<Option<ClientError>> {
        self.inner.last_error.subscribe()
    }

    /// Connect using a [`ClientConfig`].
    pub async fn connect_to(&self, config: &ClientConfig) -> Result<SessionId, ClientError> {
        self.connect(&config.host, config.port, &config.path).await
    }

    /// Connect to `ws://host:port/path`, replacing any current session.
    ///
    /// Failures are published on [`last_error`](Self::last_error) and leave the
    /// client disconnected. Nothing is retried.
    pub async fn connect(&self, host: &str, port: u16, path: &str) -> Result<SessionId, ClientError> {
        let id = SessionId::new();
        let url = server_url(host, port, path);

        {
            let mut slot = self.inner.slot.lock().await;
            slot.pending = Some(id);
            if let Some(old) = slot.active.take() {
                log::info!("Closing session {} to make way for a new connection", old.id);
                old.shutdown();
            }
            self.inner.status.send_replace(ConnectionStatus::Connecting);
        }

        log::info!("Connecting to {} (session {})", url, id);
        let result = tokio_tungstenite::connect_async(&url).await;

        let mut slot = self.inner.slot.lock().await;
        if slot.pending != Some(id) {
            log::debug!("Dropping superseded connection attempt {}", id);
            return Err(ClientError::Superseded);
        }
        slot.pending = None;

        let ws_stream = match result {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                log::warn!("Failed to connect to {}: {}", url, e);
                self.inner.status.send_replace(ConnectionStatus::Disconnected);
                return Err(self.inner.record_error(ClientError::Connection(format!(
                    "failed to connect to {}: {}",
                    url, e
                ))));
            }
        };

        let (ws_sender, ws_receiver) = ws_stream.split();
        let (tx, rx) = mpsc::unbounded_channel::<Message>();

        let send_task = tokio::spawn(send_loop(id, ws_sender, rx));
        let recv_task = tokio::spawn(receive_loop(Arc::clone(&self.inner), id, ws_receiver));

        slot.active = Some(ActiveSession {
            id,
            outbound: tx,
            send_task,
            recv_task,
        });
        self.inner
            .status
            .send_replace(ConnectionStatus::Connected { session: id });
        log::info!("Connected to {} (session {})", url, id);

        Ok(id)
    }

    /// Close the current session, if any.
    pub async fn disconnect(&self) {
        let mut slot = self.inner.slot.lock().await;
        slot.pending = None;
        if let Some(session) = slot.active.take() {
            log::info!("Disconnecting session {}", session.id);
            session.shutdown();
        }
        self.inner.status.send_replace(ConnectionStatus::Disconnected);
    }

    /// Queue a command on the current session.
    ///
    /// Returns once the frame is handed to the writer task; frames are
    /// written whole, one at a time.
    pub async fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        let text = encode(&msg).map_err(|e| self.inner.record_error(e.into()))?;

        let slot = self.inner.slot.lock().await;
        let Some(session) = slot.active.as_ref() else {
            log::warn!("Dropping outbound message, not connected");
            return Err(self.inner.record_error(ClientError::SendWithoutConnection));
        };

        log::debug!("Sending on session {}: {}", session.id, text);
        session
            .outbound
            .send(Message::Text(text.into()))
            .map_err(|_| self.inner.record_error(ClientError::SendWithoutConnection))
    }

    /// Ask the server to start a new game.
    pub async fn create_trivia(&self, request: CreateTrivia) -> Result<(), ClientError> {
        if let Err(reason) = validate_create_trivia(&request) {
            return Err(self
                .inner
                .record_error(ClientError::InvalidCommand(reason.to_string())));
        }

        self.send(ClientMessage::CreateTrivia(request)).await
    }

    /// Answer the current question with the option at `selected_option`.
    ///
    /// The time since the question arrived is attached to the message.
    pub async fn answer(&self, question_id: &str, selected_option: usize) -> Result<(), ClientError> {
        let checked = {
            let state = self.inner.state.borrow();
            match state.current_question() {
                Some(question) if question.id == question_id => {
                    validate_answer(question, selected_option)
                        .map(|()| state.elapsed_secs(Instant::now()))
                        .map_err(str::to_string)
                }
                Some(_) | None => Err(format!("`{}` is not the current question", question_id)),
            }
        };

        let time_elapsed = match checked {
            Ok(secs) => secs,
            Err(reason) => return Err(self.inner.record_error(ClientError::InvalidCommand(reason))),
        };

        self.send(ClientMessage::Answer(Answer {
            question_id: question_id.to_string(),
            selected_option,
            time_elapsed,
        }))
        .await
    }

    /// Clear the session state and last error before a new game.
    ///
    /// Does not touch the connection.
    pub fn reset_state(&self) {
        self.inner.state.send_replace(SessionState::new());
        self.inner.last_error.send_replace(None);
    }
}

/// Forward queued frames to the socket until the queue closes or a write fails.
async fn send_loop(id: SessionId, mut ws_sender: WsSink, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = ws_sender.send(msg).await {
            log::warn!("Write failed on session {}: {}", id, e);
            break;
        }
    }

    let _ = ws_sender.close().await;
}

/// Read frames until the connection ends, applying each one to the state.
async fn receive_loop(inner: Arc<Inner>, id: SessionId, mut ws_receiver: WsSource) {
    let reason = loop {
        let text = match ws_receiver.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) => break "connection closed by server".to_string(),
            Some(Ok(other)) => {
                log::debug!("Ignoring non-text frame on session {}: {:?}", id, other);
                continue;
            }
            Some(Err(e)) => break format!("connection error: {}", e),
            None => break "connection closed".to_string(),
        };

        if !handle_frame(&inner, id, text.as_str()).await {
            return;
        }
    };

    session_lost(&inner, id, reason).await;
}

/// Apply one text frame. Returns false when the session is no longer active.
async fn handle_frame(inner: &Inner, id: SessionId, text: &str) -> bool {
    let slot = inner.slot.lock().await;
    if slot.active.as_ref().map(|s| s.id) != Some(id) {
        return false;
    }

    log::debug!("Received on session {}: {}", id, text);
    match decode(text) {
        Ok(msg) => {
            log::debug!("Applying {} on session {}", msg.type_name(), id);
            let now = Instant::now();
            inner.state.send_modify(|state| state.apply(msg, text, now));
        }
        Err(e) => {
            log::warn!("Dropping frame on session {}: {}", id, e);
            inner.record_error(e.into());
        }
    }

    true
}

async fn session_lost(inner: &Inner, id: SessionId, reason: String) {
    let mut slot = inner.slot.lock().await;
    if slot.active.as_ref().map(|s| s.id) != Some(id) {
        return;
    }

    if let Some(session) = slot.active.take() {
        // The receive task is the one running this, so only stop the writer.
        session.send_task.abort();
    }
    log::warn!("Session {} ended: {}", id, reason);
    inner.status.send_replace(ConnectionStatus::Disconnected);
    inner.record_error(ClientError::Connection(reason));
}
