//! Chat session: one cancellable `/chat` stream at a time.
//!
//! `send_message` spawns a task that reads the NDJSON body and forwards reply
//! fragments over a channel. Starting a new stream cancels the previous one
//! (last writer wins). A cancelled stream yields nothing further, and never
//! its `Finished` event, even if the task had already queued it.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend_client::{BackendClient, ChatRequest};
use crate::chat::stream::{ChunkKind, DecodedLine, NdjsonDecoder};
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Reply fragment, in arrival order.
    Chunk(String),
    /// End of body; carries the concatenation of every fragment. Sent at most once.
    Finished(String),
    /// Transport failure or non-success status. No `Finished` follows.
    Failed(String),
}

/// Receiving half of one stream.
pub struct ChatStream {
    events: mpsc::UnboundedReceiver<StreamEvent>,
    cancel: CancellationToken,
}

impl ChatStream {
    /// Next event, or `None` once the stream has ended or been cancelled.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let event = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            event = self.events.recv() => event,
        };
        if self.cancel.is_cancelled() {
            return None;
        }
        event
    }
}

impl Drop for ChatStream {
    /// Dropping the receiver ends the stream.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[derive(Default)]
struct SessionState {
    session_id: Option<String>,
    /// Token of the most recent stream, until it is stopped or superseded.
    latest: Option<CancellationToken>,
    /// Request id of the stream whose task is still running.
    loading: Option<u64>,
    next_request_id: u64,
}

pub struct ChatSession {
    client: BackendClient,
    state: Arc<Mutex<SessionState>>,
}

impl ChatSession {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Starts streaming a reply to `content`. Must be called inside a Tokio runtime.
    ///
    /// Blank content is ignored: a warning is logged and `None` returned.
    pub fn send_message(&self, content: &str, context: Option<&str>) -> Option<ChatStream> {
        if content.trim().is_empty() {
            warn!("Ignoring empty chat message");
            return None;
        }

        let cancel = CancellationToken::new();
        let (request, request_id) = {
            let mut state = lock(&self.state);
            if let Some(previous) = state.latest.replace(cancel.clone()) {
                if !previous.is_cancelled() {
                    debug!("Superseding in-flight chat stream");
                    previous.cancel();
                }
            }
            let request_id = state.next_request_id;
            state.next_request_id += 1;
            state.loading = Some(request_id);
            let request = ChatRequest {
                message: content.to_string(),
                session_id: state.session_id.clone(),
                profile_context: context.map(str::to_string),
            };
            (request, request_id)
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(
            self.client.clone(),
            request,
            self.state.clone(),
            cancel.clone(),
            tx,
            request_id,
        ));

        Some(ChatStream { events: rx, cancel })
    }

    /// Cancels the current stream, if any, and returns whether there was one.
    /// A stream counts as current until its `ChatStream` is dropped.
    /// The session id is kept.
    pub fn stop_generation(&self) -> bool {
        let mut state = lock(&self.state);
        state.loading = None;
        match state.latest.take() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                info!("Chat generation stopped");
                true
            }
            _ => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).loading.is_some()
    }

    pub fn session_id(&self) -> Option<String> {
        lock(&self.state).session_id.clone()
    }

    /// Forgets the conversation: cancels any stream and drops the session id.
    pub fn reset(&self) {
        self.stop_generation();
        lock(&self.state).session_id = None;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.state).latest.take() {
            token.cancel();
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

async fn pump(
    client: BackendClient,
    request: ChatRequest,
    state: Arc<Mutex<SessionState>>,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<StreamEvent>,
    request_id: u64,
) {
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = read_reply(&client, &request, &state, &tx) => Some(result),
    };

    match outcome {
        None => debug!(request_id, "Chat stream cancelled"),
        Some(Ok(total)) => {
            debug!(request_id, chars = total.chars().count(), "Chat stream finished");
            let _ = tx.send(StreamEvent::Finished(total));
        }
        Some(Err(e)) => {
            error!(request_id, code = e.code(), "Chat stream failed: {e}");
            let _ = tx.send(StreamEvent::Failed(e.to_string()));
        }
    }

    let mut state = lock(&state);
    if state.loading == Some(request_id) {
        state.loading = None;
    }
}

async fn read_reply(
    client: &BackendClient,
    request: &ChatRequest,
    state: &Mutex<SessionState>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<String, AppError> {
    let response = client.open_chat(request).await?;
    let mut body = response.bytes_stream();
    let mut decoder = NdjsonDecoder::new();
    let mut total = String::new();

    while let Some(bytes) = body.next().await {
        let bytes = bytes?;
        for line in decoder.push(&bytes) {
            handle_line(line, state, tx, &mut total);
        }
    }
    for line in decoder.finish() {
        handle_line(line, state, tx, &mut total);
    }
    Ok(total)
}

fn handle_line(
    line: DecodedLine,
    state: &Mutex<SessionState>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
    total: &mut String,
) {
    let chunk = match line {
        Ok(chunk) => chunk,
        Err(bad) => {
            warn!(line = %bad.line, "Dropping malformed stream record: {}", bad.error);
            return;
        }
    };

    if let Some(id) = &chunk.session_id {
        let mut state = lock(state);
        if state.session_id.is_none() {
            info!(session_id = %id, "Adopted chat session id");
            state.session_id = Some(id.clone());
        }
    }

    match chunk.kind {
        ChunkKind::Answer => {
            if let Some(text) = chunk.answer_text() {
                total.push_str(text);
                // A closed receiver means the consumer went away; keep draining quietly.
                let _ = tx.send(StreamEvent::Chunk(text.to_string()));
            }
        }
        ChunkKind::Error => {
            warn!(
                "Backend reported an error in-stream: {}",
                chunk.content.as_deref().unwrap_or_default()
            );
        }
        ChunkKind::Unknown => debug!("Ignoring stream record with unknown type"),
    }
}
