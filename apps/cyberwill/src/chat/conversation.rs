use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat::pacing::ReplyView;
use crate::chat::session::{ChatSession, ChatStream, StreamEvent};
use crate::errors::AppError;
use crate::models::ChatMessage;
use crate::storage::ProfileStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed(String),
    Cancelled,
    Failed(String),
}

/// Sends `text` to the backend on behalf of a profile and records the user turn.
///
/// Returns `None` (and records nothing) when the session ignores the message.
pub fn begin_turn(
    store: &mut ProfileStore,
    session: &ChatSession,
    profile_id: Uuid,
    text: &str,
) -> Result<Option<ChatStream>, AppError> {
    let context = store
        .profile(profile_id)
        .ok_or_else(|| AppError::NotFound(format!("profile {profile_id}")))?
        .chat_context();

    let Some(stream) = session.send_message(text, Some(&context)) else {
        return Ok(None);
    };
    store.push_message(profile_id, ChatMessage::user(text.trim()))?;
    Ok(Some(stream))
}

/// Consumes a reply stream into the profile's log.
///
/// An empty assistant message is appended first and grown fragment by
/// fragment; every change is published on `view` for the typewriter. The log
/// is saved however the stream ends, so partial replies survive.
pub async fn stream_reply(
    store: &mut ProfileStore,
    profile_id: Uuid,
    mut stream: ChatStream,
    view: &watch::Sender<ReplyView>,
) -> Result<ReplyOutcome, AppError> {
    store.push_message(profile_id, ChatMessage::assistant_placeholder())?;
    let mut content = String::new();
    view.send_replace(ReplyView::streaming());

    let outcome = loop {
        match stream.next_event().await {
            Some(StreamEvent::Chunk(delta)) => {
                store.append_to_last_assistant(profile_id, &delta)?;
                content.push_str(&delta);
                view.send_replace(ReplyView {
                    content: content.clone(),
                    loading: true,
                });
            }
            Some(StreamEvent::Finished(total)) => {
                if total != content {
                    warn!("Stream total differs from the fragments received");
                }
                break ReplyOutcome::Completed(content.clone());
            }
            Some(StreamEvent::Failed(reason)) => break ReplyOutcome::Failed(reason),
            None => break ReplyOutcome::Cancelled,
        }
    };

    debug!(?outcome, "Reply settled");
    view.send_replace(ReplyView {
        content,
        loading: false,
    });
    store.save()?;
    Ok(outcome)
}
