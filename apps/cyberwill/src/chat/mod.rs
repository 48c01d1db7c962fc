// Streaming chat: NDJSON ingestion, the cancellable session, typing-effect
// pacing, and the driver that records replies into a profile's log.

pub mod conversation;
pub mod pacing;
pub mod session;
pub mod stream;

pub use conversation::{begin_turn, stream_reply, ReplyOutcome};
pub use pacing::{run_typewriter, ReplyView};
pub use session::ChatSession;
