//! Conversation state for a chat front-end
//!
//! This crate provides:
//! - `Session` - the ordered turn history for one interactive session
//! - `Turn` / `InputSource` - one message with its speaker role and provenance
//! - `UserInput` - a normalized user turn (typed, voice, or file-augmented)
//! - `Conversation` - drives one exchange against a `ChatModel`

mod conversation;
pub mod input;
pub mod session;

pub use conversation::Conversation;
pub use input::{EXCERPT_CHARS, InputSource, TRUNCATION_MARKER, UserInput, document_excerpt};
pub use session::{EditError, Session, Turn};
