//! Session store: the ordered turn history for one interactive session

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::input::{InputSource, UserInput};
use llm::{ChatMessage, Role};

/// One message in the conversation.
///
/// Content is immutable once appended, except under the edit flow, which
/// rewrites a user turn and its paired assistant turn in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub source: InputSource,
}

impl Turn {
    pub fn user(input: UserInput) -> Self {
        Turn {
            role: Role::User,
            content: input.content,
            source: input.source,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            content: content.into(),
            source: InputSource::Text,
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        ChatMessage::new(turn.role, turn.content.clone())
    }
}

/// Violations of the edit flow's preconditions.
///
/// Editing is only defined for a user turn that is directly followed by its
/// assistant reply. Anything else leaves the session untouched and reports
/// which precondition failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No turn exists at the index
    OutOfRange(usize),

    /// The turn at the index is not a user turn
    NotAUserTurn(usize),

    /// No assistant turn follows the user turn
    MissingAssistantTurn(usize),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfRange(idx) => write!(f, "No turn at index {}", idx),
            EditError::NotAUserTurn(idx) => write!(f, "Turn {} is not a user turn", idx),
            EditError::MissingAssistantTurn(idx) => {
                write!(f, "Turn {} has no paired assistant turn", idx)
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Ordered turn history, append-only except for the edit flow.
///
/// Insertion order is conversational order and is replayed verbatim as the
/// model context on every request. No truncation or windowing is performed,
/// so the context grows with the session. Turns are never deleted; `clear`
/// resets the whole session.
#[derive(Debug, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end. Role alternation is not enforced.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The prefix of turns strictly before `index`.
    pub fn context_before(&self, index: usize) -> &[Turn] {
        &self.turns[..index.min(self.turns.len())]
    }

    /// Reset the session to empty.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Check the edit preconditions for the user turn at `index`.
    pub fn validate_edit(&self, index: usize) -> Result<(), EditError> {
        let turn = self.turns.get(index).ok_or(EditError::OutOfRange(index))?;
        if turn.role != Role::User {
            return Err(EditError::NotAUserTurn(index));
        }
        match self.turns.get(index + 1) {
            Some(next) if next.role == Role::Assistant => Ok(()),
            _ => Err(EditError::MissingAssistantTurn(index)),
        }
    }

    /// Rewrite the content of the user turn at `index` in place.
    ///
    /// Defined only when `index` is a user turn followed by its assistant
    /// reply; on error the session is unchanged.
    pub fn edit(&mut self, index: usize, new_content: impl Into<String>) -> Result<(), EditError> {
        self.validate_edit(index)?;
        self.turns[index].content = new_content.into();
        Ok(())
    }

    /// Overwrite the content of the assistant turn at `index`.
    pub fn replace_assistant(
        &mut self,
        index: usize,
        new_content: impl Into<String>,
    ) -> Result<(), EditError> {
        let turn = self.turns.get(index).ok_or(EditError::OutOfRange(index))?;
        if turn.role != Role::Assistant {
            return Err(EditError::NotAUserTurn(index));
        }
        self.turns[index].content = new_content.into();
        Ok(())
    }
}
