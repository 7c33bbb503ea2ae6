//! Input normalization for user turns
//!
//! A user turn reaches the session through one of three channels: typed
//! text, a transcribed audio clip, or text augmented with an excerpt of an
//! uploaded document. The channel is carried as a structured `InputSource`
//! on the turn rather than a tag spliced into the content.

use serde::{Deserialize, Serialize};

/// How many characters of an uploaded document are used as context.
pub const EXCERPT_CHARS: usize = 200;

/// Appended to an excerpt when the document was longer than the excerpt.
pub const TRUNCATION_MARKER: &str = "…";

/// Provenance of a user turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Typed directly
    Text,
    /// Transcribed from an audio clip
    Voice,
    /// Query augmented with a document excerpt
    FileAugmented,
}

impl InputSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InputSource::Text => "text",
            InputSource::Voice => "voice",
            InputSource::FileAugmented => "file-augmented",
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized user turn, ready to append to the session.
#[derive(Clone, Debug)]
pub struct UserInput {
    pub content: String,
    pub source: InputSource,
}

impl UserInput {
    /// Typed text, passed through verbatim.
    pub fn typed(text: impl Into<String>) -> Self {
        UserInput {
            content: text.into(),
            source: InputSource::Text,
        }
    }

    /// A transcription produced from an uploaded audio clip.
    pub fn voice(transcript: impl Into<String>) -> Self {
        UserInput {
            content: transcript.into(),
            source: InputSource::Voice,
        }
    }

    /// A query with a document excerpt prepended as synthetic context.
    ///
    /// This is a fixed-prefix heuristic, not retrieval: the first
    /// `EXCERPT_CHARS` characters of the document, nothing ranked or
    /// embedded.
    pub fn with_document(query: &str, document: &str) -> Self {
        UserInput {
            content: format!(
                "Context from uploaded file:\n{}\n\nQuestion: {}",
                document_excerpt(document),
                query
            ),
            source: InputSource::FileAugmented,
        }
    }
}

/// First `EXCERPT_CHARS` characters of `text`, with the truncation marker
/// appended when the text was longer.
///
/// Counts characters, not bytes, so a multibyte document never splits a
/// code point.
pub fn document_excerpt(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(EXCERPT_CHARS) {
        Some((byte_end, _)) => format!("{}{}", &text[..byte_end], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_document_passes_through() {
        assert_eq!(document_excerpt("short"), "short");
    }

    #[test]
    fn test_exact_length_document_has_no_marker() {
        let text = "a".repeat(EXCERPT_CHARS);
        assert_eq!(document_excerpt(&text), text);
    }

    #[test]
    fn test_long_document_truncates_to_200_chars() {
        let text = "a".repeat(EXCERPT_CHARS + 50);
        let excerpt = document_excerpt(&text);
        assert_eq!(
            excerpt,
            format!("{}{}", "a".repeat(EXCERPT_CHARS), TRUNCATION_MARKER)
        );
    }

    #[test]
    fn test_excerpt_counts_chars_not_bytes() {
        // 201 two-byte characters; byte-indexed truncation would panic or
        // split a code point.
        let text = "é".repeat(EXCERPT_CHARS + 1);
        let excerpt = document_excerpt(&text);
        assert_eq!(
            excerpt,
            format!("{}{}", "é".repeat(EXCERPT_CHARS), TRUNCATION_MARKER)
        );
    }

    #[test]
    fn test_with_document_contains_excerpt_and_query() {
        let document = "x".repeat(300);
        let input = UserInput::with_document("what is this?", &document);

        assert_eq!(input.source, InputSource::FileAugmented);
        assert!(input.content.contains(&format!(
            "{}{}",
            "x".repeat(EXCERPT_CHARS),
            TRUNCATION_MARKER
        )));
        assert!(input.content.contains("Question: what is this?"));
    }

    #[test]
    fn test_sources_are_structured_not_prefixed() {
        let voice = UserInput::voice("turn on the lights");
        assert_eq!(voice.source, InputSource::Voice);
        assert_eq!(voice.content, "turn on the lights");
    }
}
