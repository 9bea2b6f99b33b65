//! Commit message drafting: prompt construction and output post-processing.

pub mod prompt;

use std::fmt;

use crate::error::GenerationError;

pub use prompt::build_commit_prompt;

/// Hard limit on the committed message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 72;

/// A finalized, non-empty commit message of at most [`MAX_MESSAGE_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage(String);

impl CommitMessage {
    /// Turn raw model output into a commit message.
    ///
    /// Trims surrounding whitespace, then keeps the first 72 characters.
    /// The cut is not re-trimmed, so the result is exactly the prefix of the
    /// trimmed text. Empty output is rejected.
    pub fn finalize(raw: &str) -> Result<Self, GenerationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::InvalidResponse(
                "generated commit message is empty".to_string(),
            ));
        }

        let message = match trimmed.char_indices().nth(MAX_MESSAGE_CHARS) {
            Some((cut, _)) => &trimmed[..cut],
            None => trimmed,
        };

        Ok(Self(message.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommitMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
