use serde::{Deserialize, Serialize};

/// A comment exactly as a comment source extracted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    /// Platform-specific handle of the commenter, when the source exposes one.
    pub author: Option<String>,
    pub text: String,
}

impl RawComment {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            author: None,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_author(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: Some(author.into()),
            text: text.into(),
        }
    }
}
