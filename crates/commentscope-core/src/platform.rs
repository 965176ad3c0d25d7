use serde::{Deserialize, Serialize};

/// Content platforms the tool knows how to pull comments from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Instagram,
    YouTube,
}

impl PlatformKind {
    /// Detect the platform from a content URL.
    ///
    /// Detection is a plain substring test: `instagram.com` selects Instagram,
    /// `youtube.com` or `youtu.be` selects `YouTube`. No other validation of the
    /// URL is performed. Returns `None` when nothing matches.
    #[must_use]
    pub fn detect(url: &str) -> Option<Self> {
        if url.contains("instagram.com") {
            Some(PlatformKind::Instagram)
        } else if url.contains("youtube.com") || url.contains("youtu.be") {
            Some(PlatformKind::YouTube)
        } else {
            None
        }
    }

    /// Human-facing platform name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            PlatformKind::Instagram => "Instagram",
            PlatformKind::YouTube => "YouTube",
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
