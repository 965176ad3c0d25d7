use commentscope_core::PlatformKind;
use commentscope_scraper::FetchError;
use thiserror::Error;

/// Failures of the chat-completion call behind the insight text.
#[derive(Debug, Error)]
pub enum InsightError {
    /// Network or TLS failure, including client-side timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("{status} - {body}")]
    Status { status: u16, body: String },

    /// A 2xx response whose body is not a chat-completion payload.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Reasons a pipeline run ends in the `Aborted` state.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid URL {url:?}: expected an Instagram or YouTube link")]
    InvalidInput { url: String },

    #[error("failed to fetch comments: {0}")]
    Fetch(#[from] FetchError),

    #[error("no comments found on {platform}; ensure the post is public and try again")]
    NoComments { platform: PlatformKind },

    #[error("analysis was cancelled")]
    Cancelled,
}
