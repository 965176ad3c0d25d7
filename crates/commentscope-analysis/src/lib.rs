//! Comment analysis pipeline for commentscope.
//!
//! Fetches comments through a [`commentscope_scraper::CommentSource`], strips
//! them down to an allow-listed character set, flags keyword spam, and asks a
//! hosted chat-completion model for a qualitative engagement read-out.

pub mod error;
pub mod insight;
pub mod normalize;
pub mod pipeline;
pub mod spam;
pub mod types;

mod retry;

pub use error::{InsightError, PipelineError};
pub use insight::{ChatCompletionClient, InsightGenerator, NO_COMMENTS_MESSAGE, NO_RESPONSE_MESSAGE};
pub use normalize::{normalize_all, normalize_comment};
pub use pipeline::Pipeline;
pub use spam::{detect_spam, spam_ratio, KeywordClassifier, SpamClassifier};
pub use types::{
    AnalysisReport, CleanedComment, FlaggedComment, InsightOutcome, InsightReport, PipelineAbort,
    PipelineRun, PipelineState, SpamReport,
};
