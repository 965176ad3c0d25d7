use chrono::{DateTime, Utc};
use commentscope_core::PlatformKind;
use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;

/// A comment after normalization; same position as its raw counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedComment {
    pub author: Option<String>,
    pub text: String,
}

/// A comment the spam classifier flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedComment {
    pub author: Option<String>,
    pub text: String,
}

/// Aggregate spam verdict over one run's comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpamReport {
    /// Percentage of spam comments, `0.00..=100.00`, two decimals.
    pub ratio_percent: f64,
    pub spam_count: usize,
    pub total: usize,
    pub flagged: Vec<FlaggedComment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightOutcome {
    /// The model produced an analysis.
    Generated,
    /// There was no text to analyze; no request was made.
    Skipped,
    /// The call failed; the text carries the error.
    Failed,
}

/// Free-form insight text plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightReport {
    pub text: String,
    pub outcome: InsightOutcome,
}

impl std::fmt::Display for InsightReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Everything a successful run hands to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub platform: PlatformKind,
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub comments: Vec<CleanedComment>,
    pub spam: SpamReport,
    pub insight: InsightReport,
}

/// States of a single pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    PlatformDetected,
    CommentsFetched,
    Normalized,
    Classified,
    Reported,
    Aborted,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::PlatformDetected => "platform_detected",
            PipelineState::CommentsFetched => "comments_fetched",
            PipelineState::Normalized => "normalized",
            PipelineState::Classified => "classified",
            PipelineState::Reported => "reported",
            PipelineState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why and where a run stopped short of `Reported`.
#[derive(Debug)]
pub struct PipelineAbort {
    /// Last state reached before aborting.
    pub from: PipelineState,
    pub error: PipelineError,
}

/// The result of one pipeline run together with the states it visited.
#[derive(Debug)]
pub struct PipelineRun {
    /// Visited states in order, starting at `Idle` and ending at `Reported`
    /// or `Aborted`.
    pub states: Vec<PipelineState>,
    pub outcome: Result<AnalysisReport, PipelineAbort>,
}

impl PipelineRun {
    #[must_use]
    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.outcome.is_err()
    }

    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        self.outcome.as_ref().ok()
    }
}
