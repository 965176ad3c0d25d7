//! Pipeline orchestration for a single content URL.
//!
//! A run walks `Idle → PlatformDetected → CommentsFetched → Normalized →
//! Classified → Reported` and drops into `Aborted` on an unrecognized URL, a
//! fetch failure (including timeout), an empty comment set, or cancellation.
//! Insight failures do not abort; they become the insight text.

use std::time::Duration;

use chrono::Utc;
use commentscope_core::{PlatformKind, RawComment};
use commentscope_scraper::{CommentSource, FetchError};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::insight::InsightGenerator;
use crate::normalize::normalize_all;
use crate::spam::SpamClassifier;
use crate::types::{AnalysisReport, PipelineAbort, PipelineRun, PipelineState, SpamReport};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Wires a comment source, a spam classifier, and an insight generator into
/// the analysis state machine.
pub struct Pipeline {
    source: Box<dyn CommentSource>,
    classifier: Box<dyn SpamClassifier>,
    insight: Box<dyn InsightGenerator>,
    fetch_timeout: Duration,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        source: Box<dyn CommentSource>,
        classifier: Box<dyn SpamClassifier>,
        insight: Box<dyn InsightGenerator>,
    ) -> Self {
        Self {
            source,
            classifier,
            insight,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bound on the whole fetch stage; expiry aborts the run.
    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Run the pipeline for `url`.
    ///
    /// Cancelling `cancel` during the fetch or the insight call drops that
    /// stage's future and aborts the run with [`PipelineError::Cancelled`].
    /// A dropped fetch tears down the backend's automation session. Never
    /// panics on collaborator failures; every failure is reported through
    /// [`PipelineRun::outcome`].
    pub async fn run(&self, url: &str, cancel: &CancellationToken) -> PipelineRun {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", %run_id, source = self.source.name());
        async move {
            let mut states = vec![PipelineState::Idle];
            let outcome = self.advance(run_id, url, cancel, &mut states).await;
            match &outcome {
                Ok(report) => tracing::info!(
                    platform = %report.platform,
                    comment_count = report.comments.len(),
                    spam_ratio = report.spam.ratio_percent,
                    "pipeline run reported"
                ),
                Err(abort) => {
                    tracing::warn!(from = %abort.from, error = %abort.error, "pipeline run aborted");
                    states.push(PipelineState::Aborted);
                }
            }
            PipelineRun { states, outcome }
        }
        .instrument(span)
        .await
    }

    async fn advance(
        &self,
        run_id: Uuid,
        url: &str,
        cancel: &CancellationToken,
        states: &mut Vec<PipelineState>,
    ) -> Result<AnalysisReport, PipelineAbort> {
        let Some(platform) = PlatformKind::detect(url) else {
            return Err(PipelineAbort {
                from: PipelineState::Idle,
                error: PipelineError::InvalidInput {
                    url: url.to_string(),
                },
            });
        };
        states.push(PipelineState::PlatformDetected);
        tracing::info!(%platform, url, "platform detected");

        let raw = self
            .fetch(platform, url, cancel)
            .await
            .map_err(|error| PipelineAbort {
                from: PipelineState::PlatformDetected,
                error,
            })?;
        states.push(PipelineState::CommentsFetched);
        tracing::info!(comment_count = raw.len(), "comments fetched");

        if raw.is_empty() {
            return Err(PipelineAbort {
                from: PipelineState::CommentsFetched,
                error: PipelineError::NoComments { platform },
            });
        }

        let comments = normalize_all(raw);
        states.push(PipelineState::Normalized);

        let spam = SpamReport::build(self.classifier.as_ref(), &comments);
        states.push(PipelineState::Classified);
        tracing::debug!(
            spam_count = spam.spam_count,
            total = spam.total,
            "comments classified"
        );

        let joined = comments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let insight = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(PipelineAbort {
                    from: PipelineState::Classified,
                    error: PipelineError::Cancelled,
                });
            }
            insight = self.insight.summarize(&joined) => insight,
        };
        states.push(PipelineState::Reported);

        Ok(AnalysisReport {
            run_id,
            platform,
            url: url.to_string(),
            analyzed_at: Utc::now(),
            comments,
            spam,
            insight,
        })
    }

    /// Fetch under the configured timeout, racing the cancellation token.
    async fn fetch(
        &self,
        platform: PlatformKind,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawComment>, PipelineError> {
        let fetch = tokio::time::timeout(self.fetch_timeout, self.source.fetch(platform, url));
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PipelineError::Cancelled),
            result = fetch => match result {
                Ok(Ok(raw)) => Ok(raw),
                Ok(Err(e)) => Err(PipelineError::Fetch(e)),
                Err(_) => Err(PipelineError::Fetch(FetchError::Timeout {
                    secs: self.fetch_timeout.as_secs(),
                })),
            },
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
