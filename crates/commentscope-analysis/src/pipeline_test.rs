use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use commentscope_core::{PlatformKind, RawComment};
use commentscope_scraper::{CommentSource, FetchError};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::insight::InsightGenerator;
use crate::spam::KeywordClassifier;
use crate::types::{InsightOutcome, InsightReport};

const REEL: &str = "https://www.instagram.com/reel/Cabc123/";

#[derive(Clone, Copy)]
enum Behavior {
    Comments(&'static [&'static str]),
    Fail,
    Hang,
}

/// Marks the fake session released when dropped.
struct SessionGuard(Arc<AtomicBool>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

struct FakeSource {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl FakeSource {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl CommentSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(
        &self,
        _platform: PlatformKind,
        _url: &str,
    ) -> Result<Vec<RawComment>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _session = SessionGuard(Arc::clone(&self.released));
        match self.behavior {
            Behavior::Comments(texts) => Ok(texts.iter().map(|t| RawComment::new(*t)).collect()),
            Behavior::Fail => Err(FetchError::BrowserSetup("chrome not found".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Default)]
struct FakeInsight {
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    fail: bool,
    hang: bool,
}

#[async_trait]
impl InsightGenerator for FakeInsight {
    async fn summarize(&self, text: &str) -> InsightReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(text.to_string());
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail {
            InsightReport {
                text: "Error: 500 - internal".to_string(),
                outcome: InsightOutcome::Failed,
            }
        } else {
            InsightReport {
                text: "- Positive Reach: high".to_string(),
                outcome: InsightOutcome::Generated,
            }
        }
    }
}

struct Harness {
    pipeline: Pipeline,
    fetch_calls: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
    insight_calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
}

fn harness(behavior: Behavior, insight_fails: bool) -> Harness {
    harness_with_insight(
        behavior,
        FakeInsight {
            fail: insight_fails,
            ..FakeInsight::default()
        },
    )
}

fn harness_with_insight(behavior: Behavior, insight: FakeInsight) -> Harness {
    let source = FakeSource::new(behavior);
    let harness_refs = (
        Arc::clone(&source.calls),
        Arc::clone(&source.released),
        Arc::clone(&insight.calls),
        Arc::clone(&insight.received),
    );
    let pipeline = Pipeline::new(
        Box::new(source),
        Box::new(KeywordClassifier::default()),
        Box::new(insight),
    )
    .with_fetch_timeout(Duration::from_millis(100));
    Harness {
        pipeline,
        fetch_calls: harness_refs.0,
        released: harness_refs.1,
        insight_calls: harness_refs.2,
        received: harness_refs.3,
    }
}

#[tokio::test]
async fn happy_path_walks_every_state() {
    let h = harness(
        Behavior::Comments(&["Follow me for more! 🔥", "Great content", "Buy followers now"]),
        false,
    );
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;

    assert_eq!(
        run.states,
        vec![
            PipelineState::Idle,
            PipelineState::PlatformDetected,
            PipelineState::CommentsFetched,
            PipelineState::Normalized,
            PipelineState::Classified,
            PipelineState::Reported,
        ]
    );
    let report = run.report().expect("run should report");
    assert_eq!(report.platform, PlatformKind::Instagram);
    assert!((report.spam.ratio_percent - 66.67).abs() < f64::EPSILON);
    assert_eq!(report.insight.outcome, InsightOutcome::Generated);
    assert_eq!(h.insight_calls.load(Ordering::SeqCst), 1);
    assert!(h.released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn insight_receives_newline_joined_normalized_text() {
    let h = harness(Behavior::Comments(&["one 😀", "two #2"]), false);
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;
    assert!(!run.is_aborted());
    assert_eq!(*h.received.lock().unwrap(), vec!["one \ntwo 2".to_string()]);
}

#[tokio::test]
async fn unrecognized_url_aborts_without_fetch() {
    let h = harness(Behavior::Comments(&["hi"]), false);
    let run = h.pipeline.run("https://example.com/post", &CancellationToken::new()).await;

    assert_eq!(run.states, vec![PipelineState::Idle, PipelineState::Aborted]);
    assert_eq!(run.final_state(), PipelineState::Aborted);
    let abort = run.outcome.expect_err("should abort");
    assert!(matches!(abort.error, PipelineError::InvalidInput { .. }));
    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.insight_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_fetch_aborts_before_insight() {
    let h = harness(Behavior::Comments(&[]), false);
    let run = h.pipeline.run("https://youtu.be/abc", &CancellationToken::new()).await;

    assert_eq!(
        run.states,
        vec![
            PipelineState::Idle,
            PipelineState::PlatformDetected,
            PipelineState::CommentsFetched,
            PipelineState::Aborted,
        ]
    );
    let abort = run.outcome.expect_err("should abort");
    assert_eq!(abort.from, PipelineState::CommentsFetched);
    assert!(matches!(
        abort.error,
        PipelineError::NoComments {
            platform: PlatformKind::YouTube
        }
    ));
    assert_eq!(h.insight_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_error_aborts_and_releases_session() {
    let h = harness(Behavior::Fail, false);
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;

    assert_eq!(run.final_state(), PipelineState::Aborted);
    let abort = run.outcome.expect_err("should abort");
    assert_eq!(abort.from, PipelineState::PlatformDetected);
    assert!(matches!(
        abort.error,
        PipelineError::Fetch(FetchError::BrowserSetup(_))
    ));
    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 1, "fetch is never retried");
    assert!(h.released.load(Ordering::SeqCst));
    assert_eq!(h.insight_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_fetch_times_out_and_releases_session() {
    let h = harness(Behavior::Hang, false);
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;

    let abort = run.outcome.expect_err("should time out");
    assert!(matches!(
        abort.error,
        PipelineError::Fetch(FetchError::Timeout { .. })
    ));
    assert!(h.released.load(Ordering::SeqCst), "session leaked on timeout");
}

#[tokio::test]
async fn cancellation_aborts_fetch_and_releases_session() {
    let h = harness(Behavior::Hang, false);
    let pipeline = h.pipeline.with_fetch_timeout(Duration::from_secs(3600));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let run = pipeline.run(REEL, &token).await;

    let abort = run.outcome.expect_err("should be cancelled");
    assert!(matches!(abort.error, PipelineError::Cancelled));
    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 1);
    assert!(h.released.load(Ordering::SeqCst), "session leaked on cancel");
}

#[tokio::test]
async fn cancellation_during_insight_aborts_promptly() {
    let h = harness_with_insight(
        Behavior::Comments(&["Great content"]),
        FakeInsight {
            hang: true,
            ..FakeInsight::default()
        },
    );
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let run = tokio::time::timeout(Duration::from_secs(5), h.pipeline.run(REEL, &token))
        .await
        .expect("cancelled run must not wait for the insight call");

    assert_eq!(
        run.states,
        vec![
            PipelineState::Idle,
            PipelineState::PlatformDetected,
            PipelineState::CommentsFetched,
            PipelineState::Normalized,
            PipelineState::Classified,
            PipelineState::Aborted,
        ]
    );
    let abort = run.outcome.expect_err("should be cancelled");
    assert_eq!(abort.from, PipelineState::Classified);
    assert!(matches!(abort.error, PipelineError::Cancelled));
    assert_eq!(h.insight_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pre_cancelled_token_never_starts_fetch() {
    let h = harness(Behavior::Comments(&["hi"]), false);
    let token = CancellationToken::new();
    token.cancel();

    let run = h.pipeline.run(REEL, &token).await;

    assert!(matches!(
        run.outcome.expect_err("should be cancelled").error,
        PipelineError::Cancelled
    ));
    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn insight_failure_still_reports_spam_ratio() {
    let h = harness(
        Behavior::Comments(&["Follow me for more!", "Great content", "Buy followers now"]),
        true,
    );
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;

    assert_eq!(run.final_state(), PipelineState::Reported);
    let report = run.report().expect("insight failure must not abort");
    assert!((report.spam.ratio_percent - 66.67).abs() < f64::EPSILON);
    assert_eq!(report.insight.outcome, InsightOutcome::Failed);
    assert_eq!(report.insight.text, "Error: 500 - internal");
}

#[tokio::test]
async fn comments_emptied_by_normalization_still_count() {
    let h = harness(Behavior::Comments(&["🔥🔥", "free money 💸"]), false);
    let run = h.pipeline.run(REEL, &CancellationToken::new()).await;

    let report = run.report().expect("should report");
    assert_eq!(report.comments.len(), 2);
    assert_eq!(report.comments[0].text, "");
    assert!((report.spam.ratio_percent - 50.0).abs() < f64::EPSILON);
}
