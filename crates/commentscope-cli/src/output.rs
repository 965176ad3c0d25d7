use clap::ValueEnum;
use commentscope_analysis::{AnalysisReport, PipelineAbort, PipelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

pub(crate) fn render_text(report: &AnalysisReport, show_spam: bool) -> String {
    let mut lines = vec![
        format!("Platform:  {}", report.platform),
        format!("URL:       {}", report.url),
        format!("Comments:  {}", report.comments.len()),
        String::new(),
        "AI Insights".to_string(),
        "-----------".to_string(),
        report.insight.text.trim_end().to_string(),
        String::new(),
        format!(
            "Spam ratio: {:.2}% ({} of {})",
            report.spam.ratio_percent, report.spam.spam_count, report.spam.total
        ),
    ];

    if show_spam && !report.spam.flagged.is_empty() {
        lines.push(String::new());
        lines.push("Flagged comments:".to_string());
        lines.extend(report.spam.flagged.iter().map(|flagged| {
            let author = flagged.author.as_deref().unwrap_or("unknown");
            format!("  - {author}: {}", flagged.text)
        }));
    }
    lines.join("\n")
}

pub(crate) fn render_json(report: &AnalysisReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// One-line user-facing reason for an aborted run.
pub(crate) fn abort_message(abort: &PipelineAbort) -> String {
    match &abort.error {
        PipelineError::Fetch(e) => format!(
            "no comments found: {e}; ensure the post is public and the browser backend is reachable"
        ),
        other => other.to_string(),
    }
}
