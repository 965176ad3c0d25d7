//! `analyze` command: wire configuration into a pipeline and run it once.

use std::time::Duration;

use clap::Args;
use commentscope_analysis::{ChatCompletionClient, KeywordClassifier, Pipeline};
use commentscope_core::{AppConfig, SourceBackend};
use commentscope_scraper::build_source;
use tokio_util::sync::CancellationToken;

use crate::output::{abort_message, render_json, render_text, OutputFormat};

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    /// Instagram or YouTube URL
    pub url: String,

    /// Override the configured comment source backend
    #[arg(long)]
    pub backend: Option<SourceBackend>,

    /// Instagram media id for the graph backend
    #[arg(long)]
    pub media_id: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List the comments flagged as spam
    #[arg(long)]
    pub show_spam: bool,
}

/// Run one analysis. Ctrl-C cancels the run at whichever stage is waiting.
///
/// # Errors
///
/// Returns an error if rules or collaborators cannot be constructed, or if
/// the run aborts.
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let rules = crate::load_rules(config)?;

    let mut fetch_settings = config.fetch.clone();
    if let Some(backend) = args.backend {
        fetch_settings.backend = backend;
    }
    let source = build_source(&fetch_settings, args.media_id.as_deref())?;
    let insight = ChatCompletionClient::new(&config.insight, rules.prompt.clone())?;
    let pipeline = Pipeline::new(
        source,
        Box::new(KeywordClassifier::from_rules(&rules)),
        Box::new(insight),
    )
    .with_fetch_timeout(Duration::from_secs(fetch_settings.timeout_secs));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c, cancelling analysis");
            trigger.cancel();
        }
    });

    tracing::info!(url = %args.url, backend = %fetch_settings.backend, "starting analysis");
    let run = pipeline.run(&args.url, &cancel).await;
    ctrl_c.abort();

    match run.outcome {
        Ok(report) => {
            let rendered = match args.format {
                OutputFormat::Text => render_text(&report, args.show_spam),
                OutputFormat::Json => render_json(&report)?,
            };
            println!("{rendered}");
            Ok(())
        }
        Err(abort) => Err(anyhow::anyhow!(abort_message(&abort))),
    }
}
