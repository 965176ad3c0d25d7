mod analyze;
mod output;

use clap::{Parser, Subcommand};
use commentscope_core::{AnalysisRules, AppConfig, PlatformKind, SourceBackend};
use tracing_subscriber::EnvFilter;

use crate::analyze::AnalyzeArgs;

#[derive(Debug, Parser)]
#[command(name = "commentscope")]
#[command(about = "Analyze Instagram and YouTube comments for spam and engagement")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, clean, and analyze the comments of a post or video
    Analyze(AnalyzeArgs),
    /// Print which platform a URL belongs to
    Detect {
        /// Instagram or YouTube URL
        url: String,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Load and validate configuration and rules, then print a redacted summary
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => {
            let config = commentscope_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            analyze::run_analyze(&config, args).await
        }
        Commands::Detect { url } => run_detect(&url),
        Commands::Config {
            command: ConfigCommands::Check,
        } => {
            let config = commentscope_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            run_config_check(&config)
        }
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Rules from `COMMENTSCOPE_RULES_PATH`, or the built-in defaults.
pub(crate) fn load_rules(config: &AppConfig) -> anyhow::Result<AnalysisRules> {
    match &config.rules_path {
        Some(path) => Ok(commentscope_core::load_rules(path)?),
        None => Ok(AnalysisRules::default()),
    }
}

fn run_detect(url: &str) -> anyhow::Result<()> {
    let platform = PlatformKind::detect(url).ok_or_else(|| {
        anyhow::anyhow!("unrecognized URL {url:?}: expected an Instagram or YouTube link")
    })?;
    println!("{platform}");
    Ok(())
}

fn run_config_check(config: &AppConfig) -> anyhow::Result<()> {
    let rules = load_rules(config)?;
    let rules_source = config
        .rules_path
        .as_ref()
        .map_or_else(|| "built-in".to_string(), |p| p.display().to_string());

    println!("environment:     {}", config.env);
    println!("log level:       {}", config.log_level);
    println!("source backend:  {}", config.fetch.backend);
    if config.fetch.backend == SourceBackend::WebDriver {
        println!("webdriver url:   {}", config.fetch.webdriver_url);
    }
    println!("insight model:   {}", config.insight.model);
    println!("insight url:     {}", config.insight.api_url);
    println!("rules:           {rules_source}");
    println!("spam phrases:    {}", rules.spam_phrases.len());
    tracing::debug!(insight = ?config.insight, fetch = ?config.fetch, "effective configuration");
    println!("configuration OK");
    Ok(())
}
