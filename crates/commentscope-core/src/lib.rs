//! Shared configuration and domain types for commentscope.

pub mod app_config;
pub mod comment;
pub mod config;
pub mod error;
pub mod platform;
pub mod rules;

pub use app_config::{AppConfig, Environment, FetchSettings, InsightSettings, SourceBackend};
pub use comment::RawComment;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use platform::PlatformKind;
pub use rules::{load_rules, AnalysisRules, PromptTemplate};
