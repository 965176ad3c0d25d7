use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("rules validation failed: {0}")]
    Validation(String),
}
