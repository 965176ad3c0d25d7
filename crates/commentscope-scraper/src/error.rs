use commentscope_core::PlatformKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("browser setup failed: {0}")]
    BrowserSetup(String),

    #[error("CDP error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("WebDriver error: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{backend} backend does not support {platform}")]
    UnsupportedPlatform {
        backend: &'static str,
        platform: PlatformKind,
    },

    #[error("no Instagram media id configured for the graph backend")]
    MissingMediaId,

    #[error("missing credentials for the {0} backend")]
    MissingCredentials(&'static str),

    #[error("fetch timed out after {secs}s")]
    Timeout { secs: u64 },
}
