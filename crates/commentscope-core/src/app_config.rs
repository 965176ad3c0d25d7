use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which comment source implementation drives the fetch stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBackend {
    /// In-process Chrome `DevTools` Protocol driver.
    Cdp,
    /// External W3C `WebDriver` server (e.g. chromedriver).
    WebDriver,
    /// Instagram Graph API. Instagram only.
    Graph,
}

impl FromStr for SourceBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdp" => Ok(SourceBackend::Cdp),
            "webdriver" => Ok(SourceBackend::WebDriver),
            "graph" => Ok(SourceBackend::Graph),
            other => Err(format!(
                "unknown source backend '{other}'; expected cdp, webdriver, or graph"
            )),
        }
    }
}

impl std::fmt::Display for SourceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceBackend::Cdp => write!(f, "cdp"),
            SourceBackend::WebDriver => write!(f, "webdriver"),
            SourceBackend::Graph => write!(f, "graph"),
        }
    }
}

/// Settings for the chat-completion call that produces the insight text.
#[derive(Clone)]
pub struct InsightSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl std::fmt::Debug for InsightSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

/// Settings for the comment fetch stage.
#[derive(Clone)]
pub struct FetchSettings {
    pub backend: SourceBackend,
    pub webdriver_url: String,
    pub chrome_path: Option<PathBuf>,
    pub page_load_wait_ms: u64,
    pub youtube_scroll_count: u32,
    pub youtube_scroll_delay_ms: u64,
    pub timeout_secs: u64,
    pub graph_base_url: String,
    pub graph_access_token: Option<String>,
    pub graph_media_id: Option<String>,
}

impl std::fmt::Debug for FetchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchSettings")
            .field("backend", &self.backend)
            .field("webdriver_url", &self.webdriver_url)
            .field("chrome_path", &self.chrome_path)
            .field("page_load_wait_ms", &self.page_load_wait_ms)
            .field("youtube_scroll_count", &self.youtube_scroll_count)
            .field("youtube_scroll_delay_ms", &self.youtube_scroll_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .field("graph_base_url", &self.graph_base_url)
            .field(
                "graph_access_token",
                &self.graph_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("graph_media_id", &self.graph_media_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub rules_path: Option<PathBuf>,
    pub insight: InsightSettings,
    pub fetch: FetchSettings,
}
