//! Chrome `DevTools` Protocol backend.
//!
//! Launches a private headless Chromium per fetch through `chromiumoxide`,
//! renders the page, scrolls if the platform needs it, and runs the shared
//! extraction script.

use std::path::PathBuf;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use commentscope_core::{PlatformKind, RawComment};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::FetchError;
use crate::extract::{parse_extracted, PlatformSelectors, ScrapeOptions, SCROLL_SCRIPT};
use crate::source::CommentSource;

const CHROME_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--mute-audio",
];

pub struct CdpSource {
    options: ScrapeOptions,
    chrome_path: Option<PathBuf>,
}

impl CdpSource {
    #[must_use]
    pub fn new(options: ScrapeOptions, chrome_path: Option<PathBuf>) -> Self {
        Self {
            options,
            chrome_path,
        }
    }

    fn browser_config(&self, profile_dir: &std::path::Path) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile_dir)
            .args(CHROME_ARGS.iter().copied());
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(FetchError::BrowserSetup)
    }

    async fn scrape(
        &self,
        page: &Page,
        platform: PlatformKind,
    ) -> Result<Vec<RawComment>, FetchError> {
        page.wait_for_navigation().await?;
        tokio::time::sleep(self.options.page_load_wait).await;

        let scrolls = self.options.scrolls_for(platform);
        for i in 0..scrolls {
            page.evaluate(SCROLL_SCRIPT).await?;
            tracing::debug!(scroll = i + 1, of = scrolls, "scrolled comment feed");
            tokio::time::sleep(self.options.scroll_delay).await;
        }

        let script = PlatformSelectors::for_platform(platform).extraction_script();
        let value: serde_json::Value = page
            .evaluate(script.as_str())
            .await?
            .into_value()
            .map_err(|e| FetchError::Deserialize {
                context: "CDP evaluation result".to_string(),
                source: e,
            })?;
        parse_extracted(value)
    }
}

#[async_trait]
impl CommentSource for CdpSource {
    fn name(&self) -> &'static str {
        "cdp"
    }

    async fn fetch(
        &self,
        platform: PlatformKind,
        url: &str,
    ) -> Result<Vec<RawComment>, FetchError> {
        let profile_dir =
            std::env::temp_dir().join(format!("commentscope-cdp-{}", uuid::Uuid::new_v4()));
        let config = self.browser_config(&profile_dir)?;

        let mut session = CdpSession::launch(config, profile_dir).await?;
        let result = match session.open(url).await {
            Ok(page) => self.scrape(&page, platform).await,
            Err(e) => Err(e),
        };
        session.close().await;

        if let Ok(comments) = &result {
            tracing::info!(platform = %platform, count = comments.len(), "CDP scrape finished");
        }
        result
    }
}

/// One private browser process plus its event-handler task.
///
/// `close` tears everything down gracefully. If the session is dropped
/// without `close` (error unwinding, timeout, cancellation), `Drop` aborts the
/// handler task and chromiumoxide kills the child process when the `Browser`
/// is dropped.
struct CdpSession {
    browser: Option<Browser>,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
}

impl CdpSession {
    async fn launch(config: BrowserConfig, profile_dir: PathBuf) -> Result<Self, FetchError> {
        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });
        tracing::debug!(profile = %profile_dir.display(), "launched headless browser");
        Ok(Self {
            browser: Some(browser),
            handler,
            profile_dir,
        })
    }

    async fn open(&self, url: &str) -> Result<Page, FetchError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| FetchError::BrowserSetup("browser already closed".to_string()))?;
        Ok(browser.new_page(url).await?)
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "failed to close browser cleanly");
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!(error = %e, "failed to reap browser process");
            }
        }
        self.handler.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            tracing::debug!(error = %e, "browser profile cleanup skipped");
        }
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler.abort();
        if let Some(browser) = self.browser.take() {
            tracing::warn!("browser session dropped before close; killing process");
            drop(browser);
            let _ = std::fs::remove_dir_all(&self.profile_dir);
        }
    }
}
