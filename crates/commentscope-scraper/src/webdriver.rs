//! W3C `WebDriver` backend.
//!
//! Talks to an external chromedriver (or any `WebDriver` server) through
//! `thirtyfour`. A new session is created for every fetch and quit afterwards.

use async_trait::async_trait;
use commentscope_core::{PlatformKind, RawComment};
use thirtyfour::prelude::*;
use thirtyfour::ChromeCapabilities;

use crate::error::FetchError;
use crate::extract::{parse_extracted, PlatformSelectors, ScrapeOptions, SCROLL_SCRIPT};
use crate::source::CommentSource;

const CHROME_ARGS: &[&str] = &[
    "--headless=new",
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
];

pub struct WebDriverSource {
    server_url: String,
    options: ScrapeOptions,
}

impl WebDriverSource {
    #[must_use]
    pub fn new(server_url: &str, options: ScrapeOptions) -> Self {
        Self {
            server_url: server_url.to_owned(),
            options,
        }
    }

    fn capabilities() -> Result<ChromeCapabilities, FetchError> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in CHROME_ARGS {
            caps.add_arg(arg)?;
        }
        Ok(caps)
    }

    async fn scrape(
        &self,
        driver: &WebDriver,
        platform: PlatformKind,
        url: &str,
    ) -> Result<Vec<RawComment>, FetchError> {
        driver.goto(url.to_string()).await?;
        tokio::time::sleep(self.options.page_load_wait).await;

        let scrolls = self.options.scrolls_for(platform);
        for i in 0..scrolls {
            driver.execute(SCROLL_SCRIPT, Vec::new()).await?;
            tracing::debug!(scroll = i + 1, of = scrolls, "scrolled comment feed");
            tokio::time::sleep(self.options.scroll_delay).await;
        }

        let script = format!(
            "return {};",
            PlatformSelectors::for_platform(platform).extraction_script()
        );
        let value: serde_json::Value = driver.execute(script, Vec::new()).await?.convert()?;
        parse_extracted(value)
    }
}

#[async_trait]
impl CommentSource for WebDriverSource {
    fn name(&self) -> &'static str {
        "webdriver"
    }

    async fn fetch(
        &self,
        platform: PlatformKind,
        url: &str,
    ) -> Result<Vec<RawComment>, FetchError> {
        let caps = Self::capabilities()?;
        let driver = WebDriver::new(&self.server_url, caps).await?;
        let mut session = WebDriverSession::new(driver);

        let result = match session.driver() {
            Some(driver) => self.scrape(driver, platform, url).await,
            None => Err(FetchError::BrowserSetup(
                "webdriver session already closed".to_string(),
            )),
        };
        session.quit().await;

        if let Ok(comments) = &result {
            tracing::info!(platform = %platform, count = comments.len(), "WebDriver scrape finished");
        }
        result
    }
}

/// Owns one `WebDriver` session and guarantees it is quit.
///
/// If dropped before [`WebDriverSession::quit`], the quit is handed to the
/// runtime so the remote browser is not leaked.
struct WebDriverSession {
    driver: Option<WebDriver>,
}

impl WebDriverSession {
    fn new(driver: WebDriver) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    fn driver(&self) -> Option<&WebDriver> {
        self.driver.as_ref()
    }

    async fn quit(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.quit().await {
                tracing::warn!(error = %e, "failed to quit WebDriver session");
            }
        }
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        tracing::warn!("WebDriver session dropped before quit; quitting in background");
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = driver.quit().await {
                    tracing::warn!(error = %e, "background WebDriver quit failed");
                }
            });
        }
    }
}
