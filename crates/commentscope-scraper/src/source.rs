use async_trait::async_trait;
use commentscope_core::{FetchSettings, PlatformKind, RawComment, SourceBackend};

use crate::cdp::CdpSource;
use crate::error::FetchError;
use crate::extract::ScrapeOptions;
use crate::graph::GraphApiSource;
use crate::webdriver::WebDriverSource;

/// Something that can produce the raw comments for a content URL.
///
/// Implementations own any automation session they open for the duration of
/// one `fetch` call and must release it on every exit path, including when
/// the returned future is dropped before completion.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Fetch the comments currently visible for `url` on `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] for any automation, network, or decoding failure.
    async fn fetch(&self, platform: PlatformKind, url: &str)
        -> Result<Vec<RawComment>, FetchError>;
}

/// Construct the comment source selected by `settings.backend`.
///
/// `media_id_override` takes precedence over the configured Graph API media id.
///
/// # Errors
///
/// Returns [`FetchError::MissingCredentials`] when the graph backend is chosen
/// without an access token, or [`FetchError::Http`] if its HTTP client cannot
/// be built.
pub fn build_source(
    settings: &FetchSettings,
    media_id_override: Option<&str>,
) -> Result<Box<dyn CommentSource>, FetchError> {
    let options = ScrapeOptions::from_settings(settings);
    match settings.backend {
        SourceBackend::Cdp => Ok(Box::new(CdpSource::new(
            options,
            settings.chrome_path.clone(),
        ))),
        SourceBackend::WebDriver => Ok(Box::new(WebDriverSource::new(
            &settings.webdriver_url,
            options,
        ))),
        SourceBackend::Graph => {
            let token = settings
                .graph_access_token
                .as_deref()
                .ok_or(FetchError::MissingCredentials("graph"))?;
            let media_id = media_id_override
                .map(str::to_string)
                .or_else(|| settings.graph_media_id.clone());
            Ok(Box::new(GraphApiSource::new(
                &settings.graph_base_url,
                token,
                media_id,
                settings.timeout_secs,
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: SourceBackend) -> FetchSettings {
        FetchSettings {
            backend,
            webdriver_url: "http://localhost:9515".to_string(),
            chrome_path: None,
            page_load_wait_ms: 0,
            youtube_scroll_count: 3,
            youtube_scroll_delay_ms: 0,
            timeout_secs: 5,
            graph_base_url: "http://localhost:1".to_string(),
            graph_access_token: None,
            graph_media_id: None,
        }
    }

    #[test]
    fn builds_cdp_source() {
        let source = build_source(&settings(SourceBackend::Cdp), None).unwrap();
        assert_eq!(source.name(), "cdp");
    }

    #[test]
    fn builds_webdriver_source() {
        let source = build_source(&settings(SourceBackend::WebDriver), None).unwrap();
        assert_eq!(source.name(), "webdriver");
    }

    #[test]
    fn graph_source_without_token_is_rejected() {
        let result = build_source(&settings(SourceBackend::Graph), None);
        assert!(matches!(result, Err(FetchError::MissingCredentials("graph"))));
    }

    #[test]
    fn graph_source_with_token_builds() {
        let mut s = settings(SourceBackend::Graph);
        s.graph_access_token = Some("token".to_string());
        let source = build_source(&s, Some("1789")).unwrap();
        assert_eq!(source.name(), "graph");
    }
}
