//! Instagram Graph API backend.
//!
//! Reads comments for a known media id from
//! `GET {base}/{media_id}/comments?fields=text,username&access_token=...`,
//! following `paging.next` links. No browser is involved, which makes this
//! the backend of choice on hosts where Chromium cannot run.

use std::time::Duration;

use async_trait::async_trait;
use commentscope_core::{PlatformKind, RawComment};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::FetchError;
use crate::source::CommentSource;

/// Upper bound on fetched pages. Reaching it truncates the comment set the
/// same way the `YouTube` scroll count does; it also stops cycling cursors.
const MAX_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct CommentsPage {
    #[serde(default)]
    data: Vec<GraphComment>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct GraphComment {
    #[serde(default)]
    text: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

pub struct GraphApiSource {
    client: Client,
    base_url: String,
    access_token: String,
    media_id: Option<String>,
}

impl GraphApiSource {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        access_token: &str,
        media_id: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("commentscope/0.1 (comment-analysis)")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            access_token: access_token.to_owned(),
            media_id,
        })
    }

    fn first_page_url(&self, media_id: &str) -> String {
        format!("{}/{media_id}/comments", self.base_url)
    }

    async fn fetch_page(&self, url: &str, first: bool) -> Result<CommentsPage, FetchError> {
        let mut request = self.client.get(url);
        // `paging.next` links already carry the token and field list.
        if first {
            request = request.query(&[
                ("fields", "text,username"),
                ("access_token", self.access_token.as_str()),
            ]);
        }

        // reqwest errors embed the request URL, and with it the access token.
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_query(url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
            context: format!("graph comments page {}", redact_query(url)),
            source: e,
        })
    }
}

/// Strip the query string so access tokens never reach logs or error text.
fn redact_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    }
}

#[async_trait]
impl CommentSource for GraphApiSource {
    fn name(&self) -> &'static str {
        "graph"
    }

    async fn fetch(
        &self,
        platform: PlatformKind,
        _url: &str,
    ) -> Result<Vec<RawComment>, FetchError> {
        if platform != PlatformKind::Instagram {
            return Err(FetchError::UnsupportedPlatform {
                backend: "graph",
                platform,
            });
        }
        let media_id = self.media_id.as_deref().ok_or(FetchError::MissingMediaId)?;

        let mut comments = Vec::new();
        let mut next = Some(self.first_page_url(media_id));
        let mut pages = 0usize;

        while let Some(page_url) = next.take() {
            if pages >= MAX_PAGES {
                tracing::warn!(
                    media_id,
                    max_pages = MAX_PAGES,
                    count = comments.len(),
                    "Graph API page cap reached; analyzing the comments fetched so far"
                );
                break;
            }
            let page = self.fetch_page(&page_url, pages == 0).await?;
            pages += 1;

            comments.extend(
                page.data
                    .into_iter()
                    .filter(|c| !c.text.trim().is_empty())
                    .map(|c| RawComment {
                        author: c.username,
                        text: c.text,
                    }),
            );
            next = page.paging.and_then(|p| p.next);
        }

        tracing::info!(
            media_id,
            pages,
            count = comments.len(),
            "Graph API comments fetched"
        );
        Ok(comments)
    }
}
