//! Platform markup knowledge shared by the browser backends.
//!
//! Both browser drivers run the same in-page script: it walks every comment
//! container, reads the author and text nodes, and returns a JSON array of
//! `{author, text}` objects.

use std::time::Duration;

use commentscope_core::{FetchSettings, PlatformKind, RawComment};
use serde::Deserialize;

/// Scrolls one viewport down; used to trigger lazy comment loading.
pub(crate) const SCROLL_SCRIPT: &str = "window.scrollBy(0, window.innerHeight); true";

/// CSS selectors locating comments on a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformSelectors {
    /// One element per comment.
    pub container: &'static str,
    /// Author node, relative to the container.
    pub author: &'static str,
    /// Comment text node(s), relative to the container.
    pub text: &'static str,
}

impl PlatformSelectors {
    #[must_use]
    pub fn for_platform(platform: PlatformKind) -> Self {
        match platform {
            PlatformKind::Instagram => Self {
                container: "ul li",
                author: "h3",
                text: "span",
            },
            PlatformKind::YouTube => Self {
                container: "ytd-comment-thread-renderer",
                author: "#author-text",
                text: "#content-text",
            },
        }
    }

    /// Build the extraction expression for this platform.
    ///
    /// Selectors are embedded as JSON string literals so quoting inside a
    /// selector can never break out of the script.
    #[must_use]
    pub fn extraction_script(&self) -> String {
        let container = js_string(self.container);
        let author = js_string(self.author);
        let text = js_string(self.text);
        format!(
            r"(() => {{
  const read = (el) => el ? (el.innerText || el.textContent || '').trim() : '';
  const out = [];
  document.querySelectorAll({container}).forEach((node) => {{
    const author = read(node.querySelector({author}));
    let text = '';
    for (const el of node.querySelectorAll({text})) {{
      const t = read(el);
      if (t && t !== author) {{ text = t; break; }}
    }}
    if (text) out.push({{ author: author || null, text }});
  }});
  return out;
}})()"
        )
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Timing knobs for a browser scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Wait after navigation before touching the page.
    pub page_load_wait: Duration,
    /// "Load more" scrolls performed on `YouTube` pages.
    pub youtube_scroll_count: u32,
    pub scroll_delay: Duration,
}

impl ScrapeOptions {
    #[must_use]
    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self {
            page_load_wait: Duration::from_millis(settings.page_load_wait_ms),
            youtube_scroll_count: settings.youtube_scroll_count,
            scroll_delay: Duration::from_millis(settings.youtube_scroll_delay_ms),
        }
    }

    /// Number of scrolls to perform before extraction on `platform`.
    ///
    /// Instagram renders the visible comment list up front, so it gets none.
    #[must_use]
    pub fn scrolls_for(&self, platform: PlatformKind) -> u32 {
        match platform {
            PlatformKind::Instagram => 0,
            PlatformKind::YouTube => self.youtube_scroll_count,
        }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            page_load_wait: Duration::from_secs(5),
            youtube_scroll_count: 8,
            scroll_delay: Duration::from_secs(2),
        }
    }
}

/// One element of the array returned by the extraction script.
#[derive(Debug, Deserialize)]
pub(crate) struct ExtractedComment {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    text: String,
}

/// Convert script output into raw comments, dropping blank entries.
pub(crate) fn into_raw_comments(extracted: Vec<ExtractedComment>) -> Vec<RawComment> {
    extracted
        .into_iter()
        .filter(|c| !c.text.trim().is_empty())
        .map(|c| RawComment {
            author: c
                .author
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
            text: c.text,
        })
        .collect()
}

/// Deserialize the script's JSON result.
pub(crate) fn parse_extracted(
    value: serde_json::Value,
) -> Result<Vec<RawComment>, crate::FetchError> {
    let extracted: Vec<ExtractedComment> =
        serde_json::from_value(value).map_err(|e| crate::FetchError::Deserialize {
            context: "comment extraction script result".to_string(),
            source: e,
        })?;
    Ok(into_raw_comments(extracted))
}
