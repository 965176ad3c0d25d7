//! Comment sources for commentscope.
//!
//! Every backend implements [`CommentSource`]. Platform markup (CSS selectors,
//! scroll behaviour, API shapes) is confined to this crate so a markup change
//! on Instagram or `YouTube` never reaches the analysis pipeline.

pub mod cdp;
pub mod error;
pub mod extract;
pub mod graph;
pub mod source;
pub mod webdriver;

pub use cdp::CdpSource;
pub use error::FetchError;
pub use extract::{PlatformSelectors, ScrapeOptions};
pub use graph::GraphApiSource;
pub use source::{build_source, CommentSource};
pub use webdriver::WebDriverSource;
