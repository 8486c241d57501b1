pub mod detail;
pub mod http;
pub mod listing;
pub mod traits;
pub mod types;

pub use detail::DetailFetcher;
pub use http::HttpPageSource;
pub use listing::UrlCollector;
pub use traits::PageSource;

use anyhow::{anyhow, Result};
use scraper::Selector;

/// Parse a CSS selector, reporting bad syntax as an error instead of panicking
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {:?}: {:?}", css, e))
}
