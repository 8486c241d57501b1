use crate::scrapers::types::FetchError;
use async_trait::async_trait;

/// Something that can answer a GET with an HTML body.
/// The HTTP client implements it; tests plug in canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch `url`, optionally sending `user_agent`. Non-2xx is an error.
    async fn fetch(&self, url: &str, user_agent: Option<&str>) -> Result<String, FetchError>;

    /// Short name for log lines
    fn source_name(&self) -> &'static str;
}
