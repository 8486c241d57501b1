use crate::scrapers::types::DetailDelay;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one scrape run.
///
/// `Default` holds the production values for the hotelleriesuisse directory;
/// tests swap in fixture URLs and zero delays.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Listing URL without the page number, e.g. `.../hotel-page-`
    pub base_url: String,
    /// Scheme and host used to resolve relative detail links
    pub site_origin: String,
    /// Number of listing pages to walk, starting at 1
    pub total_pages: u32,
    /// Whole seconds to wait between listing pages
    pub page_delay_secs: RangeInclusive<u64>,
    /// Upper bound in seconds for the pause between detail pages
    pub detail_delay_max_secs: f64,
    /// How the detail pause is sampled
    pub detail_delay: DetailDelay,
    /// User agents rotated per detail request
    pub user_agents: Vec<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Directory holding the dated snapshots
    pub data_dir: PathBuf,
    /// Link list overwritten on every run
    pub latest_urls_path: PathBuf,
    /// Drop repeated links while keeping first-seen order
    pub dedupe_links: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url:
                "https://www.hotelleriesuisse.ch/de/branche-und-politik/branchenverzeichnis/hotel-page-"
                    .to_string(),
            site_origin: "https://www.hotelleriesuisse.ch".to_string(),
            total_pages: 3,
            page_delay_secs: 1..=3,
            detail_delay_max_secs: 0.3,
            detail_delay: DetailDelay::PerRequest,
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 11_4_0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            ],
            request_timeout: Duration::from_secs(30),
            data_dir: PathBuf::from("data"),
            latest_urls_path: PathBuf::from("hotel_urls.feather"),
            dedupe_links: false,
        }
    }
}

impl ScrapeConfig {
    /// Listing page URL for a 1-based page index
    pub fn page_url(&self, page: u32) -> String {
        format!("{}{}", self.base_url, page)
    }
}
