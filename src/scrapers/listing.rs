use crate::config::ScrapeConfig;
use crate::models::ListingEntry;
use crate::scrapers::selector;
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::whole_second_delay;
use anyhow::{Context, Result};
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Walks the paginated hotel directory and gathers detail-page links
pub struct UrlCollector<'a> {
    source: &'a dyn PageSource,
    config: &'a ScrapeConfig,
}

impl<'a> UrlCollector<'a> {
    pub fn new(source: &'a dyn PageSource, config: &'a ScrapeConfig) -> Self {
        Self { source, config }
    }

    /// Fetch pages `1..=total_pages` in order. Any failed page aborts the run.
    pub async fn collect(&self) -> Result<Vec<ListingEntry>> {
        let origin = Url::parse(&self.config.site_origin)
            .with_context(|| format!("Invalid site origin {}", self.config.site_origin))?;

        let mut entries = Vec::new();

        for page in 1..=self.config.total_pages {
            let url = self.config.page_url(page);
            info!("Fetching listing page {}/{}", page, self.config.total_pages);

            let html = self
                .source
                .fetch(&url, None)
                .await
                .with_context(|| format!("Failed to fetch listing page {}", url))?;

            let links = extract_links(&html, &origin)?;
            debug!("Page {} yielded {} links", page, links.len());
            entries.extend(links.into_iter().map(|link| ListingEntry { link }));

            if page < self.config.total_pages {
                tokio::time::sleep(whole_second_delay(&self.config.page_delay_secs)).await;
            }
        }

        if self.config.dedupe_links {
            let before = entries.len();
            entries = dedupe(entries);
            debug!("Dropped {} repeated links", before - entries.len());
        }

        info!("Collected {} hotel links via {}", entries.len(), self.source.source_name());
        Ok(entries)
    }
}

/// Pull the anchor of every listing card and resolve it against `origin`
pub fn extract_links(html: &str, origin: &Url) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let card_selector = selector("li.CardGrid--grid-item")?;
    let anchor_selector = selector("a")?;

    let mut links = Vec::new();
    for card in document.select(&card_selector) {
        let Some(href) = card
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            warn!("Listing card without a link, skipping");
            continue;
        };

        match normalize_link(origin, href) {
            Some(link) => links.push(link),
            None => warn!("Skipping off-site or unresolvable link {:?}", href),
        }
    }

    Ok(links)
}

/// Make a card href absolute. Root-relative paths get the site's scheme and
/// host; anything that resolves to another origin is rejected.
pub fn normalize_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let joined = origin.join(href).ok()?;
    if joined.origin() != origin.origin() {
        return None;
    }
    Some(joined.into())
}

fn dedupe(entries: Vec<ListingEntry>) -> Vec<ListingEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.link.clone()))
        .collect()
}
