use crate::config::ScrapeConfig;
use crate::models::{AddressParts, HotelRecord};
use crate::scrapers::selector;
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::{DelaySampler, FetchStats};
use anyhow::Result;
use rand::seq::IndexedRandom;
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Turns one downloaded page (html, url) into a record
pub type PageParser = fn(&str, &str) -> Result<HotelRecord>;

/// Fetches hotel detail pages one by one and parses them into records
pub struct DetailFetcher<'a> {
    source: &'a dyn PageSource,
    config: &'a ScrapeConfig,
    parser: PageParser,
}

impl<'a> DetailFetcher<'a> {
    pub fn new(source: &'a dyn PageSource, config: &'a ScrapeConfig) -> Self {
        Self {
            source,
            config,
            parser: parse_hotel_page,
        }
    }

    #[cfg(test)]
    pub fn with_parser(mut self, parser: PageParser) -> Self {
        self.parser = parser;
        self
    }

    /// Visit every URL in order. A page that fails to download or parse is
    /// logged and contributes no record; the batch always runs to the end.
    pub async fn fetch_all(&self, urls: &[String]) -> (Vec<HotelRecord>, FetchStats) {
        let delays = DelaySampler::new(self.config.detail_delay, self.config.detail_delay_max_secs);
        let mut stats = FetchStats::default();
        let mut records = Vec::new();

        for (idx, url) in urls.iter().enumerate() {
            stats.attempted += 1;
            let agent = self.pick_user_agent();

            match self.source.fetch(url, agent).await {
                Ok(html) => match (self.parser)(&html, url) {
                    Ok(record) => {
                        debug!("Parsed {:?} from {}", record.name, url);
                        stats.parsed += 1;
                        records.push(record);
                    }
                    Err(e) => {
                        warn!("Failed to parse {}: {:#}", url, e);
                        stats.parse_failures += 1;
                    }
                },
                Err(e) => {
                    warn!("Request failed, skipping: {}", e);
                    stats.transport_failures += 1;
                }
            }

            if idx + 1 < urls.len() {
                tokio::time::sleep(delays.next_delay()).await;
            }
        }

        info!(
            "Detail fetch done: {} attempted, {} parsed, {} transport failures, {} parse failures",
            stats.attempted, stats.parsed, stats.transport_failures, stats.parse_failures
        );

        (records, stats)
    }

    fn pick_user_agent(&self) -> Option<&str> {
        self.config
            .user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
    }
}

/// Extract a [`HotelRecord`] from a detail page.
///
/// Missing elements become `None`; only a broken selector is an error.
pub fn parse_hotel_page(html: &str, url: &str) -> Result<HotelRecord> {
    let document = Html::parse_document(html);

    let name = extract_title(&document)?;
    let summary = extract_summary(&document)?;
    let address = extract_address(&document)?;
    let features = extract_features(&document)?;
    let mut facts = extract_key_values(&document)?;

    Ok(HotelRecord {
        name,
        summary,
        address,
        features,
        check_in: facts.remove("Check-In"),
        check_out: facts.remove("Check-Out"),
        room_count: facts.remove("Zimmer/Apartments"),
        bed_count: facts.remove("Betten"),
        max_seminar_size: facts.remove("Seminare bis"),
        max_banquet_size: facts.remove("Bankette bis"),
        source_url: url.to_string(),
    })
}

pub fn extract_title(document: &Html) -> Result<Option<String>> {
    let title = selector("title")?;
    Ok(document.select(&title).next().and_then(squashed_text))
}

pub fn extract_summary(document: &Html) -> Result<Option<String>> {
    let copy = selector(".Text--copy.richtext")?;
    Ok(document.select(&copy).next().and_then(squashed_text))
}

/// Read the address button label. Lines are the bare text nodes of the `<p>`.
pub fn extract_address(document: &Html) -> Result<AddressParts> {
    let label = selector(".Button--label p")?;

    let Some(block) = document.select(&label).next() else {
        return Ok(AddressParts::default());
    };

    let lines: Vec<String> = block
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let raw: String = block.text().collect();
    Ok(map_address(&lines, raw.trim()))
}

/// Positional address mapping: name, street, then "PLZ Ort".
/// Fewer than two lines keeps the raw block instead.
pub fn map_address(lines: &[String], raw: &str) -> AddressParts {
    if lines.len() < 2 {
        return AddressParts {
            unmapped: Some(raw.to_string()),
            ..Default::default()
        };
    }

    let (postal_code, city) = match lines.get(2) {
        Some(line) => match line.split_once(' ') {
            Some((plz, ort)) => (Some(plz.to_string()), non_empty(ort.trim())),
            None => (non_empty(line), None),
        },
        None => (None, None),
    };

    AddressParts {
        hotel_name: Some(lines[0].clone()),
        street: Some(lines[1].clone()),
        postal_code,
        city,
        unmapped: None,
    }
}

/// Active tags of the feature list, in page order
pub fn extract_features(document: &Html) -> Result<Vec<String>> {
    let tags = selector(".TagList--list--item .BlockLink.active")?;
    Ok(document.select(&tags).filter_map(squashed_text).collect())
}

/// Scan the secondary rich-text blocks: each `<strong>` is a value and the text
/// just before it is its label. Later duplicates overwrite earlier ones.
pub fn extract_key_values(document: &Html) -> Result<HashMap<String, String>> {
    let blocks = selector("div.richtext:not(.Text--copy)")?;
    let strong = selector("strong")?;

    let mut facts = HashMap::new();
    for block in document.select(&blocks) {
        for value in block.select(&strong) {
            let Some(key) = label_before(value) else {
                continue;
            };
            let text: String = value.text().collect();
            facts.insert(key, text.trim().to_string());
        }
    }

    Ok(facts)
}

fn label_before(element: ElementRef<'_>) -> Option<String> {
    for sibling in element.prev_siblings() {
        let text = match sibling.value() {
            Node::Text(text) => text.trim().to_string(),
            Node::Element(el) if el.name() == "br" => continue,
            Node::Element(_) => ElementRef::wrap(sibling)?.text().collect(),
            _ => continue,
        };

        let Some(line) = text.trim().lines().last() else {
            continue;
        };
        let label = line.trim().trim_end_matches(':').trim_end();
        if !label.is_empty() {
            return Some(label.to_string());
        }
    }
    None
}

fn squashed_text(element: ElementRef<'_>) -> Option<String> {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    non_empty(&joined)
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
