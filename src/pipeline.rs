use crate::config::ScrapeConfig;
use crate::models::HotelExport;
use crate::scrapers::types::FetchStats;
use crate::scrapers::{DetailFetcher, PageSource, UrlCollector};
use crate::store::{load_links, SnapshotStore};
use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// What one full run produced
#[derive(Debug)]
pub struct RunSummary {
    pub link_count: usize,
    pub links_path: PathBuf,
    pub hotel_count: usize,
    pub export_path: PathBuf,
    pub stats: FetchStats,
}

/// Stage 1: gather detail links and persist them. Returns the dated snapshot path.
pub async fn collect_urls(
    source: &dyn PageSource,
    config: &ScrapeConfig,
    store: &SnapshotStore,
    date: NaiveDate,
) -> Result<(usize, PathBuf)> {
    info!("Starting scraping urls...");
    let entries = UrlCollector::new(source, config).collect().await?;
    let path = store.save_links(&entries, date).await?;
    info!("Scraping urls finished");
    Ok((entries.len(), path))
}

/// Stage 2: read the link snapshot at `links_path`, fetch every page and
/// export the parsed hotels under `date`.
pub async fn fetch_and_export(
    source: &dyn PageSource,
    config: &ScrapeConfig,
    store: &SnapshotStore,
    links_path: &Path,
    date: NaiveDate,
) -> Result<(usize, PathBuf, FetchStats)> {
    info!("Starting scraping hoteldata...");
    let urls: Vec<String> = load_links(links_path)
        .await?
        .into_iter()
        .map(|entry| entry.link)
        .collect();

    let (records, stats) = DetailFetcher::new(source, config).fetch_all(&urls).await;
    let rows: Vec<HotelExport> = records.into_iter().map(HotelExport::from).collect();

    let path = store.save_hotels(&rows, date).await?;
    info!("Finished scraping hoteldata");
    Ok((rows.len(), path, stats))
}

/// Run both stages back to back. The collector's output path is handed to
/// the fetcher directly and both stages share one run date.
pub async fn run(source: &dyn PageSource, config: &ScrapeConfig, date: NaiveDate) -> Result<RunSummary> {
    let store = SnapshotStore::from_config(config);

    let (link_count, links_path) = collect_urls(source, config, &store, date).await?;
    let (hotel_count, export_path, stats) =
        fetch_and_export(source, config, &store, &links_path, date).await?;

    Ok(RunSummary {
        link_count,
        links_path,
        hotel_count,
        export_path,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::testing::FixtureSource;
    use crate::store::load_hotels;
    use tempfile::TempDir;

    const LISTING: &str = r#"<html><body><ul>
        <li class="CardGrid--grid-item"><a href="/de/hotel/good">Good</a></li>
        <li class="CardGrid--grid-item"><a href="/de/hotel/broken">Broken</a></li>
    </ul></body></html>"#;

    const DETAIL: &str = r#"<html><head><title>Hotel Good</title></head><body>
        <div class="Text--copy richtext">Ein gutes Hotel.</div>
        <span class="Button--label"><p>Hotel Good<br>Bahnhofstrasse 1<br>8000 Zürich</p></span>
        <div class="richtext"><p>Zimmer/Apartments: <strong>12</strong><br>Betten: <strong>24</strong></p></div>
    </body></html>"#;

    fn fixture_config(dir: &TempDir) -> ScrapeConfig {
        ScrapeConfig {
            base_url: "https://fixture.test/hotel-page-".to_string(),
            site_origin: "https://fixture.test".to_string(),
            total_pages: 1,
            page_delay_secs: 0..=0,
            detail_delay_max_secs: 0.0,
            data_dir: dir.path().join("data"),
            latest_urls_path: dir.path().join("hotel_urls.feather"),
            ..Default::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_with_one_failing_page() {
        let dir = TempDir::new().unwrap();
        let config = fixture_config(&dir);
        let source = FixtureSource::default()
            .page("https://fixture.test/hotel-page-1", LISTING)
            .page("https://fixture.test/de/hotel/good", DETAIL)
            .status("https://fixture.test/de/hotel/broken", 500);

        let summary = run(&source, &config, date()).await.unwrap();

        assert_eq!(summary.link_count, 2);
        assert_eq!(summary.hotel_count, 1);
        assert_eq!(summary.stats.transport_failures, 1);
        assert_eq!(
            summary.links_path,
            dir.path().join("data/20240501_Scraped_Data_Urls.feather")
        );

        assert_eq!(
            summary.export_path,
            dir.path().join("data/20240501_Scraped_Data_Hotels.feather")
        );
        assert_eq!(load_links(&summary.links_path).await.unwrap().len(), 2);

        let rows = load_hotels(&summary.export_path).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_url, "https://fixture.test/de/hotel/good");
        assert_eq!(rows[0].room_count, Some(12));
        assert_eq!(rows[0].bed_count, Some(24));
        assert_eq!(rows[0].max_seminar_size, None);
        assert_eq!(rows[0].max_banquet_size, None);
    }

    #[tokio::test]
    async fn test_fetch_stage_needs_link_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = fixture_config(&dir);
        let store = SnapshotStore::from_config(&config);
        let source = FixtureSource::default();

        let missing = store.dated_urls_path(date());
        let result = fetch_and_export(&source, &config, &store, &missing, date()).await;

        assert!(result.is_err());
        assert!(source.requested_urls().is_empty());
    }

    #[tokio::test]
    async fn test_collector_failure_stops_run() {
        let dir = TempDir::new().unwrap();
        let config = fixture_config(&dir);
        let source = FixtureSource::default();

        assert!(run(&source, &config, date()).await.is_err());
        assert!(!config.latest_urls_path.exists());
    }

    #[tokio::test]
    async fn test_no_records_still_exports() {
        let dir = TempDir::new().unwrap();
        let config = fixture_config(&dir);
        let source = FixtureSource::default().page(
            "https://fixture.test/hotel-page-1",
            r#"<li class="CardGrid--grid-item"><a href="/de/hotel/gone">x</a></li>"#,
        );

        let summary = run(&source, &config, date()).await.unwrap();
        assert_eq!(summary.link_count, 1);
        assert_eq!(summary.hotel_count, 0);

        let rows = load_hotels(&summary.export_path).await.unwrap();
        assert!(rows.is_empty());
    }
}
