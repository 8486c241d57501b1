mod config;
mod models;
mod pipeline;
mod scrapers;
mod store;

use chrono::Local;
use config::ScrapeConfig;
use scrapers::HttpPageSource;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏨 Hotel Scout - hotelleriesuisse directory scraper");

    let config = ScrapeConfig::default();
    let source = HttpPageSource::new(config.request_timeout)?;
    let today = Local::now().date_naive();

    let summary = pipeline::run(&source, &config, today).await?;

    info!(
        "✅ {} links -> {} hotels ({} skipped)",
        summary.link_count,
        summary.hotel_count,
        summary.stats.transport_failures + summary.stats.parse_failures
    );
    info!("Links: {}", summary.links_path.display());
    info!("Hotels: {}", summary.export_path.display());

    Ok(())
}
