use crate::config::ScrapeConfig;
use crate::models::{HotelExport, ListingEntry};
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, AsArray, Int64Array, ListBuilder, StringArray, StringBuilder};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Where run snapshots live on disk.
///
/// Snapshots are Arrow IPC (Feather v2) files holding a single record batch.
/// Link lists go to a "latest" file (overwritten every run) and to a dated
/// file under the data directory; hotel exports only get the dated file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
    latest_urls_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>, latest_urls_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            latest_urls_path: latest_urls_path.into(),
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(&config.data_dir, &config.latest_urls_path)
    }

    /// `data/{YYYYMMDD}_Scraped_Data_Urls.feather`
    pub fn dated_urls_path(&self, date: NaiveDate) -> PathBuf {
        self.dated_path(date, "Urls")
    }

    /// `data/{YYYYMMDD}_Scraped_Data_Hotels.feather`
    pub fn dated_hotels_path(&self, date: NaiveDate) -> PathBuf {
        self.dated_path(date, "Hotels")
    }

    fn dated_path(&self, date: NaiveDate, kind: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}_Scraped_Data_{}.feather", date.format("%Y%m%d"), kind))
    }

    /// Write the link list to both locations and return the dated path
    pub async fn save_links(&self, entries: &[ListingEntry], date: NaiveDate) -> Result<PathBuf> {
        let bytes = encode(&links_batch(entries)?)?;
        write_file(&self.latest_urls_path, &bytes).await?;

        let dated = self.dated_urls_path(date);
        write_file(&dated, &bytes).await?;

        info!(
            "💾 Saved {} links to {} and {}",
            entries.len(),
            self.latest_urls_path.display(),
            dated.display()
        );
        Ok(dated)
    }

    pub async fn save_hotels(&self, rows: &[HotelExport], date: NaiveDate) -> Result<PathBuf> {
        let dated = self.dated_hotels_path(date);
        write_file(&dated, &encode(&hotels_batch(rows)?)?).await?;
        info!("💾 Saved {} hotels to {}", rows.len(), dated.display());
        Ok(dated)
    }
}

/// Read a link snapshot. A missing file is an error.
pub async fn load_links(path: &Path) -> Result<Vec<ListingEntry>> {
    let batches = read_batches(path).await?;

    let mut entries = Vec::new();
    for batch in &batches {
        let links = batch
            .column_by_name("link")
            .with_context(|| format!("{} has no link column", path.display()))?
            .as_string_opt::<i32>()
            .with_context(|| format!("link column of {} is not text", path.display()))?;

        entries.extend(
            links
                .iter()
                .flatten()
                .map(|link| ListingEntry { link: link.to_string() }),
        );
    }
    Ok(entries)
}

/// Read a hotel export back into rows
#[cfg(test)]
pub async fn load_hotels(path: &Path) -> Result<Vec<HotelExport>> {
    use arrow::array::Array;
    use arrow::datatypes::Int64Type;

    let mut rows = Vec::new();
    for batch in read_batches(path).await? {
        let text = |name: &str| batch.column_by_name(name).unwrap().as_string::<i32>().clone();
        let count = |name: &str| {
            batch
                .column_by_name(name)
                .unwrap()
                .as_primitive::<Int64Type>()
                .clone()
        };
        let opt = |array: &StringArray, i: usize| {
            (!array.is_null(i)).then(|| array.value(i).to_string())
        };
        let opt_count = |array: &Int64Array, i: usize| (!array.is_null(i)).then(|| array.value(i));

        let (name, summary, street) = (text("name"), text("summary"), text("street"));
        let (postal_code, city, source_url) = (text("postal_code"), text("city"), text("source_url"));
        let (rooms, beds) = (count("room_count"), count("bed_count"));
        let (seminar, banquet) = (count("max_seminar_size"), count("max_banquet_size"));
        let features = batch.column_by_name("features").unwrap().as_list::<i32>().clone();

        for i in 0..batch.num_rows() {
            let tags = features.value(i);
            rows.push(HotelExport {
                name: opt(&name, i),
                summary: opt(&summary, i),
                street: opt(&street, i),
                postal_code: opt(&postal_code, i),
                city: opt(&city, i),
                features: tags
                    .as_string::<i32>()
                    .iter()
                    .flatten()
                    .map(str::to_string)
                    .collect(),
                room_count: opt_count(&rooms, i),
                bed_count: opt_count(&beds, i),
                max_seminar_size: opt_count(&seminar, i),
                max_banquet_size: opt_count(&banquet, i),
                source_url: source_url.value(i).to_string(),
            });
        }
    }
    Ok(rows)
}

fn links_batch(entries: &[ListingEntry]) -> Result<RecordBatch> {
    let links = StringArray::from_iter_values(entries.iter().map(|e| e.link.as_str()));
    Ok(RecordBatch::try_from_iter([("link", Arc::new(links) as ArrayRef)])?)
}

/// Column layout of the hotel export, in export order
fn hotels_batch(rows: &[HotelExport]) -> Result<RecordBatch> {
    let text = |f: fn(&HotelExport) -> Option<&str>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<StringArray>())
    };
    let count = |f: fn(&HotelExport) -> Option<i64>| -> ArrayRef {
        Arc::new(rows.iter().map(f).collect::<Int64Array>())
    };

    let mut features = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for tag in &row.features {
            features.values().append_value(tag);
        }
        features.append(true);
    }

    let source_urls = StringArray::from_iter_values(rows.iter().map(|r| r.source_url.as_str()));

    Ok(RecordBatch::try_from_iter([
        ("name", text(|r| r.name.as_deref())),
        ("summary", text(|r| r.summary.as_deref())),
        ("street", text(|r| r.street.as_deref())),
        ("postal_code", text(|r| r.postal_code.as_deref())),
        ("city", text(|r| r.city.as_deref())),
        ("features", Arc::new(features.finish()) as ArrayRef),
        ("room_count", count(|r| r.room_count)),
        ("bed_count", count(|r| r.bed_count)),
        ("max_seminar_size", count(|r| r.max_seminar_size)),
        ("max_banquet_size", count(|r| r.max_banquet_size)),
        ("source_url", Arc::new(source_urls) as ArrayRef),
    ])?)
}

fn encode(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let mut writer = FileWriter::try_new(&mut bytes, &batch.schema())?;
        writer.write(batch)?;
        writer.finish()?;
    }
    Ok(bytes)
}

async fn read_batches(path: &Path) -> Result<Vec<RecordBatch>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    let reader = FileReader::try_new(Cursor::new(bytes), None)
        .with_context(|| format!("Malformed snapshot {}", path.display()))?;

    reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Malformed snapshot {}", path.display()))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
