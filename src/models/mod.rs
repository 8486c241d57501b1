/// One detail-page link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub link: String,
}

/// Address block of a detail page split into its lines.
///
/// Either the positional fields are filled or `unmapped` keeps the raw block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressParts {
    pub hotel_name: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub unmapped: Option<String>,
}

/// Everything extracted from one hotel detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelRecord {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub address: AddressParts,
    pub features: Vec<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub room_count: Option<String>,
    pub bed_count: Option<String>,
    pub max_seminar_size: Option<String>,
    pub max_banquet_size: Option<String>,
    pub source_url: String,
}

/// Exported row: a fixed projection of [`HotelRecord`] with typed counts.
///
/// Check-in/out times and the unmapped address are not part of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelExport {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub features: Vec<String>,
    pub room_count: Option<i64>,
    pub bed_count: Option<i64>,
    pub max_seminar_size: Option<i64>,
    pub max_banquet_size: Option<i64>,
    pub source_url: String,
}

impl From<HotelRecord> for HotelExport {
    fn from(record: HotelRecord) -> Self {
        Self {
            name: record.name,
            summary: record.summary,
            street: record.address.street,
            postal_code: record.address.postal_code,
            city: record.address.city,
            features: record.features,
            room_count: parse_count(record.room_count.as_deref()),
            bed_count: parse_count(record.bed_count.as_deref()),
            max_seminar_size: parse_count(record.max_seminar_size.as_deref()),
            max_banquet_size: parse_count(record.max_banquet_size.as_deref()),
            source_url: record.source_url,
        }
    }
}

/// Coerce a scraped count to an integer; empty or non-numeric text is missing.
pub fn parse_count(raw: Option<&str>) -> Option<i64> {
    let cleaned: String = raw?
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '’'))
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }

    // "42.0" survives a float round-trip; 2^63 itself is already out of range
    match cleaned.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Some(f as i64),
        _ => None,
    }
}
