use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

use crate::listing::ScoredListing;

const LEADING_COLUMNS: [&str; 7] = [
    "rank",
    "score",
    "price_score",
    "location_score",
    "size_score",
    "amenity_score",
    "imputed",
];

const LISTING_COLUMNS: [&str; 16] = [
    "source",
    "address",
    "price",
    "fee",
    "living_area",
    "price_per_area",
    "rooms",
    "year_built",
    "cooperative_name",
    "floor",
    "total_floors",
    "has_elevator",
    "has_balcony",
    "detail_url",
    "observed_at",
    "imputed_count",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render ranked listings as CSV, rank and scores first, one column per transit mode last.
pub fn to_csv(listings: &[ScoredListing]) -> Result<Vec<u8>> {
    let modes: BTreeSet<&str> = listings
        .iter()
        .flat_map(|s| s.listing.transit_distance_by_mode.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<String> = LEADING_COLUMNS
        .iter()
        .chain(LISTING_COLUMNS.iter())
        .map(|c| c.to_string())
        .chain(modes.iter().map(|m| format!("{}_distance", m)))
        .collect();
    writer.write_record(&header).context("Failed to write CSV header")?;

    for (idx, scored) in listings.iter().enumerate() {
        let l = &scored.listing;
        let mut row = vec![
            (idx + 1).to_string(),
            format!("{:.6}", scored.composite),
            format!("{:.6}", scored.scores.price),
            format!("{:.6}", scored.scores.location),
            format!("{:.6}", scored.scores.size),
            format!("{:.6}", scored.scores.amenity),
            scored.imputed.join(";"),
            l.source.clone(),
            l.address.clone(),
            l.price.to_string(),
            opt(l.fee),
            opt(l.living_area),
            opt(l.price_per_area),
            opt(l.rooms),
            opt(l.year_built),
            opt(l.cooperative_name.as_deref()),
            opt(l.floor),
            opt(l.total_floors),
            l.has_elevator.to_string(),
            l.has_balcony.to_string(),
            l.detail_url.clone(),
            opt(l.observed_at.map(|t| t.to_rfc3339())),
            scored.imputed_count().to_string(),
        ];
        row.extend(modes.iter().map(|m| opt(l.transit_distance(m))));
        writer
            .write_record(&row)
            .with_context(|| format!("Failed to write CSV row for {}", l.detail_url))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))
}

/// Write ranked listings as CSV to `path`, atomically.
pub fn export_csv(listings: &[ScoredListing], path: &Path) -> Result<()> {
    let bytes = to_csv(listings)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;

    tracing::debug!(path = %path.display(), rows = listings.len(), "exported ranking");
    Ok(())
}
