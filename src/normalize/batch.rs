use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::normalizer::{normalize_record, NormalizeConfig};
use crate::error::RecordError;
use crate::listing::{Listing, RawRecord, RawValue};

/// A raw record that did not make it into the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Position of the record in the input sequence
    pub index: usize,
    pub detail_url: Option<String>,
    pub error: RecordError,
}

/// The normalized, de-duplicated batch plus what was lost on the way.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub listings: Vec<Listing>,
    pub rejected: Vec<Rejection>,
    /// Records collapsed into an earlier or later one with the same URL
    pub duplicates: usize,
    /// Field name to number of records where it was present but unreadable
    pub malformed: BTreeMap<String, usize>,
}

/// Normalize every record, collecting rejections, then collapse duplicate URLs.
pub fn normalize_batch(records: &[RawRecord], config: &NormalizeConfig) -> NormalizedBatch {
    let mut listings = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    let mut malformed: BTreeMap<String, usize> = BTreeMap::new();

    for (index, raw) in records.iter().enumerate() {
        match normalize_record(raw, config) {
            Ok(normalized) => {
                for field in normalized.malformed {
                    *malformed.entry(field).or_default() += 1;
                }
                listings.push(normalized.listing);
            }
            Err(error) => {
                let detail_url = raw.get_any(&["detail_url", "url"]).and_then(|v| match v {
                    RawValue::Text(s) => Some(s.trim().to_string()),
                    _ => None,
                });
                tracing::debug!(index, url = ?detail_url, %error, "rejected record");
                rejected.push(Rejection {
                    index,
                    detail_url,
                    error,
                });
            }
        }
    }

    let (listings, duplicates) = dedup_by_url(listings);

    NormalizedBatch {
        listings,
        rejected,
        duplicates,
        malformed,
    }
}

/// Collapse listings sharing a `detail_url`, keeping the most recently observed.
///
/// A timestamped observation beats an untimestamped one; on equal timestamps
/// the later record in input order wins. Survivors keep the position of the
/// first occurrence of their URL.
pub fn dedup_by_url(listings: Vec<Listing>) -> (Vec<Listing>, usize) {
    let mut kept: Vec<Listing> = Vec::with_capacity(listings.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut duplicates = 0;

    for listing in listings {
        match positions.get(&listing.detail_url) {
            Some(&pos) => {
                duplicates += 1;
                if listing.observed_at >= kept[pos].observed_at {
                    kept[pos] = listing;
                }
            }
            None => {
                positions.insert(listing.detail_url.clone(), kept.len());
                kept.push(listing);
            }
        }
    }

    (kept, duplicates)
}
