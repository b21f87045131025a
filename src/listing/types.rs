use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Three-valued flag for amenities the source may or may not report.
///
/// `Unknown` is distinct from `No`: it means the source said nothing we could
/// interpret, not that the amenity is confirmed absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl TriState {
    pub fn is_known(self) -> bool {
        self != TriState::Unknown
    }

    pub fn is_yes(self) -> bool {
        self == TriState::Yes
    }
}

impl From<bool> for TriState {
    fn from(b: bool) -> Self {
        if b {
            TriState::Yes
        } else {
            TriState::No
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriState::Yes => "yes",
            TriState::No => "no",
            TriState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One apartment observed from one source at one point in time.
///
/// Built once by the normalizer and never mutated afterwards; scores live
/// on [`ScoredListing`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub source: String,
    pub address: String,
    pub price: f64,
    pub fee: Option<f64>,
    pub living_area: Option<f64>,
    pub price_per_area: Option<f64>,
    pub rooms: Option<f64>,
    pub year_built: Option<i32>,
    pub cooperative_name: Option<String>,
    pub floor: Option<u32>,
    pub total_floors: Option<u32>,
    pub has_elevator: TriState,
    pub has_balcony: TriState,
    /// Distance in meters to the nearest stop, keyed by transport mode.
    pub transit_distance_by_mode: BTreeMap<String, f64>,
    pub detail_url: String,
    pub observed_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Minimal listing with only the required fields set.
    pub fn new(address: &str, price: f64, detail_url: &str) -> Self {
        Self {
            source: "unknown".to_string(),
            address: address.to_string(),
            price,
            fee: None,
            living_area: None,
            price_per_area: None,
            rooms: None,
            year_built: None,
            cooperative_name: None,
            floor: None,
            total_floors: None,
            has_elevator: TriState::Unknown,
            has_balcony: TriState::Unknown,
            transit_distance_by_mode: BTreeMap::new(),
            detail_url: detail_url.to_string(),
            observed_at: None,
        }
    }

    pub fn transit_distance(&self, mode: &str) -> Option<f64> {
        self.transit_distance_by_mode.get(mode).copied()
    }
}

/// Per-category sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub price: f64,
    pub location: f64,
    pub size: f64,
    pub amenity: f64,
}

impl CategoryScores {
    pub fn as_array(&self) -> [f64; 4] {
        [self.price, self.location, self.size, self.amenity]
    }
}

/// A listing with its scores and the inputs that had to be imputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    pub scores: CategoryScores,
    pub composite: f64,
    /// Names of scoring inputs that were absent or unknown, sorted.
    pub imputed: Vec<String>,
}

impl ScoredListing {
    pub fn imputed_count(&self) -> usize {
        self.imputed.len()
    }
}
