pub mod raw;
pub mod types;

pub use raw::{RawRecord, RawValue};
pub use types::{CategoryScores, Listing, ScoredListing, TriState};
