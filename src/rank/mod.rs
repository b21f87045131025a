pub mod filter;
pub mod sort;

pub use filter::{apply_filters, validate_filters, Filters};
pub use sort::{compare, sort_ranked};

use crate::listing::ScoredListing;

/// Apply the hard filters, then sort what remains into ranking order.
pub fn filter_and_rank(listings: Vec<ScoredListing>, filters: &Filters) -> Vec<ScoredListing> {
    let mut kept = apply_filters(listings, filters);
    sort_ranked(&mut kept);
    kept
}
