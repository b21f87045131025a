use std::cmp::Ordering;

use crate::listing::ScoredListing;

/// Ranking order: composite descending, then lower price, then fewer imputed
/// inputs, then `detail_url`. URLs are unique within a batch, so no two
/// listings ever compare equal.
pub fn compare(a: &ScoredListing, b: &ScoredListing) -> Ordering {
    b.composite
        .total_cmp(&a.composite)
        .then_with(|| a.listing.price.total_cmp(&b.listing.price))
        .then_with(|| a.imputed_count().cmp(&b.imputed_count()))
        .then_with(|| a.listing.detail_url.cmp(&b.listing.detail_url))
}

/// Sort listings into ranking order.
pub fn sort_ranked(listings: &mut [ScoredListing]) {
    listings.sort_by(compare);
}
