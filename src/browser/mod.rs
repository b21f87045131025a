use anyhow::{Context, Result};

use crate::listing::ScoredListing;

/// Open a URL in the user's default browser
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_url(url: &str) -> Result<()> {
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}

/// Pick the listing shown at 1-based `index` in the ranking.
pub fn select_listing(listings: &[ScoredListing], index: usize) -> Result<&ScoredListing> {
    if index < 1 || index > listings.len() {
        anyhow::bail!(
            "Invalid index {}. Must be between 1 and {}.",
            index,
            listings.len()
        );
    }
    Ok(&listings[index - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{CategoryScores, Listing};

    fn ranked(urls: &[&str]) -> Vec<ScoredListing> {
        urls.iter()
            .map(|url| ScoredListing {
                listing: Listing::new("Storgatan 1", 1_000_000.0, url),
                scores: CategoryScores {
                    price: 0.5,
                    location: 0.5,
                    size: 0.5,
                    amenity: 0.5,
                },
                composite: 0.5,
                imputed: vec![],
            })
            .collect()
    }

    #[test]
    fn test_select_listing_is_one_based() {
        let listings = ranked(&["https://a", "https://b"]);
        assert_eq!(select_listing(&listings, 1).unwrap().listing.detail_url, "https://a");
        assert_eq!(select_listing(&listings, 2).unwrap().listing.detail_url, "https://b");
    }

    #[test]
    fn test_select_listing_out_of_range() {
        let listings = ranked(&["https://a"]);
        assert!(select_listing(&listings, 0).is_err());
        let err = select_listing(&listings, 2).unwrap_err();
        assert!(err.to_string().contains("between 1 and 1"));
    }
}
