use serde::{Deserialize, Serialize};

use crate::listing::{ScoredListing, TriState};

/// Hard filters. Every bound is optional; an absent bound does not constrain.
///
/// A listing with no value for a constrained field fails that filter: the
/// bound cannot be shown to hold.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Filters {
    pub max_price: Option<f64>,
    pub max_fee: Option<f64>,
    pub min_rooms: Option<f64>,
    pub max_rooms: Option<f64>,
    pub min_living_area: Option<f64>,
    pub require_elevator: bool,
    pub require_balcony: bool,
    /// Only keep listings from these sources (case-insensitive). Empty keeps all.
    pub sources: Vec<String>,
}

fn within_max(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(max) => value.is_some_and(|v| v <= max),
    }
}

fn within_min(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(min) => value.is_some_and(|v| v >= min),
    }
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }

    pub fn matches(&self, scored: &ScoredListing) -> bool {
        let l = &scored.listing;
        within_max(Some(l.price), self.max_price)
            && within_max(l.fee, self.max_fee)
            && within_min(l.rooms, self.min_rooms)
            && within_max(l.rooms, self.max_rooms)
            && within_min(l.living_area, self.min_living_area)
            && (!self.require_elevator || l.has_elevator == TriState::Yes)
            && (!self.require_balcony || l.has_balcony == TriState::Yes)
            && (self.sources.is_empty()
                || self.sources.iter().any(|s| s.trim().eq_ignore_ascii_case(&l.source)))
    }
}

/// Keep only the listings that satisfy every filter.
pub fn apply_filters(listings: Vec<ScoredListing>, filters: &Filters) -> Vec<ScoredListing> {
    listings.into_iter().filter(|l| filters.matches(l)).collect()
}

/// Validate filter bounds. Returns all validation errors at once.
pub fn validate_filters(filters: &Filters) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let bounds = [
        ("filters.max_price", filters.max_price),
        ("filters.max_fee", filters.max_fee),
        ("filters.min_rooms", filters.min_rooms),
        ("filters.max_rooms", filters.max_rooms),
        ("filters.min_living_area", filters.min_living_area),
    ];
    for (path, bound) in bounds {
        if let Some(value) = bound {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("{}: must be a non-negative number (got {})", path, value));
            }
        }
    }

    if let (Some(min), Some(max)) = (filters.min_rooms, filters.max_rooms) {
        if min > max {
            errors.push(format!(
                "filters.min_rooms: {} is greater than filters.max_rooms {}",
                min, max
            ));
        }
    }

    if filters.sources.iter().any(|s| s.trim().is_empty()) {
        errors.push("filters.sources: source names must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{CategoryScores, Listing};

    fn scored(url: &str, price: f64, rooms: Option<f64>) -> ScoredListing {
        let mut listing = Listing::new("Storgatan 1", price, url);
        listing.rooms = rooms;
        ScoredListing {
            listing,
            scores: CategoryScores {
                price: 0.5,
                location: 0.5,
                size: 0.5,
                amenity: 0.5,
            },
            composite: 0.5,
            imputed: vec![],
        }
    }

    #[test]
    fn test_empty_filters_keep_everything() {
        let listings = vec![scored("https://a", 1.0, None), scored("https://b", 2.0, Some(3.0))];
        assert!(Filters::default().is_empty());
        assert_eq!(apply_filters(listings, &Filters::default()).len(), 2);
    }

    #[test]
    fn test_max_rooms_excludes_unknown() {
        let listings = vec![
            scored("https://1", 1.0, Some(1.0)),
            scored("https://2", 1.0, Some(2.0)),
            scored("https://unknown", 1.0, None),
            scored("https://3", 1.0, Some(3.0)),
        ];
        let filters = Filters {
            max_rooms: Some(2.0),
            ..Filters::default()
        };
        let kept = apply_filters(listings, &filters);
        let urls: Vec<&str> = kept.iter().map(|s| s.listing.detail_url.as_str()).collect();
        assert_eq!(urls, vec!["https://1", "https://2"]);
    }

    #[test]
    fn test_max_price_inclusive() {
        let listings = vec![
            scored("https://a", 3_500_000.0, None),
            scored("https://b", 3_500_001.0, None),
        ];
        let filters = Filters {
            max_price: Some(3_500_000.0),
            ..Filters::default()
        };
        let kept = apply_filters(listings, &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].listing.detail_url, "https://a");
    }

    #[test]
    fn test_max_fee_excludes_unknown_fee() {
        let mut known = scored("https://a", 1.0, None);
        known.listing.fee = Some(3_000.0);
        let unknown = scored("https://b", 1.0, None);
        let filters = Filters {
            max_fee: Some(3_500.0),
            ..Filters::default()
        };
        let kept = apply_filters(vec![known, unknown], &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].listing.detail_url, "https://a");
    }

    #[test]
    fn test_require_elevator_excludes_unknown() {
        let mut yes = scored("https://a", 1.0, None);
        yes.listing.has_elevator = TriState::Yes;
        let unknown = scored("https://b", 1.0, None);
        let filters = Filters {
            require_elevator: true,
            ..Filters::default()
        };
        assert_eq!(apply_filters(vec![yes, unknown], &filters).len(), 1);
    }

    #[test]
    fn test_source_allow_list() {
        let mut hemnet = scored("https://a", 1.0, None);
        hemnet.listing.source = "hemnet".to_string();
        let mut booli = scored("https://b", 1.0, None);
        booli.listing.source = "booli".to_string();
        let filters = Filters {
            sources: vec!["Booli".to_string()],
            ..Filters::default()
        };
        let kept = apply_filters(vec![hemnet, booli], &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].listing.source, "booli");
    }

    #[test]
    fn test_validate_filters() {
        assert!(validate_filters(&Filters::default()).is_ok());

        let filters = Filters {
            max_price: Some(-1.0),
            min_rooms: Some(4.0),
            max_rooms: Some(2.0),
            ..Filters::default()
        };
        let errors = validate_filters(&filters).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("filters.max_price"));
        assert!(errors[1].contains("filters.min_rooms"));
    }

    #[test]
    fn test_unknown_filter_key_rejected() {
        let result: Result<Filters, _> = serde_saphyr::from_str("max_bedrooms: 3");
        assert!(result.is_err());
    }
}
