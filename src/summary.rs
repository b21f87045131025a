use serde::Serialize;
use std::collections::BTreeMap;

use crate::listing::ScoredListing;

/// Spread of listing prices in a ranked batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub min: f64,
    pub median: f64,
    pub mean: f64,
    pub max: f64,
}

/// Headline numbers for a ranked batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub mean_score: f64,
    /// Sample standard deviation of the composite score (0 for one listing)
    pub score_std: f64,
    /// Composite score reached by the top 10%
    pub top_decile_threshold: f64,
    pub price: PriceSummary,
    /// Listings per room count; "unknown" for listings without one
    pub rooms_distribution: BTreeMap<String, usize>,
    pub with_elevator: usize,
    pub with_balcony: usize,
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn rooms_key(rooms: Option<f64>) -> String {
    match rooms {
        None => "unknown".to_string(),
        Some(r) if r.fract() == 0.0 => format!("{}", r as i64),
        Some(r) => format!("{}", r),
    }
}

impl BatchSummary {
    /// Summarize ranked listings; `None` for an empty batch.
    pub fn from_listings(listings: &[ScoredListing]) -> Option<Self> {
        if listings.is_empty() {
            return None;
        }

        let mut scores: Vec<f64> = listings.iter().map(|s| s.composite).collect();
        scores.sort_by(f64::total_cmp);
        let mean_score = mean(&scores);
        let score_std = if scores.len() > 1 {
            let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>()
                / (scores.len() - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let mut prices: Vec<f64> = listings.iter().map(|s| s.listing.price).collect();
        prices.sort_by(f64::total_cmp);

        let mut rooms_distribution = BTreeMap::new();
        for s in listings {
            *rooms_distribution.entry(rooms_key(s.listing.rooms)).or_insert(0) += 1;
        }

        Some(Self {
            total: listings.len(),
            mean_score,
            score_std,
            top_decile_threshold: quantile(&scores, 0.9),
            price: PriceSummary {
                min: prices[0],
                median: quantile(&prices, 0.5),
                mean: mean(&prices),
                max: prices[prices.len() - 1],
            },
            rooms_distribution,
            with_elevator: listings.iter().filter(|s| s.listing.has_elevator.is_yes()).count(),
            with_balcony: listings.iter().filter(|s| s.listing.has_balcony.is_yes()).count(),
        })
    }
}
