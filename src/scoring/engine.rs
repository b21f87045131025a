use super::config::{FloorPreference, ScoringConfig};
use super::factors::{flag_score, floor_score, Blend, Direction, MIDPOINT};
use crate::listing::{CategoryScores, Listing, ScoredListing, TriState};
use crate::stats::{BatchStatistics, FieldStats, Metric};

/// Accumulates one category for one listing, recording imputed inputs.
struct CategoryScorer<'a> {
    blend: Blend,
    imputed: &'a mut Vec<String>,
}

impl<'a> CategoryScorer<'a> {
    fn new(imputed: &'a mut Vec<String>) -> Self {
        Self {
            blend: Blend::default(),
            imputed,
        }
    }

    /// A numeric input. Skipped entirely when disabled for the batch
    /// (`stats` is `None`); imputed when the listing lacks a value.
    fn numeric(
        &mut self,
        name: &str,
        value: Option<f64>,
        stats: Option<&FieldStats>,
        weight: f64,
        direction: Direction,
    ) {
        if weight <= 0.0 {
            return;
        }
        let Some(stats) = stats else {
            return;
        };
        match value {
            Some(v) => self.blend.add(direction.score(stats, v), weight),
            None => self.imputed.push(name.to_string()),
        }
    }

    fn metric(
        &mut self,
        listing: &Listing,
        stats: &BatchStatistics,
        metric: Metric,
        weight: f64,
        direction: Direction,
    ) {
        self.numeric(
            metric.name(),
            metric.value(listing),
            stats.usable(metric),
            weight,
            direction,
        );
    }

    /// A tri-state flag. Unknown contributes the midpoint and counts as imputed.
    fn flag(&mut self, name: &str, state: TriState, weight: f64) {
        if weight <= 0.0 {
            return;
        }
        if !state.is_known() {
            self.imputed.push(name.to_string());
        }
        self.blend.add(flag_score(state), weight);
    }

    /// Floor fit. A missing floor contributes the midpoint and counts as imputed.
    fn floor(&mut self, floor: Option<u32>, preference: &FloorPreference, weight: f64) {
        if weight <= 0.0 {
            return;
        }
        match floor {
            Some(f) => self.blend.add(floor_score(f, preference), weight),
            None => {
                self.imputed.push("floor".to_string());
                self.blend.add(MIDPOINT, weight);
            }
        }
    }

    fn finish(self) -> f64 {
        self.blend.mean_or_midpoint()
    }
}

fn price_score(
    listing: &Listing,
    stats: &BatchStatistics,
    config: &ScoringConfig,
    imputed: &mut Vec<String>,
) -> f64 {
    let w = &config.price;
    let mut scorer = CategoryScorer::new(imputed);
    scorer.metric(listing, stats, Metric::Price, w.price, Direction::LowerIsBetter);
    scorer.metric(
        listing,
        stats,
        Metric::PricePerArea,
        w.price_per_area,
        Direction::LowerIsBetter,
    );
    scorer.metric(listing, stats, Metric::Fee, w.fee, Direction::LowerIsBetter);
    scorer.finish()
}

fn location_score(
    listing: &Listing,
    stats: &BatchStatistics,
    config: &ScoringConfig,
    imputed: &mut Vec<String>,
) -> f64 {
    let mut scorer = CategoryScorer::new(imputed);
    for mode in stats.transit_modes() {
        scorer.numeric(
            &format!("{}_distance", mode),
            listing.transit_distance(mode),
            stats.usable_transit(mode),
            config.location.weight_for(mode),
            Direction::LowerIsBetter,
        );
    }
    scorer.finish()
}

fn size_score(
    listing: &Listing,
    stats: &BatchStatistics,
    config: &ScoringConfig,
    imputed: &mut Vec<String>,
) -> f64 {
    let w = &config.size;
    let mut scorer = CategoryScorer::new(imputed);
    scorer.metric(
        listing,
        stats,
        Metric::LivingArea,
        w.living_area,
        Direction::HigherIsBetter,
    );
    scorer.metric(listing, stats, Metric::Rooms, w.rooms, Direction::HigherIsBetter);
    scorer.finish()
}

fn amenity_score(
    listing: &Listing,
    stats: &BatchStatistics,
    config: &ScoringConfig,
    imputed: &mut Vec<String>,
) -> f64 {
    let w = &config.amenity;
    let mut scorer = CategoryScorer::new(imputed);
    scorer.flag("has_elevator", listing.has_elevator, w.elevator);
    scorer.flag("has_balcony", listing.has_balcony, w.balcony);
    scorer.metric(
        listing,
        stats,
        Metric::YearBuilt,
        w.year_built,
        Direction::HigherIsBetter,
    );
    scorer.floor(listing.floor, &config.floor, w.floor);
    scorer.finish()
}

/// Weighted composite of the four sub-scores, weights normalized to sum to 1.
pub fn composite_score(scores: &CategoryScores, config: &ScoringConfig) -> f64 {
    let weights = config.weights.normalized();
    let sum: f64 = scores
        .as_array()
        .iter()
        .zip(weights.iter())
        .map(|(s, w)| s * w)
        .sum();
    sum.clamp(0.0, 1.0)
}

/// Score one listing against the statistics of the batch it belongs to.
///
/// A pure function: the same listing, statistics and config always give
/// the same result.
pub fn score_listing(
    listing: Listing,
    stats: &BatchStatistics,
    config: &ScoringConfig,
) -> ScoredListing {
    let mut imputed = Vec::new();
    let scores = CategoryScores {
        price: price_score(&listing, stats, config, &mut imputed),
        location: location_score(&listing, stats, config, &mut imputed),
        size: size_score(&listing, stats, config, &mut imputed),
        amenity: amenity_score(&listing, stats, config, &mut imputed),
    };
    imputed.sort();
    imputed.dedup();

    ScoredListing {
        composite: composite_score(&scores, config),
        listing,
        scores,
        imputed,
    }
}

/// Score every listing of a batch against one shared statistics snapshot.
pub fn score_batch(
    listings: Vec<Listing>,
    stats: &BatchStatistics,
    config: &ScoringConfig,
) -> Vec<ScoredListing> {
    listings
        .into_iter()
        .map(|listing| score_listing(listing, stats, config))
        .collect()
}
