//! One-call entry point: raw records in, ranked listings and an audit report out.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{validate_config, Config};
use crate::error::EngineError;
use crate::listing::{RawRecord, ScoredListing};
use crate::normalize::{normalize_batch, Rejection};
use crate::rank::filter_and_rank;
use crate::scoring::score_batch;
use crate::stats::{BatchStatistics, DegenerateField};

/// Data-quality account of one batch, returned next to the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Raw records received
    pub input_records: usize,
    /// Records dropped by the normalizer, with reasons
    pub rejected: Vec<Rejection>,
    /// Records collapsed into another with the same URL
    pub duplicates: usize,
    /// Optional fields that were present but unreadable, by field name
    pub malformed: BTreeMap<String, usize>,
    /// Scored fields switched off for this batch (informational)
    pub degenerate_fields: Vec<DegenerateField>,
    /// Listings scored before filtering
    pub scored: usize,
    /// Listings removed by hard filters
    pub filtered_out: usize,
}

impl BatchReport {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// The outcome of ranking one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBatch {
    pub listings: Vec<ScoredListing>,
    pub statistics: BatchStatistics,
    pub report: BatchReport,
}

/// A validated configuration, ready to rank any number of batches.
///
/// Holds no batch state: every call to [`Engine::rank`] computes its own
/// statistics, so independent batches can be ranked from different threads.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Validate `config` up front so no batch is ever processed with a bad one.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        validate_config(&config).map_err(EngineError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize, score, filter and rank one closed batch of raw records.
    pub fn rank(&self, records: &[RawRecord]) -> RankedBatch {
        let normalized = normalize_batch(records, &self.config.normalize);

        let statistics = BatchStatistics::compute(&normalized.listings);
        let degenerate_fields = statistics.degenerate_fields();
        for note in &degenerate_fields {
            tracing::debug!(
                field = %note.field,
                observations = note.observations,
                reason = ?note.reason,
                "field disabled for this batch"
            );
        }

        let scored = score_batch(normalized.listings, &statistics, &self.config.scoring);
        let scored_count = scored.len();
        let listings = filter_and_rank(scored, &self.config.filters);

        let report = BatchReport {
            input_records: records.len(),
            rejected: normalized.rejected,
            duplicates: normalized.duplicates,
            malformed: normalized.malformed,
            degenerate_fields,
            scored: scored_count,
            filtered_out: scored_count - listings.len(),
        };

        tracing::info!(
            input = report.input_records,
            rejected = report.rejected_count(),
            duplicates = report.duplicates,
            ranked = listings.len(),
            "batch ranked"
        );

        RankedBatch {
            listings,
            statistics,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::TriState;
    use crate::scoring::CategoryWeights;

    fn record(url: &str, price: f64) -> RawRecord {
        RawRecord::new()
            .with("url", url)
            .with("source", "hemnet")
            .with("address", "Storgatan 1")
            .with("price", price)
    }

    fn sample_batch() -> Vec<RawRecord> {
        vec![
            record("https://a", 3_000_000.0)
                .with("fee", "3 000 kr")
                .with("rooms", "2")
                .with("living_area", "60")
                .with("year_built", "1995")
                .with("floor", "2")
                .with("total_floors", "5")
                .with("has_elevator", "Ja")
                .with("has_balcony", "Ja")
                .with("metro_distance", "500")
                .with("bus_distance", "100"),
            record("https://b", 4_000_000.0)
                .with("fee", "4 500 kr")
                .with("rooms", "3")
                .with("living_area", "67")
                .with("year_built", "2010")
                .with("has_elevator", "Ja")
                .with("has_balcony", "Nej")
                .with("metro_distance", "800")
                .with("bus_distance", "200"),
            record("https://c", 2_500_000.0)
                .with("fee", "2 800 kr")
                .with("rooms", "1")
                .with("living_area", "55")
                .with("year_built", "1980")
                .with("has_elevator", "Nej")
                .with("has_balcony", "Ja")
                .with("metro_distance", "300")
                .with("bus_distance", "150"),
            record("https://d", 3_200_000.0)
                .with("rooms", "2,5")
                .with("has_elevator", "?"),
            // Rejected: no address
            RawRecord::new().with("url", "https://e").with("price", 1.0),
            // Rejected: floor above building height
            record("https://f", 2_000_000.0)
                .with("floor", "8")
                .with("total_floors", "4"),
            // Duplicate of a, observed later
            record("https://a", 2_900_000.0)
                .with("rooms", "2")
                .with("observed_at", "2024-05-01T10:00:00Z"),
        ]
    }

    #[test]
    fn test_invalid_configuration_rejected_before_ranking() {
        let mut config = Config::default();
        config.scoring.weights.price = -40.0;
        let err = Engine::new(config).unwrap_err();
        let EngineError::InvalidConfiguration(errors) = err;
        assert!(errors[0].contains("scoring.weights.price"));
    }

    #[test]
    fn test_report_accounts_for_every_record() {
        let engine = Engine::new(Config::default()).unwrap();
        let records = sample_batch();
        let batch = engine.rank(&records);

        assert_eq!(batch.report.input_records, 7);
        assert_eq!(batch.report.rejected_count(), 2);
        assert_eq!(batch.report.duplicates, 1);
        assert_eq!(batch.report.scored, 4);
        assert_eq!(batch.report.filtered_out, 0);
        assert_eq!(batch.listings.len(), 4);
        assert_eq!(batch.report.malformed.get("has_elevator"), Some(&1));
    }

    #[test]
    fn test_duplicate_keeps_timestamped_record() {
        let engine = Engine::new(Config::default()).unwrap();
        let batch = engine.rank(&sample_batch());
        let a = batch
            .listings
            .iter()
            .find(|s| s.listing.detail_url == "https://a")
            .unwrap();
        assert_eq!(a.listing.price, 2_900_000.0);
        assert_eq!(a.listing.rooms, Some(2.0));
        // Fields of the older record are not merged into the survivor
        assert!(a.listing.fee.is_none());
    }

    #[test]
    fn test_filter_sees_surviving_duplicate_only() {
        let mut records = sample_batch();
        // The later observation of a no longer reports rooms
        records[6] = record("https://a", 2_900_000.0).with("observed_at", "2024-05-01T10:00:00Z");
        let mut config = Config::default();
        config.filters.max_rooms = Some(2.0);
        let batch = Engine::new(config).unwrap().rank(&records);

        let urls: Vec<&str> = batch
            .listings
            .iter()
            .map(|s| s.listing.detail_url.as_str())
            .collect();
        assert_eq!(urls, vec!["https://c"]);
        assert_eq!(batch.report.filtered_out, 3);
    }

    #[test]
    fn test_ranking_is_non_increasing_and_bounded() {
        let engine = Engine::new(Config::default()).unwrap();
        let batch = engine.rank(&sample_batch());

        for pair in batch.listings.windows(2) {
            assert!(pair[0].composite >= pair[1].composite);
        }
        for s in &batch.listings {
            assert!((0.0..=1.0).contains(&s.composite));
            for sub in s.scores.as_array() {
                assert!((0.0..=1.0).contains(&sub));
            }
        }
    }

    #[test]
    fn test_idempotent_output() {
        let engine = Engine::new(Config::default()).unwrap();
        let first = serde_json::to_string(&engine.rank(&sample_batch())).unwrap();
        let second = serde_json::to_string(&engine.rank(&sample_batch())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_filters_applied_after_scoring() {
        let mut config = Config::default();
        config.filters.max_rooms = Some(2.0);
        let engine = Engine::new(config).unwrap();
        let batch = engine.rank(&sample_batch());

        let urls: Vec<&str> = batch
            .listings
            .iter()
            .map(|s| s.listing.detail_url.as_str())
            .collect();
        assert_eq!(batch.report.filtered_out, 2);
        assert!(urls.contains(&"https://a"));
        assert!(urls.contains(&"https://c"));

        // Scores are relative to the whole batch, not the filtered subset
        let unfiltered = Engine::new(Config::default()).unwrap().rank(&sample_batch());
        for s in &batch.listings {
            let same = unfiltered
                .listings
                .iter()
                .find(|u| u.listing.detail_url == s.listing.detail_url)
                .unwrap();
            assert_eq!(s.composite, same.composite);
        }
    }

    #[test]
    fn test_proportional_weights_rank_identically() {
        let engine_big = Engine::new(Config::default()).unwrap();
        let mut config = Config::default();
        config.scoring.weights = CategoryWeights {
            price: 4.0,
            location: 3.0,
            size: 2.0,
            amenity: 1.0,
        };
        let engine_small = Engine::new(config).unwrap();

        let big = engine_big.rank(&sample_batch());
        let small = engine_small.rank(&sample_batch());
        for (x, y) in big.listings.iter().zip(small.listings.iter()) {
            assert_eq!(x.listing.detail_url, y.listing.detail_url);
            assert!((x.composite - y.composite).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unknown_elevator_recorded_as_imputed() {
        let engine = Engine::new(Config::default()).unwrap();
        let batch = engine.rank(&sample_batch());
        let d = batch
            .listings
            .iter()
            .find(|s| s.listing.detail_url == "https://d")
            .unwrap();
        assert_eq!(d.listing.has_elevator, TriState::Unknown);
        assert!(d.imputed.contains(&"has_elevator".to_string()));
        assert!(d.imputed.contains(&"metro_distance".to_string()));
    }

    #[test]
    fn test_empty_batch() {
        let engine = Engine::new(Config::default()).unwrap();
        let batch = engine.rank(&[]);
        assert!(batch.listings.is_empty());
        assert_eq!(batch.report.input_records, 0);
        assert_eq!(batch.statistics.listings, 0);
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<RankedBatch>();
    }
}
