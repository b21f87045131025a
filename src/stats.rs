//! Per-field distribution summaries for one batch.
//!
//! Scores are relative: a price is only "low" compared to the other prices in
//! the same batch. [`BatchStatistics`] captures the ranges once and is passed
//! explicitly to every scoring call.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::listing::Listing;

/// Fewer observations than this disables a field for the batch.
pub const MIN_OBSERVATIONS: usize = 2;

/// Numeric listing fields that feed scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    PricePerArea,
    Fee,
    LivingArea,
    Rooms,
    YearBuilt,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Price,
        Metric::PricePerArea,
        Metric::Fee,
        Metric::LivingArea,
        Metric::Rooms,
        Metric::YearBuilt,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Price => "price",
            Metric::PricePerArea => "price_per_area",
            Metric::Fee => "fee",
            Metric::LivingArea => "living_area",
            Metric::Rooms => "rooms",
            Metric::YearBuilt => "year_built",
        }
    }

    pub fn value(self, listing: &Listing) -> Option<f64> {
        match self {
            Metric::Price => Some(listing.price),
            Metric::PricePerArea => listing.price_per_area,
            Metric::Fee => listing.fee,
            Metric::LivingArea => listing.living_area,
            Metric::Rooms => listing.rooms,
            Metric::YearBuilt => listing.year_built.map(f64::from),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a field was switched off for the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    TooFewObservations,
    ZeroSpread,
}

/// Summary of the non-missing observations of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl FieldStats {
    /// Summarize `values`; `None` when there are none.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        };
        Some(Self {
            count: n,
            min: values[0],
            max: values[n - 1],
            median,
        })
    }

    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.count < MIN_OBSERVATIONS {
            Some(Degeneracy::TooFewObservations)
        } else if self.max - self.min <= f64::EPSILON * self.max.abs().max(1.0) {
            Some(Degeneracy::ZeroSpread)
        } else {
            None
        }
    }

    /// Min-max position of `value` in the batch range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

/// Immutable statistics snapshot of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    /// Number of listings the snapshot was computed over
    pub listings: usize,
    pub fields: BTreeMap<Metric, FieldStats>,
    /// Transit distance statistics, keyed by transport mode
    pub transit: BTreeMap<String, FieldStats>,
}

/// A field that cannot take part in scoring for this batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateField {
    pub field: String,
    pub observations: usize,
    pub reason: Degeneracy,
}

impl BatchStatistics {
    pub fn compute(listings: &[Listing]) -> Self {
        let mut fields = BTreeMap::new();
        for metric in Metric::ALL {
            let values: Vec<f64> = listings.iter().filter_map(|l| metric.value(l)).collect();
            if let Some(stats) = FieldStats::from_values(values) {
                fields.insert(metric, stats);
            }
        }

        let mut by_mode: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for listing in listings {
            for (mode, meters) in &listing.transit_distance_by_mode {
                by_mode.entry(mode.clone()).or_default().push(*meters);
            }
        }
        let transit = by_mode
            .into_iter()
            .filter_map(|(mode, values)| FieldStats::from_values(values).map(|s| (mode, s)))
            .collect();

        Self {
            listings: listings.len(),
            fields,
            transit,
        }
    }

    /// Raw statistics for a field, whether or not it is usable.
    pub fn field(&self, metric: Metric) -> Option<&FieldStats> {
        self.fields.get(&metric)
    }

    /// Statistics for a field if it can discriminate between listings.
    pub fn usable(&self, metric: Metric) -> Option<&FieldStats> {
        self.field(metric).filter(|s| s.degeneracy().is_none())
    }

    pub fn usable_transit(&self, mode: &str) -> Option<&FieldStats> {
        self.transit.get(mode).filter(|s| s.degeneracy().is_none())
    }

    /// Transport modes with at least one observation, in order.
    pub fn transit_modes(&self) -> impl Iterator<Item = &str> {
        self.transit.keys().map(String::as_str)
    }

    /// Every scored field that is switched off for this batch.
    ///
    /// Fields with no observation at all are included, since their weight is
    /// redistributed just the same.
    pub fn degenerate_fields(&self) -> Vec<DegenerateField> {
        let mut out = Vec::new();
        for metric in Metric::ALL {
            match self.field(metric) {
                Some(stats) => {
                    if let Some(reason) = stats.degeneracy() {
                        out.push(DegenerateField {
                            field: metric.name().to_string(),
                            observations: stats.count,
                            reason,
                        });
                    }
                }
                None => out.push(DegenerateField {
                    field: metric.name().to_string(),
                    observations: 0,
                    reason: Degeneracy::TooFewObservations,
                }),
            }
        }
        for (mode, stats) in &self.transit {
            if let Some(reason) = stats.degeneracy() {
                out.push(DegenerateField {
                    field: format!("{}_distance", mode),
                    observations: stats.count,
                    reason,
                });
            }
        }
        out
    }
}
