use super::config::FloorPreference;
use crate::listing::TriState;
use crate::stats::FieldStats;

/// Score given to an input or category we know nothing about.
pub const MIDPOINT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    /// Place `value` in the batch range and orient it so 1.0 is best.
    pub fn score(self, stats: &FieldStats, value: f64) -> f64 {
        let position = stats.normalize(value);
        match self {
            Direction::LowerIsBetter => 1.0 - position,
            Direction::HigherIsBetter => position,
        }
    }
}

/// Score of a tri-state amenity flag. Unknown sits halfway, not at zero.
pub fn flag_score(state: TriState) -> f64 {
    match state {
        TriState::Yes => 1.0,
        TriState::No => 0.0,
        TriState::Unknown => MIDPOINT,
    }
}

/// Score of a known floor against the buyer's floor preference.
pub fn floor_score(floor: u32, preference: &FloorPreference) -> f64 {
    if preference.avoid_ground_floor && floor <= 1 {
        return 0.2;
    }
    match (preference.preferred_min, preference.preferred_max) {
        (Some(min), Some(max)) if (min..=max).contains(&floor) => 1.0,
        (Some(min), Some(_)) if floor < min => 0.6,
        (Some(_), Some(_)) => 0.7,
        _ => 0.8,
    }
}

/// Weighted mean over the inputs of one category.
///
/// Inputs that are skipped simply do not add weight, which hands their share
/// to the inputs that remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blend {
    total: f64,
    weight: f64,
}

impl Blend {
    pub fn add(&mut self, score: f64, weight: f64) {
        if weight > 0.0 {
            self.total += score * weight;
            self.weight += weight;
        }
    }

    /// The weighted mean, or `None` when nothing was added.
    pub fn mean(&self) -> Option<f64> {
        if self.weight > 0.0 {
            Some((self.total / self.weight).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    pub fn mean_or_midpoint(&self) -> f64 {
        self.mean().unwrap_or(MIDPOINT)
    }
}
