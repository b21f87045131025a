use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main scoring configuration.
///
/// Category weights decide how much each sub-score counts towards the
/// composite; the per-category blocks weigh the inputs inside a category.
/// Weights are relative and normalized before use, so `{40, 30, 20, 10}`
/// and `{4, 3, 2, 1}` rank identically.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights: { price: 40, location: 30, size: 20, amenity: 10 }
///   location:
///     metro: 2
///     modes: { tram: 1.5 }
///   amenity: { year_built: 0.25, floor: 0.5 }
///   floor: { avoid_ground_floor: true, preferred_min: 2, preferred_max: 6 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ScoringConfig {
    pub weights: CategoryWeights,
    pub price: PriceWeights,
    pub location: LocationWeights,
    pub size: SizeWeights,
    pub amenity: AmenityWeights,
    pub floor: FloorPreference,
}

/// Share of each category in the composite score.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct CategoryWeights {
    pub price: f64,
    pub location: f64,
    pub size: f64,
    pub amenity: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            price: 40.0,
            location: 30.0,
            size: 20.0,
            amenity: 10.0,
        }
    }
}

impl CategoryWeights {
    pub fn as_array(&self) -> [f64; 4] {
        [self.price, self.location, self.size, self.amenity]
    }

    /// Weights rescaled to sum to 1.
    ///
    /// Callers validate first; an all-zero vector is returned unchanged.
    pub fn normalized(&self) -> [f64; 4] {
        let raw = self.as_array();
        let sum: f64 = raw.iter().sum();
        if sum > 0.0 {
            raw.map(|w| w / sum)
        } else {
            raw
        }
    }
}

/// Inputs of the price category. Lower is better for all three.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PriceWeights {
    pub price: f64,
    pub price_per_area: f64,
    /// Monthly fee to the housing cooperative
    pub fee: f64,
}

impl Default for PriceWeights {
    fn default() -> Self {
        Self {
            price: 1.0,
            price_per_area: 1.0,
            fee: 0.5,
        }
    }
}

/// Inputs of the location category: one per transport mode.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct LocationWeights {
    /// Weight of the metro distance (default: 2.0)
    pub metro: f64,
    /// Weight of any mode without an explicit entry (default: 1.0)
    pub default_mode: f64,
    /// Explicit per-mode weights, e.g. `{ bus: 0.5, tram: 1.5 }`
    pub modes: BTreeMap<String, f64>,
}

impl Default for LocationWeights {
    fn default() -> Self {
        Self {
            metro: 2.0,
            default_mode: 1.0,
            modes: BTreeMap::new(),
        }
    }
}

impl LocationWeights {
    pub fn weight_for(&self, mode: &str) -> f64 {
        if let Some(w) = self.modes.get(mode) {
            *w
        } else if mode == "metro" {
            self.metro
        } else {
            self.default_mode
        }
    }
}

/// Inputs of the size category. Higher is better.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct SizeWeights {
    pub living_area: f64,
    pub rooms: f64,
}

impl Default for SizeWeights {
    fn default() -> Self {
        Self {
            living_area: 1.0,
            rooms: 1.0,
        }
    }
}

/// Inputs of the amenity category.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct AmenityWeights {
    pub elevator: f64,
    pub balcony: f64,
    /// Recency bonus: newer buildings score higher
    pub year_built: f64,
    /// Fit with the floor preference (off by default)
    pub floor: f64,
}

impl Default for AmenityWeights {
    fn default() -> Self {
        Self {
            elevator: 1.0,
            balcony: 1.0,
            year_built: 0.5,
            floor: 0.0,
        }
    }
}

/// Which floors the buyer likes. Only used when `amenity.floor` is positive.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct FloorPreference {
    /// Ground floor and first floor score low
    pub avoid_ground_floor: bool,
    /// Preferred range, inclusive; applied only when both ends are set
    pub preferred_min: Option<u32>,
    pub preferred_max: Option<u32>,
}

impl Default for FloorPreference {
    fn default() -> Self {
        Self {
            avoid_ground_floor: true,
            preferred_min: Some(2),
            preferred_max: Some(6),
        }
    }
}
