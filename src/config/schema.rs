use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeConfig;
use crate::rank::Filters;
use crate::scoring::ScoringConfig;

/// Everything the engine can be configured with. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub filters: Filters,
    pub normalize: NormalizeConfig,
}
