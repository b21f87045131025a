pub mod config;
pub mod engine;
pub mod factors;
pub mod validation;

pub use config::*;
pub use engine::{composite_score, score_batch, score_listing};
pub use factors::{Blend, Direction, MIDPOINT};
pub use validation::validate_scoring;
