pub mod browser;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod listing;
pub mod normalize;
pub mod output;
pub mod rank;
pub mod scoring;
pub mod stats;
pub mod summary;

pub use engine::{BatchReport, Engine, RankedBatch};
pub use error::{EngineError, RecordError};
