pub mod batch;
pub mod normalizer;
pub mod parse;

pub use batch::{dedup_by_url, normalize_batch, NormalizedBatch, Rejection};
pub use normalizer::{normalize_record, NormalizeConfig, Normalized};
pub use parse::Parsed;
