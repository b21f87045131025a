pub mod export;
pub mod formatter;

pub use export::{export_csv, to_csv};
pub use formatter::{
    format_listing_detail, format_price, format_report, format_score, format_scored_table,
    format_summary, format_tsv, should_use_colors,
};
