use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::engine::BatchReport;
use crate::listing::ScoredListing;
use crate::summary::BatchSummary;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a composite score on a 0-100 scale (0.8734 -> "87.3")
/// If imputed is true, appends asterisk to mark scores that relied on imputation
pub fn format_score(score: f64, imputed: bool) -> String {
    let formatted = format!("{:.1}", score * 100.0);
    if imputed {
        format!("{}*", formatted)
    } else {
        formatted
    }
}

/// Format a price in compact notation (3.5M, 850k, 900)
pub fn format_price(price: f64) -> String {
    let formatted = if price >= 1_000_000.0 {
        format!("{:.2}M", price / 1_000_000.0)
    } else if price >= 1_000.0 {
        format!("{:.0}k", price / 1_000.0)
    } else {
        format!("{:.0}", price)
    };

    // Trim trailing zeros (e.g., "3.50M" -> "3.5M", "2.00M" -> "2M")
    if formatted.ends_with('M') {
        let number = formatted.trim_end_matches('M');
        let number = number.trim_end_matches('0').trim_end_matches('.');
        format!("{}M", number)
    } else {
        formatted
    }
}

fn format_rooms(rooms: Option<f64>) -> String {
    match rooms {
        Some(r) => format!("{}r", r),
        None => "?r".to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format ranked listings as a table with columns: Index, Score, Price, Rooms, Address, URL
/// No headers
/// Index column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 6 chars wide (fits "100.0*")
pub fn format_scored_table(listings: &[ScoredListing], use_colors: bool) -> String {
    format_table_with_width(listings, use_colors, get_terminal_width())
}

fn format_table_with_width(
    listings: &[ScoredListing],
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if listings.is_empty() {
        return "No listings found.".to_string();
    }

    let index_width = 3;
    let score_width = 6;
    let price_width = 7;
    let rooms_width = 5;
    let separator = "  ";

    listings
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let listing = &scored.listing;
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!(
                "{:>width$}",
                format_score(scored.composite, scored.imputed_count() > 0),
                width = score_width
            );
            let price_str = format!("{:>width$}", format_price(listing.price), width = price_width);
            let rooms_str = format!("{:>width$}", format_rooms(listing.rooms), width = rooms_width);

            let fixed_width = index_width
                + 1
                + score_width
                + price_width
                + rooms_width
                + separator.len() * 4
                + listing.detail_url.chars().count();

            let address = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_text(&listing.address, width - fixed_width)
                }
                // Very narrow terminal, show truncated
                Some(_) => truncate_text(&listing.address, 20),
                // No terminal (pipe), don't truncate
                None => listing.address.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    price_str.green(),
                    separator,
                    rooms_str.cyan(),
                    separator,
                    address,
                    separator,
                    listing.detail_url.underline()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}{}{}",
                    index_str,
                    score_str,
                    separator,
                    price_str,
                    separator,
                    rooms_str,
                    separator,
                    address,
                    separator,
                    listing.detail_url
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked listings as tab-separated values for scripting
/// Columns: rank, score, price, rooms, address, url (no headers, no colors)
pub fn format_tsv(listings: &[ScoredListing]) -> String {
    listings
        .iter()
        .enumerate()
        .map(|(idx, scored)| {
            let listing = &scored.listing;
            format!(
                "{}\t{:.4}\t{}\t{}\t{}\t{}",
                idx + 1,
                scored.composite,
                listing.price,
                listing.rooms.map(|r| r.to_string()).unwrap_or_default(),
                listing.address,
                listing.detail_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a single listing with detailed multi-line output (for verbose mode)
pub fn format_listing_detail(scored: &ScoredListing, use_colors: bool) -> String {
    let listing = &scored.listing;
    let fee = listing
        .fee
        .map(|f| format!("{:.0}/month", f))
        .unwrap_or_else(|| "unknown".to_string());
    let area = listing
        .living_area
        .map(|a| format!("{} m2", a))
        .unwrap_or_else(|| "unknown".to_string());
    let scores = format!(
        "price {:.2}, location {:.2}, size {:.2}, amenity {:.2}",
        scored.scores.price, scored.scores.location, scored.scores.size, scored.scores.amenity
    );
    let imputed = if scored.imputed.is_empty() {
        "none".to_string()
    } else {
        scored.imputed.join(", ")
    };

    if use_colors {
        format!(
            "{}\n  Price: {}  Fee: {}\n  Rooms: {}  Area: {}\n  Elevator: {}  Balcony: {}\n  Scores: {}\n  Imputed: {}\n  URL: {}",
            listing.address.bold(),
            format_price(listing.price).green(),
            fee,
            format_rooms(listing.rooms).cyan(),
            area,
            listing.has_elevator,
            listing.has_balcony,
            scores,
            imputed.yellow(),
            listing.detail_url.underline()
        )
    } else {
        format!(
            "{}\n  Price: {}  Fee: {}\n  Rooms: {}  Area: {}\n  Elevator: {}  Balcony: {}\n  Scores: {}\n  Imputed: {}\n  URL: {}",
            listing.address,
            format_price(listing.price),
            fee,
            format_rooms(listing.rooms),
            area,
            listing.has_elevator,
            listing.has_balcony,
            scores,
            imputed,
            listing.detail_url
        )
    }
}

/// Format the data-quality report as indented lines (for stderr)
pub fn format_report(report: &BatchReport) -> String {
    let mut lines = vec![format!(
        "Read {} records: {} rejected, {} duplicates, {} scored, {} filtered out",
        report.input_records,
        report.rejected_count(),
        report.duplicates,
        report.scored,
        report.filtered_out
    )];

    for rejection in &report.rejected {
        let url = rejection.detail_url.as_deref().unwrap_or("(no url)");
        lines.push(format!(
            "  rejected #{} {}: {}",
            rejection.index + 1,
            url,
            rejection.error
        ));
    }
    for (field, count) in &report.malformed {
        lines.push(format!("  unreadable {}: {} records", field, count));
    }
    for note in &report.degenerate_fields {
        lines.push(format!(
            "  not scored: {} ({} observations)",
            note.field, note.observations
        ));
    }

    lines.join("\n")
}

/// Format the batch summary block
pub fn format_summary(summary: &BatchSummary) -> String {
    let rooms = summary
        .rooms_distribution
        .iter()
        .map(|(rooms, count)| format!("{}: {}", rooms, count))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Listings: {}\nScore: mean {}, std {:.1}, top 10% from {}\nPrice: min {}, median {}, mean {}, max {}\nRooms: {}\nElevator: {}  Balcony: {}",
        summary.total,
        format_score(summary.mean_score, false),
        summary.score_std * 100.0,
        format_score(summary.top_decile_threshold, false),
        format_price(summary.price.min),
        format_price(summary.price.median),
        format_price(summary.price.mean),
        format_price(summary.price.max),
        rooms,
        summary.with_elevator,
        summary.with_balcony
    )
}
