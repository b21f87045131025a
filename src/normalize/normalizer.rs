use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::parse::{
    parse_integer, parse_number, parse_text, parse_timestamp, parse_tristate, Parsed,
};
use crate::error::RecordError;
use crate::listing::{Listing, RawRecord, TriState};

const DISTANCE_SUFFIX: &str = "_distance";
const MAX_PLAUSIBLE_ROOMS: f64 = 20.0;

/// Options for turning raw records into listings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct NormalizeConfig {
    /// Sources that only list properties without a recurring fee.
    /// For these an absent fee means 0 rather than unknown.
    pub fee_free_sources: Vec<String>,
}

impl NormalizeConfig {
    fn is_fee_free(&self, source: &str) -> bool {
        self.fee_free_sources
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(source))
    }
}

/// A listing plus the names of optional fields that were present but unreadable.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub listing: Listing,
    pub malformed: Vec<String>,
}

/// Tracks malformed optional fields while a record is being read.
#[derive(Default)]
struct Tally(Vec<String>);

impl Tally {
    fn take<T>(&mut self, field: &str, parsed: Parsed<T>) -> Option<T> {
        if parsed.is_malformed() {
            self.0.push(field.to_string());
        }
        parsed.ok()
    }
}

fn required<T>(field: &'static str, parsed: Parsed<T>) -> Result<T, RecordError> {
    parsed.ok().ok_or(RecordError::MissingRequiredField { field })
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// Turn one raw record into a [`Listing`], or say why it cannot be one.
///
/// Missing or unreadable `address`, `price` or `detail_url` rejects the record.
/// Unreadable optional fields become absent (never zero) and are listed in
/// [`Normalized::malformed`].
pub fn normalize_record(
    raw: &RawRecord,
    config: &NormalizeConfig,
) -> Result<Normalized, RecordError> {
    let detail_url = required("detail_url", parse_text(raw.get_any(&["detail_url", "url"])))?;
    let address = required("address", parse_text(raw.get("address")))?;
    let price = required("price", parse_number(raw.get("price")))?;
    if price <= 0.0 {
        return Err(RecordError::InvalidFieldValue {
            field: "price",
            reason: "price must be positive".to_string(),
        });
    }

    let mut tally = Tally::default();

    let source = tally
        .take("source", parse_text(raw.get("source")))
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());

    let living_area = positive(tally.take("living_area", parse_number(raw.get("living_area"))));
    let supplied_ppa = positive(tally.take(
        "price_per_area",
        parse_number(raw.get_any(&["price_per_area", "price_per_m2"])),
    ));
    let price_per_area = supplied_ppa.or_else(|| living_area.map(|area| price / area));

    let fee = tally.take("fee", parse_number(raw.get("fee"))).or_else(|| {
        if raw.get("fee").is_none() && config.is_fee_free(&source) {
            Some(0.0)
        } else {
            None
        }
    });

    let rooms = positive(tally.take("rooms", parse_number(raw.get("rooms"))));
    if let Some(rooms) = rooms.filter(|r| *r > MAX_PLAUSIBLE_ROOMS) {
        tracing::warn!(url = %detail_url, rooms, "unusual room count");
    }

    let year_built = tally
        .take("year_built", parse_integer(raw.get("year_built")))
        .and_then(|y| i32::try_from(y).ok());
    if let Some(year) = year_built {
        let current_year = Utc::now().year();
        if !(1800..=current_year).contains(&year) {
            tracing::warn!(url = %detail_url, year, "unusual year_built");
        }
    }

    let floor = tally
        .take("floor", parse_integer(raw.get("floor")))
        .and_then(|f| u32::try_from(f).ok());
    let total_floors = tally
        .take("total_floors", parse_integer(raw.get("total_floors")))
        .and_then(|f| u32::try_from(f).ok())
        .filter(|f| *f > 0);
    if let (Some(floor), Some(total)) = (floor, total_floors) {
        if floor > total {
            return Err(RecordError::InvalidFieldValue {
                field: "floor",
                reason: format!("floor {} is above total_floors {}", floor, total),
            });
        }
    }

    let has_elevator = tally
        .take("has_elevator", parse_tristate(raw.get("has_elevator")))
        .unwrap_or(TriState::Unknown);
    let has_balcony = tally
        .take("has_balcony", parse_tristate(raw.get("has_balcony")))
        .unwrap_or(TriState::Unknown);

    let mut transit_distance_by_mode = BTreeMap::new();
    for (key, value) in raw.iter() {
        let Some(mode) = key.strip_suffix(DISTANCE_SUFFIX) else {
            continue;
        };
        if mode.is_empty() {
            continue;
        }
        if let Some(meters) = tally.take(key, parse_number(Some(value))) {
            transit_distance_by_mode.insert(mode.to_string(), meters);
        }
    }

    let listing = Listing {
        source,
        address,
        price,
        fee,
        living_area,
        price_per_area,
        rooms,
        year_built,
        cooperative_name: tally.take(
            "cooperative_name",
            parse_text(raw.get_any(&["cooperative_name", "housing_cooperative"])),
        ),
        floor,
        total_floors,
        has_elevator,
        has_balcony,
        transit_distance_by_mode,
        detail_url,
        observed_at: tally.take(
            "observed_at",
            parse_timestamp(raw.get_any(&["observed_at", "scraped_at"])),
        ),
    };

    Ok(Normalized {
        listing,
        malformed: tally.0,
    })
}
