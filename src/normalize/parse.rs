use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::listing::{RawValue, TriState};

/// Outcome of reading one raw field.
///
/// Keeps "not there" apart from "there but unreadable" so the latter can be
/// tallied; both end up as an absent field on the listing, never as zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Present(T),
    Absent,
    Malformed,
}

impl<T> Parsed<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Parsed::Malformed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        match self {
            Parsed::Present(v) => Parsed::Present(f(v)),
            Parsed::Absent => Parsed::Absent,
            Parsed::Malformed => Parsed::Malformed,
        }
    }
}

const TRUTHY: &[&str] = &["yes", "ja", "true", "y", "1", "finns", "x"];
const FALSY: &[&str] = &["no", "nej", "false", "n", "0", "saknas", "-"];

/// Read a non-negative number.
///
/// Text is cleaned the way listing sites format figures: whitespace
/// (including non-breaking and thin spaces) is dropped and the leading numeric
/// part is kept, so `"3 500 000 kr"` reads as 3500000 and `"2,5 rum"` as 2.5.
/// Negative, non-finite or non-numeric input is malformed.
pub fn parse_number(value: Option<&RawValue>) -> Parsed<f64> {
    match value {
        None | Some(RawValue::Null) => Parsed::Absent,
        Some(RawValue::Number(n)) => {
            if n.is_finite() && *n >= 0.0 {
                Parsed::Present(*n)
            } else {
                Parsed::Malformed
            }
        }
        Some(RawValue::Bool(_)) | Some(RawValue::Compound(_)) => Parsed::Malformed,
        Some(RawValue::Text(s)) => match clean_number(s) {
            Some(n) => Parsed::Present(n),
            None if s.trim().is_empty() => Parsed::Absent,
            None => Parsed::Malformed,
        },
    }
}

/// Read a non-negative whole number. `"1995"` and `1995.0` are fine, `2.5` is not.
pub fn parse_integer(value: Option<&RawValue>) -> Parsed<i64> {
    match parse_number(value) {
        Parsed::Present(n) if n.fract() == 0.0 && n <= i64::MAX as f64 => Parsed::Present(n as i64),
        Parsed::Present(_) => Parsed::Malformed,
        Parsed::Absent => Parsed::Absent,
        Parsed::Malformed => Parsed::Malformed,
    }
}

fn clean_number(text: &str) -> Option<f64> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.starts_with('-') {
        return None;
    }

    let numeric: String = compact
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !numeric.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let commas = numeric.matches(',').count();
    let normalized = if commas == 0 {
        numeric
    } else if numeric.contains('.') || commas > 1 {
        // "1,500,000" or "1,500.50": commas group thousands
        numeric.replace(',', "")
    } else {
        let (_, after) = numeric.split_once(',').unwrap_or((&numeric, ""));
        if after.len() == 3 {
            numeric.replace(',', "")
        } else {
            numeric.replace(',', ".")
        }
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Read a tri-state flag. Anything not clearly yes or no is `Malformed`,
/// which the caller turns into [`TriState::Unknown`].
pub fn parse_tristate(value: Option<&RawValue>) -> Parsed<TriState> {
    match value {
        None | Some(RawValue::Null) => Parsed::Absent,
        Some(RawValue::Bool(b)) => Parsed::Present(TriState::from(*b)),
        Some(RawValue::Number(n)) if *n == 1.0 => Parsed::Present(TriState::Yes),
        Some(RawValue::Number(n)) if *n == 0.0 => Parsed::Present(TriState::No),
        Some(RawValue::Number(_)) | Some(RawValue::Compound(_)) => Parsed::Malformed,
        Some(RawValue::Text(s)) => {
            let token = s.trim().to_lowercase();
            if TRUTHY.contains(&token.as_str()) {
                Parsed::Present(TriState::Yes)
            } else if FALSY.contains(&token.as_str()) {
                Parsed::Present(TriState::No)
            } else if token.is_empty() {
                Parsed::Absent
            } else {
                Parsed::Malformed
            }
        }
    }
}

/// Read free text, trimmed.
pub fn parse_text(value: Option<&RawValue>) -> Parsed<String> {
    match value {
        None | Some(RawValue::Null) => Parsed::Absent,
        Some(RawValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Parsed::Absent
            } else {
                Parsed::Present(trimmed.to_string())
            }
        }
        Some(RawValue::Number(n)) if n.is_finite() => Parsed::Present(n.to_string()),
        Some(_) => Parsed::Malformed,
    }
}

/// Read an observation timestamp: RFC 3339, a naive ISO date-time (taken as
/// UTC), a plain date, or unix seconds.
pub fn parse_timestamp(value: Option<&RawValue>) -> Parsed<DateTime<Utc>> {
    match value {
        None | Some(RawValue::Null) => Parsed::Absent,
        Some(RawValue::Number(n)) if n.is_finite() && n.fract() == 0.0 => {
            match DateTime::from_timestamp(*n as i64, 0) {
                Some(ts) => Parsed::Present(ts),
                None => Parsed::Malformed,
            }
        }
        Some(RawValue::Text(s)) => {
            let s = s.trim();
            if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                return Parsed::Present(ts.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Parsed::Present(naive.and_utc());
                }
            }
            match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => date
                    .and_hms_opt(0, 0, 0)
                    .map(|dt| Parsed::Present(dt.and_utc()))
                    .unwrap_or(Parsed::Malformed),
                Err(_) => Parsed::Malformed,
            }
        }
        Some(_) => Parsed::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number(Some(&text("2500000"))), Parsed::Present(2_500_000.0));
        assert_eq!(parse_number(Some(&RawValue::Number(65.5))), Parsed::Present(65.5));
    }

    #[test]
    fn test_parse_number_with_spaces_and_currency() {
        assert_eq!(parse_number(Some(&text("3 500 000 kr"))), Parsed::Present(3_500_000.0));
        // Non-breaking space as thousands separator
        assert_eq!(parse_number(Some(&text("4\u{a0}250 kr/mån"))), Parsed::Present(4_250.0));
    }

    #[test]
    fn test_parse_number_with_unit() {
        assert_eq!(parse_number(Some(&text("65 m²"))), Parsed::Present(65.0));
    }

    #[test]
    fn test_parse_number_decimal_comma() {
        assert_eq!(parse_number(Some(&text("2,5 rum"))), Parsed::Present(2.5));
    }

    #[test]
    fn test_parse_number_thousands_commas() {
        assert_eq!(parse_number(Some(&text("1,500,000"))), Parsed::Present(1_500_000.0));
        assert_eq!(parse_number(Some(&text("4,500"))), Parsed::Present(4_500.0));
    }

    #[test]
    fn test_parse_number_negative_is_malformed() {
        assert_eq!(parse_number(Some(&text("-5"))), Parsed::Malformed);
        assert_eq!(parse_number(Some(&RawValue::Number(-1.0))), Parsed::Malformed);
    }

    #[test]
    fn test_compound_values_are_malformed() {
        let nested = RawValue::Compound(serde_json::json!({"amount": 3000}));
        assert_eq!(parse_number(Some(&nested)), Parsed::Malformed);
        assert_eq!(parse_integer(Some(&nested)), Parsed::Malformed);
        assert_eq!(parse_tristate(Some(&nested)), Parsed::Malformed);
        assert_eq!(parse_text(Some(&nested)), Parsed::Malformed);
        assert_eq!(parse_timestamp(Some(&nested)), Parsed::Malformed);
    }

    #[test]
    fn test_parse_number_non_numeric_is_malformed() {
        assert_eq!(parse_number(Some(&text("pris saknas"))), Parsed::Malformed);
        assert_eq!(parse_number(Some(&RawValue::Bool(true))), Parsed::Malformed);
        assert_eq!(parse_number(Some(&RawValue::Number(f64::NAN))), Parsed::Malformed);
    }

    #[test]
    fn test_parse_number_absent() {
        assert_eq!(parse_number(None), Parsed::Absent);
        assert_eq!(parse_number(Some(&RawValue::Null)), Parsed::Absent);
        assert_eq!(parse_number(Some(&text("   "))), Parsed::Absent);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer(Some(&text("1995"))), Parsed::Present(1995));
        assert_eq!(parse_integer(Some(&RawValue::Number(3.0))), Parsed::Present(3));
        assert_eq!(parse_integer(Some(&RawValue::Number(2.5))), Parsed::Malformed);
    }

    #[test]
    fn test_parse_tristate_tokens() {
        assert_eq!(parse_tristate(Some(&text("Ja"))), Parsed::Present(TriState::Yes));
        assert_eq!(parse_tristate(Some(&text("finns"))), Parsed::Present(TriState::Yes));
        assert_eq!(parse_tristate(Some(&text("NEJ"))), Parsed::Present(TriState::No));
        assert_eq!(parse_tristate(Some(&RawValue::Bool(false))), Parsed::Present(TriState::No));
        assert_eq!(parse_tristate(Some(&RawValue::Number(1.0))), Parsed::Present(TriState::Yes));
    }

    #[test]
    fn test_parse_tristate_ambiguous_is_not_false() {
        assert_eq!(parse_tristate(Some(&text("kanske"))), Parsed::Malformed);
        assert_eq!(parse_tristate(Some(&RawValue::Number(2.0))), Parsed::Malformed);
        assert_eq!(parse_tristate(None), Parsed::Absent);
    }

    #[test]
    fn test_parse_text_trims() {
        assert_eq!(
            parse_text(Some(&text("  Storgatan 1 "))),
            Parsed::Present("Storgatan 1".to_string())
        );
        assert_eq!(parse_text(Some(&RawValue::Bool(true))), Parsed::Malformed);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp(Some(&text("2024-03-01T12:00:00+01:00"))).ok().unwrap();
        assert_eq!(rfc.hour(), 11);

        let naive = parse_timestamp(Some(&text("2024-03-01T12:30:00.123456"))).ok().unwrap();
        assert_eq!(naive.minute(), 30);

        let date = parse_timestamp(Some(&text("2024-03-01"))).ok().unwrap();
        assert_eq!(date.day(), 1);

        let unix = parse_timestamp(Some(&RawValue::Number(0.0))).ok().unwrap();
        assert_eq!(unix.year(), 1970);

        assert!(parse_timestamp(Some(&text("yesterday"))).is_malformed());
    }
}
