//! Field parsing and formatting helpers shared by the form layer and the
//! CSV stores.

use chrono::NaiveDate;
use regex::Regex;

use crate::error::LedgerError;

/// Calendar dates serialize as `YYYY-MM-DD` everywhere.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Round to 2 decimal places, the precision applied to every derived field
/// before it is persisted.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// The risk/reward sentinel serializes as the literal `inf`.
pub fn format_rr(rr: f64) -> String {
    if rr.is_infinite() {
        "inf".to_string()
    } else {
        format!("{rr:.2}")
    }
}

/// Accepts `inf` (and the legacy spelling `Infinite`) alongside plain
/// decimal text.
pub fn parse_rr(raw: &str) -> Option<f64> {
    match raw.trim() {
        "inf" | "Inf" | "Infinite" => Some(f64::INFINITY),
        s => s.parse::<f64>().ok(),
    }
}

/// Parse a money/price field. Tolerates a currency prefix and thousands
/// separators ("$1,234.56" → 1234.56) the way they arrive from pasted
/// broker statements.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, LedgerError> {
    let re = Regex::new(r"[$,\s]").map_err(|e| LedgerError::invalid(field, e.to_string()))?;
    let cleaned = re.replace_all(raw.trim(), "");
    if cleaned.is_empty() {
        return Err(LedgerError::invalid(field, "value is required"));
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| LedgerError::invalid(field, format!("'{}' is not a number", raw.trim())))
}

/// Empty input means "absent", anything else must parse as a decimal.
pub fn parse_optional_decimal(
    field: &'static str,
    raw: &str,
) -> Result<Option<f64>, LedgerError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(field, raw).map(Some)
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| LedgerError::invalid(field, format!("'{}' is not a YYYY-MM-DD date", raw.trim())))
}

pub fn parse_optional_date(
    field: &'static str,
    raw: &str,
) -> Result<Option<NaiveDate>, LedgerError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_date(field, raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_tolerates_currency_noise() {
        assert_eq!(parse_decimal("entry price", "$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_decimal("entry price", " 42 ").unwrap(), 42.0);
        assert_eq!(parse_decimal("balance", "-90.35").unwrap(), -90.35);
    }

    #[test]
    fn decimal_failure_names_the_field() {
        let err = parse_decimal("stop loss", "abc").unwrap_err();
        match err {
            LedgerError::Validation { field, .. } => assert_eq!(field, "stop loss"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_optional_fields_are_absent() {
        assert_eq!(parse_optional_decimal("exit price", "  ").unwrap(), None);
        assert_eq!(parse_optional_date("exit date", "").unwrap(), None);
    }

    #[test]
    fn rr_sentinel_round_trips() {
        assert_eq!(format_rr(f64::INFINITY), "inf");
        assert_eq!(format_rr(2.5), "2.50");
        assert_eq!(parse_rr("inf"), Some(f64::INFINITY));
        assert_eq!(parse_rr("Infinite"), Some(f64::INFINITY));
        assert_eq!(parse_rr("2.50"), Some(2.5));
        assert_eq!(parse_rr("n/a"), None);
    }

    #[test]
    fn round2_matches_persisted_precision() {
        assert_eq!(round2(2.555), 2.56);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(150.0), 150.0);
    }
}
