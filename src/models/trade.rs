use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::parse;

/// Position direction. Absent on a trade means the legacy buy-reference
/// convention, which prices P/L exactly like a Long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }

    /// Accepts the form spellings and the buy/sell aliases, case-insensitive.
    pub fn parse(raw: &str) -> Option<Direction> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }
}

/// One row of the trade table.
///
/// The derived fields (`pl_amount`, `pl_percent`, `rr_ratio`, `holding_days`)
/// are recomputed from the primary fields at save time and are never edited
/// directly. A trade with no exit price is open: its P/L fields are `None`,
/// not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub ticker: String,
    pub setup: String,
    pub direction: Option<Direction>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub size: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub pl_amount: Option<f64>,
    pub pl_percent: Option<f64>,
    /// `f64::INFINITY` when entry price equals stop loss (zero risk per unit).
    pub rr_ratio: f64,
    pub holding_days: Option<i64>,
    pub screenshot: Option<String>,
    pub notes: String,
}

impl TradeRecord {
    /// Closed trades carry a realized P/L; only they participate in the
    /// aggregate statistics.
    pub fn is_closed(&self) -> bool {
        self.pl_amount.is_some()
    }
}

/// Primary trade fields as submitted by the caller, already strongly typed.
/// Parsing raw form input into this shape is the presentation layer's job
/// (see [`TradeForm`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub entry_date: NaiveDate,
    pub ticker: String,
    pub setup: String,
    pub direction: Option<Direction>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub target_price: f64,
    pub size: f64,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub screenshot: Option<String>,
    pub notes: String,
}

/// Raw form fields, one string per entry widget. `parse` reports the first
/// offending field instead of coercing silently.
#[derive(Debug, Clone, Default)]
pub struct TradeForm {
    pub entry_date: String,
    pub ticker: String,
    pub setup: String,
    pub position: String,
    pub entry_price: String,
    pub stop_loss: String,
    pub target_price: String,
    pub size: String,
    pub exit_date: String,
    pub exit_price: String,
    pub screenshot: String,
    pub notes: String,
}

impl TradeForm {
    pub fn parse(&self) -> Result<TradeInput, LedgerError> {
        let direction = match self.position.trim() {
            "" => None,
            raw => Some(Direction::parse(raw).ok_or_else(|| {
                LedgerError::invalid("position", format!("'{raw}' is not Long or Short"))
            })?),
        };

        Ok(TradeInput {
            entry_date: parse::parse_date("entry date", &self.entry_date)?,
            ticker: self.ticker.trim().to_string(),
            setup: self.setup.trim().to_string(),
            direction,
            entry_price: parse::parse_decimal("entry price", &self.entry_price)?,
            stop_loss: parse::parse_decimal("stop loss", &self.stop_loss)?,
            target_price: parse::parse_decimal("target price", &self.target_price)?,
            size: parse::parse_decimal("size", &self.size)?,
            exit_date: parse::parse_optional_date("exit date", &self.exit_date)?,
            exit_price: parse::parse_optional_decimal("exit price", &self.exit_price)?,
            screenshot: match self.screenshot.trim() {
                "" => None,
                path => Some(path.to_string()),
            },
            notes: self.notes.clone(),
        })
    }
}
