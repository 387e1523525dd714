//! Pure trade calculator: derives P/L, risk/reward and holding period from
//! the primary fields of a submitted trade.

use crate::models::{Direction, TradeInput};
use crate::parse::round2;

/// Derived fields for one trade. All values are pre-rounded to the 2-decimal
/// precision they are persisted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub holding_days: Option<i64>,
    pub pl_amount: Option<f64>,
    pub pl_percent: Option<f64>,
    pub rr_ratio: f64,
}

/// Single calculation contract for both trade conventions: an absent
/// direction means the buy-reference schema, which prices like a Long.
///
/// Chronological order of entry and exit dates is NOT validated here; a
/// negative holding period is surfaced as entered so the caller can flag
/// the data-entry error. Likewise a stop or target on the wrong side of the
/// entry yields a negative R/R, reported as computed.
pub fn derive(input: &TradeInput) -> Derived {
    let direction = input.direction.unwrap_or(Direction::Long);

    let holding_days = input
        .exit_date
        .map(|exit| (exit - input.entry_date).num_days());

    let (pl_amount, pl_percent) = match input.exit_price {
        Some(exit) => {
            let raw = match direction {
                Direction::Long => (exit - input.entry_price) * input.size,
                Direction::Short => (input.entry_price - exit) * input.size,
            };
            let basis = input.entry_price * input.size;
            // Division sentinel: percent is undefined on a zero basis.
            let percent = if basis != 0.0 {
                Some(round2(raw / basis * 100.0))
            } else {
                None
            };
            (Some(round2(raw)), percent)
        }
        None => (None, None),
    };

    let risk = input.entry_price - input.stop_loss;
    let rr_ratio = if risk == 0.0 {
        f64::INFINITY
    } else {
        round2((input.target_price - input.entry_price) / risk)
    };

    Derived {
        holding_days,
        pl_amount,
        pl_percent,
        rr_ratio,
    }
}
