//! Performance analytics over the trade table and the balance history.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::journal::Journal;
use crate::models::{BalanceSnapshot, TradeRecord};

/// Aggregate statistics over the trade table. Only closed trades (rows with
/// a realized P/L) participate; `open_trades` just counts the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub open_trades: usize,
    pub wins: usize,
    /// Non-winning closed trades; an exact-zero P/L counts as a loss.
    pub losses: usize,
    pub win_rate: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
    pub expectancy: f64,
    /// `f64::INFINITY` when there are wins and the loss sum is exactly 0.
    pub profit_factor: f64,
    pub total_pl: f64,
    pub avg_trade: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    /// Running prefix sums over realized P/L, in table order. The engine
    /// does not re-sort by date.
    pub cumulative_pl: Vec<f64>,
    /// Deepest decline of the cumulative P/L curve below its prior peak,
    /// reported as a non-positive number.
    pub max_drawdown: f64,
    pub current_balance: f64,
}

/// Aggregate statistics over a (possibly filtered) balance history. An empty
/// input yields the all-zero default, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n − 1); 0 with fewer than two rows.
    pub std_dev: f64,
    /// Non-positive; 0 if the balance never dips below a prior peak.
    pub max_drawdown: f64,
    pub monthly_change: Vec<MonthlyChange>,
    pub months_positive: usize,
    pub months_negative: usize,
}

/// Last balance of a calendar-month bucket minus the previous bucket's last
/// balance. The first bucket has no baseline and reports 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyChange {
    pub year: i32,
    pub month: u32,
    pub change: f64,
}

/// Difference between a current balance and the configured starting balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountChange {
    pub diff: f64,
    pub percent: f64,
}

impl Journal {
    pub fn trade_statistics(&self) -> TradeStats {
        summarize_trades(self.trades(), self.settings().starting_balance)
    }

    pub fn history_statistics(&self, rows: &[BalanceSnapshot]) -> HistoryStats {
        summarize_history(rows)
    }

    /// Starting balance plus the sum of all realized P/L.
    pub fn current_balance(&self) -> f64 {
        let realized: f64 = self.trades().iter().filter_map(|t| t.pl_amount).sum();
        self.settings().starting_balance + realized
    }

    /// A trade's P/L as a percentage of the current balance; `None` (not
    /// applicable) for open trades or a non-positive balance.
    pub fn balance_impact(&self, trade: &TradeRecord) -> Option<f64> {
        trade
            .pl_amount
            .and_then(|pl| balance_impact(pl, self.current_balance()))
    }

    pub fn account_change(&self, current: f64) -> AccountChange {
        account_change(self.settings().starting_balance, current)
    }
}

pub fn summarize_trades(trades: &[TradeRecord], starting_balance: f64) -> TradeStats {
    let closed: Vec<f64> = trades.iter().filter_map(|t| t.pl_amount).collect();
    let open_trades = trades.len() - closed.len();
    let total_trades = closed.len();

    let gains: Vec<f64> = closed.iter().copied().filter(|pl| *pl > 0.0).collect();
    let losses: Vec<f64> = closed.iter().copied().filter(|pl| *pl <= 0.0).collect();

    let win_rate = if total_trades > 0 {
        gains.len() as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };
    let avg_gain = mean(&gains);
    let avg_loss = mean(&losses);
    let expectancy = if total_trades > 0 {
        win_rate / 100.0 * avg_gain + (1.0 - win_rate / 100.0) * avg_loss
    } else {
        0.0
    };

    let gross_profit: f64 = gains.iter().sum();
    let gross_loss = losses.iter().sum::<f64>().abs();
    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let total_pl: f64 = closed.iter().sum();
    let cumulative_pl: Vec<f64> = closed
        .iter()
        .scan(0.0, |acc, pl| {
            *acc += pl;
            Some(*acc)
        })
        .collect();

    let (best_trade, worst_trade) = if closed.is_empty() {
        (0.0, 0.0)
    } else {
        (
            closed.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            closed.iter().copied().fold(f64::INFINITY, f64::min),
        )
    };

    TradeStats {
        total_trades,
        open_trades,
        wins: gains.len(),
        losses: losses.len(),
        win_rate,
        avg_gain,
        avg_loss,
        expectancy,
        profit_factor,
        total_pl,
        avg_trade: mean(&closed),
        best_trade,
        worst_trade,
        max_drawdown: max_drawdown(cumulative_pl.iter().copied()),
        cumulative_pl,
        current_balance: starting_balance + total_pl,
    }
}

pub fn summarize_history(rows: &[BalanceSnapshot]) -> HistoryStats {
    if rows.is_empty() {
        return HistoryStats::default();
    }

    let balances: Vec<f64> = rows.iter().map(|s| s.balance).collect();
    let count = balances.len();
    let average = mean(&balances);
    let min = balances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = balances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = if count > 1 {
        let variance = balances
            .iter()
            .map(|b| (b - average).powi(2))
            .sum::<f64>()
            / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    // Last observed balance per calendar month, buckets in chronological
    // order; within a bucket the last row in insertion order wins.
    let mut last_by_month: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for snapshot in rows {
        last_by_month.insert(
            (snapshot.date.year(), snapshot.date.month()),
            snapshot.balance,
        );
    }

    let mut monthly_change = Vec::with_capacity(last_by_month.len());
    let mut previous: Option<f64> = None;
    for ((year, month), last) in last_by_month {
        let change = previous.map_or(0.0, |prev| last - prev);
        monthly_change.push(MonthlyChange { year, month, change });
        previous = Some(last);
    }

    let months_positive = monthly_change.iter().filter(|m| m.change > 0.0).count();
    let months_negative = monthly_change.iter().filter(|m| m.change < 0.0).count();

    HistoryStats {
        count,
        average,
        min,
        max,
        std_dev,
        max_drawdown: max_drawdown(balances.iter().copied()),
        monthly_change,
        months_positive,
        months_negative,
    }
}

/// P/L as a percentage of the current balance; `None` when the balance is
/// non-positive, since a percentage of a non-positive base is meaningless.
pub fn balance_impact(pl: f64, current_balance: f64) -> Option<f64> {
    if current_balance > 0.0 {
        Some(pl / current_balance * 100.0)
    } else {
        None
    }
}

pub fn account_change(starting: f64, current: f64) -> AccountChange {
    let diff = current - starting;
    let percent = if starting != 0.0 {
        (current / starting - 1.0) * 100.0
    } else {
        0.0
    };
    AccountChange { diff, percent }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Deepest decline below the running peak; 0 for an empty or never-declining
/// series.
fn max_drawdown(series: impl IntoIterator<Item = f64>) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for value in series {
        peak = peak.max(value);
        worst = worst.min(value - peak);
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed(pl: f64) -> TradeRecord {
        TradeRecord {
            entry_date: date(2024, 3, 1),
            ticker: "AAPL".into(),
            setup: "Momentum".into(),
            direction: Some(Direction::Long),
            entry_price: 100.0,
            stop_loss: 90.0,
            target_price: 130.0,
            size: 10.0,
            exit_date: Some(date(2024, 3, 8)),
            exit_price: Some(100.0 + pl / 10.0),
            pl_amount: Some(pl),
            pl_percent: Some(pl / 10.0),
            rr_ratio: 3.0,
            holding_days: Some(7),
            screenshot: None,
            notes: String::new(),
        }
    }

    fn open() -> TradeRecord {
        TradeRecord {
            exit_date: None,
            exit_price: None,
            pl_amount: None,
            pl_percent: None,
            holding_days: None,
            ..closed(0.0)
        }
    }

    fn snap(y: i32, m: u32, d: u32, balance: f64) -> BalanceSnapshot {
        BalanceSnapshot {
            id: format!("SNAP-{y}-{m}-{d}"),
            date: date(y, m, d),
            balance,
        }
    }

    #[test]
    fn reference_scenario() {
        // entry 100 exit 150 size 10 → +500; entry 100 exit 80 size 10 → -200
        let trades = vec![closed(500.0), closed(-200.0)];
        let stats = summarize_trades(&trades, 0.0);
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.win_rate, 50.0);
        assert_eq!(stats.avg_gain, 500.0);
        assert_eq!(stats.avg_loss, -200.0);
        assert_eq!(stats.expectancy, 150.0);
        assert_eq!(stats.profit_factor, 2.5);
        assert_eq!(stats.cumulative_pl, vec![500.0, 300.0]);
        assert_eq!(stats.max_drawdown, -200.0);
        assert_eq!(stats.best_trade, 500.0);
        assert_eq!(stats.worst_trade, -200.0);
    }

    #[test]
    fn no_closed_trades_is_all_zero_not_nan() {
        let stats = summarize_trades(&[open(), open()], 1000.0);
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.open_trades, 2);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.expectancy, 0.0);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.current_balance, 1000.0);
        assert!(stats.cumulative_pl.is_empty());
    }

    #[test]
    fn win_rate_stays_within_bounds() {
        let all_wins = summarize_trades(&[closed(10.0), closed(20.0)], 0.0);
        assert_eq!(all_wins.win_rate, 100.0);
        let all_losses = summarize_trades(&[closed(-10.0)], 0.0);
        assert_eq!(all_losses.win_rate, 0.0);
    }

    #[test]
    fn profit_factor_is_infinite_only_with_wins_and_no_losses() {
        let no_losses = summarize_trades(&[closed(100.0)], 0.0);
        assert!(no_losses.profit_factor.is_infinite());

        // A zero-P/L trade counts as a loss but adds nothing to the loss
        // sum, so the sentinel still applies.
        let with_zero = summarize_trades(&[closed(100.0), closed(0.0)], 0.0);
        assert!(with_zero.profit_factor.is_infinite());
        assert_eq!(with_zero.losses, 1);
        assert_eq!(with_zero.win_rate, 50.0);
    }

    #[test]
    fn zero_pl_counts_as_a_loss_in_averages() {
        let stats = summarize_trades(&[closed(100.0), closed(0.0), closed(-50.0)], 0.0);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.avg_loss, -25.0);
    }

    #[test]
    fn reference_history_scenario() {
        let rows = vec![
            snap(2024, 1, 31, 1000.0),
            snap(2024, 2, 28, 1200.0),
            snap(2024, 3, 31, 1100.0),
        ];
        let stats = summarize_history(&rows);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max_drawdown, -100.0);
        assert_eq!(
            stats.monthly_change,
            vec![
                MonthlyChange { year: 2024, month: 1, change: 0.0 },
                MonthlyChange { year: 2024, month: 2, change: 200.0 },
                MonthlyChange { year: 2024, month: 3, change: -100.0 },
            ]
        );
        assert_eq!(stats.months_positive, 1);
        assert_eq!(stats.months_negative, 1);
    }

    #[test]
    fn last_observation_wins_within_a_month() {
        let rows = vec![
            snap(2024, 1, 10, 1000.0),
            snap(2024, 1, 31, 1050.0),
            snap(2024, 2, 28, 1150.0),
        ];
        let stats = summarize_history(&rows);
        assert_eq!(stats.monthly_change.len(), 2);
        assert_eq!(stats.monthly_change[1].change, 100.0);
    }

    #[test]
    fn buckets_span_year_boundaries_in_order() {
        let rows = vec![
            snap(2023, 12, 31, 500.0),
            snap(2024, 1, 31, 700.0),
        ];
        let stats = summarize_history(&rows);
        assert_eq!(stats.monthly_change[0].year, 2023);
        assert_eq!(stats.monthly_change[1].change, 200.0);
    }

    #[test]
    fn empty_history_yields_the_no_data_value() {
        let stats = summarize_history(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.max_drawdown, 0.0);
        assert!(stats.monthly_change.is_empty());
    }

    #[test]
    fn std_dev_uses_the_sample_convention() {
        let rows = vec![
            snap(2024, 1, 1, 2.0),
            snap(2024, 1, 2, 4.0),
            snap(2024, 1, 3, 6.0),
        ];
        let stats = summarize_history(&rows);
        assert_eq!(stats.average, 4.0);
        assert!((stats.std_dev - 2.0).abs() < 1e-9);

        let single = summarize_history(&rows[..1]);
        assert_eq!(single.std_dev, 0.0);
    }

    #[test]
    fn never_declining_balance_has_zero_drawdown() {
        let rows = vec![
            snap(2024, 1, 1, 100.0),
            snap(2024, 2, 1, 150.0),
            snap(2024, 3, 1, 150.0),
        ];
        assert_eq!(summarize_history(&rows).max_drawdown, 0.0);
    }

    #[test]
    fn balance_impact_is_not_applicable_on_a_nonpositive_base() {
        assert_eq!(balance_impact(50.0, 1000.0), Some(5.0));
        assert_eq!(balance_impact(50.0, 0.0), None);
        assert_eq!(balance_impact(50.0, -100.0), None);
    }

    #[test]
    fn account_change_handles_a_zero_start() {
        let change = account_change(1000.0, 1100.0);
        assert_eq!(change.diff, 100.0);
        assert!((change.percent - 10.0).abs() < 1e-9);

        let from_zero = account_change(0.0, 500.0);
        assert_eq!(from_zero.diff, 500.0);
        assert_eq!(from_zero.percent, 0.0);
    }
}
