use std::path::Path;

use chrono::{Datelike, NaiveDate};

use crate::error::LedgerError;
use crate::journal::Journal;
use crate::models::BalanceSnapshot;
use crate::store::BalanceHistory;

/// Sortable balance-history columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Balance,
}

impl Journal {
    pub fn add_snapshot(
        &mut self,
        date: NaiveDate,
        balance: f64,
    ) -> Result<&BalanceSnapshot, LedgerError> {
        self.history.append(date, balance)
    }

    /// Edit by surrogate id; `NotFound` when the id no longer matches.
    pub fn update_snapshot(
        &mut self,
        id: &str,
        new_date: NaiveDate,
        new_balance: f64,
    ) -> Result<(), LedgerError> {
        self.history.update(id, new_date, new_balance)
    }

    pub fn delete_snapshot(&mut self, id: &str) -> Result<BalanceSnapshot, LedgerError> {
        self.history.remove(id)
    }

    /// Full history, insertion order.
    pub fn history(&self) -> &[BalanceSnapshot] {
        self.history.rows()
    }

    /// Restricts the history to a calendar year and/or month, preserving
    /// relative order. An empty result is a valid "no data" outcome.
    pub fn filtered_history(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Vec<BalanceSnapshot> {
        self.history
            .rows()
            .iter()
            .filter(|s| year.is_none_or(|y| s.date.year() == y))
            .filter(|s| month.is_none_or(|m| s.date.month() == m))
            .cloned()
            .collect()
    }

    /// Writes the given (typically filtered) rows to a caller-chosen path.
    pub fn export_history(
        &self,
        path: impl AsRef<Path>,
        rows: &[BalanceSnapshot],
    ) -> Result<(), LedgerError> {
        BalanceHistory::export(path.as_ref(), rows)
    }
}

/// Display-only stable sort; the backing store keeps insertion order.
pub fn sort_history(
    rows: &[BalanceSnapshot],
    key: SortKey,
    descending: bool,
) -> Vec<BalanceSnapshot> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ord = match key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Balance => a.balance.total_cmp(&b.balance),
        };
        if descending { ord.reverse() } else { ord }
    });
    sorted
}
