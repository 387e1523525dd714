//! Durable balance-snapshot history backed by `account_history.csv`.
//!
//! The file keeps the plain `Date,Balance` shape; surrogate ids live only in
//! memory and are assigned when a row enters the repository, so edit and
//! delete never match rows by value.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use log::warn;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::BalanceSnapshot;
use crate::parse::DATE_FORMAT;
use crate::store::{map_csv_error, parse_error, persist_tempfile, rewrite_tempfile};

pub const HISTORY_HEADER: [&str; 2] = ["Date", "Balance"];

pub struct BalanceHistory {
    path: PathBuf,
    rows: Vec<BalanceSnapshot>,
}

fn snapshot_id() -> String {
    format!("SNAP-{}", Uuid::new_v4())
}

impl BalanceHistory {
    /// Opens the history, degrading a corrupt or unreadable table to empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let rows = match read_table(&path) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "failed to load {}: {e}; starting with an empty balance history",
                    path.display()
                );
                Vec::new()
            }
        };
        BalanceHistory { path, rows }
    }

    pub fn rows(&self) -> &[BalanceSnapshot] {
        &self.rows
    }

    /// Full strict read of the backing file. Rows get fresh surrogate ids.
    pub fn load_all(&self) -> Result<Vec<BalanceSnapshot>, LedgerError> {
        read_table(&self.path)
    }

    pub fn append(
        &mut self,
        date: NaiveDate,
        balance: f64,
    ) -> Result<&BalanceSnapshot, LedgerError> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(LedgerError::Io(e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(&HISTORY_HEADER)
                .map_err(|e| map_csv_error(&self.path, e))?;
        }
        writer
            .write_record(&snapshot_to_row(date, balance))
            .map_err(|e| map_csv_error(&self.path, e))?;
        writer.flush()?;

        self.rows.push(BalanceSnapshot {
            id: snapshot_id(),
            date,
            balance,
        });
        Ok(self.rows.last().expect("row just appended"))
    }

    /// Rewrites the matched row in place; every other row is untouched.
    pub fn update(
        &mut self,
        id: &str,
        new_date: NaiveDate,
        new_balance: f64,
    ) -> Result<(), LedgerError> {
        let index = self.index_of(id)?;
        let mut next = self.rows.clone();
        next[index].date = new_date;
        next[index].balance = new_balance;
        self.rewrite_all(next)
    }

    /// Removes exactly the matched row.
    pub fn remove(&mut self, id: &str) -> Result<BalanceSnapshot, LedgerError> {
        let index = self.index_of(id)?;
        let mut next = self.rows.clone();
        let removed = next.remove(index);
        self.rewrite_all(next)?;
        Ok(removed)
    }

    /// Atomically replaces the entire table, then commits it in memory.
    pub fn rewrite_all(&mut self, rows: Vec<BalanceSnapshot>) -> Result<(), LedgerError> {
        write_table(&self.path, &rows)?;
        self.rows = rows;
        Ok(())
    }

    /// Writes an arbitrary row set (e.g. a filtered view) to a caller-chosen
    /// destination, same format as the backing table.
    pub fn export(path: &Path, rows: &[BalanceSnapshot]) -> Result<(), LedgerError> {
        write_table(path, rows)
    }

    fn index_of(&self, id: &str) -> Result<usize, LedgerError> {
        self.rows
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("no balance snapshot with id {id}")))
    }
}

fn snapshot_to_row(date: NaiveDate, balance: f64) -> [String; 2] {
    [date.format(DATE_FORMAT).to_string(), balance.to_string()]
}

fn write_table(path: &Path, rows: &[BalanceSnapshot]) -> Result<(), LedgerError> {
    let tmp = rewrite_tempfile(path)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file());
        writer
            .write_record(&HISTORY_HEADER)
            .map_err(|e| map_csv_error(path, e))?;
        for row in rows {
            writer
                .write_record(&snapshot_to_row(row.date, row.balance))
                .map_err(|e| map_csv_error(path, e))?;
        }
        writer.flush()?;
    }
    persist_tempfile(tmp, path)
}

fn read_table(path: &Path) -> Result<Vec<BalanceSnapshot>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| map_csv_error(path, e))?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| map_csv_error(path, e))?;
        let line = record.position().map_or(i + 1, |p| p.line() as usize);
        if i == 0 {
            check_header(path, &record)?;
            continue;
        }
        rows.push(row_to_snapshot(path, line, &record)?);
    }
    Ok(rows)
}

fn check_header(path: &Path, record: &StringRecord) -> Result<(), LedgerError> {
    let matches = record.len() == HISTORY_HEADER.len()
        && record.iter().zip(HISTORY_HEADER).all(|(cell, expected)| {
            cell.trim_start_matches('\u{feff}') == expected
        });
    if !matches {
        return Err(parse_error(path, 1, "unexpected balance history header"));
    }
    Ok(())
}

fn row_to_snapshot(
    path: &Path,
    line: usize,
    record: &StringRecord,
) -> Result<BalanceSnapshot, LedgerError> {
    if record.len() != HISTORY_HEADER.len() {
        return Err(parse_error(
            path,
            line,
            format!("expected 2 fields, got {}", record.len()),
        ));
    }
    let date_raw = record.get(0).unwrap_or("").trim();
    let balance_raw = record.get(1).unwrap_or("").trim();

    let date = NaiveDate::parse_from_str(date_raw, DATE_FORMAT)
        .map_err(|_| parse_error(path, line, format!("unparsable Date '{date_raw}'")))?;
    let balance = balance_raw
        .parse::<f64>()
        .map_err(|_| parse_error(path, line, format!("unparsable Balance '{balance_raw}'")))?;

    Ok(BalanceSnapshot {
        id: snapshot_id(),
        date,
        balance,
    })
}
