//! Durable, ordered trade table backed by `trades.csv`.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use log::warn;

use crate::error::LedgerError;
use crate::models::{Direction, TradeRecord};
use crate::parse::{self, DATE_FORMAT};
use crate::store::{map_csv_error, parse_error, persist_tempfile, rewrite_tempfile};

pub const TRADE_HEADER: [&str; 16] = [
    "Entry Date",
    "Ticker",
    "Setup",
    "Position",
    "Entry Price",
    "Stop Loss",
    "Target Price",
    "Size",
    "Exit Date",
    "Exit Price",
    "P/L $",
    "P/L %",
    "R/R Ratio",
    "Holding Days",
    "Screenshot",
    "Notes",
];

/// Repository owning the authoritative trade table. All reads and writes go
/// through it; the in-memory table commits only after the file write
/// succeeded.
pub struct TradeLedger {
    path: PathBuf,
    rows: Vec<TradeRecord>,
}

impl TradeLedger {
    /// Opens the ledger, degrading a corrupt or unreadable table to an empty
    /// one. Save paths never degrade; see [`TradeLedger::load_all`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let rows = match read_table(&path) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "failed to load {}: {e}; starting with an empty trade table",
                    path.display()
                );
                Vec::new()
            }
        };
        TradeLedger { path, rows }
    }

    pub fn rows(&self) -> &[TradeRecord] {
        &self.rows
    }

    /// Full strict read of the backing file.
    pub fn load_all(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        read_table(&self.path)
    }

    /// Appends one row, creating the table with its header when missing.
    pub fn append(&mut self, record: TradeRecord) -> Result<&TradeRecord, LedgerError> {
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
                .write_record(&TRADE_HEADER)
                .map_err(|e| map_csv_error(&self.path, e))?;
        }
        writer
            .write_record(&record_to_row(&record))
            .map_err(|e| map_csv_error(&self.path, e))?;
        writer.flush()?;

        self.rows.push(record);
        Ok(self.rows.last().expect("row just appended"))
    }

    /// Positional delete: removes exactly one row and rewrites the table.
    pub fn remove(&mut self, index: usize) -> Result<TradeRecord, LedgerError> {
        if index >= self.rows.len() {
            return Err(LedgerError::NotFound(format!(
                "no trade at position {index} (table has {} rows)",
                self.rows.len()
            )));
        }
        let mut next = self.rows.clone();
        let removed = next.remove(index);
        self.rewrite_all(next)?;
        Ok(removed)
    }

    /// Atomically replaces the entire table, then commits it in memory.
    pub fn rewrite_all(&mut self, rows: Vec<TradeRecord>) -> Result<(), LedgerError> {
        let tmp = rewrite_tempfile(&self.path)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file());
            writer
                .write_record(&TRADE_HEADER)
                .map_err(|e| map_csv_error(&self.path, e))?;
            for record in &rows {
                writer
                    .write_record(&record_to_row(record))
                    .map_err(|e| map_csv_error(&self.path, e))?;
            }
            writer.flush()?;
        }
        persist_tempfile(tmp, &self.path)?;
        self.rows = rows;
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<Vec<TradeRecord>, LedgerError> {
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
        rows.push(row_to_record(path, line, &record)?);
    }
    Ok(rows)
}

fn check_header(path: &Path, record: &StringRecord) -> Result<(), LedgerError> {
    let matches = record.len() == TRADE_HEADER.len()
        && record.iter().zip(TRADE_HEADER).all(|(cell, expected)| {
            // A BOM on the first cell is tolerated.
            cell.trim_start_matches('\u{feff}') == expected
        });
    if !matches {
        return Err(parse_error(path, 1, "unexpected trade table header"));
    }
    Ok(())
}

fn record_to_row(t: &TradeRecord) -> [String; 16] {
    [
        t.entry_date.format(DATE_FORMAT).to_string(),
        t.ticker.clone(),
        t.setup.clone(),
        t.direction.map(|d| d.as_str().to_string()).unwrap_or_default(),
        t.entry_price.to_string(),
        t.stop_loss.to_string(),
        t.target_price.to_string(),
        t.size.to_string(),
        t.exit_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        t.exit_price.map(|p| p.to_string()).unwrap_or_default(),
        t.pl_amount.map(|v| format!("{v:.2}")).unwrap_or_default(),
        t.pl_percent.map(|v| format!("{v:.2}")).unwrap_or_default(),
        parse::format_rr(t.rr_ratio),
        t.holding_days.map(|d| d.to_string()).unwrap_or_default(),
        t.screenshot.clone().unwrap_or_default(),
        t.notes.clone(),
    ]
}

fn row_to_record(
    path: &Path,
    line: usize,
    record: &StringRecord,
) -> Result<TradeRecord, LedgerError> {
    if record.len() != TRADE_HEADER.len() {
        return Err(parse_error(
            path,
            line,
            format!("expected {} fields, got {}", TRADE_HEADER.len(), record.len()),
        ));
    }

    let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

    let direction = match cell(3) {
        "" => None,
        raw => Some(Direction::parse(raw).ok_or_else(|| {
            parse_error(path, line, format!("unknown position '{raw}'"))
        })?),
    };

    Ok(TradeRecord {
        entry_date: date_cell(path, line, "Entry Date", cell(0))?,
        ticker: cell(1).to_string(),
        setup: cell(2).to_string(),
        direction,
        entry_price: num_cell(path, line, "Entry Price", cell(4))?,
        stop_loss: num_cell(path, line, "Stop Loss", cell(5))?,
        target_price: num_cell(path, line, "Target Price", cell(6))?,
        size: num_cell(path, line, "Size", cell(7))?,
        exit_date: opt_date_cell(path, line, "Exit Date", cell(8))?,
        exit_price: opt_num_cell(path, line, "Exit Price", cell(9))?,
        pl_amount: opt_num_cell(path, line, "P/L $", cell(10))?,
        pl_percent: opt_num_cell(path, line, "P/L %", cell(11))?,
        rr_ratio: parse::parse_rr(cell(12)).ok_or_else(|| {
            parse_error(path, line, format!("unparsable R/R Ratio '{}'", cell(12)))
        })?,
        holding_days: opt_int_cell(path, line, "Holding Days", cell(13))?,
        screenshot: match cell(14) {
            "" => None,
            s => Some(s.to_string()),
        },
        notes: record.get(15).unwrap_or("").to_string(),
    })
}

fn num_cell(path: &Path, line: usize, name: &str, raw: &str) -> Result<f64, LedgerError> {
    raw.parse::<f64>()
        .map_err(|_| parse_error(path, line, format!("unparsable {name} '{raw}'")))
}

fn opt_num_cell(
    path: &Path,
    line: usize,
    name: &str,
    raw: &str,
) -> Result<Option<f64>, LedgerError> {
    if raw.is_empty() {
        return Ok(None);
    }
    num_cell(path, line, name, raw).map(Some)
}

fn opt_int_cell(
    path: &Path,
    line: usize,
    name: &str,
    raw: &str,
) -> Result<Option<i64>, LedgerError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<i64>()
        .map(Some)
        .map_err(|_| parse_error(path, line, format!("unparsable {name} '{raw}'")))
}

fn date_cell(path: &Path, line: usize, name: &str, raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| parse_error(path, line, format!("unparsable {name} '{raw}'")))
}

fn opt_date_cell(
    path: &Path,
    line: usize,
    name: &str,
    raw: &str,
) -> Result<Option<NaiveDate>, LedgerError> {
    if raw.is_empty() {
        return Ok(None);
    }
    date_cell(path, line, name, raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed_trade() -> TradeRecord {
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
            exit_price: Some(150.0),
            pl_amount: Some(500.0),
            pl_percent: Some(50.0),
            rr_ratio: 3.0,
            holding_days: Some(7),
            screenshot: None,
            notes: "breakout, held a week".into(),
        }
    }

    fn open_trade() -> TradeRecord {
        TradeRecord {
            exit_date: None,
            exit_price: None,
            pl_amount: None,
            pl_percent: None,
            holding_days: None,
            rr_ratio: f64::INFINITY,
            stop_loss: 100.0,
            ..closed_trade()
        }
    }

    #[test]
    fn append_then_load_round_trips_field_for_field() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = TradeLedger::open(dir.path().join("trades.csv"));
        ledger.append(closed_trade()).unwrap();
        ledger.append(open_trade()).unwrap();

        let loaded = ledger.load_all().unwrap();
        assert_eq!(loaded, vec![closed_trade(), open_trade()]);
    }

    #[test]
    fn open_trade_pl_cells_are_empty_not_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        let mut ledger = TradeLedger::open(&path);
        ledger.append(open_trade()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains(",inf,"));
        assert!(!row.contains(",0.00,"));
    }

    #[test]
    fn missing_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TradeLedger::open(dir.path().join("trades.csv"));
        assert!(ledger.rows().is_empty());
        assert!(ledger.load_all().unwrap().is_empty());
    }

    #[test]
    fn remove_deletes_exactly_the_indexed_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = TradeLedger::open(dir.path().join("trades.csv"));
        let mut second = closed_trade();
        second.ticker = "MSFT".into();
        ledger.append(closed_trade()).unwrap();
        ledger.append(second).unwrap();
        ledger.append(open_trade()).unwrap();

        let removed = ledger.remove(1).unwrap();
        assert_eq!(removed.ticker, "MSFT");
        assert_eq!(ledger.rows().len(), 2);
        assert_eq!(ledger.load_all().unwrap(), ledger.rows());
    }

    #[test]
    fn remove_out_of_bounds_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = TradeLedger::open(dir.path().join("trades.csv"));
        assert!(matches!(ledger.remove(0), Err(LedgerError::NotFound(_))));
    }

    #[test]
    fn corrupt_numeric_field_is_a_parse_error_with_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        let header = TRADE_HEADER.join(",");
        fs::write(
            &path,
            format!("{header}\n2024-03-01,AAPL,Momentum,Long,oops,90,130,10,,,,,inf,,,\n"),
        )
        .unwrap();

        let ledger = TradeLedger::open(&path);
        // open() degrades...
        assert!(ledger.rows().is_empty());
        // ...but the strict read reports the corruption.
        match ledger.load_all().unwrap_err() {
            LedgerError::Parse { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("Entry Price"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_row_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        let header = TRADE_HEADER.join(",");
        fs::write(&path, format!("{header}\n2024-03-01,AAPL\n")).unwrap();

        let ledger = TradeLedger::open(&path);
        assert!(matches!(
            ledger.load_all(),
            Err(LedgerError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn foreign_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        fs::write(&path, "Date,Balance\n2024-01-31,1000\n").unwrap();

        let ledger = TradeLedger::open(&path);
        assert!(matches!(
            ledger.load_all(),
            Err(LedgerError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn infinite_rr_serializes_as_inf_literal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        let mut ledger = TradeLedger::open(&path);
        ledger.append(open_trade()).unwrap();

        let loaded = ledger.load_all().unwrap();
        assert!(loaded[0].rr_ratio.is_infinite());
    }
}
