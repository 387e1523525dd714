pub mod balance;
pub mod config;
pub mod trades;

pub use balance::BalanceHistory;
pub use config::ConfigStore;
pub use trades::TradeLedger;

use std::path::Path;

use crate::error::LedgerError;

/// Temp file in the same directory as `path`, so the closing rename stays on
/// one filesystem and the whole-table rewrite is atomic.
pub(crate) fn rewrite_tempfile(path: &Path) -> Result<tempfile::NamedTempFile, LedgerError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
        None => tempfile::NamedTempFile::new_in(".")?,
    };
    Ok(tmp)
}

pub(crate) fn persist_tempfile(
    tmp: tempfile::NamedTempFile,
    path: &Path,
) -> Result<(), LedgerError> {
    tmp.persist(path).map_err(|e| LedgerError::Io(e.error))?;
    Ok(())
}

/// Classify a csv-crate error: transport problems stay `Io`, everything else
/// is corrupt stored data.
pub(crate) fn map_csv_error(path: &Path, err: csv::Error) -> LedgerError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => LedgerError::Io(e),
        _ => LedgerError::Parse {
            file: path.display().to_string(),
            line,
            message,
        },
    }
}

pub(crate) fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> LedgerError {
    LedgerError::Parse {
        file: path.display().to_string(),
        line,
        message: message.into(),
    }
}
