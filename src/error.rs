use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// `Validation` and `NotFound` are recoverable and meant to be surfaced to
/// the user as-is; `Parse` and `Io` on load degrade to an empty table at the
/// store boundary, while on save they propagate so the caller knows the
/// write did not take effect.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no matching record: {0}")]
    NotFound(String),
}

impl LedgerError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }
}
