//! Key-value settings document, `trading_config.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::LedgerError;
use crate::models::Settings;
use crate::store::{persist_tempfile, rewrite_tempfile};

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, falling back to defaults for a missing file,
    /// missing keys, or an unreadable document.
    pub fn load(&self) -> Settings {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Settings::default();
            }
            Err(e) => {
                warn!(
                    "failed to read {}: {e}; using default settings",
                    self.path.display()
                );
                return Settings::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "corrupt settings in {}: {e}; using defaults",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    /// Persists the document; save failures propagate to the caller.
    pub fn save(&self, settings: &Settings) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(settings).map_err(|e| LedgerError::Parse {
            file: self.path.display().to_string(),
            line: 0,
            message: e.to_string(),
        })?;
        let mut tmp = rewrite_tempfile(&self.path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        persist_tempfile(tmp, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("trading_config.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("trading_config.json"));
        let settings = Settings {
            starting_balance: 10_000.0,
            theme: "clam".to_string(),
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn corrupt_document_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trading_config.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(ConfigStore::new(&path).load(), Settings::default());
    }

    #[test]
    fn partial_document_keeps_per_key_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trading_config.json");
        fs::write(&path, r##"{"profit_color": "#00ff00"}"##).unwrap();
        let settings = ConfigStore::new(&path).load();
        assert_eq!(settings.profit_color, "#00ff00");
        assert_eq!(settings.loss_color, "#bb2124");
        assert_eq!(settings.starting_balance, 0.0);
    }
}
