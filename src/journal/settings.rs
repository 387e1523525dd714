use crate::error::LedgerError;
use crate::journal::Journal;
use crate::models::{Settings, SettingsUpdate};

impl Journal {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Applies the provided fields and persists the document. The in-memory
    /// settings commit only after the write succeeded.
    pub fn update_settings(&mut self, update: SettingsUpdate) -> Result<&Settings, LedgerError> {
        let mut next = self.settings.clone();
        if let Some(val) = update.starting_balance {
            next.starting_balance = val;
        }
        if let Some(val) = update.theme {
            next.theme = val;
        }
        if let Some(val) = update.profit_color {
            next.profit_color = val;
        }
        if let Some(val) = update.loss_color {
            next.loss_color = val;
        }
        if let Some(val) = update.chart_style {
            next.chart_style = val;
        }

        self.config.save(&next)?;
        self.settings = next;
        Ok(&self.settings)
    }
}
