//! The operation layer: a single facade owning the three stores, exposing
//! the calls the presentation layer makes. All mutations go through
//! `&mut self`, so a load-modify-rewrite sequence can never interleave with
//! another.

mod balance;
mod settings;
mod stats;
mod trades;

use std::fs;
use std::path::Path;

use log::{info, warn};

pub use balance::SortKey;
pub use balance::sort_history;
pub use stats::{
    AccountChange, HistoryStats, MonthlyChange, TradeStats, account_change, balance_impact,
    summarize_history, summarize_trades,
};

use crate::models::Settings;
use crate::store::{BalanceHistory, ConfigStore, TradeLedger};

pub const TRADES_FILE: &str = "trades.csv";
pub const HISTORY_FILE: &str = "account_history.csv";
pub const CONFIG_FILE: &str = "trading_config.json";

pub struct Journal {
    trades: TradeLedger,
    history: BalanceHistory,
    config: ConfigStore,
    settings: Settings,
}

impl Journal {
    /// Opens (or creates) the data directory and all three stores. Corrupt
    /// or unreadable tables degrade to empty with a logged warning; save
    /// failures later still propagate.
    pub fn open(data_dir: impl AsRef<Path>) -> Journal {
        let dir = data_dir.as_ref();
        if let Err(e) = fs::create_dir_all(dir) {
            warn!("failed to create data directory {}: {e}", dir.display());
        }

        let trades = TradeLedger::open(dir.join(TRADES_FILE));
        let history = BalanceHistory::open(dir.join(HISTORY_FILE));
        let config = ConfigStore::new(dir.join(CONFIG_FILE));
        let settings = config.load();

        info!(
            "journal opened: {} trades, {} balance snapshots",
            trades.rows().len(),
            history.rows().len()
        );

        Journal {
            trades,
            history,
            config,
            settings,
        }
    }
}
