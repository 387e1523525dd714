use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, balance) observation of account equity.
///
/// `id` is a surrogate identifier assigned when the row enters the
/// repository; edit and delete look rows up by it, never by the
/// (date, balance) value pair, so duplicate observations stay addressable.
/// The durable table persists only date and balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub id: String,
    pub date: NaiveDate,
    pub balance: f64,
}
