use serde::{Deserialize, Serialize};

/// Process-wide account configuration, persisted as a small JSON document.
/// Missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Baseline for the analytics engine: current balance is
    /// starting balance plus the sum of all realized P/L.
    pub starting_balance: f64,
    pub theme: String,
    pub profit_color: String,
    pub loss_color: String,
    pub chart_style: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            starting_balance: 0.0,
            theme: "arc".to_string(),
            profit_color: "#22bb33".to_string(),
            loss_color: "#bb2124".to_string(),
            chart_style: "Default".to_string(),
        }
    }
}

/// Partial settings update; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub starting_balance: Option<f64>,
    pub theme: Option<String>,
    pub profit_color: Option<String>,
    pub loss_color: Option<String>,
    pub chart_style: Option<String>,
}
