//! Instrument and setup vocabularies for entry forms. Plain data for the
//! presentation layer; the core never constrains tickers or setups to them.

pub const FOREX_PAIRS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "USD/CHF", "USD/CAD",
    "AUD/USD", "NZD/USD", "EUR/GBP", "EUR/JPY", "GBP/JPY",
];

pub const INDICES: &[&str] = &[
    "NASDAQ", "S&P 500", "DOW 30", "FTSE 100", "DAX",
    "NIKKEI 225", "HANG SENG", "ASX 200",
];

pub const COMMODITIES: &[&str] = &["GOLD", "SILVER", "CRUDE OIL", "NATURAL GAS", "COPPER"];

pub const SETUP_TYPES: &[&str] = &[
    "SMC - 4H Fair Value Gap",
    "SMC - 4H Breaker Block",
    "SMC - 4H Order Block",
    "SMC - 4H Mitigation Block",
    "SMC - 15min Fair Value Gap",
    "SMC - 15min Breaker Block",
    "SMC - 15min Order Block",
    "SMC - 15min Mitigation Block",
    "FIB - 4H 0.618 Retracement",
    "FIB - 4H 0.786 Retracement",
    "FIB - 4H Extension 1.618",
    "FIB - 15min 0.618 Retracement",
    "FIB - 15min 0.786 Retracement",
    "FIB - 15min Extension 1.618",
    "Support/Resistance",
    "Moving Average",
    "Trend Line Break",
    "Pattern Trade",
    "Gap Fill",
    "Momentum",
    "Other",
];
