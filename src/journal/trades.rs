use crate::calc;
use crate::error::LedgerError;
use crate::journal::Journal;
use crate::models::{TradeInput, TradeRecord};

impl Journal {
    /// Validates and derives, then persists. Nothing is stored when
    /// validation fails, and the derived fields always come from the
    /// calculator, never from the caller.
    pub fn submit_trade(&mut self, input: TradeInput) -> Result<&TradeRecord, LedgerError> {
        validate(&input)?;
        let derived = calc::derive(&input);
        let record = TradeRecord {
            entry_date: input.entry_date,
            ticker: input.ticker.trim().to_uppercase(),
            setup: input.setup,
            direction: input.direction,
            entry_price: input.entry_price,
            stop_loss: input.stop_loss,
            target_price: input.target_price,
            size: input.size,
            exit_date: input.exit_date,
            exit_price: input.exit_price,
            pl_amount: derived.pl_amount,
            pl_percent: derived.pl_percent,
            rr_ratio: derived.rr_ratio,
            holding_days: derived.holding_days,
            screenshot: input.screenshot,
            notes: input.notes,
        };
        self.trades.append(record)
    }

    /// Full ordered trade table, insertion order.
    pub fn trades(&self) -> &[TradeRecord] {
        self.trades.rows()
    }

    /// Positional delete followed by a full rewrite of the store.
    pub fn delete_trade(&mut self, index: usize) -> Result<TradeRecord, LedgerError> {
        self.trades.remove(index)
    }
}

fn validate(input: &TradeInput) -> Result<(), LedgerError> {
    if input.ticker.trim().is_empty() {
        return Err(LedgerError::invalid("ticker", "value is required"));
    }
    if input.setup.trim().is_empty() {
        return Err(LedgerError::invalid("setup", "value is required"));
    }
    if input.entry_price <= 0.0 {
        return Err(LedgerError::invalid(
            "entry price",
            "must be greater than zero",
        ));
    }
    if input.size <= 0.0 {
        return Err(LedgerError::invalid("size", "must be greater than zero"));
    }
    Ok(())
}
