//! CSV transaction log writer.
//!
//! One row per transaction:
//! `Date,Action,Price,Shares,PnL,Return%,Portfolio_Value`. Timestamps to
//! second precision, money and percent fields to 2 decimals, share
//! quantity to 6 decimals. The file is a reporting artifact; the engine
//! never reads it back.

use crate::domain::engine::Transaction;
use crate::domain::error::SigtraderError;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub struct TransactionLogAdapter;

impl TransactionLogAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TransactionLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TransactionLogAdapter {
    fn write(
        &self,
        transactions: &[Transaction],
        output_path: &Path,
    ) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;

        wtr.write_record([
            "Date",
            "Action",
            "Price",
            "Shares",
            "PnL",
            "Return%",
            "Portfolio_Value",
        ])
        .map_err(|e| SigtraderError::Data {
            reason: format!("CSV write error: {e}"),
        })?;

        for txn in transactions {
            wtr.write_record([
                txn.time.format("%Y-%m-%d %H:%M:%S").to_string(),
                txn.action.to_string(),
                format!("{:.2}", txn.price),
                format!("{:.6}", txn.shares),
                format!("{:.2}", txn.pnl),
                format!("{:.2}", txn.return_pct),
                format!("{:.2}", txn.portfolio_value),
            ])
            .map_err(|e| SigtraderError::Data {
                reason: format!("CSV write error: {e}"),
            })?;
        }

        wtr.flush()?;
        Ok(())
    }
}
