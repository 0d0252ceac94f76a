//! Report generation port trait.

use crate::domain::engine::Transaction;
use crate::domain::error::SigtraderError;
use std::path::Path;

/// Port for persisting the transaction log.
pub trait ReportPort {
    fn write(&self, transactions: &[Transaction], output_path: &Path)
        -> Result<(), SigtraderError>;
}
