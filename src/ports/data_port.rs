//! Data access port trait.

use chrono::NaiveDateTime;

use crate::domain::bar::Bar;
use crate::domain::error::SigtraderError;

pub trait DataPort {
    /// Load the full bar series, sorted by timestamp.
    fn load_bars(&self) -> Result<Vec<Bar>, SigtraderError>;

    /// First timestamp, last timestamp, and bar count, or `None` when the
    /// source is empty.
    fn data_range(
        &self,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, SigtraderError> {
        let bars = self.load_bars()?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => {
                Ok(Some((first.timestamp, last.timestamp, bars.len())))
            }
            _ => Ok(None),
        }
    }
}
