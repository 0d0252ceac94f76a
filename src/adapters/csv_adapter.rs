//! CSV bar file data adapter.
//!
//! Expects a header row and `timestamp,open,high,low,close,volume`
//! columns. Timestamps are `%Y-%m-%d %H:%M:%S`; a bare `%Y-%m-%d` is
//! accepted for daily bars and lands on midnight.

use crate::domain::bar::Bar;
use crate::domain::error::SigtraderError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SigtraderError> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|e| SigtraderError::Data {
            reason: format!("invalid timestamp {value:?}: {e}"),
        })
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'a str, SigtraderError> {
    record.get(index).ok_or_else(|| SigtraderError::Data {
        reason: format!("missing {name} column"),
    })
}

fn parse_f64(value: &str, name: &str) -> Result<f64, SigtraderError> {
    value.parse().map_err(|e| SigtraderError::Data {
        reason: format!("invalid {name} value {value:?}: {e}"),
    })
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, SigtraderError> {
        let mut rdr =
            csv::Reader::from_path(&self.path).map_err(|e| SigtraderError::Data {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })?;

        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error: {e}"),
            })?;

            let timestamp = parse_timestamp(field(&record, 0, "timestamp")?)?;
            let open = parse_f64(field(&record, 1, "open")?, "open")?;
            let high = parse_f64(field(&record, 2, "high")?, "high")?;
            let low = parse_f64(field(&record, 3, "low")?, "low")?;
            let close = parse_f64(field(&record, 4, "close")?, "close")?;
            let volume: i64 =
                field(&record, 5, "volume")?
                    .parse()
                    .map_err(|e| SigtraderError::Data {
                        reason: format!("invalid volume value: {e}"),
                    })?;

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}
