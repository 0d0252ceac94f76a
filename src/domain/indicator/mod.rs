//! Technical indicator implementations.
//!
//! Every indicator is a pure function from a bar slice to an
//! [`IndicatorSeries`] aligned with the input: one [`IndicatorPoint`] per
//! bar, with `valid = false` during the look-back warmup.

pub mod rsi;
pub mod sma;
pub mod volatility;
pub mod williams_r;
pub mod zscore;

use chrono::NaiveDateTime;
use std::fmt;

/// A single point in an indicator time series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

/// Indicator identity plus its look-back parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    ZScore(usize),
    Rsi(usize),
    WilliamsR(usize),
    Volatility(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at index `i`, or `None` while the indicator is still warming up.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values
            .get(i)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::ZScore(period) => write!(f, "ZSCORE({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLR({})", period),
            IndicatorType::Volatility(period) => write!(f, "VOLATILITY({})", period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "RSI(14)");
        assert_eq!(IndicatorType::WilliamsR(14).to_string(), "WILLR(14)");
        assert_eq!(IndicatorType::ZScore(50).to_string(), "ZSCORE(50)");
        assert_eq!(IndicatorType::Volatility(20).to_string(), "VOLATILITY(20)");
    }

    #[test]
    fn value_at_respects_validity() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![
                IndicatorPoint {
                    timestamp: ts,
                    valid: false,
                    value: 0.0,
                },
                IndicatorPoint {
                    timestamp: ts,
                    valid: true,
                    value: 42.0,
                },
            ],
        };

        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(42.0));
        assert_eq!(series.value_at(2), None);
    }
}
