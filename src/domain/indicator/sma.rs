//! Simple moving average.
//!
//! SMA(n)[i] = mean of the n closing prices ending at bar i.
//! Warmup: first (n-1) bars are invalid. The ramped variant shrinks the
//! window to the available history instead, so it is defined from bar 0.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);

    for i in 0..bars.len() {
        let valid = period > 0 && i >= warmup;

        let value = if valid {
            let start = i + 1 - period;
            bars[start..=i].iter().map(|b| b.close).sum::<f64>() / period as f64
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

/// Moving average with a ramp-in: the mean is taken over min(period, i+1)
/// bars, so every point is valid.
pub fn calculate_sma_ramped(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let start = (i + 1).saturating_sub(period.max(1));
        let window = &bars[start..=i];
        let value = window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64;

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid: true,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
