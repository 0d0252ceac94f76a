//! Rolling z-score of closing price.
//!
//! ZSCORE(n)[i] = (C[i] - SMA(n)[i]) / STDDEV(n)[i] with population
//! standard deviation over the same window. A degenerate window (zero
//! standard deviation) yields 0.0 rather than a division error.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_zscore(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);

    for i in 0..bars.len() {
        let valid = period > 0 && i >= warmup;

        let value = if valid {
            let start = i + 1 - period;
            let window = &bars[start..=i];

            let mean: f64 = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|b| {
                    let diff = b.close - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let stddev = variance.sqrt();

            if stddev > 0.0 {
                (bars[i].close - mean) / stddev
            } else {
                0.0
            }
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
        indicator_type: IndicatorType::ZScore(period),
        values,
    }
}
