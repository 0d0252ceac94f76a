//! Williams %R.
//!
//! WILLR(n)[i] = -100 * (HH - C[i]) / (HH - LL) where HH/LL are the highest
//! high and lowest low over the n bars ending at i. Range is [-100, 0];
//! readings near -100 are oversold, near 0 overbought. A flat window
//! (HH == LL) pins the value at -50.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_williams_r(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let warmup = period.saturating_sub(1);

    for i in 0..bars.len() {
        let valid = period > 0 && i >= warmup;

        let value = if valid {
            let start = i + 1 - period;
            let window = &bars[start..=i];

            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let range = highest - lowest;

            if range > 0.0 {
                -100.0 * (highest - bars[i].close) / range
            } else {
                -50.0
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
        indicator_type: IndicatorType::WilliamsR(period),
        values,
    }
}
