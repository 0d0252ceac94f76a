//! Rolling volatility.
//!
//! VOLATILITY(n)[i] = population standard deviation of the n bar-to-bar
//! simple returns ending at bar i.
//! Warmup: first n bars are invalid (n returns need n+1 closes).

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub fn calculate_volatility(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut returns = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 {
            returns.push(0.0);
        } else {
            returns.push(bars[i].simple_return(bars[i - 1].close));
        }
    }

    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let valid = period > 0 && i >= period;

        let value = if valid {
            // returns[i-period+1..=i] are the n returns ending at bar i
            let window = &returns[i + 1 - period..=i];
            let mean: f64 = window.iter().sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|r| {
                    let diff = r - mean;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            variance.sqrt()
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
        indicator_type: IndicatorType::Volatility(period),
        values,
    }
}
