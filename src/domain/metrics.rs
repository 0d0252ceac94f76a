//! Performance metrics derived from a finished equity series.
//!
//! All three metrics are pure reductions. Annualization uses a
//! caller-supplied periods-per-year constant (252 for daily bars); it is
//! deliberately not inferred from timestamps, so intraday runs must set it
//! to match their bar interval.

use crate::domain::engine::LedgerRow;

pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub cagr: f64,
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline, as a non-positive fraction.
    pub max_drawdown: f64,
}

impl Metrics {
    pub fn compute(ledger: &[LedgerRow], periods_per_year: f64) -> Self {
        let equity: Vec<f64> = ledger.iter().map(|row| row.total).collect();

        Metrics {
            cagr: compute_cagr(&equity, periods_per_year),
            sharpe_ratio: compute_sharpe(&equity, periods_per_year),
            max_drawdown: compute_max_drawdown(&equity),
        }
    }
}

/// (end/start)^(1/years) - 1 with years = bar_count / periods_per_year.
/// Zero when the series is too short or degenerate to annualize.
fn compute_cagr(equity: &[f64], periods_per_year: f64) -> f64 {
    if equity.len() < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }

    let start = equity[0];
    let end = equity[equity.len() - 1];
    if start <= 0.0 || end <= 0.0 {
        return 0.0;
    }

    let years = equity.len() as f64 / periods_per_year;
    (end / start).powf(1.0 / years) - 1.0
}

/// mean(per-bar return) / std(per-bar return) * sqrt(periods_per_year),
/// with population standard deviation. Zero when there are fewer than two
/// returns or the returns have no variance.
fn compute_sharpe(equity: &[f64], periods_per_year: f64) -> f64 {
    if equity.len() < 3 || periods_per_year <= 0.0 {
        return 0.0;
    }

    let returns: Vec<f64> = equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean / stddev) * periods_per_year.sqrt()
    } else {
        0.0
    }
}

/// min over time of equity / running_max(equity) - 1, a non-positive
/// fraction.
fn compute_max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;

    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = value / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}
