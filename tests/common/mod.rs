#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sigtrader::domain::bar::Bar;
use sigtrader::domain::engine::EngineConfig;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::signal::{Intent, SignalSeries};
use sigtrader::ports::data_port::DataPort;

pub fn ts(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + Duration::minutes(minutes)
}

/// Close-only bars, one per minute.
pub fn make_bars(prices: &[f64]) -> Vec<Bar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: ts(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000,
        })
        .collect()
}

/// Bars with explicit high/low around the close.
pub fn make_ohlc_bars(rows: &[(f64, f64, f64)]) -> Vec<Bar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Bar {
            timestamp: ts(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1000,
        })
        .collect()
}

pub fn make_signals(bars: &[Bar], intents: &[Intent]) -> SignalSeries {
    let timestamps: Vec<_> = bars.iter().map(|b| b.timestamp).collect();
    SignalSeries::from_intents(&timestamps, intents)
}

pub fn config_10k() -> EngineConfig {
    EngineConfig {
        initial_capital: 10_000.0,
        ..EngineConfig::default()
    }
}

/// In-memory data port for pipeline tests.
pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self) -> Result<Vec<Bar>, SigtraderError> {
        if let Some(reason) = &self.error {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }
}
