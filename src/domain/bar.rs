//! Price bar representation.

use chrono::NaiveDateTime;

/// One bar of market data. Timestamps are strictly increasing and unique
/// within a series; volume is carried through but unused by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Close-to-close simple return against a previous close.
    pub fn simple_return(&self, prev_close: f64) -> f64 {
        if prev_close > 0.0 {
            (self.close - prev_close) / prev_close
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar(close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 50_000,
        }
    }

    #[test]
    fn simple_return_up() {
        let bar = sample_bar(110.0);
        assert!((bar.simple_return(100.0) - 0.10).abs() < 1e-12);
    }

    #[test]
    fn simple_return_down() {
        let bar = sample_bar(95.0);
        assert!((bar.simple_return(100.0) - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn simple_return_zero_prev_close() {
        let bar = sample_bar(100.0);
        assert!((bar.simple_return(0.0) - 0.0).abs() < f64::EPSILON);
    }
}
