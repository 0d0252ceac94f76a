//! Position-intent series produced by signal generators.

use chrono::NaiveDateTime;

/// The strategy's desired position direction for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Long,
    Short,
    Flat,
}

impl Intent {
    /// Conventional numeric encoding: +1 long, -1 short, 0 flat.
    pub fn as_f64(self) -> f64 {
        match self {
            Intent::Long => 1.0,
            Intent::Short => -1.0,
            Intent::Flat => 0.0,
        }
    }
}

/// One point of the intent series. `changed` is the first-difference flag:
/// true exactly when the intent differs from the previous bar's. The first
/// bar has no predecessor and is never flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub timestamp: NaiveDateTime,
    pub intent: Intent,
    pub changed: bool,
}

/// An intent series over the same index as the price series it was
/// generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSeries {
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    /// Build a series from per-bar intents, deriving the `changed` flags.
    pub fn from_intents(timestamps: &[NaiveDateTime], intents: &[Intent]) -> Self {
        let points = timestamps
            .iter()
            .zip(intents)
            .enumerate()
            .map(|(i, (&timestamp, &intent))| SignalPoint {
                timestamp,
                intent,
                changed: i > 0 && intent != intents[i - 1],
            })
            .collect();
        SignalSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
