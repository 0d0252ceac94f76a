//! Signal-generating strategies.
//!
//! A strategy is selected at construction time as one variant of
//! [`StrategyKind`] and turns a bar series into a [`SignalSeries`].
//! The Williams %R and composite strategies carry intent forward bar to
//! bar (intent only moves when a transition rule fires); the crossover and
//! mean-reversion strategies recompute intent fresh every bar.

use crate::domain::bar::Bar;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma_ramped;
use crate::domain::indicator::volatility::calculate_volatility;
use crate::domain::indicator::williams_r::calculate_williams_r;
use crate::domain::indicator::zscore::calculate_zscore;
use crate::domain::signal::{Intent, SignalSeries};

/// Thresholds for the Williams %R long/short strategy. %R lives in
/// [-100, 0]; the default bands (-80 entry / -20 exit and mirrored for
/// shorts) do not overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct WilliamsRParams {
    pub period: usize,
    pub long_entry: f64,
    pub long_exit: f64,
    pub short_entry: f64,
    pub short_exit: f64,
}

impl Default for WilliamsRParams {
    fn default() -> Self {
        WilliamsRParams {
            period: 14,
            long_entry: -80.0,
            long_exit: -20.0,
            short_entry: -20.0,
            short_exit: -80.0,
        }
    }
}

/// Parameters for the three-indicator composite strategy. Entries require
/// all three indicators to agree; exits fire on any one trigger and are
/// reversals (an exited long becomes a short, and vice versa).
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeParams {
    pub rsi_period: usize,
    pub wr_period: usize,
    pub vol_period: usize,
    pub rsi_lower: f64,
    pub rsi_upper: f64,
    pub wr_lower: f64,
    pub wr_upper: f64,
    pub vol_limit: f64,
}

impl Default for CompositeParams {
    fn default() -> Self {
        CompositeParams {
            rsi_period: 14,
            wr_period: 14,
            vol_period: 20,
            rsi_lower: 30.0,
            rsi_upper: 70.0,
            wr_lower: -80.0,
            wr_upper: -20.0,
            vol_limit: 0.02,
        }
    }
}

/// The closed set of strategies.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    WilliamsR(WilliamsRParams),
    Composite(CompositeParams),
    MaCrossover {
        short_window: usize,
        long_window: usize,
    },
    MeanReversion {
        window: usize,
        threshold: f64,
    },
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::WilliamsR(_) => "williams_r",
            StrategyKind::Composite(_) => "composite",
            StrategyKind::MaCrossover { .. } => "ma_crossover",
            StrategyKind::MeanReversion { .. } => "mean_reversion",
        }
    }

    /// Compute the intent series for a bar series. The output shares the
    /// bar index: one point per bar, always defined.
    pub fn compute_signals(&self, bars: &[Bar]) -> SignalSeries {
        let intents = match self {
            StrategyKind::WilliamsR(params) => williams_r_intents(bars, params),
            StrategyKind::Composite(params) => composite_intents(bars, params),
            StrategyKind::MaCrossover {
                short_window,
                long_window,
            } => crossover_intents(bars, *short_window, *long_window),
            StrategyKind::MeanReversion { window, threshold } => {
                mean_reversion_intents(bars, *window, *threshold)
            }
        };

        let timestamps: Vec<_> = bars.iter().map(|b| b.timestamp).collect();
        SignalSeries::from_intents(&timestamps, &intents)
    }
}

/// Williams %R transition rules, evaluated in fixed priority order each bar.
/// Long entry is checked before short entry; with overlapping threshold
/// bands the long side wins. An undefined indicator holds the previous
/// intent unchanged.
fn williams_r_intents(bars: &[Bar], params: &WilliamsRParams) -> Vec<Intent> {
    let wr = calculate_williams_r(bars, params.period);
    let mut intents = Vec::with_capacity(bars.len());
    let mut prev = Intent::Flat;

    for i in 0..bars.len() {
        let next = match wr.value_at(i) {
            None => prev,
            Some(value) => {
                if prev != Intent::Long && value <= params.long_entry {
                    Intent::Long
                } else if prev == Intent::Long && value >= params.long_exit {
                    Intent::Flat
                } else if prev != Intent::Short && value >= params.short_entry {
                    Intent::Short
                } else if prev == Intent::Short && value <= params.short_exit {
                    Intent::Flat
                } else {
                    prev
                }
            }
        };
        intents.push(next);
        prev = next;
    }

    intents
}

/// Composite strategy: conjunctive entries, disjunctive exits, exits are
/// reversals. Intent is forced flat until every indicator has warmed up.
fn composite_intents(bars: &[Bar], params: &CompositeParams) -> Vec<Intent> {
    let rsi = calculate_rsi(bars, params.rsi_period);
    let wr = calculate_williams_r(bars, params.wr_period);
    let vol = calculate_volatility(bars, params.vol_period);

    let mut intents = Vec::with_capacity(bars.len());
    let mut prev = Intent::Flat;

    for i in 0..bars.len() {
        let next = match (rsi.value_at(i), wr.value_at(i), vol.value_at(i)) {
            (Some(r), Some(w), Some(v)) => {
                let long_entry = r <= params.rsi_lower && w <= params.wr_lower && v <= params.vol_limit;
                let short_entry = r >= params.rsi_upper && w >= params.wr_upper && v <= params.vol_limit;
                let long_exit = r >= params.rsi_upper || w >= params.wr_upper || v > params.vol_limit;
                let short_exit = r <= params.rsi_lower || w <= params.wr_lower || v > params.vol_limit;

                if prev != Intent::Long && long_entry {
                    Intent::Long
                } else if prev != Intent::Short && short_entry {
                    Intent::Short
                } else if prev == Intent::Long && long_exit {
                    Intent::Short
                } else if prev == Intent::Short && short_exit {
                    Intent::Long
                } else {
                    prev
                }
            }
            _ => Intent::Flat,
        };
        intents.push(next);
        prev = next;
    }

    intents
}

/// Moving-average crossover, stateless: long when the short average is
/// above the long average, short otherwise, flat for the first
/// `short_window` bars. Both averages ramp in over the available history.
fn crossover_intents(bars: &[Bar], short_window: usize, long_window: usize) -> Vec<Intent> {
    let short = calculate_sma_ramped(bars, short_window);
    let long = calculate_sma_ramped(bars, long_window);

    (0..bars.len())
        .map(|i| {
            if i < short_window {
                Intent::Flat
            } else if short.values[i].value > long.values[i].value {
                Intent::Long
            } else {
                Intent::Short
            }
        })
        .collect()
}

/// Mean reversion on the rolling z-score, stateless: long when stretched
/// below the mean, short when stretched above, flat in between and during
/// warmup.
fn mean_reversion_intents(bars: &[Bar], window: usize, threshold: f64) -> Vec<Intent> {
    let z = calculate_zscore(bars, window);
    (0..bars.len())
        .map(|i| match z.value_at(i) {
            Some(value) if value <= -threshold => Intent::Long,
            Some(value) if value >= threshold => Intent::Short,
            _ => Intent::Flat,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap()
                    + chrono::Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn wr2_params() -> WilliamsRParams {
        WilliamsRParams {
            period: 2,
            ..WilliamsRParams::default()
        }
    }

    fn intents_of(series: &SignalSeries) -> Vec<Intent> {
        series.points.iter().map(|p| p.intent).collect()
    }

    #[test]
    fn williams_holds_flat_during_warmup() {
        // period 2: bar 0 has no %R reading, intent stays at its initial flat
        let bars = make_bars(&[100.0, 100.0]);
        let strategy = StrategyKind::WilliamsR(wr2_params());
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[0].intent, Intent::Flat);
    }

    #[test]
    fn williams_full_long_round_trip() {
        // close-only bars: %R is -100 on a down bar, 0 on an up bar
        let bars = make_bars(&[100.0, 90.0, 95.0]);
        let strategy = StrategyKind::WilliamsR(wr2_params());
        let series = strategy.compute_signals(&bars);

        assert_eq!(
            intents_of(&series),
            vec![Intent::Flat, Intent::Long, Intent::Flat]
        );
        assert!(series.points[1].changed);
        assert!(series.points[2].changed);
    }

    #[test]
    fn williams_short_entry_then_oversold_goes_long() {
        // flat -> long -> flat -> short; the deep oversold reading at the
        // end satisfies both short-exit and long-entry, and long-entry is
        // checked first
        let bars = make_bars(&[100.0, 90.0, 95.0, 96.0, 90.0]);
        let strategy = StrategyKind::WilliamsR(wr2_params());
        let series = strategy.compute_signals(&bars);

        assert_eq!(
            intents_of(&series),
            vec![
                Intent::Flat,
                Intent::Long,
                Intent::Flat,
                Intent::Short,
                Intent::Long,
            ]
        );
    }

    #[test]
    fn williams_short_exit_to_flat() {
        // separated bands: %R = -85 clears the short exit (-80) without
        // reaching the long entry (-90)
        let params = WilliamsRParams {
            period: 2,
            long_entry: -90.0,
            long_exit: -20.0,
            short_entry: -20.0,
            short_exit: -80.0,
        };
        let mut bars = make_bars(&[100.0, 100.0, 101.0, 100.0]);
        // final bar: HH 101, LL 91, close 92.5 -> %R = -85
        bars[3].high = 101.0;
        bars[3].low = 91.0;
        bars[3].close = 92.5;

        let strategy = StrategyKind::WilliamsR(params);
        let series = strategy.compute_signals(&bars);

        // bar 2 closes at the top of its window -> short entry
        assert_eq!(series.points[2].intent, Intent::Short);
        assert_eq!(series.points[3].intent, Intent::Flat);
    }

    #[test]
    fn williams_holds_position_between_thresholds() {
        // after the long entry the %R readings sit inside the band, so the
        // long is held
        let bars = make_bars(&[100.0, 90.0, 90.0, 90.0]);
        let strategy = StrategyKind::WilliamsR(wr2_params());
        let series = strategy.compute_signals(&bars);

        // bar 2 and 3: flat windows pin %R at -50, between -80 and -20
        assert_eq!(
            intents_of(&series),
            vec![Intent::Flat, Intent::Long, Intent::Long, Intent::Long]
        );
    }

    #[test]
    fn williams_long_entry_beats_short_entry_on_overlap() {
        // overlapping bands: -50 satisfies both entries; long wins
        let params = WilliamsRParams {
            period: 2,
            long_entry: -40.0,
            long_exit: 0.0,
            short_entry: -60.0,
            short_exit: -100.0,
        };
        let bars = make_bars(&[100.0, 90.0]);
        let strategy = StrategyKind::WilliamsR(params);
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[1].intent, Intent::Long);
    }

    fn tight_composite() -> CompositeParams {
        CompositeParams {
            rsi_period: 2,
            wr_period: 2,
            vol_period: 2,
            rsi_lower: 30.0,
            rsi_upper: 70.0,
            wr_lower: -80.0,
            wr_upper: -20.0,
            vol_limit: 0.02,
        }
    }

    #[test]
    fn composite_forced_flat_during_warmup() {
        let bars = make_bars(&[100.0, 99.0, 98.0]);
        let strategy = StrategyKind::Composite(tight_composite());
        let series = strategy.compute_signals(&bars);

        // rsi and volatility warm up at bar 2; bars 0-1 are forced flat
        assert_eq!(series.points[0].intent, Intent::Flat);
        assert_eq!(series.points[1].intent, Intent::Flat);
    }

    #[test]
    fn composite_conjunctive_long_entry() {
        // two gentle down bars: rsi 0, %R -100, tiny volatility -> all agree
        let bars = make_bars(&[100.0, 99.0, 98.0]);
        let strategy = StrategyKind::Composite(tight_composite());
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[2].intent, Intent::Long);
    }

    #[test]
    fn composite_exit_is_reversal_not_flat() {
        // enter long on the down drift, then a sharp rally trips the
        // disjunctive exit (%R at 0); the long reverses straight into a short
        let bars = make_bars(&[100.0, 99.0, 98.0, 105.0]);
        let strategy = StrategyKind::Composite(tight_composite());
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[2].intent, Intent::Long);
        assert_eq!(series.points[3].intent, Intent::Short);
    }

    #[test]
    fn composite_holds_when_no_rule_fires() {
        // after the long entry, a flat bar keeps all triggers quiet
        let bars = make_bars(&[100.0, 99.0, 98.0, 98.0]);
        let strategy = StrategyKind::Composite(tight_composite());
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[2].intent, Intent::Long);
        // bar 3: %R pinned at -50 (inside the band), rsi low but entry
        // already held, volatility small
        assert_eq!(series.points[3].intent, Intent::Long);
    }

    #[test]
    fn crossover_flat_then_directional() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let strategy = StrategyKind::MaCrossover {
            short_window: 2,
            long_window: 4,
        };
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[0].intent, Intent::Flat);
        assert_eq!(series.points[1].intent, Intent::Flat);
        // rising series: short average above long average from bar 2 on
        for point in &series.points[2..] {
            assert_eq!(point.intent, Intent::Long);
        }
    }

    #[test]
    fn crossover_short_when_short_avg_below() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let strategy = StrategyKind::MaCrossover {
            short_window: 2,
            long_window: 4,
        };
        let series = strategy.compute_signals(&bars);

        for point in &series.points[2..] {
            assert_eq!(point.intent, Intent::Short);
        }
    }

    #[test]
    fn mean_reversion_thresholds() {
        // last bar well below the window mean -> long
        let bars = make_bars(&[100.0, 101.0, 100.0, 101.0, 90.0]);
        let strategy = StrategyKind::MeanReversion {
            window: 5,
            threshold: 1.0,
        };
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[3].intent, Intent::Flat);
        assert_eq!(series.points[4].intent, Intent::Long);
    }

    #[test]
    fn mean_reversion_flat_inside_band() {
        let bars = make_bars(&[100.0, 100.5, 100.0, 100.5, 100.2]);
        let strategy = StrategyKind::MeanReversion {
            window: 5,
            threshold: 2.0,
        };
        let series = strategy.compute_signals(&bars);

        assert_eq!(series.points[4].intent, Intent::Flat);
    }

    #[test]
    fn strategy_names() {
        assert_eq!(
            StrategyKind::WilliamsR(WilliamsRParams::default()).name(),
            "williams_r"
        );
        assert_eq!(
            StrategyKind::Composite(CompositeParams::default()).name(),
            "composite"
        );
        assert_eq!(
            StrategyKind::MaCrossover {
                short_window: 12,
                long_window: 24
            }
            .name(),
            "ma_crossover"
        );
        assert_eq!(
            StrategyKind::MeanReversion {
                window: 50,
                threshold: 1.0
            }
            .name(),
            "mean_reversion"
        );
    }
}
