//! Typed configuration construction and validation.
//!
//! Builds the engine, strategy, and analyzer settings from a
//! [`ConfigPort`], failing fast before any simulation work starts.

use chrono::Duration;

use crate::domain::engine::EngineConfig;
use crate::domain::error::SigtraderError;
use crate::domain::metrics::DEFAULT_PERIODS_PER_YEAR;
use crate::domain::strategy::{CompositeParams, StrategyKind, WilliamsRParams};
use crate::ports::config_port::ConfigPort;

fn invalid(key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn invalid_strategy(key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn non_negative_pct(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<f64, SigtraderError> {
    let value = config.get_double("backtest", key, 0.0);
    if value < 0.0 {
        return Err(invalid(key, "must not be negative"));
    }
    Ok(value)
}

/// Build the engine configuration from the `[backtest]` section.
pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, SigtraderError> {
    let initial_capital = config.get_double("backtest", "initial_capital", 0.0);
    if initial_capital <= 0.0 {
        return Err(invalid("initial_capital", "must be positive"));
    }

    let dedup_minutes = config.get_int("backtest", "dedup_window_minutes", 0);
    if dedup_minutes < 0 {
        return Err(invalid("dedup_window_minutes", "must not be negative"));
    }

    Ok(EngineConfig {
        initial_capital,
        stop_loss_pct: non_negative_pct(config, "stop_loss_pct")?,
        take_profit_pct: non_negative_pct(config, "take_profit_pct")?,
        trailing_stop_pct: non_negative_pct(config, "trailing_stop_pct")?,
        allow_shorting: config.get_bool("backtest", "allow_shorting", false),
        dedup_window: Duration::minutes(dedup_minutes),
        spread_pct: non_negative_pct(config, "spread_pct")?,
    })
}

/// Build the strategy from the `[strategy]` section. The `name` key selects
/// one of the closed set of variants; unknown names fail before the
/// simulation runs.
pub fn build_strategy(config: &dyn ConfigPort) -> Result<StrategyKind, SigtraderError> {
    let name = config
        .get_string("strategy", "name")
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "strategy".into(),
            key: "name".into(),
        })?;

    match name.as_str() {
        "williams_r" => {
            let defaults = WilliamsRParams::default();
            let period = config.get_int("strategy", "period", defaults.period as i64);
            if period < 1 {
                return Err(invalid_strategy("period", "must be at least 1"));
            }
            Ok(StrategyKind::WilliamsR(WilliamsRParams {
                period: period as usize,
                long_entry: config.get_double("strategy", "long_entry", defaults.long_entry),
                long_exit: config.get_double("strategy", "long_exit", defaults.long_exit),
                short_entry: config.get_double("strategy", "short_entry", defaults.short_entry),
                short_exit: config.get_double("strategy", "short_exit", defaults.short_exit),
            }))
        }

        "composite" => {
            let defaults = CompositeParams::default();
            let rsi_period = config.get_int("strategy", "rsi_period", defaults.rsi_period as i64);
            let wr_period = config.get_int("strategy", "wr_period", defaults.wr_period as i64);
            let vol_period = config.get_int("strategy", "vol_period", defaults.vol_period as i64);
            if rsi_period < 1 || wr_period < 1 || vol_period < 1 {
                return Err(invalid_strategy(
                    "rsi_period/wr_period/vol_period",
                    "periods must be at least 1",
                ));
            }

            let params = CompositeParams {
                rsi_period: rsi_period as usize,
                wr_period: wr_period as usize,
                vol_period: vol_period as usize,
                rsi_lower: config.get_double("strategy", "rsi_lower", defaults.rsi_lower),
                rsi_upper: config.get_double("strategy", "rsi_upper", defaults.rsi_upper),
                wr_lower: config.get_double("strategy", "wr_lower", defaults.wr_lower),
                wr_upper: config.get_double("strategy", "wr_upper", defaults.wr_upper),
                vol_limit: config.get_double("strategy", "vol_limit", defaults.vol_limit),
            };
            if params.rsi_lower >= params.rsi_upper {
                return Err(invalid_strategy("rsi_lower", "must be below rsi_upper"));
            }
            if params.wr_lower >= params.wr_upper {
                return Err(invalid_strategy("wr_lower", "must be below wr_upper"));
            }
            if params.vol_limit <= 0.0 {
                return Err(invalid_strategy("vol_limit", "must be positive"));
            }
            Ok(StrategyKind::Composite(params))
        }

        "ma_crossover" => {
            let short_window = config.get_int("strategy", "short_window", 12);
            let long_window = config.get_int("strategy", "long_window", 24);
            if short_window < 1 {
                return Err(invalid_strategy("short_window", "must be at least 1"));
            }
            if long_window <= short_window {
                return Err(invalid_strategy(
                    "long_window",
                    "must be greater than short_window",
                ));
            }
            Ok(StrategyKind::MaCrossover {
                short_window: short_window as usize,
                long_window: long_window as usize,
            })
        }

        "mean_reversion" => {
            let window = config.get_int("strategy", "window", 50);
            let threshold = config.get_double("strategy", "threshold", 1.0);
            if window < 2 {
                return Err(invalid_strategy("window", "must be at least 2"));
            }
            if threshold <= 0.0 {
                return Err(invalid_strategy("threshold", "must be positive"));
            }
            Ok(StrategyKind::MeanReversion {
                window: window as usize,
                threshold,
            })
        }

        _ => Err(SigtraderError::UnknownStrategy { name }),
    }
}

/// Annualization constant for the analyzer, from `[backtest]
/// periods_per_year`. The caller owns picking a value that matches the bar
/// interval.
pub fn build_periods_per_year(config: &dyn ConfigPort) -> Result<f64, SigtraderError> {
    let value = config.get_double("backtest", "periods_per_year", DEFAULT_PERIODS_PER_YEAR);
    if value <= 0.0 {
        return Err(invalid("periods_per_year", "must be positive"));
    }
    Ok(value)
}
