//! Backtest engine: executes an intent series against a price series.
//!
//! The engine walks the bars in chronological order exactly once. At each
//! bar it evaluates risk-management exits first, then the strategy's
//! intent transition, then records a ledger row. All state lives in one
//! [`PositionState`] owned by the loop for the duration of the run.

use chrono::{Duration, NaiveDateTime};
use std::fmt;

use crate::domain::bar::Bar;
use crate::domain::error::SigtraderError;
use crate::domain::position::{OpenPosition, PositionState, Side};
use crate::domain::signal::{Intent, SignalSeries};

/// Execution parameters for a run. Percentages are fractions (0.02 = 2%);
/// a value of 0.0 disables that rule.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub trailing_stop_pct: f64,
    pub allow_shorting: bool,
    pub dedup_window: Duration,
    pub spread_pct: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            initial_capital: 10_000.0,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
            trailing_stop_pct: 0.0,
            allow_shorting: false,
            dedup_window: Duration::zero(),
            spread_pct: 0.0,
        }
    }
}

/// What a transaction did. The `*_LONG`/`*_SHORT` risk variants record
/// which side the exited position was on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Short,
    Cover,
    ExitLong,
    ExitShort,
    StopLossLong,
    StopLossShort,
    TakeProfitLong,
    TakeProfitShort,
    TrailingStopLong,
    TrailingStopShort,
}

impl Action {
    /// Risk-management exits bypass the dedup gate and never advance its
    /// clock.
    pub fn is_risk_exit(self) -> bool {
        matches!(
            self,
            Action::StopLossLong
                | Action::StopLossShort
                | Action::TakeProfitLong
                | Action::TakeProfitShort
                | Action::TrailingStopLong
                | Action::TrailingStopShort
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Short => "SHORT",
            Action::Cover => "COVER",
            Action::ExitLong => "EXIT_LONG",
            Action::ExitShort => "EXIT_SHORT",
            Action::StopLossLong => "STOP_LOSS_LONG",
            Action::StopLossShort => "STOP_LOSS_SHORT",
            Action::TakeProfitLong => "TAKE_PROFIT_LONG",
            Action::TakeProfitShort => "TAKE_PROFIT_SHORT",
            Action::TrailingStopLong => "TRAILING_STOP_LONG",
            Action::TrailingStopShort => "TRAILING_STOP_SHORT",
        };
        f.write_str(name)
    }
}

/// An immutable record of one theoretical trade. `return_pct` is in
/// percent (-2.0 means -2%); `portfolio_value` is total equity right after
/// the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub time: NaiveDateTime,
    pub action: Action,
    pub price: f64,
    pub shares: f64,
    pub pnl: f64,
    pub return_pct: f64,
    pub portfolio_value: f64,
}

/// Per-bar snapshot of the portfolio. `shares` is signed (negative for
/// short exposure); `total` uses the short-aware valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub timestamp: NaiveDateTime,
    pub cash: f64,
    pub shares: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ledger: Vec<LedgerRow>,
    pub transactions: Vec<Transaction>,
}

/// A risk exit decision: which rule fired and the threshold-derived price
/// the exit settles at.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskExit {
    pub action: Action,
    pub exit_price: f64,
}

type RiskRule = fn(&mut OpenPosition, f64, &EngineConfig) -> Option<RiskExit>;

/// The risk rules in priority order. Evaluation is top-to-bottom with
/// first-match-wins; reordering this list changes which exit a bar that
/// satisfies several rules settles at.
const RISK_RULES: &[RiskRule] = &[stop_loss_rule, take_profit_rule, trailing_stop_rule];

/// Evaluate the risk rules against the current bar. Exit prices are
/// derived from the configured thresholds, not the raw bar price, so the
/// logged return of a stop-loss is exactly the configured percentage even
/// when the price gapped through the level.
pub fn evaluate_risk_exit(
    pos: &mut OpenPosition,
    price: f64,
    config: &EngineConfig,
) -> Option<RiskExit> {
    RISK_RULES
        .iter()
        .find_map(|rule| rule(pos, price, config))
}

fn stop_loss_rule(
    pos: &mut OpenPosition,
    price: f64,
    config: &EngineConfig,
) -> Option<RiskExit> {
    if config.stop_loss_pct <= 0.0 || pos.position_return(price) > -config.stop_loss_pct {
        return None;
    }
    let (action, exit_price) = match pos.side {
        Side::Long => (
            Action::StopLossLong,
            pos.entry_price * (1.0 - config.stop_loss_pct),
        ),
        Side::Short => (
            Action::StopLossShort,
            pos.entry_price * (1.0 + config.stop_loss_pct),
        ),
    };
    Some(RiskExit { action, exit_price })
}

fn take_profit_rule(
    pos: &mut OpenPosition,
    price: f64,
    config: &EngineConfig,
) -> Option<RiskExit> {
    if config.take_profit_pct <= 0.0 || pos.position_return(price) < config.take_profit_pct {
        return None;
    }
    let (action, exit_price) = match pos.side {
        Side::Long => (
            Action::TakeProfitLong,
            pos.entry_price * (1.0 + config.take_profit_pct),
        ),
        Side::Short => (
            Action::TakeProfitShort,
            pos.entry_price * (1.0 - config.take_profit_pct),
        ),
    };
    Some(RiskExit { action, exit_price })
}

/// The stop is ratcheted before its trigger is checked, so a bar that
/// makes a new favorable extreme can still exit if it closes back through
/// the updated stop.
fn trailing_stop_rule(
    pos: &mut OpenPosition,
    price: f64,
    config: &EngineConfig,
) -> Option<RiskExit> {
    if config.trailing_stop_pct <= 0.0 {
        return None;
    }
    let stop = pos.ratchet_trailing_stop(price, config.trailing_stop_pct);
    if !pos.trailing_stop_hit(price) {
        return None;
    }
    let action = match pos.side {
        Side::Long => Action::TrailingStopLong,
        Side::Short => Action::TrailingStopShort,
    };
    Some(RiskExit {
        action,
        exit_price: stop,
    })
}

/// Run the simulation. The signal series must cover the same index as the
/// price series; anything else is a caller contract violation and fails
/// fast. Open positions are not force-closed at the last bar.
pub fn run_backtest(
    bars: &[Bar],
    signals: &SignalSeries,
    config: &EngineConfig,
) -> Result<BacktestResult, SigtraderError> {
    if bars.len() != signals.len() {
        return Err(SigtraderError::MisalignedSeries {
            bars: bars.len(),
            signals: signals.len(),
        });
    }

    let mut state = PositionState::new(config.initial_capital);
    let mut ledger = Vec::with_capacity(bars.len());
    let mut transactions = Vec::new();
    // dedup clock: set only by strategy-driven transactions
    let mut last_trade_time: Option<NaiveDateTime> = None;
    let mut last_price = f64::NAN;

    for (bar, point) in bars.iter().zip(&signals.points) {
        let time = bar.timestamp;

        // forward-fill unusable closes from the previous bar
        let price = if bar.close.is_finite() && bar.close > 0.0 {
            bar.close
        } else {
            last_price
        };
        if !(price.is_finite() && price > 0.0) {
            ledger.push(LedgerRow {
                timestamp: time,
                cash: state.cash,
                shares: state.signed_shares(),
                total: state.cash,
            });
            continue;
        }
        last_price = price;

        // 1. risk exits run before any strategy-driven transition
        if let Some(mut pos) = state.open.take() {
            match evaluate_risk_exit(&mut pos, price, config) {
                Some(exit) => {
                    let txn =
                        close_position(&mut state, &pos, time, exit.action, exit.exit_price);
                    transactions.push(txn);
                }
                None => state.open = Some(pos),
            }
        }

        // 2. strategy transition, gated once per intent change by the
        //    dedup window
        if point.changed {
            let gated = match last_trade_time {
                Some(t0) => time - t0 < config.dedup_window,
                None => false,
            };
            if !gated && apply_transition(&mut state, time, price, point.intent, config, &mut transactions)
            {
                last_trade_time = Some(time);
            }
        }

        // 3. ledger row
        ledger.push(LedgerRow {
            timestamp: time,
            cash: state.cash,
            shares: state.signed_shares(),
            total: state.equity(price),
        });
    }

    Ok(BacktestResult {
        ledger,
        transactions,
    })
}

/// Dispatch one intent transition against the current position. Returns
/// true when at least one transaction posted (which advances the dedup
/// clock).
fn apply_transition(
    state: &mut PositionState,
    time: NaiveDateTime,
    price: f64,
    intent: Intent,
    config: &EngineConfig,
    transactions: &mut Vec<Transaction>,
) -> bool {
    match (state.open.take(), intent) {
        (None, Intent::Long) => match open_position(state, time, price, Side::Long, config) {
            Some(txn) => {
                transactions.push(txn);
                true
            }
            None => false,
        },

        (None, Intent::Short) if config.allow_shorting => {
            match open_position(state, time, price, Side::Short, config) {
                Some(txn) => {
                    transactions.push(txn);
                    true
                }
                None => false,
            }
        }
        (None, _) => false,

        (Some(pos), intent) => match (pos.side, intent) {
            (Side::Long, Intent::Short) => {
                // sell signal: close the long, then roll the freed cash
                // into a short when shorting is enabled
                let exit_price = price * (1.0 - config.spread_pct);
                let txn = close_position(state, &pos, time, Action::Sell, exit_price);
                transactions.push(txn);
                if config.allow_shorting {
                    if let Some(txn) = open_position(state, time, price, Side::Short, config) {
                        transactions.push(txn);
                    }
                }
                true
            }

            (Side::Long, Intent::Flat) => {
                let exit_price = price * (1.0 - config.spread_pct);
                let txn = close_position(state, &pos, time, Action::ExitLong, exit_price);
                transactions.push(txn);
                true
            }

            (Side::Short, Intent::Long) => {
                // cover signal: realize the short, then go long with all
                // cash
                let exit_price = price * (1.0 + config.spread_pct);
                let txn = close_position(state, &pos, time, Action::Cover, exit_price);
                transactions.push(txn);
                if let Some(txn) = open_position(state, time, price, Side::Long, config) {
                    transactions.push(txn);
                }
                true
            }

            (Side::Short, Intent::Flat) => {
                let exit_price = price * (1.0 + config.spread_pct);
                let txn = close_position(state, &pos, time, Action::ExitShort, exit_price);
                transactions.push(txn);
                true
            }

            // intent matches the held side; put the position back
            (Side::Long, Intent::Long) | (Side::Short, Intent::Short) => {
                state.open = Some(pos);
                false
            }
        },
    }
}

/// Open a full-notional position: every available dollar becomes exposure.
/// Longs buy at the ask, shorts sell at the bid when a spread is
/// configured.
fn open_position(
    state: &mut PositionState,
    time: NaiveDateTime,
    price: f64,
    side: Side,
    config: &EngineConfig,
) -> Option<Transaction> {
    if state.cash <= 0.0 {
        return None;
    }

    let exec_price = match side {
        Side::Long => price * (1.0 + config.spread_pct),
        Side::Short => price * (1.0 - config.spread_pct),
    };
    let quantity = state.cash / exec_price;

    let trailing_stop = if config.trailing_stop_pct > 0.0 {
        Some(match side {
            Side::Long => exec_price * (1.0 - config.trailing_stop_pct),
            Side::Short => exec_price * (1.0 + config.trailing_stop_pct),
        })
    } else {
        None
    };

    let action = match side {
        Side::Long => {
            state.cash = 0.0;
            Action::Buy
        }
        // a short keeps its cash as the notional backing the exposure
        Side::Short => Action::Short,
    };

    state.open = Some(OpenPosition {
        side,
        quantity,
        entry_price: exec_price,
        entry_time: time,
        trailing_stop,
    });

    Some(Transaction {
        time,
        action,
        price: exec_price,
        shares: quantity,
        pnl: 0.0,
        return_pct: 0.0,
        portfolio_value: state.equity(price),
    })
}

/// Close `pos` at `exit_price`, realizing PnL into cash. The caller has
/// already removed the position from the state.
fn close_position(
    state: &mut PositionState,
    pos: &OpenPosition,
    time: NaiveDateTime,
    action: Action,
    exit_price: f64,
) -> Transaction {
    let pnl = pos.unrealized_pnl(exit_price);
    let return_pct = pos.position_return(exit_price) * 100.0;

    match pos.side {
        Side::Long => state.cash += pos.quantity * exit_price,
        Side::Short => state.cash += pnl,
    }

    Transaction {
        time,
        action,
        price: exit_price,
        shares: pos.quantity,
        pnl,
        return_pct,
        portfolio_value: state.cash,
    }
}
