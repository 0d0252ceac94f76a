//! Position state threaded through the simulation loop.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

/// An open position. `quantity` is always the absolute share count; the
/// sign convention lives in [`PositionState::signed_shares`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub side: Side,
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub trailing_stop: Option<f64>,
}

impl OpenPosition {
    /// Fractional return at `price` from the position's point of view:
    /// positive when the trade is winning, for either side.
    pub fn position_return(&self, price: f64) -> f64 {
        if self.entry_price <= 0.0 {
            return 0.0;
        }
        match self.side {
            Side::Long => (price - self.entry_price) / self.entry_price,
            Side::Short => (self.entry_price - price) / self.entry_price,
        }
    }

    /// Unrealized profit at `price`.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => (price - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - price) * self.quantity,
        }
    }

    /// Ratchet the trailing stop toward the current price. For a long the
    /// stop only ever moves up; for a short only down. Returns the stop
    /// after the update.
    pub fn ratchet_trailing_stop(&mut self, price: f64, trail_pct: f64) -> f64 {
        let candidate = match self.side {
            Side::Long => price * (1.0 - trail_pct),
            Side::Short => price * (1.0 + trail_pct),
        };
        let updated = match (self.trailing_stop, self.side) {
            (None, _) => candidate,
            (Some(old), Side::Long) => old.max(candidate),
            (Some(old), Side::Short) => old.min(candidate),
        };
        self.trailing_stop = Some(updated);
        updated
    }

    /// True when `price` has crossed back through the trailing stop.
    pub fn trailing_stop_hit(&self, price: f64) -> bool {
        match (self.trailing_stop, self.side) {
            (Some(stop), Side::Long) => price <= stop,
            (Some(stop), Side::Short) => price >= stop,
            (None, _) => false,
        }
    }
}

/// The single mutable entity of a run: cash plus the open position, if
/// any. `open: None` is the flat state, so shares and position tag can
/// never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    pub cash: f64,
    pub open: Option<OpenPosition>,
}

impl PositionState {
    pub fn new(initial_capital: f64) -> Self {
        PositionState {
            cash: initial_capital,
            open: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.open.is_none()
    }

    /// Signed share count: positive long, negative short, zero flat.
    pub fn signed_shares(&self) -> f64 {
        match &self.open {
            Some(pos) => match pos.side {
                Side::Long => pos.quantity,
                Side::Short => -pos.quantity,
            },
            None => 0.0,
        }
    }

    /// Total equity at `price`. A long is marked to market; a short has no
    /// shares to hold, so its value is cash plus unrealized PnL.
    pub fn equity(&self, price: f64) -> f64 {
        match &self.open {
            None => self.cash,
            Some(pos) => match pos.side {
                Side::Long => self.cash + pos.quantity * price,
                Side::Short => self.cash + pos.unrealized_pnl(price),
            },
        }
    }
}
