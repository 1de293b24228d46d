use serde::Deserialize;

use crate::model::signal::Direction;
use crate::strategy::confidence_gate::{ConfidenceGate, ConfidenceInterval};

/// Crossing progress for one direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossState {
    anchor: Option<f64>,
    crossed: bool,
    updates_after_cross: u32,
    crossed_prices: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossPhase {
    Idle,
    Armed,
    Crossed,
}

/// What a single price did to a [`CrossState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossStep {
    /// No anchor; nothing to track.
    Idle,
    /// Armed, price has not crossed yet.
    Waiting,
    /// First move past the anchor.
    Crossed,
    /// A new favorable extreme was recorded.
    Extended,
    /// Still crossed, no new extreme.
    Holding,
    /// Price fell back through the anchor; state cleared.
    Reverted,
}

impl CrossState {
    pub fn arm(&mut self, anchor: f64) {
        *self = CrossState {
            anchor: Some(anchor),
            ..CrossState::default()
        };
    }

    pub fn reset(&mut self) {
        *self = CrossState::default();
    }

    pub fn advance(&mut self, direction: Direction, price: f64) -> CrossStep {
        let Some(anchor) = self.anchor else {
            return CrossStep::Idle;
        };

        if !self.crossed {
            if direction.is_beyond(price, anchor) {
                self.crossed = true;
                self.updates_after_cross = 0;
                self.crossed_prices = vec![price];
                return CrossStep::Crossed;
            }
            return CrossStep::Waiting;
        }

        if direction.opposite().is_beyond(price, anchor) {
            self.reset();
            return CrossStep::Reverted;
        }

        let extends = self
            .crossed_prices
            .last()
            .map(|last| direction.is_beyond(price, *last))
            .unwrap_or(true);
        if extends {
            self.crossed_prices.push(price);
            self.updates_after_cross += 1;
            CrossStep::Extended
        } else {
            CrossStep::Holding
        }
    }

    pub fn phase(&self) -> CrossPhase {
        match (self.anchor, self.crossed) {
            (None, _) => CrossPhase::Idle,
            (Some(_), false) => CrossPhase::Armed,
            (Some(_), true) => CrossPhase::Crossed,
        }
    }

    pub fn anchor(&self) -> Option<f64> {
        self.anchor
    }

    pub fn is_crossed(&self) -> bool {
        self.crossed
    }

    pub fn updates_after_cross(&self) -> u32 {
        self.updates_after_cross
    }

    pub fn crossed_prices(&self) -> &[f64] {
        &self.crossed_prices
    }
}

/// One [`CrossState`] per direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossPair {
    pub up: CrossState,
    pub down: CrossState,
}

impl CrossPair {
    pub fn get(&self, direction: Direction) -> &CrossState {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut CrossState {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }

    /// The crossed direction, only when exactly one is crossed.
    pub fn sole_crossed(&self) -> Option<Direction> {
        match (self.up.is_crossed(), self.down.is_crossed()) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }

    /// Up wins ties, matching how the persisted "crossed" column is filled.
    pub fn any_crossed(&self) -> Option<Direction> {
        if self.up.is_crossed() {
            Some(Direction::Up)
        } else if self.down.is_crossed() {
            Some(Direction::Down)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.up.reset();
        self.down.reset();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfirmationRules {
    pub min_updates_after_cross: u32,
    pub spread_gate: bool,
    pub gate: ConfidenceGate,
}

impl Default for ConfirmationRules {
    fn default() -> Self {
        Self {
            min_updates_after_cross: 2,
            spread_gate: false,
            gate: ConfidenceGate::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingReason {
    TooFewUpdates { have: u32, need: u32 },
    NoInterval,
    OutsideInterval { interval: ConfidenceInterval },
    MissingSpreadInput,
    SpreadTooWide { edge: f64, spread: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    NotCrossed,
    /// Both directions crossed at once; never actionable.
    Ambiguous,
    Pending {
        direction: Direction,
        reason: PendingReason,
    },
    Confirmed {
        direction: Direction,
        interval: ConfidenceInterval,
    },
}

/// Both directions' crossing state plus the rules that turn a crossing into a trade.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTracker {
    rules: ConfirmationRules,
    pair: CrossPair,
}

impl CrossTracker {
    pub fn new(rules: ConfirmationRules) -> Self {
        Self {
            rules,
            pair: CrossPair::default(),
        }
    }

    pub fn arm(&mut self, direction: Direction, anchor: f64) {
        self.pair.get_mut(direction).arm(anchor);
    }

    pub fn advance(&mut self, price: f64) -> [(Direction, CrossStep); 2] {
        Direction::ALL.map(|d| (d, self.pair.get_mut(d).advance(d, price)))
    }

    /// Decide whether the current price confirms a crossing.
    ///
    /// `spread` is the live yes-side bid/ask width; it is only consulted
    /// when the spread gate is enabled.
    pub fn evaluate(&self, price: f64, spread: Option<f64>) -> Confirmation {
        if self.pair.up.is_crossed() && self.pair.down.is_crossed() {
            return Confirmation::Ambiguous;
        }
        let Some(direction) = self.pair.sole_crossed() else {
            return Confirmation::NotCrossed;
        };
        let state = self.pair.get(direction);

        if state.updates_after_cross() < self.rules.min_updates_after_cross {
            return Confirmation::Pending {
                direction,
                reason: PendingReason::TooFewUpdates {
                    have: state.updates_after_cross(),
                    need: self.rules.min_updates_after_cross,
                },
            };
        }

        let Some(interval) = self.rules.gate.interval(state.crossed_prices()) else {
            return Confirmation::Pending {
                direction,
                reason: PendingReason::NoInterval,
            };
        };
        if !interval.contains(price) {
            return Confirmation::Pending {
                direction,
                reason: PendingReason::OutsideInterval { interval },
            };
        }

        if self.rules.spread_gate {
            let inputs = (self.pair.up.anchor(), self.pair.down.anchor(), spread);
            let (Some(up), Some(down), Some(spread)) = inputs else {
                return Confirmation::Pending {
                    direction,
                    reason: PendingReason::MissingSpreadInput,
                };
            };
            let edge = (up - down).abs();
            if edge <= spread {
                return Confirmation::Pending {
                    direction,
                    reason: PendingReason::SpreadTooWide { edge, spread },
                };
            }
        }

        Confirmation::Confirmed {
            direction,
            interval,
        }
    }

    /// Interval over a direction's crossed prices, if computable.
    pub fn interval(&self, direction: Direction) -> Option<ConfidenceInterval> {
        self.rules
            .gate
            .interval(self.pair.get(direction).crossed_prices())
    }

    pub fn reset(&mut self, direction: Direction) {
        self.pair.get_mut(direction).reset();
    }

    pub fn reset_all(&mut self) {
        self.pair.reset();
    }

    pub fn state(&self, direction: Direction) -> &CrossState {
        self.pair.get(direction)
    }

    pub fn pair(&self) -> &CrossPair {
        &self.pair
    }

    pub fn rules(&self) -> &ConfirmationRules {
        &self.rules
    }
}
