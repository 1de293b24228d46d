use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Up, Direction::Down];

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// True when `price` sits strictly beyond `level` in this direction.
    pub fn is_beyond(&self, price: f64, level: f64) -> bool {
        match self {
            Direction::Up => price > level,
            Direction::Down => price < level,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract side bought when a direction confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    BuyYes,
    BuyNo,
}

impl TradeSide {
    pub fn for_direction(direction: Direction) -> Self {
        match direction {
            Direction::Up => TradeSide::BuyYes,
            Direction::Down => TradeSide::BuyNo,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            TradeSide::BuyYes => Direction::Up,
            TradeSide::BuyNo => Direction::Down,
        }
    }

    /// Contract side as the exchange spells it.
    pub fn as_kalshi_side(&self) -> &'static str {
        match self {
            TradeSide::BuyYes => "yes",
            TradeSide::BuyNo => "no",
        }
    }

    /// True when `price` has moved against a position entered at `entry_price`.
    pub fn is_adverse(&self, price: f64, entry_price: f64) -> bool {
        match self {
            TradeSide::BuyYes => price < entry_price,
            TradeSide::BuyNo => price > entry_price,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::BuyYes => write!(f, "buy_yes"),
            TradeSide::BuyNo => write!(f, "buy_no"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternSignal {
    pub direction: Direction,
    pub anchor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeIntent {
    pub side: TradeSide,
    pub entry_price: f64,
    pub opened_at_ms: u64,
}
