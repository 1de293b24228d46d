use std::fmt;

use crate::model::signal::TradeSide;

/// Reference to an order accepted by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub order_id: String,
    pub client_order_id: String,
    pub market_id: String,
    pub side: TradeSide,
    pub count: u32,
}

impl fmt::Display for OrderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} x{} (order {}, client {})",
            self.market_id, self.side, self.count, self.order_id, self.client_order_id
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Resting,
    Executed,
    Canceled,
    Pending,
    Unknown,
}

impl OrderStatus {
    pub fn from_kalshi_str(s: &str) -> Self {
        match s {
            "resting" => OrderStatus::Resting,
            "executed" => OrderStatus::Executed,
            "canceled" => OrderStatus::Canceled,
            "pending" => OrderStatus::Pending,
            _ => OrderStatus::Unknown,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Resting => write!(f, "RESTING"),
            OrderStatus::Executed => write!(f, "EXECUTED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
