use crate::model::market::MarketInfo;
use crate::model::order::OrderHandle;
use crate::model::signal::{Direction, TradeSide};

/// Something worth telling a human about.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PriceChanged {
        previous: f64,
        current: f64,
    },
    PatternDetected {
        direction: Direction,
        anchor: f64,
        price: f64,
    },
    SignalCrossed {
        direction: Direction,
        price: f64,
    },
    TradeExecuted {
        side: TradeSide,
        price: f64,
        handle: OrderHandle,
    },
    SignalReset {
        direction: Option<Direction>,
        reason: &'static str,
        price: f64,
    },
}

impl EngineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::PriceChanged { .. } => "price_changed",
            EngineEvent::PatternDetected { .. } => "pattern_detected",
            EngineEvent::SignalCrossed { .. } => "signal_crossed",
            EngineEvent::TradeExecuted { .. } => "trade_executed",
            EngineEvent::SignalReset { .. } => "signal_reset",
        }
    }

    /// Alert text for the notification channel.
    pub fn render(&self, market: &MarketInfo) -> String {
        let header = format!("{}\nVolume: {}", market.label(), market.volume);
        match self {
            EngineEvent::PriceChanged { previous, current } => format!(
                "Price Update: {}\nNew Price: {}\nPrevious Price: {}",
                header, current, previous
            ),
            EngineEvent::PatternDetected {
                direction,
                anchor,
                price,
            } => format!(
                "New Pattern: {}\nPrice: {}\nPattern: {} movement (anchor {:.4})",
                header, price, direction, anchor
            ),
            EngineEvent::SignalCrossed { direction, price } => format!(
                "Signal Crossed: {}\nPrice: {}\nDirection: {}\nWatching for confirmation",
                header, price, direction
            ),
            EngineEvent::TradeExecuted {
                side,
                price,
                handle,
            } => format!(
                "Trade Executed: {}\nSide: {}\nEntry Price: {}\nContracts: {}\nOrder: {}",
                header, side, price, handle.count, handle.order_id
            ),
            EngineEvent::SignalReset {
                direction,
                reason,
                price,
            } => format!(
                "Signal Reset: {}\nPrice: {}\nDirection: {}\nReason: {}",
                header,
                price,
                direction.map(|d| d.as_str()).unwrap_or("both"),
                reason
            ),
        }
    }
}
