use crate::indicator::BollingerBands;
use crate::model::signal::{Direction, TradeSide};
use crate::model::tick::Quote;

/// One persisted row per processed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub market_id: String,
    pub timestamp_ms: u64,
    pub price: f64,
    pub last_price: f64,
    pub quote: Option<Quote>,
    pub sma: Option<f64>,
    pub total_average: Option<f64>,
    pub margin_of_error: Option<f64>,
    pub std_dev: Option<f64>,
    pub anchor: Option<f64>,
    pub rsi: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub pattern: Option<Direction>,
    pub trade_sent: bool,
    pub crossed: Option<Direction>,
    pub trade_side: Option<TradeSide>,
}
