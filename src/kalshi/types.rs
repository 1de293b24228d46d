use serde::{Deserialize, Serialize};

use crate::model::market::MarketInfo;
use crate::model::tick::Quote;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub member_id: Option<String>,
}

/// Page of `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub events: Vec<KalshiEvent>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KalshiEvent {
    pub event_ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markets: Vec<KalshiMarket>,
}

/// Market as returned by both the event listing and `GET /markets/{ticker}`.
/// Prices are in cents.
#[derive(Debug, Clone, Deserialize)]
pub struct KalshiMarket {
    pub ticker: String,
    #[serde(default)]
    pub event_ticker: Option<String>,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub yes_bid: Option<f64>,
    #[serde(default)]
    pub yes_ask: Option<f64>,
    #[serde(default)]
    pub no_bid: Option<f64>,
    #[serde(default)]
    pub no_ask: Option<f64>,
}

impl KalshiMarket {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// All four book quotes, or `None` if any is missing.
    pub fn quote(&self) -> Option<Quote> {
        Some(Quote {
            yes_bid: self.yes_bid?,
            yes_ask: self.yes_ask?,
            no_bid: self.no_bid?,
            no_ask: self.no_ask?,
        })
    }

    pub fn to_market_info(&self, event: &KalshiEvent) -> MarketInfo {
        MarketInfo {
            event_id: event.event_ticker.clone(),
            market_id: self.ticker.clone(),
            title: event.title.clone(),
            subtitle: self.subtitle.clone(),
            volume: self.volume,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketResponse {
    pub market: KalshiMarket,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderRequest<'a> {
    pub ticker: &'a str,
    pub action: &'a str,
    #[serde(rename = "type")]
    pub order_type: &'a str,
    pub count: u32,
    pub side: &'a str,
    pub client_order_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct KalshiOrder {
    pub order_id: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub order: KalshiOrder,
}

#[derive(Debug, Deserialize)]
pub struct KalshiErrorResponse {
    pub error: KalshiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct KalshiErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
