use serde::{Deserialize, Serialize};

/// Top-of-book quotes for a binary market, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub yes_bid: f64,
    pub yes_ask: f64,
    pub no_bid: f64,
    pub no_ask: f64,
}

impl Quote {
    /// Width of the yes-side book.
    pub fn yes_spread(&self) -> f64 {
        self.yes_ask - self.yes_bid
    }
}

/// Which quote a tick's `price` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[default]
    LastPrice,
    YesBid,
    YesAsk,
    NoBid,
    NoAsk,
}

impl PriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::LastPrice => "last_price",
            PriceSource::YesBid => "yes_bid",
            PriceSource::YesAsk => "yes_ask",
            PriceSource::NoBid => "no_bid",
            PriceSource::NoAsk => "no_ask",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub market_id: String,
    pub price: f64,
    pub last_price: f64,
    pub timestamp_ms: u64,
    pub quote: Option<Quote>,
}

impl Tick {
    /// Tick carrying only a last-trade price.
    pub fn from_price(market_id: &str, price: f64, timestamp_ms: u64) -> Self {
        Self {
            market_id: market_id.to_string(),
            price,
            last_price: price,
            timestamp_ms,
            quote: None,
        }
    }

    /// Build a tick whose engine-facing `price` is picked by `source`.
    /// Returns `None` when the source needs a quote that is absent.
    pub fn from_quote(
        market_id: &str,
        last_price: f64,
        quote: Option<Quote>,
        source: PriceSource,
        timestamp_ms: u64,
    ) -> Option<Self> {
        let price = match source {
            PriceSource::LastPrice => last_price,
            PriceSource::YesBid => quote?.yes_bid,
            PriceSource::YesAsk => quote?.yes_ask,
            PriceSource::NoBid => quote?.no_bid,
            PriceSource::NoAsk => quote?.no_ask,
        };
        Some(Self {
            market_id: market_id.to_string(),
            price,
            last_price,
            timestamp_ms,
            quote,
        })
    }

    /// Value of the given source on this tick, if present.
    pub fn value_of(&self, source: PriceSource) -> Option<f64> {
        match source {
            PriceSource::LastPrice => Some(self.last_price),
            PriceSource::YesBid => self.quote.map(|q| q.yes_bid),
            PriceSource::YesAsk => self.quote.map(|q| q.yes_ask),
            PriceSource::NoBid => self.quote.map(|q| q.no_bid),
            PriceSource::NoAsk => self.quote.map(|q| q.no_ask),
        }
    }
}
