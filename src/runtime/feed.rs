use anyhow::Result;
use async_trait::async_trait;

use crate::model::market::MarketInfo;
use crate::model::tick::Tick;

/// Source of tradeable markets and their latest prices.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// Every currently open market, regardless of volume.
    async fn list_markets(&self) -> Result<Vec<MarketInfo>>;

    /// Latest tick for one market. `Ok(None)` when the configured price
    /// source has no value right now (e.g. an empty book side).
    async fn fetch_tick(&self, market_id: &str) -> Result<Option<Tick>>;
}
