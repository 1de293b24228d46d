pub mod backoff;
pub mod feed;
pub mod market_registry;
pub mod monitor;

pub use backoff::ExponentialBackoff;
pub use feed::MarketFeed;
pub use market_registry::{MarketRegistry, MergeSummary};
pub use monitor::{CycleSummary, MarketStatus, Monitor, MonitorSettings};
