/// A tradeable market as returned by discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketInfo {
    pub event_id: String,
    pub market_id: String,
    pub title: String,
    pub subtitle: String,
    pub volume: u64,
}

impl MarketInfo {
    pub fn label(&self) -> String {
        if self.subtitle.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.subtitle)
        }
    }

    /// Strictly above the threshold, matching how markets are picked for monitoring.
    pub fn is_popular(&self, volume_threshold: u64) -> bool {
        self.volume > volume_threshold
    }
}
