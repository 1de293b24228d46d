use std::collections::HashMap;

use crate::model::market::MarketInfo;
use crate::strategy::{EngineConfig, SignalEngine};

struct MarketEntry {
    info: MarketInfo,
    // None while checked out, or after its task was lost.
    engine: Option<SignalEngine>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub kept: usize,
}

/// Known markets and their engine state, keyed by market id.
pub struct MarketRegistry {
    engine_cfg: EngineConfig,
    entries: HashMap<String, MarketEntry>,
}

impl MarketRegistry {
    pub fn new(engine_cfg: EngineConfig) -> Self {
        Self {
            engine_cfg,
            entries: HashMap::new(),
        }
    }

    /// Replace the known set with `markets`. Existing ids keep their engine
    /// state and take the new volume; missing ids are dropped.
    pub fn merge(&mut self, markets: Vec<MarketInfo>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        let mut next = HashMap::with_capacity(markets.len());

        for info in markets {
            if next.contains_key(&info.market_id) {
                continue;
            }
            let id = info.market_id.clone();
            let entry = match self.entries.remove(&id) {
                Some(mut existing) => {
                    existing.info.volume = info.volume;
                    if existing.engine.is_none() {
                        existing.engine = Some(SignalEngine::new(&id, self.engine_cfg.clone()));
                    }
                    summary.kept += 1;
                    existing
                }
                None => {
                    tracing::debug!(market = %id, label = %info.label(), "Market added");
                    summary.added.push(id.clone());
                    MarketEntry {
                        engine: Some(SignalEngine::new(&id, self.engine_cfg.clone())),
                        info,
                    }
                }
            };
            next.insert(id, entry);
        }

        summary.removed = self.entries.drain().map(|(id, _)| id).collect();
        summary.removed.sort();
        summary.added.sort();
        for id in &summary.removed {
            tracing::debug!(market = %id, "Market removed");
        }
        self.entries = next;
        summary
    }

    /// Ids above the volume threshold, in lexical order.
    pub fn monitored_ids(&self, volume_threshold: u64) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.info.is_popular(volume_threshold))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Take a market's engine out for processing. `None` if unknown or
    /// already checked out.
    pub fn checkout(&mut self, market_id: &str) -> Option<(MarketInfo, SignalEngine)> {
        let entry = self.entries.get_mut(market_id)?;
        let engine = entry.engine.take()?;
        Some((entry.info.clone(), engine))
    }

    /// Put an engine back. Returns false when the market is no longer known.
    pub fn restore(&mut self, engine: SignalEngine) -> bool {
        match self.entries.get_mut(engine.state().market_id()) {
            Some(entry) => {
                entry.engine = Some(engine);
                true
            }
            None => false,
        }
    }

    pub fn info(&self, market_id: &str) -> Option<&MarketInfo> {
        self.entries.get(market_id).map(|e| &e.info)
    }

    pub fn engine(&self, market_id: &str) -> Option<&SignalEngine> {
        self.entries.get(market_id).and_then(|e| e.engine.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
