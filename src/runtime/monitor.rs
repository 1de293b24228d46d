use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::Config;
use crate::model::market::MarketInfo;
use crate::model::record::TickRecord;
use crate::model::tick::Tick;
use crate::notify::NotificationSender;
use crate::order_manager::OrderManager;
use crate::strategy::{SignalEngine, TickOutcome};
use crate::tick_store::TickStore;

use super::backoff::ExponentialBackoff;
use super::feed::MarketFeed;
use super::market_registry::MarketRegistry;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub market_refresh_interval: Duration,
    pub volume_threshold: u64,
    pub fetch_attempts: u32,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            poll_interval: config.monitor.poll_interval()?,
            market_refresh_interval: config.monitor.market_refresh_interval()?,
            volume_threshold: config.monitor.volume_threshold,
            fetch_attempts: config.monitor.fetch_attempts.max(1),
            backoff_initial: config.monitor.backoff_initial(),
            backoff_max: config.monitor.backoff_max(),
        })
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.backoff_initial, self.backoff_max, 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Processed,
    Unchanged,
    NoPrice,
    FetchFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub processed: usize,
    pub unchanged: usize,
    pub no_price: usize,
    pub fetch_failed: usize,
    pub lost: usize,
    pub records_written: usize,
}

struct MarketOutcome {
    info: MarketInfo,
    engine: SignalEngine,
    status: MarketStatus,
    record: Option<TickRecord>,
}

/// Everything a per-market task needs; shared across the cycle.
struct MarketTaskContext {
    feed: Arc<dyn MarketFeed>,
    orders: Arc<OrderManager>,
    notifier: NotificationSender,
    settings: MonitorSettings,
}

/// Polls every monitored market once per cycle and drives its engine.
pub struct Monitor {
    ctx: Arc<MarketTaskContext>,
    registry: MarketRegistry,
    store: Option<TickStore>,
    last_refresh: Option<Instant>,
}

impl Monitor {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        orders: Arc<OrderManager>,
        notifier: NotificationSender,
        registry: MarketRegistry,
        store: Option<TickStore>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            ctx: Arc::new(MarketTaskContext {
                feed,
                orders,
                notifier,
                settings,
            }),
            registry,
            store,
            last_refresh: None,
        }
    }

    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    pub fn store(&self) -> Option<&TickStore> {
        self.store.as_ref()
    }

    fn refresh_due(&self) -> bool {
        match self.last_refresh {
            None => true,
            Some(at) => at.elapsed() >= self.ctx.settings.market_refresh_interval,
        }
    }

    /// Re-list markets and merge them into the registry.
    pub async fn refresh_markets(&mut self) -> Result<()> {
        let markets = self.ctx.feed.list_markets().await?;
        let summary = self.registry.merge(markets);
        self.last_refresh = Some(Instant::now());
        tracing::info!(
            total = self.registry.len(),
            monitored = self
                .registry
                .monitored_ids(self.ctx.settings.volume_threshold)
                .len(),
            added = summary.added.len(),
            removed = summary.removed.len(),
            "Markets refreshed"
        );
        Ok(())
    }

    /// One pass over every monitored market, one task each.
    pub async fn run_cycle(&mut self) -> CycleSummary {
        let ids = self
            .registry
            .monitored_ids(self.ctx.settings.volume_threshold);
        let mut tasks = JoinSet::new();
        for id in ids {
            if let Some((info, engine)) = self.registry.checkout(&id) {
                tasks.spawn(process_market(self.ctx.clone(), info, engine));
            }
        }

        let mut summary = CycleSummary::default();
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    // The engine went down with the task; the next refresh rebuilds it.
                    tracing::error!(error = %e, "Market task failed");
                    summary.lost += 1;
                    continue;
                }
            };

            match outcome.status {
                MarketStatus::Processed => summary.processed += 1,
                MarketStatus::Unchanged => summary.unchanged += 1,
                MarketStatus::NoPrice => summary.no_price += 1,
                MarketStatus::FetchFailed => summary.fetch_failed += 1,
            }
            if let (Some(store), Some(record)) = (self.store.as_ref(), outcome.record.as_ref()) {
                match store.append(&outcome.info, record) {
                    Ok(()) => summary.records_written += 1,
                    Err(e) => tracing::error!(
                        market = %outcome.info.market_id,
                        error = %e,
                        "Tick log append failed"
                    ),
                }
            }
            if !self.registry.restore(outcome.engine) {
                tracing::debug!(market = %outcome.info.market_id, "Market gone; engine discarded");
            }
        }

        tracing::debug!(?summary, "Cycle complete");
        summary
    }

    /// Refresh and poll until `shutdown` flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut backoff = self.ctx.settings.backoff();
        tracing::info!(
            poll_interval_ms = self.ctx.settings.poll_interval.as_millis() as u64,
            volume_threshold = self.ctx.settings.volume_threshold,
            "Monitor started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            if self.refresh_due() {
                if let Err(e) = self.refresh_markets().await {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Market refresh failed; backing off"
                    );
                    if self.registry.is_empty() {
                        tokio::select! {
                            _ = tokio::time::sleep(delay) => continue,
                            _ = shutdown.changed() => break,
                        }
                    }
                } else {
                    backoff.reset();
                }
            }

            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.ctx.settings.poll_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("Monitor stopped");
        Ok(())
    }
}

async fn process_market(
    ctx: Arc<MarketTaskContext>,
    info: MarketInfo,
    mut engine: SignalEngine,
) -> MarketOutcome {
    let Some(fetched) = fetch_with_retry(&ctx, &info.market_id).await else {
        return MarketOutcome {
            info,
            engine,
            status: MarketStatus::FetchFailed,
            record: None,
        };
    };
    let Some(tick) = fetched else {
        tracing::debug!(market = %info.market_id, "No price available");
        return MarketOutcome {
            info,
            engine,
            status: MarketStatus::NoPrice,
            record: None,
        };
    };

    let outcome = engine.on_tick(&tick);
    let status = match &outcome {
        TickOutcome::Unchanged => {
            tracing::debug!(market = %info.market_id, price = tick.price, "No change in price");
            MarketStatus::Unchanged
        }
        TickOutcome::Processed(report) => {
            let executed = ctx.orders.apply(&mut engine, &report.actions).await;
            for event in report.events.iter().chain(&executed) {
                tracing::info!(market = %info.market_id, kind = event.kind(), "Engine event");
                ctx.notifier.notify(event.render(&info));
            }
            MarketStatus::Processed
        }
    };

    let record = engine.take_record(&tick, outcome.report());
    MarketOutcome {
        info,
        engine,
        status,
        record,
    }
}

/// `None` when every attempt failed.
async fn fetch_with_retry(
    ctx: &MarketTaskContext,
    market_id: &str,
) -> Option<Option<Tick>> {
    let mut backoff = ctx.settings.backoff();
    let attempts = ctx.settings.fetch_attempts.max(1);
    for attempt in 1..=attempts {
        match ctx.feed.fetch_tick(market_id).await {
            Ok(tick) => return Some(tick),
            Err(e) => {
                tracing::warn!(market = market_id, attempt, attempts, error = %e, "Price fetch failed");
                if attempt < attempts {
                    tokio::time::sleep(backoff.next_delay()).await;
                }
            }
        }
    }
    None
}
