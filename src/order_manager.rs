use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::event::EngineEvent;
use crate::lifecycle::ExitOrchestrator;
use crate::model::order::OrderHandle;
use crate::model::signal::TradeSide;
use crate::strategy::{EngineAction, SignalEngine};

/// Exchange side of order placement.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn place_order(&self, market_id: &str, side: TradeSide, count: u32)
        -> Result<OrderHandle>;

    async fn cancel_order(&self, handle: &OrderHandle) -> Result<()>;
}

/// Accepts everything and touches nothing. Used when auto trading is off.
#[derive(Debug, Clone, Default)]
pub struct DryRunExecutor;

#[async_trait]
impl OrderExecutor for DryRunExecutor {
    async fn place_order(
        &self,
        market_id: &str,
        side: TradeSide,
        count: u32,
    ) -> Result<OrderHandle> {
        let client_order_id = uuid::Uuid::new_v4().to_string();
        let handle = OrderHandle {
            order_id: format!("dry-{}", &client_order_id[..8]),
            client_order_id,
            market_id: market_id.to_string(),
            side,
            count,
        };
        tracing::info!(market = market_id, side = %side, count, order_id = %handle.order_id, "Dry-run order placed");
        Ok(handle)
    }

    async fn cancel_order(&self, handle: &OrderHandle) -> Result<()> {
        tracing::info!(market = %handle.market_id, order_id = %handle.order_id, "Dry-run order canceled");
        Ok(())
    }
}

/// Carries engine actions out against an executor and feeds the result back.
pub struct OrderManager {
    executor: Arc<dyn OrderExecutor>,
    contracts_per_order: u32,
}

impl OrderManager {
    pub fn new(executor: Arc<dyn OrderExecutor>, contracts_per_order: u32) -> Self {
        Self {
            executor,
            contracts_per_order: contracts_per_order.max(1),
        }
    }

    pub fn contracts_per_order(&self) -> u32 {
        self.contracts_per_order
    }

    /// Execute `actions` in order. A placement is recorded on the engine only
    /// once the executor accepted it; a failed placement leaves no open trade.
    /// Cancel failures are logged; the engine has already reset by then.
    pub async fn apply(
        &self,
        engine: &mut SignalEngine,
        actions: &[EngineAction],
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for action in actions {
            match action {
                EngineAction::Open(intent) => {
                    let market_id = engine.state().market_id().to_string();
                    match self
                        .executor
                        .place_order(&market_id, intent.side, self.contracts_per_order)
                        .await
                    {
                        Ok(handle) => {
                            tracing::info!(
                                market = %market_id,
                                side = %intent.side,
                                entry_price = intent.entry_price,
                                order_id = %handle.order_id,
                                "Order accepted"
                            );
                            if engine.confirm_open(*intent, handle.clone()) {
                                events.push(EngineEvent::TradeExecuted {
                                    side: intent.side,
                                    price: intent.entry_price,
                                    handle,
                                });
                            }
                        }
                        Err(e) => {
                            tracing::error!(
                                market = %market_id,
                                side = %intent.side,
                                error = %e,
                                "Order placement failed"
                            );
                        }
                    }
                }
                EngineAction::Cancel { handle, trigger } => {
                    let reason = ExitOrchestrator::decide(*trigger);
                    match self.executor.cancel_order(handle).await {
                        Ok(()) => tracing::info!(
                            market = %handle.market_id,
                            order_id = %handle.order_id,
                            reason,
                            "Order canceled"
                        ),
                        Err(e) => tracing::warn!(
                            market = %handle.market_id,
                            order_id = %handle.order_id,
                            reason,
                            error = %e,
                            "Order cancel failed"
                        ),
                    }
                }
            }
        }
        events
    }
}
