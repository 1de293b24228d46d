use crate::event::EngineEvent;
use crate::indicator::{IndicatorBank, IndicatorConfig, IndicatorSnapshot};
use crate::lifecycle::{ExitContext, ExitOrchestrator, ExitRules, ExitTrigger, OpenTrade};
use crate::model::order::OrderHandle;
use crate::model::record::TickRecord;
use crate::model::signal::{Direction, PatternSignal, TradeIntent, TradeSide};
use crate::model::tick::{PriceSource, Quote, Tick};
use crate::strategy::cross::{Confirmation, ConfirmationRules, CrossStep, CrossTracker};
use crate::strategy::pattern::PatternDetector;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    pub indicators: IndicatorConfig,
    pub confirmation: ConfirmationRules,
    pub exit: ExitRules,
    /// Field whose change gates appending a persisted row.
    pub record_key: PriceSource,
}

/// Work the caller must carry out against the exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineAction {
    Open(TradeIntent),
    Cancel {
        handle: OrderHandle,
        trigger: ExitTrigger,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: IndicatorSnapshot,
    pub pattern: Option<PatternSignal>,
    pub confirmation: Confirmation,
    pub events: Vec<EngineEvent>,
    pub actions: Vec<EngineAction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Price identical to the last one seen; nothing was touched.
    Unchanged,
    Processed(TickReport),
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            TickOutcome::Unchanged => None,
            TickOutcome::Processed(report) => Some(report),
        }
    }
}

/// Everything the engine remembers about one market.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentState {
    market_id: String,
    bank: IndicatorBank,
    cross: CrossTracker,
    last_price: Option<f64>,
    last_quote: Option<Quote>,
    movement: Option<Direction>,
    open_trade: Option<OpenTrade>,
    last_snapshot: IndicatorSnapshot,
    // Outer None: no row persisted yet. Inner None: the key field was absent.
    last_record_key: Option<Option<f64>>,
}

impl InstrumentState {
    fn new(market_id: &str, cfg: &EngineConfig) -> Self {
        Self {
            market_id: market_id.to_string(),
            bank: IndicatorBank::new(cfg.indicators.clone()),
            cross: CrossTracker::new(cfg.confirmation),
            last_price: None,
            last_quote: None,
            movement: None,
            open_trade: None,
            last_snapshot: IndicatorSnapshot::default(),
            last_record_key: None,
        }
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn bank(&self) -> &IndicatorBank {
        &self.bank
    }

    pub fn cross(&self) -> &CrossTracker {
        &self.cross
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn last_quote(&self) -> Option<Quote> {
        self.last_quote
    }

    pub fn movement(&self) -> Option<Direction> {
        self.movement
    }

    pub fn open_trade(&self) -> Option<&OpenTrade> {
        self.open_trade.as_ref()
    }

    pub fn last_snapshot(&self) -> &IndicatorSnapshot {
        &self.last_snapshot
    }
}

/// Per-market signal state machine, fed one tick at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEngine {
    cfg: EngineConfig,
    state: InstrumentState,
}

impl SignalEngine {
    pub fn new(market_id: &str, cfg: EngineConfig) -> Self {
        Self {
            state: InstrumentState::new(market_id, &cfg),
            cfg,
        }
    }

    pub fn state(&self) -> &InstrumentState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn on_tick(&mut self, tick: &Tick) -> TickOutcome {
        let price = tick.price;
        if self.state.last_price == Some(price) {
            return TickOutcome::Unchanged;
        }

        let previous = self.state.last_price.replace(price);
        self.state.last_quote = tick.quote;

        let mut events = Vec::new();
        let mut actions = Vec::new();
        if let Some(previous) = previous {
            events.push(EngineEvent::PriceChanged {
                previous,
                current: price,
            });
        }

        let snapshot = self.state.bank.push(price);
        let prev_snapshot = std::mem::replace(&mut self.state.last_snapshot, snapshot);

        let pattern = self.detect_pattern(price, &mut events);

        for (direction, step) in self.state.cross.advance(price) {
            match step {
                CrossStep::Crossed => {
                    tracing::info!(market = %self.state.market_id, %direction, price, "Signal crossed");
                    events.push(EngineEvent::SignalCrossed { direction, price });
                }
                CrossStep::Reverted => {
                    let reason = ExitOrchestrator::decide(ExitTrigger::SignalReversal);
                    tracing::info!(market = %self.state.market_id, %direction, price, reason, "Signal reset");
                    events.push(EngineEvent::SignalReset {
                        direction: Some(direction),
                        reason,
                        price,
                    });
                    let tied = self
                        .state
                        .open_trade
                        .as_ref()
                        .is_some_and(|t| t.intent.side.direction() == direction);
                    if tied {
                        if let Some(trade) = self.state.open_trade.take() {
                            actions.push(EngineAction::Cancel {
                                handle: trade.handle,
                                trigger: ExitTrigger::SignalReversal,
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(trade) = self.state.open_trade.as_ref() {
            let ctx = ExitContext {
                price,
                rsi: snapshot.rsi,
                prev_rsi: prev_snapshot.rsi,
                band_position: snapshot.bollinger.map(|b| b.position(price)),
                prev_band_position: prev_snapshot
                    .bollinger
                    .zip(previous)
                    .map(|(b, p)| b.position(p)),
            };
            if let Some(trigger) = self.cfg.exit.evaluate(&trade.intent, &ctx) {
                let reason = ExitOrchestrator::decide(trigger);
                tracing::info!(
                    market = %self.state.market_id,
                    side = %trade.intent.side,
                    entry_price = trade.intent.entry_price,
                    price,
                    reason,
                    "Exit condition met"
                );
                if let Some(trade) = self.state.open_trade.take() {
                    actions.push(EngineAction::Cancel {
                        handle: trade.handle,
                        trigger,
                    });
                }
                self.state.cross.reset_all();
                events.push(EngineEvent::SignalReset {
                    direction: None,
                    reason,
                    price,
                });
            }
        }

        let spread = tick.quote.map(|q| q.yes_spread());
        let confirmation = self.state.cross.evaluate(price, spread);
        if self.state.open_trade.is_none() {
            if let Confirmation::Confirmed {
                direction,
                interval,
            } = confirmation
            {
                let intent = TradeIntent {
                    side: TradeSide::for_direction(direction),
                    entry_price: price,
                    opened_at_ms: tick.timestamp_ms,
                };
                tracing::info!(
                    market = %self.state.market_id,
                    side = %intent.side,
                    price,
                    ci_lower = interval.lower,
                    ci_upper = interval.upper,
                    "Trade confirmed"
                );
                actions.push(EngineAction::Open(intent));
            }
        }

        TickOutcome::Processed(TickReport {
            snapshot,
            pattern,
            confirmation,
            events,
            actions,
        })
    }

    fn detect_pattern(&mut self, price: f64, events: &mut Vec<EngineEvent>) -> Option<PatternSignal> {
        if !self.state.bank.raw_is_full() {
            return None;
        }
        let signal = PatternDetector::detect(&self.state.bank.smoothed().values())?;
        if self.state.movement == Some(signal.direction) {
            return None;
        }

        self.state.movement = Some(signal.direction);
        self.state.cross.arm(signal.direction, signal.anchor);
        tracing::info!(
            market = %self.state.market_id,
            direction = %signal.direction,
            anchor = signal.anchor,
            "New pattern detected"
        );
        events.push(EngineEvent::PatternDetected {
            direction: signal.direction,
            anchor: signal.anchor,
            price,
        });
        Some(signal)
    }

    /// Record that the order for `intent` was accepted. Returns false, and
    /// changes nothing, when a trade is already open.
    pub fn confirm_open(&mut self, intent: TradeIntent, handle: OrderHandle) -> bool {
        if self.state.open_trade.is_some() {
            tracing::warn!(
                market = %self.state.market_id,
                order_id = %handle.order_id,
                "Trade already open; ignoring confirmation"
            );
            return false;
        }
        self.state.open_trade = Some(OpenTrade { intent, handle });
        true
    }

    /// Build the row to persist for `tick`, or `None` when the configured
    /// change key matches the previously persisted row.
    pub fn take_record(&mut self, tick: &Tick, report: Option<&TickReport>) -> Option<TickRecord> {
        let key = tick.value_of(self.cfg.record_key);
        if self.state.last_record_key == Some(key) {
            return None;
        }
        self.state.last_record_key = Some(key);

        let snapshot = self.state.last_snapshot;
        let crossed = self.state.cross.pair().any_crossed();
        let interval = crossed.and_then(|d| self.state.cross.interval(d));
        let pattern = report.and_then(|r| r.pattern);

        Some(TickRecord {
            market_id: self.state.market_id.clone(),
            timestamp_ms: tick.timestamp_ms,
            price: tick.price,
            last_price: tick.last_price,
            quote: tick.quote,
            sma: snapshot.sma,
            total_average: snapshot.sma_of_sma,
            margin_of_error: interval.map(|ci| ci.margin_of_error()),
            std_dev: interval.map(|ci| ci.std_dev),
            anchor: pattern.map(|p| p.anchor),
            rsi: snapshot.rsi,
            bollinger: snapshot.bollinger,
            pattern: pattern.map(|p| p.direction),
            trade_sent: self.state.open_trade.is_some(),
            crossed,
            trade_side: self.state.open_trade.as_ref().map(|t| t.intent.side),
        })
    }
}
