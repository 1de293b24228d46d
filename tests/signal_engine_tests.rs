use kalshi_signal::event::EngineEvent;
use kalshi_signal::indicator::IndicatorConfig;
use kalshi_signal::lifecycle::{ExitRules, ExitTrigger};
use kalshi_signal::model::order::OrderHandle;
use kalshi_signal::model::signal::{Direction, TradeIntent, TradeSide};
use kalshi_signal::model::tick::{PriceSource, Quote, Tick};
use kalshi_signal::strategy::{
    Confirmation, CrossPhase, EngineAction, EngineConfig, PatternDetector, SignalEngine,
    TickOutcome, TickReport,
};

const MARKET: &str = "KXTEST-24-B50";

// SMA period 1 makes the smoothed series equal to the raw prices.
fn unsmoothed_config() -> EngineConfig {
    EngineConfig {
        indicators: IndicatorConfig {
            sma_period: 1,
            ..IndicatorConfig::default()
        },
        ..EngineConfig::default()
    }
}

fn feed(engine: &mut SignalEngine, ts: &mut u64, price: f64) -> TickReport {
    *ts += 1;
    match engine.on_tick(&Tick::from_price(MARKET, price, *ts)) {
        TickOutcome::Processed(report) => report,
        TickOutcome::Unchanged => panic!("price {price} was unexpectedly unchanged"),
    }
}

fn handle(side: TradeSide) -> OrderHandle {
    OrderHandle {
        order_id: "ord-1".to_string(),
        client_order_id: "cid-1".to_string(),
        market_id: MARKET.to_string(),
        side,
        count: 10,
    }
}

/// Drive an up pattern (anchor 46) to confirmation at 50 and return the intent.
fn confirm_up(engine: &mut SignalEngine, ts: &mut u64) -> TradeIntent {
    for p in [47.0, 45.0, 46.0, 46.5] {
        feed(engine, ts, p);
    }
    let crossed = feed(engine, ts, 48.0);
    assert_eq!(crossed.pattern.map(|p| p.direction), Some(Direction::Up));
    feed(engine, ts, 49.0);
    let report = feed(engine, ts, 50.0);
    match report.actions.as_slice() {
        [EngineAction::Open(intent)] => *intent,
        other => panic!("expected a single open action, got {other:?}"),
    }
}

#[test]
/// Verifies the default engine reports SMA-9 = 5 after prices 1..=9.
fn scenario_a_default_sma() {
    let mut engine = SignalEngine::new(MARKET, EngineConfig::default());
    let mut ts = 0;
    let mut last = None;
    for p in 1..=9 {
        last = Some(feed(&mut engine, &mut ts, p as f64));
    }
    let report = last.unwrap();
    assert_eq!(report.snapshot.sma, Some(5.0));
    assert!(engine.state().bank().raw_is_full());
}

#[test]
/// Verifies the full up sequence: pattern, cross, confirmation with a
/// buy-yes intent at the confirming price.
fn up_pattern_confirms_buy_yes() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    for p in [47.0, 45.0, 46.0, 46.5] {
        let report = feed(&mut engine, &mut ts, p);
        assert!(report.pattern.is_none());
    }

    let report = feed(&mut engine, &mut ts, 48.0);
    let pattern = report.pattern.unwrap();
    assert!((pattern.anchor - 46.0).abs() < f64::EPSILON);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::PatternDetected { direction: Direction::Up, .. })));
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::SignalCrossed { direction: Direction::Up, .. })));
    assert!(report.actions.is_empty());
    assert_eq!(engine.state().movement(), Some(Direction::Up));

    let report = feed(&mut engine, &mut ts, 49.0);
    assert!(matches!(report.confirmation, Confirmation::Pending { .. }));

    let report = feed(&mut engine, &mut ts, 50.0);
    let intent = match report.actions.as_slice() {
        [EngineAction::Open(intent)] => *intent,
        other => panic!("expected open, got {other:?}"),
    };
    assert_eq!(intent.side, TradeSide::BuyYes);
    assert!((intent.entry_price - 50.0).abs() < f64::EPSILON);
    assert_eq!(intent.opened_at_ms, ts);
}

#[test]
/// Verifies an adverse move after entry cancels the order and fully resets
/// both crossing states on that same tick.
fn scenario_d_adverse_move_exits_and_resets() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    let intent = confirm_up(&mut engine, &mut ts);
    assert!(engine.confirm_open(intent, handle(TradeSide::BuyYes)));
    assert!(engine.state().open_trade().is_some());

    let report = feed(&mut engine, &mut ts, 48.0);
    assert_eq!(
        report.actions,
        vec![EngineAction::Cancel {
            handle: handle(TradeSide::BuyYes),
            trigger: ExitTrigger::AdverseMove,
        }]
    );
    assert!(report.events.iter().any(|e| matches!(
        e,
        EngineEvent::SignalReset {
            direction: None,
            reason: "exit.adverse_move",
            ..
        }
    )));
    assert!(engine.state().open_trade().is_none());
    assert_eq!(engine.state().cross().state(Direction::Up).phase(), CrossPhase::Idle);
    assert_eq!(engine.state().cross().state(Direction::Down).phase(), CrossPhase::Idle);
    assert_eq!(report.confirmation, Confirmation::NotCrossed);
}

#[test]
/// Verifies a price moving back through the anchor cancels the trade tied
/// to that direction.
fn reversal_through_anchor_cancels_trade() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    let intent = confirm_up(&mut engine, &mut ts);
    engine.confirm_open(intent, handle(TradeSide::BuyYes));

    let report = feed(&mut engine, &mut ts, 45.0);
    assert_eq!(
        report.actions,
        vec![EngineAction::Cancel {
            handle: handle(TradeSide::BuyYes),
            trigger: ExitTrigger::SignalReversal,
        }]
    );
    assert!(report.events.iter().any(|e| matches!(
        e,
        EngineEvent::SignalReset {
            direction: Some(Direction::Up),
            reason: "exit.signal_reversal",
            ..
        }
    )));
    assert!(engine.state().open_trade().is_none());
}

#[test]
/// Verifies a failed placement records nothing and the next confirming tick
/// produces a fresh open intent.
fn unconfirmed_placement_is_reattempted() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    let _ = confirm_up(&mut engine, &mut ts);
    assert!(engine.state().open_trade().is_none());

    let report = feed(&mut engine, &mut ts, 51.0);
    match report.actions.as_slice() {
        [EngineAction::Open(intent)] => {
            assert_eq!(intent.side, TradeSide::BuyYes);
            assert!((intent.entry_price - 51.0).abs() < f64::EPSILON);
        }
        other => panic!("expected re-attempt, got {other:?}"),
    }
}

#[test]
/// Verifies no second open while a trade is already open.
fn no_duplicate_open_while_trade_is_open() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    let intent = confirm_up(&mut engine, &mut ts);
    assert!(engine.confirm_open(intent, handle(TradeSide::BuyYes)));
    assert!(!engine.confirm_open(intent, handle(TradeSide::BuyYes)));

    let report = feed(&mut engine, &mut ts, 51.0);
    assert!(report.actions.is_empty());
    assert!(matches!(report.confirmation, Confirmation::Confirmed { .. }));
}

#[test]
/// Verifies a repeated price is a no-op that leaves every piece of state untouched.
fn identical_price_is_idempotent() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    for p in [47.0, 45.0, 46.0, 46.5, 48.0] {
        feed(&mut engine, &mut ts, p);
    }
    let before = engine.clone();
    let outcome = engine.on_tick(&Tick::from_price(MARKET, 48.0, 999));
    assert_eq!(outcome, TickOutcome::Unchanged);
    assert!(outcome.report().is_none());
    assert_eq!(engine, before);
}

#[test]
/// Verifies price-change events are only emitted once a previous price exists.
fn first_tick_has_no_price_change_event() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    let first = feed(&mut engine, &mut ts, 47.0);
    assert!(first.events.is_empty());
    let second = feed(&mut engine, &mut ts, 45.0);
    assert_eq!(
        second.events,
        vec![EngineEvent::PriceChanged {
            previous: 47.0,
            current: 45.0,
        }]
    );
}

#[test]
/// Verifies the same pattern direction is not re-announced on consecutive detections.
fn repeated_direction_is_not_rearmed() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let mut ts = 0;
    for p in [47.0, 45.0, 46.0, 46.5, 48.0] {
        feed(&mut engine, &mut ts, p);
    }
    for p in [50.0, 47.0, 48.0, 48.5, 51.0] {
        let report = feed(&mut engine, &mut ts, p);
        assert!(report.pattern.is_none());
    }
    // [50, 47, 48, 48.5, 51] is itself an up shape.
    let again = PatternDetector::detect(&engine.state().bank().smoothed().values()).unwrap();
    assert_eq!(again.direction, Direction::Up);
    assert_eq!(engine.state().movement(), Some(Direction::Up));
    assert_eq!(engine.state().cross().state(Direction::Up).anchor(), Some(46.0));
}

#[test]
/// Verifies rows are produced only when the record key changes, and that
/// a confirmed trade is reflected in the next row.
fn take_record_dedups_on_key() {
    let mut engine = SignalEngine::new(MARKET, unsmoothed_config());
    let tick = Tick::from_price(MARKET, 40.0, 1);
    let outcome = engine.on_tick(&tick);
    let row = engine.take_record(&tick, outcome.report()).unwrap();
    assert!((row.price - 40.0).abs() < f64::EPSILON);
    assert!(!row.trade_sent);
    assert_eq!(row.pattern, None);

    let repeat = Tick::from_price(MARKET, 40.0, 2);
    let outcome = engine.on_tick(&repeat);
    assert_eq!(outcome, TickOutcome::Unchanged);
    assert!(engine.take_record(&repeat, outcome.report()).is_none());

    let mut ts = 2;
    let intent = confirm_up(&mut engine, &mut ts);
    engine.confirm_open(intent, handle(TradeSide::BuyYes));
    let tick = Tick::from_price(MARKET, 50.5, ts + 1);
    let outcome = engine.on_tick(&tick);
    let row = engine.take_record(&tick, outcome.report()).unwrap();
    assert!(row.trade_sent);
    assert_eq!(row.trade_side, Some(TradeSide::BuyYes));
    assert_eq!(row.crossed, Some(Direction::Up));
    assert!(row.margin_of_error.unwrap() > 0.0);
}

#[test]
/// Verifies a quote-based record key persists a row when only the quote moved.
fn quote_record_key_tracks_quote_changes() {
    let cfg = EngineConfig {
        record_key: PriceSource::YesBid,
        ..unsmoothed_config()
    };
    let mut engine = SignalEngine::new(MARKET, cfg);
    let quote = |yes_bid: f64| Quote {
        yes_bid,
        yes_ask: yes_bid + 2.0,
        no_bid: 98.0 - yes_bid,
        no_ask: 100.0 - yes_bid,
    };

    let t1 = Tick::from_quote(MARKET, 50.0, Some(quote(49.0)), PriceSource::LastPrice, 1).unwrap();
    let out = engine.on_tick(&t1);
    assert!(engine.take_record(&t1, out.report()).is_some());

    let t2 = Tick::from_quote(MARKET, 50.0, Some(quote(48.0)), PriceSource::LastPrice, 2).unwrap();
    let out = engine.on_tick(&t2);
    assert_eq!(out, TickOutcome::Unchanged);
    assert!(engine.take_record(&t2, out.report()).is_some());
    assert!(engine.take_record(&t2, None).is_none());
}

// Default SMA period keeps pattern detection quiet over these short runs.
fn exit_only_config(indicators: IndicatorConfig, exit: ExitRules) -> EngineConfig {
    EngineConfig {
        indicators,
        exit,
        ..EngineConfig::default()
    }
}

fn open_buy_yes(engine: &mut SignalEngine, entry_price: f64) {
    let intent = TradeIntent {
        side: TradeSide::BuyYes,
        entry_price,
        opened_at_ms: 0,
    };
    assert!(engine.confirm_open(intent, handle(TradeSide::BuyYes)));
}

#[test]
/// Verifies RSI falling from 100 back into the neutral band cancels the
/// open trade, using the previous tick's RSI as the outside reading.
fn rsi_returning_to_neutral_cancels_trade() {
    let cfg = exit_only_config(
        IndicatorConfig {
            rsi_period: 4,
            ..IndicatorConfig::default()
        },
        ExitRules {
            adverse_move: false,
            rsi_neutral_band: Some([40.0, 60.0]),
            bollinger_reentry: false,
        },
    );
    let mut engine = SignalEngine::new(MARKET, cfg);
    open_buy_yes(&mut engine, 50.0);
    let mut ts = 0;

    for p in [50.0, 51.0, 52.0, 53.0] {
        let report = feed(&mut engine, &mut ts, p);
        assert!(report.snapshot.rsi.is_none());
        assert!(report.actions.is_empty());
    }
    let overbought = feed(&mut engine, &mut ts, 54.0);
    assert_eq!(overbought.snapshot.rsi, Some(100.0));
    assert!(overbought.actions.is_empty());

    let back = feed(&mut engine, &mut ts, 52.0);
    let rsi = back.snapshot.rsi.unwrap();
    assert!((rsi - 60.0).abs() < 1e-9);
    match back.actions.as_slice() {
        [EngineAction::Cancel { handle, trigger }] => {
            assert_eq!(*trigger, ExitTrigger::RsiNeutral);
            assert_eq!(handle.order_id, "ord-1");
        }
        other => panic!("expected an RSI exit, got {other:?}"),
    }
    assert!(engine.state().open_trade().is_none());
    assert!(back.events.iter().any(|e| matches!(
        e,
        EngineEvent::SignalReset {
            reason: "exit.rsi_neutral",
            ..
        }
    )));
}

#[test]
/// Verifies price re-entering the Bollinger bands after closing above them
/// cancels the open trade.
fn bollinger_reentry_cancels_trade() {
    let cfg = exit_only_config(
        IndicatorConfig {
            bollinger_period: 5,
            bollinger_k: 1.0,
            ..IndicatorConfig::default()
        },
        ExitRules {
            adverse_move: false,
            rsi_neutral_band: None,
            bollinger_reentry: true,
        },
    );
    let mut engine = SignalEngine::new(MARKET, cfg);
    open_buy_yes(&mut engine, 50.0);
    let mut ts = 0;

    for p in [50.0, 50.2, 49.8, 50.1] {
        assert!(feed(&mut engine, &mut ts, p).actions.is_empty());
    }
    let spike = feed(&mut engine, &mut ts, 60.0);
    let bands = spike.snapshot.bollinger.unwrap();
    assert!(60.0 > bands.upper);
    assert!(spike.actions.is_empty());

    let back = feed(&mut engine, &mut ts, 50.1);
    let bands = back.snapshot.bollinger.unwrap();
    assert!(50.1 > bands.lower && 50.1 < bands.upper);
    match back.actions.as_slice() {
        [EngineAction::Cancel { trigger, .. }] => {
            assert_eq!(*trigger, ExitTrigger::BollingerReentry);
        }
        other => panic!("expected a Bollinger exit, got {other:?}"),
    }
    assert!(engine.state().open_trade().is_none());
}
