use kalshi_signal::indicator::BandPosition;
use kalshi_signal::lifecycle::{ExitContext, ExitOrchestrator, ExitRules, ExitTrigger};
use kalshi_signal::model::signal::{TradeIntent, TradeSide};

fn intent(side: TradeSide, entry_price: f64) -> TradeIntent {
    TradeIntent {
        side,
        entry_price,
        opened_at_ms: 0,
    }
}

fn at(price: f64) -> ExitContext {
    ExitContext {
        price,
        ..ExitContext::default()
    }
}

#[test]
/// Verifies adverse-move exits: buy-yes below entry, buy-no above entry.
fn adverse_move_by_side() {
    let rules = ExitRules::default();
    let yes = intent(TradeSide::BuyYes, 50.0);
    let no = intent(TradeSide::BuyNo, 50.0);

    assert_eq!(rules.evaluate(&yes, &at(49.0)), Some(ExitTrigger::AdverseMove));
    assert_eq!(rules.evaluate(&yes, &at(50.0)), None);
    assert_eq!(rules.evaluate(&yes, &at(51.0)), None);
    assert_eq!(rules.evaluate(&no, &at(51.0)), Some(ExitTrigger::AdverseMove));
    assert_eq!(rules.evaluate(&no, &at(49.0)), None);
}

#[test]
/// Verifies the RSI rule fires only on the move from outside into the band.
fn rsi_neutral_fires_on_reentry() {
    let rules = ExitRules {
        adverse_move: false,
        rsi_neutral_band: Some([40.0, 60.0]),
        bollinger_reentry: false,
    };
    let yes = intent(TradeSide::BuyYes, 50.0);
    let ctx = |prev: f64, cur: f64| ExitContext {
        price: 55.0,
        rsi: Some(cur),
        prev_rsi: Some(prev),
        ..ExitContext::default()
    };

    assert_eq!(rules.evaluate(&yes, &ctx(75.0, 55.0)), Some(ExitTrigger::RsiNeutral));
    assert_eq!(rules.evaluate(&yes, &ctx(50.0, 55.0)), None);
    assert_eq!(rules.evaluate(&yes, &ctx(55.0, 75.0)), None);
    assert_eq!(rules.evaluate(&yes, &at(55.0)), None);
}

#[test]
/// Verifies the Bollinger rule fires when price returns inside the bands.
fn bollinger_reentry_fires_on_return_inside() {
    let rules = ExitRules {
        adverse_move: false,
        rsi_neutral_band: None,
        bollinger_reentry: true,
    };
    let no = intent(TradeSide::BuyNo, 50.0);
    let ctx = |prev: BandPosition, cur: BandPosition| ExitContext {
        price: 45.0,
        band_position: Some(cur),
        prev_band_position: Some(prev),
        ..ExitContext::default()
    };

    assert_eq!(
        rules.evaluate(&no, &ctx(BandPosition::Below, BandPosition::Inside)),
        Some(ExitTrigger::BollingerReentry)
    );
    assert_eq!(
        rules.evaluate(&no, &ctx(BandPosition::Inside, BandPosition::Inside)),
        None
    );
    assert_eq!(
        rules.evaluate(&no, &ctx(BandPosition::Inside, BandPosition::Above)),
        None
    );
}

#[test]
/// Verifies every exit trigger maps to a stable reason code.
fn trigger_maps_to_reason_code() {
    assert_eq!(ExitOrchestrator::decide(ExitTrigger::AdverseMove), "exit.adverse_move");
    assert_eq!(ExitOrchestrator::decide(ExitTrigger::RsiNeutral), "exit.rsi_neutral");
    assert_eq!(
        ExitOrchestrator::decide(ExitTrigger::BollingerReentry),
        "exit.bollinger_reentry"
    );
    assert_eq!(
        ExitOrchestrator::decide(ExitTrigger::SignalReversal),
        "exit.signal_reversal"
    );
}
