use kalshi_signal::model::signal::Direction;
use kalshi_signal::strategy::{
    ConfidenceGate, Confirmation, ConfirmationRules, CrossPhase, CrossState, CrossStep,
    CrossTracker, PendingReason,
};
use proptest::prelude::*;

fn armed_up(anchor: f64) -> CrossTracker {
    let mut t = CrossTracker::new(ConfirmationRules::default());
    t.arm(Direction::Up, anchor);
    t
}

#[test]
/// Verifies an unarmed state ignores prices entirely.
fn idle_state_ignores_prices() {
    let mut s = CrossState::default();
    assert_eq!(s.advance(Direction::Up, 100.0), CrossStep::Idle);
    assert_eq!(s.phase(), CrossPhase::Idle);
}

#[test]
/// Verifies the Idle -> Armed -> Crossed progression and favorable extension.
fn up_crossing_progresses() {
    let mut s = CrossState::default();
    s.arm(46.0);
    assert_eq!(s.phase(), CrossPhase::Armed);
    assert_eq!(s.advance(Direction::Up, 46.0), CrossStep::Waiting);
    assert_eq!(s.advance(Direction::Up, 48.0), CrossStep::Crossed);
    assert_eq!(s.updates_after_cross(), 0);
    assert_eq!(s.advance(Direction::Up, 47.0), CrossStep::Holding);
    assert_eq!(s.advance(Direction::Up, 49.0), CrossStep::Extended);
    assert_eq!(s.updates_after_cross(), 1);
    assert_eq!(s.crossed_prices(), &[48.0, 49.0]);
}

#[test]
/// Verifies a strict move back past the anchor clears the state.
fn reversal_resets_state() {
    let mut s = CrossState::default();
    s.arm(4.0);
    s.advance(Direction::Down, 3.5);
    assert!(s.is_crossed());
    assert_eq!(s.advance(Direction::Down, 4.0), CrossStep::Holding);
    assert_eq!(s.advance(Direction::Down, 4.1), CrossStep::Reverted);
    assert_eq!(s.phase(), CrossPhase::Idle);
    assert!(s.crossed_prices().is_empty());
}

#[test]
/// Verifies confirmation needs the configured number of post-cross updates.
fn confirmation_waits_for_updates() {
    let mut t = armed_up(46.0);
    t.advance(48.0);
    assert!(matches!(
        t.evaluate(48.0, None),
        Confirmation::Pending {
            direction: Direction::Up,
            reason: PendingReason::TooFewUpdates { have: 0, need: 2 }
        }
    ));
    t.advance(49.0);
    t.advance(50.0);
    match t.evaluate(50.0, None) {
        Confirmation::Confirmed {
            direction,
            interval,
        } => {
            assert_eq!(direction, Direction::Up);
            assert!((interval.lower - 46.516).abs() < 1e-3);
            assert!((interval.upper - 51.484).abs() < 1e-3);
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
}

#[test]
/// Verifies a price outside the interval keeps the crossing pending.
fn price_outside_interval_is_pending() {
    let mut t = armed_up(46.0);
    for p in [48.0, 49.0, 50.0] {
        t.advance(p);
    }
    assert!(matches!(
        t.evaluate(60.0, None),
        Confirmation::Pending {
            reason: PendingReason::OutsideInterval { .. },
            ..
        }
    ));
}

#[test]
/// Verifies both directions crossed at once is never actionable.
fn both_crossed_is_ambiguous() {
    let mut t = CrossTracker::new(ConfirmationRules::default());
    t.arm(Direction::Up, 40.0);
    t.arm(Direction::Down, 60.0);
    t.advance(50.0);
    assert_eq!(t.evaluate(50.0, None), Confirmation::Ambiguous);
}

#[test]
/// Verifies the spread gate: missing inputs disqualify, and the anchor gap
/// must exceed the yes spread.
fn spread_gate_requires_edge_over_spread() {
    let rules = ConfirmationRules {
        spread_gate: true,
        ..ConfirmationRules::default()
    };
    let mut t = CrossTracker::new(rules);
    t.arm(Direction::Up, 46.0);
    for p in [48.0, 49.0, 50.0] {
        t.advance(p);
    }
    // No down anchor yet.
    assert!(matches!(
        t.evaluate(50.0, Some(1.0)),
        Confirmation::Pending {
            reason: PendingReason::MissingSpreadInput,
            ..
        }
    ));

    t.arm(Direction::Down, 43.0);
    assert!(matches!(
        t.evaluate(50.0, None),
        Confirmation::Pending {
            reason: PendingReason::MissingSpreadInput,
            ..
        }
    ));
    assert!(matches!(
        t.evaluate(50.0, Some(3.0)),
        Confirmation::Pending {
            reason: PendingReason::SpreadTooWide { .. },
            ..
        }
    ));
    assert!(matches!(
        t.evaluate(50.0, Some(2.0)),
        Confirmation::Confirmed { .. }
    ));
}

#[test]
/// Verifies the asymmetric gate admits a price the symmetric 95% gate rejects above the mean.
fn asymmetric_gate_admits_further_above() {
    let prices = [48.0, 49.0, 50.0];
    let mut sym = armed_up(46.0);
    let mut asym = CrossTracker::new(ConfirmationRules {
        gate: ConfidenceGate::asymmetric_default(),
        ..ConfirmationRules::default()
    });
    asym.arm(Direction::Up, 46.0);
    for p in prices {
        sym.advance(p);
        asym.advance(p);
    }
    // Upper 95% bound is about 51.48.
    assert!(matches!(
        sym.evaluate(52.0, None),
        Confirmation::Pending { .. }
    ));
    assert!(matches!(
        asym.evaluate(52.0, None),
        Confirmation::Confirmed { .. }
    ));
}

proptest! {
    #[test]
    /// Verifies crossed prices only ever move in the favorable direction and
    /// the update counter matches the recorded extensions.
    fn crossed_prices_are_monotonic(prices in prop::collection::vec(40.0f64..60.0, 1..60)) {
        let mut s = CrossState::default();
        s.arm(50.0);
        for p in prices {
            s.advance(Direction::Up, p);
            let cp = s.crossed_prices();
            prop_assert!(cp.windows(2).all(|w| w[1] > w[0]));
            if s.is_crossed() {
                prop_assert_eq!(s.updates_after_cross() as usize, cp.len() - 1);
            } else {
                prop_assert!(cp.is_empty());
            }
        }
    }
}
