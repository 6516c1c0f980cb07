//! Property tests for the position state machines.
//!
//! 1. Peak monotonicity: while invested, the tracked peak never decreases
//! 2. One transition per tick: every decision is exactly one of enter/exit/hold,
//!    and it agrees with the invested flag before and after
//! 3. Window bound: moving-average windows never exceed their period

use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{AdaptiveCrossoverParams, DrawdownTrailingParams, LeveragedTrendParams, PeakOrdering};
use core_types::{Decision, InstrumentState};
use proptest::prelude::*;
use rust_decimal::Decimal;
use strategies::{
    AdaptiveCrossoverEngine, DrawdownTrailingController, MovingAverageWindow, MultiTierStopController,
    TierState,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1_000i64..50_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_tick() -> impl Strategy<Value = (Decimal, Decimal, Decimal)> {
    (arb_price(), arb_price(), arb_price())
}

fn arb_ordering() -> impl Strategy<Value = PeakOrdering> {
    prop_oneof![Just(PeakOrdering::UpdateThenTest), Just(PeakOrdering::TestThenUpdate)]
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 1, 2, 0, 0, 0).unwrap()
}

// ── 1. Peak monotonicity ────────────────────────────────────────────

proptest! {
    #[test]
    fn peak_never_decreases_while_invested(
        ticks in prop::collection::vec(arb_tick(), 1..200),
        ordering in arb_ordering(),
        cooldown in prop::option::of(0i64..10),
    ) {
        let ctl = DrawdownTrailingController::new(DrawdownTrailingParams {
            peak_ordering: ordering,
            cooldown_days: cooldown,
            ..DrawdownTrailingParams::default()
        }).unwrap();
        let mut state = InstrumentState::new();
        ctl.enter_initial(&mut state, ticks[0].0);

        for (i, (price, fast, slow)) in ticks.into_iter().enumerate() {
            let before = state.clone();
            let now = start() + Duration::days(i as i64);
            let decision = ctl.evaluate(&mut state, price, fast, slow, now);

            if before.invested && state.invested {
                prop_assert!(state.peak_price >= before.peak_price);
                prop_assert!(state.peak_price >= Some(price));
            }
            if decision.is_exit() {
                prop_assert_eq!(state.peak_price, None);
            }
        }
    }
}

// ── 2. One transition per tick ──────────────────────────────────────

proptest! {
    #[test]
    fn drawdown_decisions_match_state_transitions(
        ticks in prop::collection::vec(arb_tick(), 1..200),
        ordering in arb_ordering(),
    ) {
        let ctl = DrawdownTrailingController::new(DrawdownTrailingParams {
            peak_ordering: ordering,
            ..DrawdownTrailingParams::default()
        }).unwrap();
        let mut state = InstrumentState::new();

        for (i, (price, fast, slow)) in ticks.into_iter().enumerate() {
            let was_invested = state.invested;
            let now = start() + Duration::days(i as i64);
            let decision = ctl.evaluate(&mut state, price, fast, slow, now);
            match decision {
                Decision::EnterLong { .. } => {
                    prop_assert!(!was_invested && state.invested);
                }
                Decision::Exit { .. } => {
                    prop_assert!(was_invested && !state.invested);
                }
                Decision::Hold => {
                    prop_assert_eq!(was_invested, state.invested);
                }
            }
        }
    }

    #[test]
    fn multi_tier_decisions_match_state_transitions(
        ticks in prop::collection::vec((arb_tick(), 5u32..40), 1..200),
    ) {
        let ctl = MultiTierStopController::new(LeveragedTrendParams::default()).unwrap();
        let mut state = TierState::Flat;

        for ((price, short, long), vix) in ticks {
            let was_holding = state.is_holding();
            let decision = ctl.evaluate(&mut state, price, short, long, Decimal::from(vix));
            match decision {
                Decision::EnterLong { size } => {
                    prop_assert!(!was_holding && state.is_holding());
                    prop_assert!(size > Decimal::ZERO && size <= Decimal::ONE);
                }
                Decision::Exit { .. } => {
                    prop_assert!(was_holding && !state.is_holding());
                }
                Decision::Hold => {
                    prop_assert_eq!(was_holding, state.is_holding());
                }
            }
        }
    }

    #[test]
    fn crossover_never_enters_while_invested_or_exits_while_flat(
        closes in prop::collection::vec((arb_price(), any::<bool>(), any::<bool>()), 1..120),
    ) {
        let mut engine = AdaptiveCrossoverEngine::new(AdaptiveCrossoverParams::default()).unwrap();
        for (close, preservation, invested) in closes {
            let decision = engine.on_monthly_close(close, Decimal::ONE, Decimal::from(50), preservation, invested);
            prop_assert!(!(invested && decision.is_entry()));
            prop_assert!(!(!invested && decision.is_exit()));
        }
    }
}

// ── 3. Window bound ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn window_never_exceeds_its_period(
        period in 1usize..30,
        values in prop::collection::vec(arb_price(), 0..100),
    ) {
        let mut window = MovingAverageWindow::new(period);
        for value in values {
            window.push(value);
            prop_assert!(window.len() <= period);
            prop_assert_eq!(window.mean().is_some(), window.len() == period);
        }
    }
}
