//! Property tests for the portfolio drawdown monitor.

use proptest::prelude::*;
use risk::PortfolioDrawdownMonitor;
use rust_decimal::Decimal;

fn arb_value() -> impl Strategy<Value = Decimal> {
    (1_000i64..1_000_000).prop_map(Decimal::from)
}

proptest! {
    /// The peak only ever rises.
    #[test]
    fn highest_value_is_monotonic(values in prop::collection::vec(arb_value(), 1..300)) {
        let mut monitor = PortfolioDrawdownMonitor::new(Decimal::new(2, 1), Decimal::from(500_000)).unwrap();
        let mut previous = monitor.highest_value();
        for value in values {
            monitor.update(value);
            prop_assert!(monitor.highest_value() >= previous);
            prop_assert!(monitor.highest_value() >= value);
            previous = monitor.highest_value();
        }
    }

    /// Repeating a value without a new high changes neither the flag nor the peak.
    #[test]
    fn repeated_update_is_idempotent(
        history in prop::collection::vec(arb_value(), 0..50),
        value in arb_value(),
    ) {
        let mut monitor = PortfolioDrawdownMonitor::new(Decimal::new(15, 2), Decimal::from(1_000)).unwrap();
        for v in history {
            monitor.update(v);
        }
        let first = monitor.update(value);
        let peak = monitor.highest_value();
        let second = monitor.update(value);
        prop_assert_eq!(first, second);
        prop_assert_eq!(peak, monitor.highest_value());
    }

    /// The flag is exactly the strict drawdown test against the running peak.
    #[test]
    fn flag_matches_the_drawdown_condition(values in prop::collection::vec(arb_value(), 1..100)) {
        let threshold = Decimal::new(25, 2);
        let mut monitor = PortfolioDrawdownMonitor::new(threshold, Decimal::from(1_000)).unwrap();
        for value in values {
            let active = monitor.update(value);
            let expected = value < monitor.highest_value() * (Decimal::ONE - threshold);
            prop_assert_eq!(active, expected);
        }
    }
}
