use crate::error::ExecutorError;
use crate::portfolio::{Fill, Portfolio, Side};
use chrono::{DateTime, Utc};
use configuration::Simulation;
use core_types::MarketSlice;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Quantities are kept to this many decimal places, rounded toward zero.
const QUANTITY_DP: u32 = 6;

/// The execution and portfolio collaborator the algorithms talk to.
///
/// Algorithms only ever ask for target weights or a full exit; fills, cash and
/// marking are the broker's business.
pub trait Broker {
    /// Rebalances `symbol` so that it makes up `fraction` of total portfolio value.
    fn set_target_allocation(&mut self, symbol: &str, fraction: Decimal) -> Result<(), ExecutorError>;

    /// Sells the whole holding in `symbol`. A no-op when nothing is held.
    fn liquidate(&mut self, symbol: &str) -> Result<(), ExecutorError>;

    fn is_invested(&self, symbol: &str) -> bool;

    /// Quantity held in `symbol`; zero when flat.
    fn holdings(&self, symbol: &str) -> Decimal;

    /// Cash plus every holding at its latest mark.
    fn total_value(&self) -> Decimal;
}

/// An in-memory broker that fills market orders at the latest close.
#[derive(Debug, Clone)]
pub struct PaperBroker {
    portfolio: Portfolio,
    commission_pct: Decimal,
    prices: HashMap<String, Decimal>,
    now: DateTime<Utc>,
    fills: Vec<Fill>,
}

impl PaperBroker {
    pub fn new(params: &Simulation) -> Self {
        Self {
            portfolio: Portfolio::new(params.initial_capital),
            commission_pct: params.commission_pct,
            prices: HashMap::new(),
            now: DateTime::<Utc>::default(),
            fills: Vec::new(),
        }
    }

    /// Records the closes in `slice` as the prices fills execute at.
    pub fn mark(&mut self, slice: &MarketSlice) {
        self.now = slice.timestamp;
        for (symbol, bar) in &slice.bars {
            if bar.has_price() {
                self.prices.insert(symbol.clone(), bar.close);
            }
        }
    }

    pub fn price(&self, symbol: &str) -> Result<Decimal, ExecutorError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ExecutorError::NoPrice(symbol.to_string()))
    }

    pub fn cash(&self) -> Decimal {
        self.portfolio.cash
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    fn execute(&mut self, symbol: &str, side: Side, quantity: Decimal, price: Decimal) -> Result<(), ExecutorError> {
        if quantity <= Decimal::ZERO {
            return Ok(());
        }
        let fill = Fill {
            timestamp: self.now,
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            fee: price * quantity * self.commission_pct,
        };
        self.portfolio.apply(&fill)?;
        tracing::debug!(symbol, ?side, %quantity, %price, fee = %fill.fee, "Order filled.");
        self.fills.push(fill);
        Ok(())
    }
}

impl Broker for PaperBroker {
    fn set_target_allocation(&mut self, symbol: &str, fraction: Decimal) -> Result<(), ExecutorError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(ExecutorError::InvalidAllocation {
                symbol: symbol.to_string(),
                fraction: fraction.to_string(),
            });
        }
        let price = self.price(symbol)?;
        let target = (self.total_value() * fraction / price)
            .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero);
        let current = self.holdings(symbol);

        if target > current {
            let affordable = (self.portfolio.cash / (price * (Decimal::ONE + self.commission_pct)))
                .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero);
            let quantity = (target - current).min(affordable);
            self.execute(symbol, Side::Buy, quantity, price)
        } else {
            self.execute(symbol, Side::Sell, current - target, price)
        }
    }

    fn liquidate(&mut self, symbol: &str) -> Result<(), ExecutorError> {
        let quantity = self.holdings(symbol);
        if quantity.is_zero() {
            return Ok(());
        }
        let price = self.price(symbol)?;
        self.execute(symbol, Side::Sell, quantity, price)
    }

    fn is_invested(&self, symbol: &str) -> bool {
        self.holdings(symbol) > Decimal::ZERO
    }

    fn holdings(&self, symbol: &str) -> Decimal {
        self.portfolio
            .holding(symbol)
            .map_or(Decimal::ZERO, |holding| holding.quantity)
    }

    fn total_value(&self) -> Decimal {
        // Every holding was bought at a marked price, so a mark exists for it.
        let holdings_value: Decimal = self
            .portfolio
            .holdings
            .iter()
            .filter_map(|(symbol, holding)| self.prices.get(symbol).map(|price| *price * holding.quantity))
            .sum();
        self.portfolio.cash + holdings_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::DailyBar;
    use rust_decimal_macros::dec;

    fn slice(spy: Decimal, tqqq: Decimal) -> MarketSlice {
        MarketSlice::new(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
            .with_bar("SPY", DailyBar::from_close(spy))
            .with_bar("TQQQ", DailyBar::from_close(tqqq))
    }

    fn broker() -> PaperBroker {
        PaperBroker::new(&Simulation {
            initial_capital: dec!(10000),
            commission_pct: dec!(0),
        })
    }

    #[test]
    fn target_allocations_split_the_portfolio() {
        let mut broker = broker();
        broker.mark(&slice(dec!(100), dec!(50)));
        broker.set_target_allocation("SPY", dec!(0.5)).unwrap();
        broker.set_target_allocation("TQQQ", dec!(0.5)).unwrap();

        assert_eq!(broker.holdings("SPY"), dec!(50));
        assert_eq!(broker.holdings("TQQQ"), dec!(100));
        assert_eq!(broker.cash(), dec!(0));
        assert_eq!(broker.fills().len(), 2);

        broker.mark(&slice(dec!(110), dec!(40)));
        assert_eq!(broker.total_value(), dec!(9500));
    }

    #[test]
    fn liquidate_returns_to_cash() {
        let mut broker = broker();
        broker.mark(&slice(dec!(100), dec!(50)));
        broker.set_target_allocation("SPY", dec!(1)).unwrap();
        assert!(broker.is_invested("SPY"));

        broker.mark(&slice(dec!(120), dec!(50)));
        broker.liquidate("SPY").unwrap();
        assert!(!broker.is_invested("SPY"));
        assert_eq!(broker.cash(), dec!(12000));
        // flat liquidations do nothing
        broker.liquidate("SPY").unwrap();
        assert_eq!(broker.fills().len(), 2);
    }

    #[test]
    fn commission_limits_what_cash_can_buy() {
        let mut broker = PaperBroker::new(&Simulation {
            initial_capital: dec!(1010),
            commission_pct: dec!(0.01),
        });
        broker.mark(&slice(dec!(100), dec!(50)));
        broker.set_target_allocation("SPY", dec!(1)).unwrap();
        assert_eq!(broker.holdings("SPY"), dec!(10));
        assert_eq!(broker.cash(), dec!(0));
    }

    #[test]
    fn unpriced_symbols_and_bad_fractions_are_rejected() {
        let mut broker = broker();
        assert_eq!(
            broker.set_target_allocation("SPY", dec!(0.5)),
            Err(ExecutorError::NoPrice("SPY".to_string()))
        );
        broker.mark(&slice(dec!(100), dec!(50)));
        assert!(matches!(
            broker.set_target_allocation("SPY", dec!(1.5)),
            Err(ExecutorError::InvalidAllocation { .. })
        ));
    }
}
