use crate::error::ExecutorError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

/// A completed trade, as applied to the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub fee: Decimal,
}

/// A long holding in one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// Manages the state of a trading account: cash and long holdings.
/// Its sole responsibility is to accurately reflect the current state based on fills.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: Decimal,
    pub holdings: HashMap<String, Holding>,
}

impl Portfolio {
    /// Creates a new `Portfolio` with a given amount of starting capital.
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            cash: initial_capital,
            holdings: HashMap::new(),
        }
    }

    /// Updates the portfolio state based on a fill.
    /// This is the core state transition logic. It does not calculate P&L, it only mutates state.
    pub fn apply(&mut self, fill: &Fill) -> Result<(), ExecutorError> {
        let notional = fill.price * fill.quantity;

        match fill.side {
            Side::Buy => {
                let required = notional + fill.fee;
                if required > self.cash {
                    return Err(ExecutorError::InsufficientCash {
                        required: required.to_string(),
                        available: self.cash.to_string(),
                    });
                }
                self.cash -= required;

                let holding = self.holdings.entry(fill.symbol.clone()).or_insert(Holding {
                    quantity: Decimal::ZERO,
                    average_price: Decimal::ZERO,
                    last_updated: fill.timestamp,
                });
                // New average entry price over the combined quantity.
                let total_quantity = holding.quantity + fill.quantity;
                if !total_quantity.is_zero() {
                    holding.average_price =
                        (holding.average_price * holding.quantity + notional) / total_quantity;
                }
                holding.quantity = total_quantity;
                holding.last_updated = fill.timestamp;
            }
            Side::Sell => {
                let holding = self
                    .holdings
                    .get_mut(&fill.symbol)
                    .ok_or_else(|| ExecutorError::PositionNotFound(fill.symbol.clone()))?;
                if fill.quantity > holding.quantity {
                    return Err(ExecutorError::InvalidClosingQuantity {
                        requested: fill.quantity.to_string(),
                        available: holding.quantity.to_string(),
                    });
                }
                holding.quantity -= fill.quantity;
                holding.last_updated = fill.timestamp;
                self.cash += notional - fill.fee;

                // If the quantity is zero after an update, remove it from the map.
                if holding.quantity.is_zero() {
                    self.holdings.remove(&fill.symbol);
                }
            }
        }

        Ok(())
    }

    /// Equity = cash + market value of all holdings at `prices`.
    pub fn total_equity(&self, prices: &HashMap<String, Decimal>) -> Result<Decimal, ExecutorError> {
        let mut holdings_value = Decimal::ZERO;
        for (symbol, holding) in &self.holdings {
            let price = prices
                .get(symbol)
                .ok_or_else(|| ExecutorError::NoPrice(symbol.clone()))?;
            holdings_value += *price * holding.quantity;
        }
        Ok(self.cash + holdings_value)
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(side: Side, quantity: Decimal, price: Decimal) -> Fill {
        Fill {
            timestamp: DateTime::<Utc>::default(),
            symbol: "SPY".to_string(),
            side,
            quantity,
            price,
            fee: dec!(1),
        }
    }

    #[test]
    fn buys_average_and_sells_release_cash() {
        let mut portfolio = Portfolio::new(dec!(1000));
        portfolio.apply(&fill(Side::Buy, dec!(2), dec!(100))).unwrap();
        portfolio.apply(&fill(Side::Buy, dec!(2), dec!(200))).unwrap();
        assert_eq!(portfolio.cash, dec!(398));
        let holding = portfolio.holding("SPY").unwrap();
        assert_eq!(holding.quantity, dec!(4));
        assert_eq!(holding.average_price, dec!(150));

        portfolio.apply(&fill(Side::Sell, dec!(4), dec!(210))).unwrap();
        assert_eq!(portfolio.cash, dec!(1237));
        assert!(portfolio.holding("SPY").is_none());
    }

    #[test]
    fn rejects_overspending_and_overselling() {
        let mut portfolio = Portfolio::new(dec!(100));
        assert!(matches!(
            portfolio.apply(&fill(Side::Buy, dec!(1), dec!(100))),
            Err(ExecutorError::InsufficientCash { .. })
        ));
        assert_eq!(
            portfolio.apply(&fill(Side::Sell, dec!(1), dec!(10))),
            Err(ExecutorError::PositionNotFound("SPY".to_string()))
        );
        assert_eq!(portfolio.cash, dec!(100));
    }

    #[test]
    fn equity_needs_a_price_for_every_holding() {
        let mut portfolio = Portfolio::new(dec!(1000));
        portfolio.apply(&fill(Side::Buy, dec!(1), dec!(100))).unwrap();
        assert_eq!(
            portfolio.total_equity(&HashMap::new()),
            Err(ExecutorError::NoPrice("SPY".to_string()))
        );
        let prices = HashMap::from([("SPY".to_string(), dec!(120))]);
        assert_eq!(portfolio.total_equity(&prices).unwrap(), dec!(1019));
    }
}
