use crate::error::StrategyError;
use crate::moving_average::MovingAverageWindow;
use configuration::AdaptiveCrossoverParams;
use core_types::{Decision, ExitReason, ThresholdPair};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const RSI_NEUTRAL: Decimal = dec!(50);

/// Monthly short/long moving-average crossover with thresholds that widen
/// with volatility, with directionless momentum, and under capital preservation.
#[derive(Debug, Clone)]
pub struct AdaptiveCrossoverEngine {
    params: AdaptiveCrossoverParams,
    short_window: MovingAverageWindow,
    long_window: MovingAverageWindow,
}

impl AdaptiveCrossoverEngine {
    pub fn new(params: AdaptiveCrossoverParams) -> Result<Self, StrategyError> {
        if params.short_period == 0 || params.long_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "moving-average periods must be positive".to_string(),
            ));
        }
        if params.short_period > params.long_period {
            return Err(StrategyError::InvalidParameters(
                "short_period must not exceed long_period".to_string(),
            ));
        }
        if params.base_buy_threshold <= Decimal::ZERO || params.base_sell_threshold <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(
                "base thresholds must be positive".to_string(),
            ));
        }
        if params.preservation_buy_mult <= Decimal::ZERO || params.preservation_sell_mult <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(
                "preservation multipliers must be positive".to_string(),
            ));
        }
        Ok(Self {
            short_window: MovingAverageWindow::new(params.short_period),
            long_window: MovingAverageWindow::new(params.long_period),
            params,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.params.symbol
    }

    pub fn allocation(&self) -> Decimal {
        self.params.allocation
    }

    pub fn short_window(&self) -> &MovingAverageWindow {
        &self.short_window
    }

    pub fn long_window(&self) -> &MovingAverageWindow {
        &self.long_window
    }

    /// Buy and sell thresholds for one evaluation.
    ///
    /// `close` must be positive.
    pub fn thresholds(&self, close: Decimal, atr: Decimal, rsi: Decimal, preservation: bool) -> ThresholdPair {
        let volatility_factor = atr / close;
        let momentum_factor = ((RSI_NEUTRAL - (rsi - RSI_NEUTRAL).abs()) / RSI_NEUTRAL).max(Decimal::ZERO);
        let scale = Decimal::ONE + volatility_factor + momentum_factor;

        let mut buy_threshold = self.params.base_buy_threshold * scale;
        let mut sell_threshold = self.params.base_sell_threshold * scale;
        if preservation {
            buy_threshold *= self.params.preservation_buy_mult;
            sell_threshold *= self.params.preservation_sell_mult;
        }
        ThresholdPair {
            buy_threshold,
            sell_threshold,
        }
    }

    /// Records a completed month's close in both windows without deciding.
    pub fn observe(&mut self, close: Decimal) {
        self.short_window.push(close);
        self.long_window.push(close);
    }

    /// Consumes one completed month's close and decides.
    pub fn on_monthly_close(
        &mut self,
        close: Decimal,
        atr: Decimal,
        rsi: Decimal,
        capital_preservation_active: bool,
        currently_invested: bool,
    ) -> Decision {
        self.observe(close);

        let (Some(short_ma), Some(long_ma)) = (self.short_window.mean(), self.long_window.mean()) else {
            tracing::info!(
                symbol = %self.params.symbol,
                have = self.long_window.len(),
                need = self.params.long_period,
                "Not enough monthly closes for the crossover yet."
            );
            return Decision::Hold;
        };
        if close <= Decimal::ZERO || long_ma <= Decimal::ZERO {
            tracing::info!(symbol = %self.params.symbol, %close, %long_ma, "Non-positive close or average; holding.");
            return Decision::Hold;
        }

        let thresholds = self.thresholds(close, atr, rsi, capital_preservation_active);
        let ma_difference = (short_ma - long_ma) / long_ma;
        tracing::debug!(
            symbol = %self.params.symbol,
            %short_ma,
            %long_ma,
            %ma_difference,
            buy = %thresholds.buy_threshold,
            sell = %thresholds.sell_threshold,
            preservation = capital_preservation_active,
            "Crossover evaluated."
        );

        if !currently_invested && ma_difference > thresholds.buy_threshold {
            tracing::info!(symbol = %self.params.symbol, %ma_difference, "Crossover buy signal.");
            Decision::EnterLong {
                size: self.params.allocation,
            }
        } else if currently_invested && ma_difference < -thresholds.sell_threshold {
            tracing::info!(symbol = %self.params.symbol, %ma_difference, "Crossover sell signal.");
            Decision::Exit {
                reason: ExitReason::CrossoverSell,
            }
        } else {
            Decision::Hold
        }
    }
}
