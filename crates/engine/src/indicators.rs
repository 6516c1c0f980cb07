//! The indicator provider: `ta` indicators fed from daily bars, exposed to the
//! strategies as plain `Decimal` values once they have seen a full period.

use crate::error::EngineError;
use core_types::DailyBar;
use core_types::numeric::{to_decimal, to_f64};
use rust_decimal::Decimal;
use ta::indicators::{AverageTrueRange, RelativeStrengthIndex, SimpleMovingAverage};
use ta::{DataItem, Next};

pub type Sma = Indicator<SimpleMovingAverage>;
pub type Atr = Indicator<AverageTrueRange>;
pub type Rsi = Indicator<RelativeStrengthIndex>;

/// A `ta` indicator plus the bookkeeping to know when its output is valid.
#[derive(Debug, Clone)]
pub struct Indicator<I> {
    name: &'static str,
    inner: I,
    period: usize,
    seen: usize,
    current: Option<f64>,
}

impl<I> Indicator<I> {
    fn wrap<E: std::fmt::Debug>(name: &'static str, period: usize, inner: Result<I, E>) -> Result<Self, EngineError> {
        let inner = inner.map_err(|e| EngineError::Indicator(format!("Failed to initialize {name}({period}): {e:?}")))?;
        Ok(Self {
            name,
            inner,
            period,
            seen: 0,
            current: None,
        })
    }

    fn record(&mut self, value: f64) {
        self.seen += 1;
        self.current = Some(value);
    }

    pub fn is_ready(&self) -> bool {
        self.seen >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// The latest output, or `None` while warming up or if it is not finite.
    pub fn value(&self) -> Option<Decimal> {
        if !self.is_ready() {
            return None;
        }
        let current = self.current?;
        match to_decimal(self.name, current) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(indicator = self.name, error = %e, "Discarding indicator output.");
                None
            }
        }
    }
}

impl<I: Next<f64, Output = f64>> Indicator<I> {
    pub fn update(&mut self, close: Decimal) -> Result<(), EngineError> {
        let close = to_f64(self.name, close)?;
        let value = self.inner.next(close);
        self.record(value);
        Ok(())
    }
}

impl Sma {
    pub fn sma(period: usize) -> Result<Self, EngineError> {
        Self::wrap("sma", period, SimpleMovingAverage::new(period))
    }
}

impl Rsi {
    pub fn rsi(period: usize) -> Result<Self, EngineError> {
        Self::wrap("rsi", period, RelativeStrengthIndex::new(period))
    }
}

impl Atr {
    pub fn atr(period: usize) -> Result<Self, EngineError> {
        Self::wrap("atr", period, AverageTrueRange::new(period))
    }

    /// Feeds a full bar so the true range sees the high/low. Bars `ta` rejects
    /// as inconsistent fall back to the close alone.
    pub fn update_bar(&mut self, bar: &DailyBar) -> Result<(), EngineError> {
        let item = DataItem::builder()
            .open(to_f64("open", bar.open)?)
            .high(to_f64("high", bar.high)?)
            .low(to_f64("low", bar.low)?)
            .close(to_f64("close", bar.close)?)
            .volume(to_f64("volume", bar.volume)?)
            .build();
        match item {
            Ok(item) => {
                let value = self.inner.next(&item);
                self.record(value);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = ?e, "Inconsistent OHLC bar; feeding the close only.");
                self.update(bar.close)
            }
        }
    }
}
