use rust_decimal::Decimal;
use std::collections::VecDeque;

/// The last `period` values of a series, averaged arithmetically.
///
/// Appending beyond `period` evicts the oldest value, so the window never
/// holds more than `period` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageWindow {
    period: usize,
    values: VecDeque<Decimal>,
}

impl MovingAverageWindow {
    /// `period` is clamped to at least one.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    pub fn push(&mut self, value: Decimal) {
        self.values.push_back(value);
        self.truncate(self.period);
    }

    /// Keeps only the most recent `len` values.
    pub fn truncate(&mut self, len: usize) {
        while self.values.len() > len {
            self.values.pop_front();
        }
    }

    /// The mean, or `None` until the window is full.
    pub fn mean(&self) -> Option<Decimal> {
        if !self.is_ready() {
            return None;
        }
        let sum: Decimal = self.values.iter().sum();
        Some(sum / Decimal::from(self.period))
    }

    pub fn is_ready(&self) -> bool {
        self.values.len() >= self.period
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn period(&self) -> usize {
        self.period
    }
}
