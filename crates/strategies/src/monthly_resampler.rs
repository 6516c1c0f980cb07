use core_types::MonthlyBar;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
struct OpenMonth {
    year: i32,
    month: u32,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
}

impl OpenMonth {
    fn start(year: i32, month: u32, price: Decimal) -> Self {
        Self {
            year,
            month,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    fn record(&mut self, price: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }

    fn finish(&self) -> MonthlyBar {
        MonthlyBar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            month: self.month,
            year: self.year,
        }
    }
}

/// Folds daily closes into calendar-month bars.
///
/// A month is only known to be complete when the first close of a later month
/// arrives, so each bar is emitted on that tick. The emitting tick opens the
/// new month.
#[derive(Debug, Clone, Default)]
pub struct MonthlyResampler {
    current: Option<OpenMonth>,
    history: Vec<MonthlyBar>,
}

impl MonthlyResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_daily_close(&mut self, price: Decimal, month: u32, year: i32) -> Option<MonthlyBar> {
        match self.current.as_mut() {
            Some(open) if open.year == year && open.month == month => {
                open.record(price);
                None
            }
            Some(open) => {
                let bar = open.finish();
                self.history.push(bar);
                self.current = Some(OpenMonth::start(year, month, price));
                tracing::debug!(year = bar.year, month = bar.month, close = %bar.close, "Monthly bar completed.");
                Some(bar)
            }
            None => {
                self.current = Some(OpenMonth::start(year, month, price));
                None
            }
        }
    }

    /// Every completed month, oldest first.
    pub fn history(&self) -> &[MonthlyBar] {
        &self.history
    }
}
