use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLCV bar for a single instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl DailyBar {
    /// A bar where every price field equals `close`. Handy for close-only feeds.
    pub fn from_close(close: Decimal) -> Self {
        Self {
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
        }
    }

    /// A bar is usable when it carries a strictly positive close.
    pub fn has_price(&self) -> bool {
        self.close > Decimal::ZERO
    }
}

/// Everything the market delivered for one trading day.
///
/// Instruments without data on this day are simply absent. Presence is checked
/// once at the tick boundary through [`MarketSlice::bar`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSlice {
    pub timestamp: DateTime<Utc>,
    pub bars: BTreeMap<String, DailyBar>,
}

impl MarketSlice {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            bars: BTreeMap::new(),
        }
    }

    pub fn with_bar(mut self, symbol: &str, bar: DailyBar) -> Self {
        self.insert(symbol, bar);
        self
    }

    pub fn insert(&mut self, symbol: &str, bar: DailyBar) {
        self.bars.insert(symbol.to_string(), bar);
    }

    /// Returns the bar for `symbol` only if it is present and carries a price.
    pub fn bar(&self, symbol: &str) -> Option<&DailyBar> {
        self.bars.get(symbol).filter(|bar| bar.has_price())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.bar(symbol).is_some()
    }

    pub fn close(&self, symbol: &str) -> Option<Decimal> {
        self.bar(symbol).map(|bar| bar.close)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }
}

/// A completed calendar month built from daily closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBar {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub month: u32,
    pub year: i32,
}

/// Position bookkeeping for one instrument.
///
/// Owned by the caller and passed by `&mut` into each evaluation; never shared.
/// On exit every price field is reset to `None`. The cooldown survives the exit
/// because it is what gates the next entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentState {
    pub invested: bool,
    pub entry_price: Option<Decimal>,
    pub peak_price: Option<Decimal>,
    pub trailing_stop_price: Option<Decimal>,
    pub reentry_cooldown_until: Option<DateTime<Utc>>,
}

impl InstrumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the instrument as held from `price`.
    pub fn open(&mut self, price: Decimal) {
        self.invested = true;
        self.entry_price = Some(price);
        self.peak_price = Some(price);
        self.trailing_stop_price = None;
    }

    /// Returns to flat, unsetting every price field.
    pub fn close(&mut self) {
        self.invested = false;
        self.entry_price = None;
        self.peak_price = None;
        self.trailing_stop_price = None;
    }

    /// Raises the peak to `price` if it is higher. Never lowers it.
    pub fn ratchet_peak(&mut self, price: Decimal) {
        self.peak_price = Some(match self.peak_price {
            Some(peak) => peak.max(price),
            None => price,
        });
    }

    /// `true` while a reentry cooldown set at or after `now` is still pending.
    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.reentry_cooldown_until.is_some_and(|until| now < until)
    }
}

/// Dynamic buy/sell thresholds for one crossover evaluation. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub buy_threshold: Decimal,
    pub sell_threshold: Decimal,
}
