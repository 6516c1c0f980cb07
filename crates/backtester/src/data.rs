//! Loads long-format daily history (`date,symbol,open,high,low,close,volume`)
//! into one `MarketSlice` per trading day.

use crate::error::BacktestError;
use chrono::{NaiveDate, NaiveTime};
use core_types::{DailyBar, MarketSlice};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Symbol", alias = "ticker")]
    symbol: String,
    #[serde(alias = "Open")]
    open: String,
    #[serde(alias = "High")]
    high: String,
    #[serde(alias = "Low")]
    low: String,
    #[serde(alias = "Close", alias = "Adj Close")]
    close: String,
    #[serde(alias = "Volume", default)]
    volume: Option<String>,
}

fn parse_decimal(field: &str, value: &str, line: u64) -> Result<Decimal, BacktestError> {
    Decimal::from_str(value.trim()).map_err(|e| BacktestError::InvalidRow {
        line,
        message: format!("{field} '{value}': {e}"),
    })
}

impl CsvRow {
    fn into_bar(self, line: u64) -> Result<(NaiveDate, String, DailyBar), BacktestError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|e| BacktestError::InvalidRow {
            line,
            message: format!("date '{}': {e}", self.date),
        })?;
        let volume = match self.volume.as_deref().map(str::trim) {
            None | Some("") => Decimal::ZERO,
            Some(v) => parse_decimal("volume", v, line)?,
        };
        let bar = DailyBar {
            open: parse_decimal("open", &self.open, line)?,
            high: parse_decimal("high", &self.high, line)?,
            low: parse_decimal("low", &self.low, line)?,
            close: parse_decimal("close", &self.close, line)?,
            volume,
        };
        Ok((date, self.symbol.trim().to_string(), bar))
    }
}

/// Reads history from any CSV source, grouping rows by date in ascending order.
///
/// Rows without a positive close are dropped, so the instrument is simply
/// absent from that day's slice.
pub fn read_slices<R: Read>(reader: R) -> Result<Vec<MarketSlice>, BacktestError> {
    let mut rows = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut days: BTreeMap<NaiveDate, MarketSlice> = BTreeMap::new();
    let mut skipped = 0usize;

    for (index, record) in rows.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = index as u64 + 2;
        let (date, symbol, bar) = record?.into_bar(line)?;
        if !bar.has_price() {
            skipped += 1;
            continue;
        }
        days.entry(date)
            .or_insert_with(|| MarketSlice::new(date.and_time(NaiveTime::MIN).and_utc()))
            .insert(&symbol, bar);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Dropped rows without a positive close.");
    }
    tracing::info!(days = days.len(), "Market data loaded.");
    Ok(days.into_values().collect())
}

/// Loads history from a CSV file.
pub fn load_slices(path: &Path) -> Result<Vec<MarketSlice>, BacktestError> {
    let file = std::fs::File::open(path)?;
    read_slices(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_rows_by_day_in_order() {
        let csv = "\
date,symbol,open,high,low,close,volume
2024-01-03,SPY,470,472,468,471.5,1000
2024-01-02,SPY,469,471,467,470.25,900
2024-01-02,TQQQ,50,51,49,50.5,
2024-01-03,TQQQ,51,52,50,0,100
";
        let slices = read_slices(csv.as_bytes()).unwrap();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(slices[0].close("SPY"), Some(dec!(470.25)));
        assert_eq!(slices[0].bar("TQQQ").map(|b| b.volume), Some(dec!(0)));
        // zero close means no tick for TQQQ that day
        assert_eq!(slices[1].close("SPY"), Some(dec!(471.5)));
        assert!(!slices[1].contains("TQQQ"));
    }

    #[test]
    fn reports_the_offending_line() {
        let csv = "date,symbol,open,high,low,close,volume\n2024-01-02,SPY,1,1,1,abc,0\n";
        match read_slices(csv.as_bytes()) {
            Err(BacktestError::InvalidRow { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("close"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_dates() {
        let csv = "date,symbol,open,high,low,close,volume\n02/01/2024,SPY,1,1,1,1,0\n";
        assert!(matches!(read_slices(csv.as_bytes()), Err(BacktestError::InvalidRow { .. })));
    }
}
