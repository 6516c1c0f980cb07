//! Feature engineering for the next-day direction classifier.
//!
//! For each day `i` the row carries the raw close and volume, then for each
//! horizon `h`:
//! - `close_ratio_h`: close / mean of the last `h` closes (including today)
//!
//! and, for the first horizon only, right after its ratio:
//! - `trend_h`: how many of the `h` days before today closed higher than the day before
//!
//! With the default horizons `[2, 5, 60, 250]` that is seven columns. The label is `1` when the next close is
//! higher than today's, `0` otherwise.

use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// One day of input for feature generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyObservation {
    pub close: f64,
    pub volume: f64,
}

/// Labelled rows for fitting plus the unlabelled row for today.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i32>,
    /// Features for the most recent day, whose label is not yet known.
    pub latest: Option<Vec<f64>>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Column names, in row order.
pub fn feature_names(horizons: &[usize]) -> Vec<String> {
    let mut names = vec!["close".to_string(), "volume".to_string()];
    for (k, h) in horizons.iter().enumerate() {
        names.push(format!("close_ratio_{h}"));
        if k == 0 {
            names.push(format!("trend_{h}"));
        }
    }
    names
}

/// Rolling means of `closes` per horizon; `None` until `h` values are available.
fn rolling_means(closes: &[f64], h: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = Sma::new(h) else {
        return vec![None; closes.len()];
    };
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let mean = sma.next(close);
            (i + 1 >= h).then_some(mean)
        })
        .collect()
}

/// Builds the training set from a chronologically ordered history.
///
/// Rows missing any horizon's lookback, or containing non-finite values, are
/// dropped. Zero or empty horizons produce an empty set.
pub fn build_training_set(history: &[DailyObservation], horizons: &[usize]) -> TrainingSet {
    let mut set = TrainingSet {
        feature_names: feature_names(horizons),
        ..TrainingSet::default()
    };
    let n = history.len();
    let max_h = horizons.iter().copied().max().unwrap_or(0);
    if n < 2 || horizons.is_empty() || horizons.contains(&0) {
        return set;
    }

    let closes: Vec<f64> = history.iter().map(|o| o.close).collect();
    let means: Vec<Vec<Option<f64>>> = horizons.iter().map(|&h| rolling_means(&closes, h)).collect();

    // targets[j] = 1 when close[j + 1] > close[j]; up_prefix[k] = sum of targets[..k]
    let mut up_prefix = vec![0u32; n];
    for j in 0..n - 1 {
        let up = u32::from(closes[j + 1] > closes[j]);
        up_prefix[j + 1] = up_prefix[j] + up;
    }

    for i in max_h..n {
        let mut row = Vec::with_capacity(3 + horizons.len());
        row.push(closes[i]);
        row.push(history[i].volume);
        let mut complete = true;
        for (k, &h) in horizons.iter().enumerate() {
            match means[k][i] {
                Some(mean) if mean != 0.0 => row.push(closes[i] / mean),
                _ => complete = false,
            }
            if k == 0 {
                row.push(f64::from(up_prefix[i] - up_prefix[i - h]));
            }
        }
        if !complete || row.iter().any(|v| !v.is_finite()) {
            continue;
        }

        if i + 1 < n {
            set.labels.push(i32::from(closes[i + 1] > closes[i]));
            set.features.push(row);
        } else {
            set.latest = Some(row);
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(closes: &[f64]) -> Vec<DailyObservation> {
        closes
            .iter()
            .map(|&close| DailyObservation { close, volume: 1000.0 })
            .collect()
    }

    #[test]
    fn builds_labelled_rows_and_latest_row() {
        let history = observations(&[10.0, 11.0, 10.0, 12.0, 13.0, 12.0]);
        let set = build_training_set(&history, &[2]);

        assert_eq!(set.feature_names, vec!["close", "volume", "close_ratio_2", "trend_2"]);
        // rows 2..=4 are labelled, row 5 is today's
        assert_eq!(set.len(), 3);
        assert_eq!(set.labels, vec![1, 1, 0]);

        // Day 3: close 12, mean(10, 12) = 11; previous two moves: 11->10 down, 10->12 up
        let day3 = &set.features[1];
        assert_eq!(day3[0], 12.0);
        assert!((day3[2] - 12.0 / 11.0).abs() < 1e-12);
        assert_eq!(day3[3], 1.0);

        let latest = set.latest.unwrap();
        assert_eq!(latest[0], 12.0);
        // the two moves before day 5: 12->13 up, 13->12 down
        assert_eq!(latest[3], 1.0);
    }

    #[test]
    fn only_the_first_horizon_gets_a_trend_column() {
        assert_eq!(
            feature_names(&[2, 5, 60, 250]),
            vec![
                "close",
                "volume",
                "close_ratio_2",
                "trend_2",
                "close_ratio_5",
                "close_ratio_60",
                "close_ratio_250",
            ]
        );

        let closes: Vec<f64> = (0..12).map(|i| 10.0 + f64::from(i % 3)).collect();
        let set = build_training_set(&observations(&closes), &[2, 5]);
        assert_eq!(set.feature_names, vec!["close", "volume", "close_ratio_2", "trend_2", "close_ratio_5"]);
        // rows 5..=10 are labelled, row 11 is today's
        assert_eq!(set.len(), 6);
        assert!(set.features.iter().all(|row| row.len() == 5));

        // Day 5: close 12, mean of days 4..=5 is 11.5, mean of days 1..=5 is 11.2
        let day5 = &set.features[0];
        assert_eq!(day5[0], 12.0);
        assert!((day5[2] - 12.0 / 11.5).abs() < 1e-12);
        // moves 3->4 (10->11) and 4->5 (11->12) are both up
        assert_eq!(day5[3], 2.0);
        assert!((day5[4] - 12.0 / 11.2).abs() < 1e-12);
    }

    #[test]
    fn short_history_yields_nothing() {
        let set = build_training_set(&observations(&[10.0, 11.0, 12.0]), &[5]);
        assert!(set.is_empty());
        assert!(set.latest.is_none());
    }

    #[test]
    fn zero_horizon_is_ignored() {
        let set = build_training_set(&observations(&[1.0; 20]), &[0, 2]);
        assert!(set.is_empty());
    }
}
