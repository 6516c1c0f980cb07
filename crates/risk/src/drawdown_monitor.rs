use crate::error::RiskError;
use chrono::{DateTime, Duration, Utc};
use configuration::CapitalPreservationParams;
use rust_decimal::Decimal;

/// Tracks the running peak of total portfolio value and reports whether the
/// current value sits far enough below it to switch capital preservation on.
///
/// Without a cooldown the flag is recomputed from scratch on every update.
/// With one, the flag stays on until `cooldown` has passed since the last breach.
#[derive(Debug, Clone)]
pub struct PortfolioDrawdownMonitor {
    max_drawdown_threshold: Decimal,
    highest_value: Decimal,
    active: bool,
    cooldown: Option<Duration>,
    active_until: Option<DateTime<Utc>>,
}

impl PortfolioDrawdownMonitor {
    pub fn new(max_drawdown_threshold: Decimal, initial_value: Decimal) -> Result<Self, RiskError> {
        if max_drawdown_threshold <= Decimal::ZERO || max_drawdown_threshold >= Decimal::ONE {
            return Err(RiskError::InvalidParameters(
                "max_drawdown_threshold must be between 0 and 1".to_string(),
            ));
        }
        if initial_value <= Decimal::ZERO {
            return Err(RiskError::InvalidInitialValue(initial_value));
        }
        Ok(Self {
            max_drawdown_threshold,
            highest_value: initial_value,
            active: false,
            cooldown: None,
            active_until: None,
        })
    }

    pub fn from_params(params: &CapitalPreservationParams, initial_value: Decimal) -> Result<Self, RiskError> {
        let monitor = Self::new(params.max_drawdown_threshold, initial_value)?;
        match params.cooldown_days {
            Some(days) if days < 0 => Err(RiskError::InvalidParameters(
                "cooldown_days cannot be negative".to_string(),
            )),
            Some(days) if days > 0 => Ok(monitor.with_cooldown(days)),
            _ => Ok(monitor),
        }
    }

    /// Keeps the mode on for `days` after the most recent breach.
    pub fn with_cooldown(mut self, days: i64) -> Self {
        self.cooldown = (days > 0).then(|| Duration::days(days));
        self
    }

    /// Ratchets the peak and recomputes the flag.
    pub fn update(&mut self, current_total_value: Decimal) -> bool {
        let breached = self.observe(current_total_value);
        self.set_active(breached, current_total_value);
        self.active
    }

    /// Like [`update`](Self::update), but a breach also holds the mode on
    /// until the cooldown, if any, has elapsed.
    pub fn update_at(&mut self, current_total_value: Decimal, now: DateTime<Utc>) -> bool {
        let breached = self.observe(current_total_value);
        if breached {
            self.active_until = self.cooldown.map(|cooldown| now + cooldown);
        }
        let buffered = self.active_until.is_some_and(|until| now < until);
        self.set_active(breached || buffered, current_total_value);
        self.active
    }

    fn observe(&mut self, current_total_value: Decimal) -> bool {
        self.highest_value = self.highest_value.max(current_total_value);
        current_total_value < self.highest_value * (Decimal::ONE - self.max_drawdown_threshold)
    }

    fn set_active(&mut self, active: bool, current_total_value: Decimal) {
        if active != self.active {
            tracing::info!(
                active,
                value = %current_total_value,
                peak = %self.highest_value,
                "Capital preservation mode changed."
            );
        }
        self.active = active;
    }

    pub fn highest_value(&self) -> Decimal {
        self.highest_value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
