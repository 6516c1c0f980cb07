use crate::error::EngineError;
use chrono::{DateTime, Utc};
use core_types::{Decision, MarketSlice, StrategyId};
use executor::Broker;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters kept over a run, reported when it ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    /// Entries from flat, per symbol.
    pub entries: BTreeMap<String, u32>,
    /// Exits to flat, per symbol.
    pub exits: BTreeMap<String, u32>,
    /// Exits to flat, per reason.
    pub exit_reasons: BTreeMap<String, u32>,
}

impl RunStats {
    pub fn entries_for(&self, symbol: &str) -> u32 {
        self.entries.get(symbol).copied().unwrap_or(0)
    }

    pub fn exits_for(&self, symbol: &str) -> u32 {
        self.exits.get(symbol).copied().unwrap_or(0)
    }
}

/// The host-side contract every strategy family is driven through.
///
/// The replay harness calls, per trading day and in order: `on_warmup_finished`
/// once on the first tick after warm-up, `on_data`, and then `on_schedule`.
pub trait Algorithm {
    fn id(&self) -> StrategyId;

    /// Every symbol the algorithm reads from a `MarketSlice`.
    fn symbols(&self) -> Vec<String>;

    /// Trading days to feed before decisions start.
    fn warmup_days(&self) -> usize;

    fn on_warmup_finished(&mut self, _slice: &MarketSlice, _broker: &mut dyn Broker) -> Result<(), EngineError> {
        Ok(())
    }

    /// Processes one tick. While `warming_up` only indicators and history are fed.
    fn on_data(&mut self, slice: &MarketSlice, warming_up: bool, broker: &mut dyn Broker) -> Result<(), EngineError>;

    /// Daily after-close hook, decoupled from tick evaluation.
    fn on_schedule(&mut self, _now: DateTime<Utc>) -> Result<(), EngineError> {
        Ok(())
    }

    fn stats(&self) -> &RunStats;
}

/// Realizes `decision` for `symbol` through the broker and counts transitions.
///
/// An entry while already invested rebalances to the new size without being
/// counted; an exit while flat does nothing.
pub fn execute_decision(
    decision: Decision,
    symbol: &str,
    broker: &mut dyn Broker,
    stats: &mut RunStats,
) -> Result<(), EngineError> {
    match decision {
        Decision::EnterLong { size } => {
            let was_invested = broker.is_invested(symbol);
            broker.set_target_allocation(symbol, size)?;
            if !was_invested {
                *stats.entries.entry(symbol.to_string()).or_default() += 1;
            }
        }
        Decision::Exit { reason } => {
            if broker.is_invested(symbol) {
                broker.liquidate(symbol)?;
                *stats.exits.entry(symbol.to_string()).or_default() += 1;
                *stats.exit_reasons.entry(reason.to_string()).or_default() += 1;
            }
        }
        Decision::Hold => {}
    }
    Ok(())
}
