use crate::algorithm::Algorithm;
use crate::classifier::ClassifierAlgorithm;
use crate::combined::CombinedAlgorithm;
use crate::error::EngineError;
use crate::leveraged_trend::LeveragedTrendAlgorithm;
use configuration::Config;
use core_types::StrategyId;

/// Creates the algorithm for `id` from its section of the configuration.
///
/// The match is exhaustive, so a new `StrategyId` will not compile until it is
/// wired up here.
pub fn create_algorithm(id: StrategyId, config: &Config) -> Result<Box<dyn Algorithm>, EngineError> {
    match id {
        StrategyId::Combined => Ok(Box::new(CombinedAlgorithm::new(
            &config.combined,
            config.simulation.initial_capital,
        )?)),
        StrategyId::LeveragedTrend => Ok(Box::new(LeveragedTrendAlgorithm::new(&config.leveraged_trend)?)),
        StrategyId::Classifier => Ok(Box::new(ClassifierAlgorithm::new(&config.classifier)?)),
    }
}
