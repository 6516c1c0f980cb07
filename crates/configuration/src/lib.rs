use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AdaptiveCrossoverParams, CapitalPreservationParams, ClassifierParams, CombinedParams, Config,
    DrawdownTrailingParams, EntryStopParams, LeveragedTrendParams, Logging, PeakOrdering,
    Simulation,
};

/// Prefix for environment overrides, e.g. `TRENDGUARD__COMBINED__TQQQ__DRAWDOWN_THRESHOLD=0.25`.
pub const ENV_PREFIX: &str = "TRENDGUARD";

/// Loads the application configuration.
///
/// Reads `path` (default `config.toml`; a missing file is not an error), layers
/// `TRENDGUARD__*` environment variables on top, deserializes into our
/// strongly-typed `Config` and validates it.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        // An explicitly requested file must exist.
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("trendguard-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[combined.tqqq]\ndrawdown_threshold = 0.25\ncooldown_days = 5").unwrap();
        writeln!(file, "[leveraged_trend]\nsymbol = \"UPRO\"").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.combined.tqqq.drawdown_threshold, dec!(0.25));
        assert_eq!(config.combined.tqqq.cooldown_days, Some(5));
        assert_eq!(config.combined.tqqq.slow_ma_period, 300);
        assert_eq!(config.leveraged_trend.symbol, "UPRO");
        assert_eq!(config.classifier.horizons, vec![2, 5, 60, 250]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = Path::new("/definitely/not/here/trendguard.toml");
        assert!(matches!(load_config(Some(path)), Err(ConfigError::LoadError(_))));
    }
}
