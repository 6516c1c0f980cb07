use anyhow::Context;
use backtester::{BacktestReport, Backtester, load_slices};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use configuration::{Config, init_tracing, load_config};
use core_types::StrategyId;
use engine::create_algorithm;
use std::path::{Path, PathBuf};

/// The main entry point for the Trendguard replay tool.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    let _guard = init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run(args) => handle_run(args, &config),
        Commands::CheckConfig => handle_check_config(&config, cli.config.as_deref()),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trend-following allocation strategies, replayed over daily history.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (default: ./config.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay one strategy over a CSV of daily bars.
    Run(RunArgs),
    /// Load and validate the configuration, then print the effective values.
    CheckConfig,
}

#[derive(Parser)]
struct RunArgs {
    /// Strategy to run: combined, leveraged-trend or classifier.
    #[arg(long)]
    strategy: StrategyId,

    /// CSV with `date,symbol,open,high,low,close,volume` rows.
    #[arg(long)]
    data: PathBuf,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let slices = load_slices(&args.data)
        .with_context(|| format!("Failed to load market data from {}", args.data.display()))?;
    let algorithm = create_algorithm(args.strategy, config)
        .with_context(|| format!("Failed to build strategy '{}'", args.strategy))?;

    let mut backtester = Backtester::new(algorithm, &config.simulation).with_progress(!args.json);
    let report = backtester.run(&slices).context("Replay failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary_table(&report));
    }
    Ok(())
}

fn handle_check_config(config: &Config, path: Option<&Path>) -> anyhow::Result<()> {
    let source = path.map_or_else(|| "config.toml (optional) + environment".to_string(), |p| p.display().to_string());
    println!("Configuration from {source} is valid.");
    println!("{config:#?}");
    Ok(())
}

fn summary_table(report: &BacktestReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);

    let period = match (report.start, report.end) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "-".to_string(),
    };
    table.add_row(vec!["Strategy".to_string(), report.strategy.to_string()]);
    table.add_row(vec!["Period".to_string(), period]);
    table.add_row(vec![
        "Trading days (warm-up)".to_string(),
        format!("{} ({})", report.trading_days, report.warmup_days),
    ]);
    table.add_row(vec!["Initial capital".to_string(), report.initial_capital.round_dp(2).to_string()]);
    table.add_row(vec!["Final value".to_string(), report.final_value.round_dp(2).to_string()]);
    table.add_row(vec!["Total return %".to_string(), report.total_return_pct.round_dp(2).to_string()]);
    table.add_row(vec!["Max drawdown %".to_string(), report.max_drawdown_pct.round_dp(2).to_string()]);
    table.add_row(vec!["Fills".to_string(), report.fills.to_string()]);

    for (symbol, entries) in &report.stats.entries {
        let exits = report.stats.exits_for(symbol);
        table.add_row(vec![format!("{symbol} entries / exits"), format!("{entries} / {exits}")]);
    }
    for (reason, count) in &report.stats.exit_reasons {
        table.add_row(vec![format!("Exits: {reason}"), count.to_string()]);
    }
    table
}
