mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::bond::{BondArgs, PriceArgs};

/// Bond yield-to-maturity and cash-flow schedule calculations
#[derive(Parser)]
#[command(
    name = "bond-yield",
    version,
    about = "Bond yield-to-maturity and cash-flow schedule calculations",
    long_about = "Computes current yield, yield to maturity (bisection), total interest, \
                  premium/discount classification and the periodic cash-flow schedule \
                  for annual and semi-annual coupon bonds."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver diagnostics to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full bond metrics: current yield, YTM, total interest, schedule
    Metrics(BondArgs),
    /// Solve yield to maturity only
    Ytm(BondArgs),
    /// Generate the periodic cash-flow schedule
    Schedule(BondArgs),
    /// Price a bond at a quoted annual yield
    Price(PriceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Metrics(args) => commands::bond::run_metrics(args),
        Commands::Ytm(args) => commands::bond::run_ytm(args),
        Commands::Schedule(args) => commands::bond::run_schedule(args),
        Commands::Price(args) => commands::bond::run_price(args),
        Commands::Version => {
            println!("bond-yield {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
