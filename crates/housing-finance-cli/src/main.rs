mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::indicators::IndicatorArgs;
use commands::loan::EvaluateArgs;
use commands::rates::ConvertRateArgs;
use commands::schedule::ScheduleArgs;
use commands::subsidy::SubsidyArgs;

/// Housing finance analytics with decimal precision
#[derive(Parser)]
#[command(
    name = "hfa",
    version,
    about = "Housing finance analytics with decimal precision",
    long_about = "A CLI for mortgage credit analysis with decimal precision. \
                  Builds French amortization schedules with grace periods and \
                  periodic charges, derives NPV/IRR/TCEA return indicators, \
                  converts nominal and effective rates, and checks Techo Propio \
                  subsidy eligibility."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a French amortization schedule
    Schedule(ScheduleArgs),
    /// Evaluate a property loan end to end (schedule plus indicators)
    Evaluate(EvaluateArgs),
    /// Check Techo Propio subsidy eligibility
    Subsidy(SubsidyArgs),
    /// Compute NPV, IRR, and TCEA over a cash-flow series
    Indicators(IndicatorArgs),
    /// Convert between annual, period, and nominal rates
    ConvertRate(ConvertRateArgs),
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

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Evaluate(args) => commands::loan::run_evaluate(args),
        Commands::Subsidy(args) => commands::subsidy::run_subsidy(args),
        Commands::Indicators(args) => commands::indicators::run_indicators(args),
        Commands::ConvertRate(args) => commands::rates::run_convert_rate(args),
        Commands::Version => {
            println!("hfa {}", env!("CARGO_PKG_VERSION"));
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
