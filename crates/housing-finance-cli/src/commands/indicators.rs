use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use housing_finance_core::indicators::{self, IndicatorInput};

use crate::input;

/// Arguments for indicator aggregation
#[derive(Args)]
pub struct IndicatorArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Net amount handed to the borrower (defaults to --financed)
    #[arg(long)]
    pub received: Option<Decimal>,

    /// Principal the schedule amortizes (received amount plus financed costs)
    #[arg(long)]
    pub financed: Option<Decimal>,

    /// Periodic installments (comma-separated, e.g. "905.5,905.5,905.5")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub flows: Option<Vec<Decimal>>,

    /// Annual discount rate for the NPV indicator
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Days per period (30 = monthly)
    #[arg(long, default_value = "30")]
    pub period_days: u32,
}

pub fn run_indicators(args: IndicatorArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let indicator_input: IndicatorInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let financed = args
            .financed
            .ok_or("--financed is required (or provide --input)")?;
        IndicatorInput {
            received_principal: args.received.unwrap_or(financed),
            financed_principal: financed,
            cash_flows: args.flows.unwrap_or_default(),
            annual_discount_rate: args.discount_rate.unwrap_or(dec!(0.20)),
            period_days: args.period_days,
        }
    };

    let result = indicators::compute(&indicator_input)?;
    Ok(serde_json::to_value(result)?)
}
