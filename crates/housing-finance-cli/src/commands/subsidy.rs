use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use housing_finance_core::subsidy::{self, SubsidyInput};

use crate::input;

/// Arguments for subsidy eligibility checks
#[derive(Args)]
pub struct SubsidyArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Applicant's monthly household income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Price of the property to purchase
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Applicant already owns a home (the program requires a first home)
    #[arg(long)]
    pub repeat_buyer: bool,
}

pub fn run_subsidy(args: SubsidyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let subsidy_input: SubsidyInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        SubsidyInput {
            monthly_income: args.income.ok_or("--income is required (or provide --input)")?,
            first_time_buyer: !args.repeat_buyer,
            property_price: args.price.ok_or("--price is required (or provide --input)")?,
        }
    };

    let result = subsidy::evaluate(&subsidy_input)?;
    Ok(serde_json::to_value(result)?)
}
