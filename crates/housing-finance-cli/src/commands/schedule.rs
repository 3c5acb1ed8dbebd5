use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use housing_finance_core::schedule::{self, ScheduleInput};

use crate::input;

use super::parse_grace;

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount to amortize
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Number of repayment periods
    #[arg(long)]
    pub installments: Option<u32>,

    /// Effective annual rate (0.12 = 12%)
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// Days per period (30 = monthly)
    #[arg(long, default_value = "30")]
    pub period_days: u32,

    /// Grace kind: none, partial, or total
    #[arg(long, default_value = "none")]
    pub grace: String,

    /// Number of grace periods at the start of the term
    #[arg(long, default_value = "0")]
    pub grace_periods: u32,

    /// Property price backing the risk insurance charge
    #[arg(long)]
    pub property_price: Option<Decimal>,

    /// Per-period life insurance rate on the outstanding balance
    #[arg(long)]
    pub life_insurance_rate: Option<Decimal>,

    /// Annual risk insurance rate on the property price
    #[arg(long)]
    pub risk_insurance_rate: Option<Decimal>,

    /// Flat commission billed each period
    #[arg(long)]
    pub commission: Option<Decimal>,

    /// Flat postage fee billed each period
    #[arg(long)]
    pub postage: Option<Decimal>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            installments: args
                .installments
                .ok_or("--installments is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            period_days: args.period_days,
            grace: parse_grace(&args.grace)?,
            grace_periods: args.grace_periods,
            property_price: args.property_price.unwrap_or(Decimal::ZERO),
            life_insurance_rate: args.life_insurance_rate.unwrap_or(Decimal::ZERO),
            risk_insurance_annual_rate: args.risk_insurance_rate.unwrap_or(Decimal::ZERO),
            periodic_commission: args.commission.unwrap_or(Decimal::ZERO),
            postage_fee: args.postage.unwrap_or(Decimal::ZERO),
        }
    };

    let result = schedule::generate(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
