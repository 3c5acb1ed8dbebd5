use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use housing_finance_core::loan::{self, LoanInput, RateType};

use crate::input;

use super::parse_grace;

/// Arguments for end-to-end loan evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Initial payment as a fraction of price (0.20 = 20%)
    #[arg(long)]
    pub initial_pct: Option<Decimal>,

    /// Explicit initial payment amount (overrides the percentage)
    #[arg(long)]
    pub initial_amount: Option<Decimal>,

    /// Housing subsidy netted from the price
    #[arg(long)]
    pub subsidy: Option<Decimal>,

    /// Notarial costs financed with the loan
    #[arg(long)]
    pub notarial: Option<Decimal>,

    /// Registry costs financed with the loan
    #[arg(long)]
    pub registry: Option<Decimal>,

    /// Appraisal fee financed with the loan
    #[arg(long)]
    pub appraisal: Option<Decimal>,

    /// Study fee financed with the loan
    #[arg(long)]
    pub study: Option<Decimal>,

    /// Activation fee financed with the loan
    #[arg(long)]
    pub activation: Option<Decimal>,

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

    /// Number of repayment periods
    #[arg(long)]
    pub installments: Option<u32>,

    /// Quoted annual rate
    #[arg(long)]
    pub annual_rate: Option<Decimal>,

    /// How the annual rate is quoted: effective or nominal
    #[arg(long, default_value = "effective")]
    pub rate_type: String,

    /// Compounding label for nominal rates (monthly, quarterly, semiannual, annual)
    #[arg(long, default_value = "monthly")]
    pub capitalization: String,

    /// Days per period (30 = monthly)
    #[arg(long, default_value = "30")]
    pub period_days: u32,

    /// Grace kind: none, partial, or total
    #[arg(long, default_value = "none")]
    pub grace: String,

    /// Number of grace periods at the start of the term
    #[arg(long, default_value = "0")]
    pub grace_periods: u32,

    /// Annual discount rate for the NPV indicator
    #[arg(long)]
    pub discount_rate: Option<Decimal>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        LoanInput {
            property_price: args.price.ok_or("--price is required (or provide --input)")?,
            initial_payment_pct: args.initial_pct.unwrap_or(Decimal::ZERO),
            initial_payment_amount: args.initial_amount.unwrap_or(Decimal::ZERO),
            subsidy_amount: args.subsidy.unwrap_or(Decimal::ZERO),
            notarial_costs: args.notarial.unwrap_or(Decimal::ZERO),
            registry_costs: args.registry.unwrap_or(Decimal::ZERO),
            appraisal_fee: args.appraisal.unwrap_or(Decimal::ZERO),
            study_fee: args.study.unwrap_or(Decimal::ZERO),
            activation_fee: args.activation.unwrap_or(Decimal::ZERO),
            life_insurance_rate: args.life_insurance_rate.unwrap_or(Decimal::ZERO),
            risk_insurance_annual_rate: args.risk_insurance_rate.unwrap_or(Decimal::ZERO),
            periodic_commission: args.commission.unwrap_or(Decimal::ZERO),
            postage_fee: args.postage.unwrap_or(Decimal::ZERO),
            installments: args
                .installments
                .ok_or("--installments is required (or provide --input)")?,
            annual_rate: args
                .annual_rate
                .ok_or("--annual-rate is required (or provide --input)")?,
            rate_type: parse_rate_type(&args.rate_type)?,
            capitalization: args.capitalization.clone(),
            period_days: args.period_days,
            grace: parse_grace(&args.grace)?,
            grace_periods: args.grace_periods,
            annual_discount_rate: args.discount_rate.unwrap_or(dec!(0.20)),
        }
    };

    let result = loan::evaluate(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_rate_type(label: &str) -> Result<RateType, Box<dyn std::error::Error>> {
    match label {
        "effective" => Ok(RateType::Effective),
        "nominal" => Ok(RateType::Nominal),
        other => {
            Err(format!("Unknown rate type '{}' (expected effective or nominal)", other).into())
        }
    }
}
