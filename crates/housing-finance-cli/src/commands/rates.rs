use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use housing_finance_core::rates;

/// Arguments for rate conversion
#[derive(Args)]
pub struct ConvertRateArgs {
    /// Effective annual rate to convert into a period rate
    #[arg(long)]
    pub annual: Option<Decimal>,

    /// Period rate to convert into an effective annual rate
    #[arg(long)]
    pub period: Option<Decimal>,

    /// Nominal annual rate to convert into an effective annual rate
    #[arg(long)]
    pub nominal: Option<Decimal>,

    /// Compounding label for --nominal (monthly, quarterly, semiannual, annual)
    #[arg(long, default_value = "monthly")]
    pub capitalization: String,

    /// Days per period for --annual and --period conversions
    #[arg(long, default_value = "30")]
    pub period_days: u32,
}

pub fn run_convert_rate(args: ConvertRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.period_days == 0 {
        return Err("--period-days must be positive".into());
    }

    if let Some(nominal) = args.nominal {
        let effective = rates::nominal_to_effective(nominal, &args.capitalization);
        return Ok(serde_json::json!({
            "nominal_rate": nominal.to_string(),
            "capitalization": args.capitalization,
            "annual_effective_rate": effective.to_string(),
        }));
    }

    if let Some(annual) = args.annual {
        let period_rate = rates::period_rate_from_annual(annual, args.period_days);
        return Ok(serde_json::json!({
            "annual_rate": annual.to_string(),
            "period_days": args.period_days,
            "period_rate": period_rate.to_string(),
        }));
    }

    if let Some(period) = args.period {
        let annual = rates::annual_rate_from_period(period, args.period_days);
        return Ok(serde_json::json!({
            "period_rate": period.to_string(),
            "period_days": args.period_days,
            "annual_effective_rate": annual.to_string(),
        }));
    }

    Err("Provide one of --annual, --period, or --nominal".into())
}
