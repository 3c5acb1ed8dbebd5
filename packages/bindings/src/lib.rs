use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn decimal_arg(value: f64, name: &str) -> NapiResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| napi::Error::from_reason(format!("{} is not a representable number", name)))
}

fn decimal_result(value: Decimal) -> NapiResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| napi::Error::from_reason("result does not fit in an f64"))
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let input: housing_finance_core::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = housing_finance_core::schedule::generate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan evaluation
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_loan(input_json: String) -> NapiResult<String> {
    let input: housing_finance_core::loan::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = housing_finance_core::loan::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Subsidy
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_subsidy(input_json: String) -> NapiResult<String> {
    let input: housing_finance_core::subsidy::SubsidyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = housing_finance_core::subsidy::evaluate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_indicators(input_json: String) -> NapiResult<String> {
    let input: housing_finance_core::indicators::IndicatorInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = housing_finance_core::indicators::compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rate conversion
// ---------------------------------------------------------------------------

#[napi]
pub fn annual_to_period_rate(annual_rate: f64, period_days: u32) -> NapiResult<f64> {
    if period_days == 0 {
        return Err(napi::Error::from_reason("period_days must be positive"));
    }
    let annual = decimal_arg(annual_rate, "annual_rate")?;
    decimal_result(housing_finance_core::rates::period_rate_from_annual(
        annual,
        period_days,
    ))
}

#[napi]
pub fn period_to_annual_rate(period_rate: f64, period_days: u32) -> NapiResult<f64> {
    if period_days == 0 {
        return Err(napi::Error::from_reason("period_days must be positive"));
    }
    let period = decimal_arg(period_rate, "period_rate")?;
    decimal_result(housing_finance_core::rates::annual_rate_from_period(
        period,
        period_days,
    ))
}

#[napi]
pub fn nominal_to_effective_rate(nominal_rate: f64, capitalization: String) -> NapiResult<f64> {
    let nominal = decimal_arg(nominal_rate, "nominal_rate")?;
    decimal_result(housing_finance_core::rates::nominal_to_effective(
        nominal,
        &capitalization,
    ))
}
