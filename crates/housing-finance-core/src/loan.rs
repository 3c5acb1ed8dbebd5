//! End-to-end loan evaluation.
//!
//! Resolves a property purchase into the financed principal, builds the
//! repayment schedule, and derives the return indicators the borrower and
//! lender actually compare offers with. All math uses `rust_decimal::Decimal`
//! for institutional-grade precision.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::HousingFinanceError;
use crate::indicators::{self, IndicatorInput};
use crate::rates;
use crate::schedule::{self, GraceKind, PeriodKind, ScheduleEntry, ScheduleInput, ScheduleTotals};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::HousingFinanceResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// How the quoted annual rate is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Effective annual rate, used as-is.
    #[default]
    Effective,
    /// Nominal annual rate, compounded per `capitalization` before use.
    Nominal,
}

/// Full description of a property loan to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Purchase price of the property.
    pub property_price: Money,
    /// Initial payment as a fraction of the price (0.20 = 20%).
    #[serde(default)]
    pub initial_payment_pct: Rate,
    /// Explicit initial payment; when positive it overrides the percentage.
    #[serde(default)]
    pub initial_payment_amount: Money,
    /// Housing subsidy netted from the price before financing.
    #[serde(default)]
    pub subsidy_amount: Money,
    #[serde(default)]
    pub notarial_costs: Money,
    #[serde(default)]
    pub registry_costs: Money,
    #[serde(default)]
    pub appraisal_fee: Money,
    #[serde(default)]
    pub study_fee: Money,
    #[serde(default)]
    pub activation_fee: Money,
    /// Per-period life insurance rate applied to the outstanding balance.
    #[serde(default)]
    pub life_insurance_rate: Rate,
    /// Annual property-risk insurance rate applied to the property price.
    #[serde(default)]
    pub risk_insurance_annual_rate: Rate,
    /// Flat servicing commission billed each period.
    #[serde(default)]
    pub periodic_commission: Money,
    /// Flat postage/statement fee billed each period.
    #[serde(default)]
    pub postage_fee: Money,
    /// Number of repayment periods.
    pub installments: u32,
    /// Quoted annual rate, read according to `rate_type`.
    pub annual_rate: Rate,
    #[serde(default)]
    pub rate_type: RateType,
    /// Compounding label for nominal rates; unrecognized labels compound monthly.
    #[serde(default = "default_capitalization")]
    pub capitalization: String,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default)]
    pub grace: GraceKind,
    #[serde(default)]
    pub grace_periods: u32,
    /// Annual opportunity rate used to discount the flows for NPV.
    #[serde(default = "default_discount_rate")]
    pub annual_discount_rate: Rate,
}

fn default_capitalization() -> String {
    "monthly".to_string()
}

fn default_period_days() -> u32 {
    rates::DEFAULT_PERIOD_DAYS
}

fn default_discount_rate() -> Rate {
    dec!(0.20)
}

/// Resolved amounts and terms the evaluation ran with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub property_price: Money,
    pub initial_payment: Money,
    pub subsidy_amount: Money,
    /// Price net of initial payment and subsidy.
    pub net_financed: Money,
    /// One-time notarial, registry, appraisal, study, and activation charges.
    pub upfront_costs: Money,
    /// Net amount plus upfront costs; the principal the schedule amortizes.
    pub financed_principal: Money,
    pub installments: u32,
    pub period_days: u32,
    /// Effective annual rate after any nominal conversion.
    pub annual_effective_rate: Rate,
    pub period_rate: Rate,
    pub grace: GraceKind,
    pub grace_periods: u32,
    pub annual_discount_rate: Rate,
}

/// Headline installment figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentQuote {
    /// Level amortizing installment (principal + interest).
    pub base_installment: Money,
    /// Total of the first normal period including insurance and fees,
    /// zero when the schedule never leaves grace.
    pub full_installment: Money,
}

/// Return indicators reported with a loan evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanIndicators {
    pub npv: Money,
    pub period_irr: Rate,
    pub annual_irr: Rate,
    /// Effective annual cost on the net amount received (TCEA).
    pub annual_cost_rate: Rate,
}

/// Composed output of a full loan evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanReport {
    pub summary: LoanSummary,
    pub installments: InstallmentQuote,
    pub schedule: Vec<ScheduleEntry>,
    pub totals: ScheduleTotals,
    pub indicators: LoanIndicators,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate a property loan end to end.
///
/// Resolves the initial payment and subsidy into the financed principal,
/// converts a nominal quote to its effective rate, generates the repayment
/// schedule, and aggregates NPV/IRR/TCEA over the resulting installments.
/// The cost rate discounts against the net amount actually received, so
/// upfront costs and periodic charges widen the gap between it and the IRR.
pub fn evaluate(input: &LoanInput) -> HousingFinanceResult<ComputationOutput<LoanReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_loan_input(input)?;

    let initial_payment = if input.initial_payment_amount > Decimal::ZERO {
        if input.initial_payment_pct > Decimal::ZERO {
            warnings.push(
                "Explicit initial payment amount overrides the percentage of price".to_string(),
            );
        }
        input.initial_payment_amount
    } else {
        input.property_price * input.initial_payment_pct
    };

    let net_financed =
        (input.property_price - initial_payment - input.subsidy_amount).max(Decimal::ZERO);
    let upfront_costs = input.notarial_costs
        + input.registry_costs
        + input.appraisal_fee
        + input.study_fee
        + input.activation_fee;
    let financed_principal = net_financed + upfront_costs;

    if financed_principal.is_zero() {
        warnings.push(
            "Initial payment and subsidy cover the property price; nothing is financed"
                .to_string(),
        );
    }

    let annual_effective_rate = match input.rate_type {
        RateType::Nominal => rates::nominal_to_effective(input.annual_rate, &input.capitalization),
        RateType::Effective => input.annual_rate,
    };

    if input.grace != GraceKind::None && input.grace_periods >= input.installments {
        warnings.push(format!(
            "Grace periods ({}) consume the whole term ({}); the schedule never amortizes",
            input.grace_periods, input.installments
        ));
    }

    let schedule = schedule::generate(&ScheduleInput {
        principal: financed_principal,
        installments: input.installments,
        annual_rate: annual_effective_rate,
        period_days: input.period_days,
        grace: input.grace,
        grace_periods: input.grace_periods,
        property_price: input.property_price,
        life_insurance_rate: input.life_insurance_rate,
        risk_insurance_annual_rate: input.risk_insurance_annual_rate,
        periodic_commission: input.periodic_commission,
        postage_fee: input.postage_fee,
    })?;

    // The borrower's outflows are the billed totals, already rounded to cents.
    let cash_flows: Vec<Money> = schedule
        .entries
        .iter()
        .map(|entry| entry.total_installment)
        .collect();

    let indicator_set = indicators::compute(&IndicatorInput {
        received_principal: net_financed,
        financed_principal,
        cash_flows,
        annual_discount_rate: input.annual_discount_rate,
        period_days: input.period_days,
    })?;

    let full_installment = schedule
        .entries
        .iter()
        .find(|entry| entry.kind == PeriodKind::Normal)
        .map(|entry| entry.total_installment)
        .unwrap_or(Decimal::ZERO);

    let report = LoanReport {
        summary: LoanSummary {
            property_price: input.property_price.round_dp(2),
            initial_payment: initial_payment.round_dp(2),
            subsidy_amount: input.subsidy_amount.round_dp(2),
            net_financed: net_financed.round_dp(2),
            upfront_costs: upfront_costs.round_dp(2),
            financed_principal: financed_principal.round_dp(2),
            installments: input.installments,
            period_days: input.period_days,
            annual_effective_rate,
            period_rate: schedule.period_rate,
            grace: input.grace,
            grace_periods: input.grace_periods,
            annual_discount_rate: input.annual_discount_rate,
        },
        installments: InstallmentQuote {
            base_installment: schedule.base_installment,
            full_installment,
        },
        schedule: schedule.entries,
        totals: schedule.totals,
        indicators: LoanIndicators {
            npv: indicator_set.npv,
            period_irr: indicator_set.period_irr,
            annual_irr: indicator_set.annual_irr,
            annual_cost_rate: indicator_set.annual_cost_rate,
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Property loan evaluation — French amortization with grace variants, NPV/IRR/TCEA on billed installments",
        &serde_json::json!({
            "property_price": input.property_price.to_string(),
            "financed_principal": financed_principal.to_string(),
            "annual_effective_rate": annual_effective_rate.to_string(),
            "installments": input.installments,
            "period_days": input.period_days,
            "grace_periods": input.grace_periods,
            "annual_discount_rate": input.annual_discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_loan_input(input: &LoanInput) -> HousingFinanceResult<()> {
    if input.property_price <= Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "property_price".into(),
            reason: "Property price must be positive".into(),
        });
    }
    if input.installments == 0 {
        return Err(HousingFinanceError::InvalidParameters {
            field: "installments".into(),
            reason: "At least one installment is required".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "annual_rate".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if input.period_days == 0 {
        return Err(HousingFinanceError::InvalidParameters {
            field: "period_days".into(),
            reason: "Period length in days must be positive".into(),
        });
    }
    if input.initial_payment_pct < Decimal::ZERO || input.initial_payment_pct > Decimal::ONE {
        return Err(HousingFinanceError::InvalidParameters {
            field: "initial_payment_pct".into(),
            reason: "Initial payment percentage must be between 0 and 1".into(),
        });
    }

    let non_negative = [
        ("initial_payment_amount", input.initial_payment_amount),
        ("subsidy_amount", input.subsidy_amount),
        ("notarial_costs", input.notarial_costs),
        ("registry_costs", input.registry_costs),
        ("appraisal_fee", input.appraisal_fee),
        ("study_fee", input.study_fee),
        ("activation_fee", input.activation_fee),
        ("life_insurance_rate", input.life_insurance_rate),
        ("risk_insurance_annual_rate", input.risk_insurance_annual_rate),
        ("periodic_commission", input.periodic_commission),
        ("postage_fee", input.postage_fee),
        ("annual_discount_rate", input.annual_discount_rate),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(HousingFinanceError::InvalidParameters {
                field: field.into(),
                reason: "Cannot be negative".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RATE_TOL: Decimal = dec!(0.000001);

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal, label: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tolerance,
            "{label}: expected {expected}, got {actual} (diff {diff})"
        );
    }

    fn standard_loan() -> LoanInput {
        LoanInput {
            property_price: dec!(200000),
            initial_payment_pct: dec!(0.20),
            initial_payment_amount: Decimal::ZERO,
            subsidy_amount: Decimal::ZERO,
            notarial_costs: dec!(1200),
            registry_costs: dec!(800),
            appraisal_fee: dec!(500),
            study_fee: dec!(300),
            activation_fee: dec!(200),
            life_insurance_rate: dec!(0.0005),
            risk_insurance_annual_rate: dec!(0.0003),
            periodic_commission: dec!(9),
            postage_fee: dec!(3),
            installments: 120,
            annual_rate: dec!(0.095),
            rate_type: RateType::Effective,
            capitalization: "monthly".to_string(),
            period_days: 30,
            grace: GraceKind::None,
            grace_periods: 0,
            annual_discount_rate: dec!(0.20),
        }
    }

    #[test]
    fn test_summary_resolves_financed_amounts() {
        let output = evaluate(&standard_loan()).unwrap();
        let summary = &output.result.summary;

        assert_eq!(summary.initial_payment, dec!(40000.00));
        assert_eq!(summary.net_financed, dec!(160000.00));
        assert_eq!(summary.upfront_costs, dec!(3000.00));
        assert_eq!(summary.financed_principal, dec!(163000.00));
        assert_eq!(summary.annual_effective_rate, dec!(0.095));
        assert_eq!(output.result.schedule.len(), 120);
        // The schedule amortizes exactly the financed principal.
        assert_close(
            output.result.totals.amortization,
            dec!(163000),
            dec!(0.01),
            "amortized principal",
        );
    }

    #[test]
    fn test_cost_rate_exceeds_irr_when_costs_are_charged() {
        let output = evaluate(&standard_loan()).unwrap();
        let indicators = &output.result.indicators;

        // Insurance and fees push the borrower's flows above the pure
        // annuity, so the period IRR lands above the contract rate.
        assert!(indicators.annual_irr > dec!(0.095));
        // TCEA discounts against the smaller net amount received, so it
        // exceeds the IRR on the financed principal.
        assert!(indicators.annual_cost_rate > indicators.annual_irr);
        // Discounting at 20% against a 9.5% loan leaves value on the table.
        assert!(indicators.npv > Decimal::ZERO);
    }

    #[test]
    fn test_full_installment_is_first_normal_total() {
        let output = evaluate(&standard_loan()).unwrap();
        let report = &output.result;

        let first = &report.schedule[0];
        assert_eq!(first.kind, PeriodKind::Normal);
        assert_eq!(report.installments.full_installment, first.total_installment);
        assert!(report.installments.full_installment > report.installments.base_installment);
    }

    #[test]
    fn test_explicit_amount_overrides_percentage() {
        let mut input = standard_loan();
        input.initial_payment_amount = dec!(50000);
        let output = evaluate(&input).unwrap();

        assert_eq!(output.result.summary.initial_payment, dec!(50000.00));
        assert_eq!(output.result.summary.net_financed, dec!(150000.00));
        assert!(output
            .warnings
            .iter()
            .any(|warning| warning.contains("overrides")));
    }

    #[test]
    fn test_nominal_rate_is_compounded_before_scheduling() {
        let mut input = standard_loan();
        input.annual_rate = dec!(0.12);
        input.rate_type = RateType::Nominal;
        input.capitalization = "monthly".to_string();
        let output = evaluate(&input).unwrap();

        let expected = rates::nominal_to_effective(dec!(0.12), "monthly");
        assert_eq!(output.result.summary.annual_effective_rate, expected);
        assert_close(expected, dec!(0.12682503), RATE_TOL, "12% nominal monthly");
    }

    #[test]
    fn test_subsidy_reduces_net_financed() {
        let mut input = standard_loan();
        input.property_price = dec!(136000);
        input.initial_payment_pct = dec!(0.10);
        input.subsidy_amount = dec!(46545);
        let output = evaluate(&input).unwrap();

        // 136000 - 13600 - 46545
        assert_eq!(output.result.summary.net_financed, dec!(75855.00));
        assert_eq!(
            output.result.summary.financed_principal,
            dec!(75855.00) + dec!(3000.00)
        );
    }

    #[test]
    fn test_grace_consuming_term_quotes_zero_installments() {
        let mut input = standard_loan();
        input.installments = 12;
        input.grace = GraceKind::Total;
        input.grace_periods = 12;
        let output = evaluate(&input).unwrap();

        assert_eq!(output.result.installments.base_installment, Decimal::ZERO);
        assert_eq!(output.result.installments.full_installment, Decimal::ZERO);
        assert!(output
            .warnings
            .iter()
            .any(|warning| warning.contains("never amortizes")));
    }

    #[test]
    fn test_fully_covered_price_produces_zero_report() {
        let input = LoanInput {
            property_price: dec!(50000),
            initial_payment_pct: dec!(0.10),
            initial_payment_amount: Decimal::ZERO,
            subsidy_amount: dec!(46545),
            notarial_costs: Decimal::ZERO,
            registry_costs: Decimal::ZERO,
            appraisal_fee: Decimal::ZERO,
            study_fee: Decimal::ZERO,
            activation_fee: Decimal::ZERO,
            life_insurance_rate: Decimal::ZERO,
            risk_insurance_annual_rate: Decimal::ZERO,
            periodic_commission: Decimal::ZERO,
            postage_fee: Decimal::ZERO,
            installments: 12,
            annual_rate: dec!(0.10),
            rate_type: RateType::Effective,
            capitalization: "monthly".to_string(),
            period_days: 30,
            grace: GraceKind::None,
            grace_periods: 0,
            annual_discount_rate: dec!(0.20),
        };
        let output = evaluate(&input).unwrap();
        let report = &output.result;

        // 50000 - 5000 - 46545 clamps to zero rather than going negative.
        assert_eq!(report.summary.net_financed, dec!(0.00));
        assert_eq!(report.summary.financed_principal, dec!(0.00));
        assert_eq!(report.installments.base_installment, Decimal::ZERO);
        assert_eq!(report.indicators.npv, dec!(0.00));
        assert_eq!(report.indicators.period_irr, Decimal::ZERO);
        assert!(output
            .warnings
            .iter()
            .any(|warning| warning.contains("nothing is financed")));
    }

    #[test]
    fn test_period_irr_annualization_is_consistent() {
        let output = evaluate(&standard_loan()).unwrap();
        let indicators = &output.result.indicators;

        let annualized = rates::annual_rate_from_period(indicators.period_irr, 30);
        assert_eq!(indicators.annual_irr, annualized);
    }

    #[test]
    fn test_grace_terms_are_echoed_in_summary() {
        let mut input = standard_loan();
        input.grace = GraceKind::Partial;
        input.grace_periods = 6;
        let output = evaluate(&input).unwrap();

        assert_eq!(output.result.summary.grace, GraceKind::Partial);
        assert_eq!(output.result.summary.grace_periods, 6);
        assert_eq!(output.result.schedule[0].kind, PeriodKind::GracePartial);
        assert_eq!(output.result.schedule[6].kind, PeriodKind::Normal);
    }

    #[test]
    fn test_rejects_structurally_invalid_inputs() {
        let mut no_price = standard_loan();
        no_price.property_price = Decimal::ZERO;
        let HousingFinanceError::InvalidParameters { field, .. } =
            evaluate(&no_price).unwrap_err();
        assert_eq!(field, "property_price");

        let mut bad_pct = standard_loan();
        bad_pct.initial_payment_pct = dec!(1.5);
        let HousingFinanceError::InvalidParameters { field, .. } =
            evaluate(&bad_pct).unwrap_err();
        assert_eq!(field, "initial_payment_pct");

        let mut negative_fee = standard_loan();
        negative_fee.appraisal_fee = dec!(-10);
        let HousingFinanceError::InvalidParameters { field, .. } =
            evaluate(&negative_fee).unwrap_err();
        assert_eq!(field, "appraisal_fee");
    }
}
