use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cashflow;
use crate::error::HousingFinanceError;
use crate::rates;
use crate::types::{Money, Rate};
use crate::HousingFinanceResult;

/// Input for indicator aggregation over a schedule's cash flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorInput {
    /// Amount the borrower actually receives, net of upfront costs.
    pub received_principal: Money,
    /// Amount the schedule amortizes (net amount plus financed costs).
    pub financed_principal: Money,
    /// Total installment of every period, in order.
    pub cash_flows: Vec<Money>,
    /// Annual discount rate for the NPV.
    #[serde(default = "default_discount_rate")]
    pub annual_discount_rate: Rate,
    /// Period length in days on the 360-day year.
    #[serde(default = "default_period_days")]
    pub period_days: u32,
}

fn default_discount_rate() -> Rate {
    dec!(0.20)
}

fn default_period_days() -> u32 {
    rates::DEFAULT_PERIOD_DAYS
}

/// Return and cost indicators derived from one cash-flow series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// NPV of the flows against the financed principal at the discount rate.
    pub npv: Money,
    /// Per-period IRR against the financed principal.
    pub period_irr: Rate,
    pub annual_irr: Rate,
    /// Annualized IRR against the received amount (TCEA equivalent).
    pub annual_cost_rate: Rate,
    pub period_discount_rate: Rate,
}

/// Derive the full indicator set for a schedule's cash flows.
pub fn compute(input: &IndicatorInput) -> HousingFinanceResult<IndicatorSet> {
    if input.period_days == 0 {
        return Err(HousingFinanceError::InvalidParameters {
            field: "period_days".into(),
            reason: "Period length must be at least 1 day".into(),
        });
    }

    let period_discount_rate =
        rates::period_rate_from_annual(input.annual_discount_rate, input.period_days);

    let period_irr =
        cashflow::internal_rate_of_return(input.financed_principal, &input.cash_flows);
    let annual_irr = rates::annual_rate_from_period(period_irr, input.period_days);

    let npv = cashflow::net_present_value(
        input.financed_principal,
        &input.cash_flows,
        period_discount_rate,
    )
    .round_dp(2);

    Ok(IndicatorSet {
        npv,
        period_irr,
        annual_irr,
        annual_cost_rate: annual_cost_rate(
            input.received_principal,
            &input.cash_flows,
            input.period_days,
        ),
        period_discount_rate,
    })
}

/// Annualized total cost of borrowing: the IRR of the flows against the
/// amount actually received, annualized over `period_days` periods. Exceeds
/// the plain annual IRR whenever upfront costs shrink the received amount.
pub fn annual_cost_rate(received_principal: Money, cash_flows: &[Money], period_days: u32) -> Rate {
    let period_rate = cashflow::internal_rate_of_return(received_principal, cash_flows);
    rates::annual_rate_from_period(period_rate, period_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE_TOL: Decimal = dec!(0.0001);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    /// Helper: two annual flows with a 5% upfront haircut on the received side.
    fn annual_flows_input() -> IndicatorInput {
        IndicatorInput {
            received_principal: dec!(950),
            financed_principal: dec!(1000),
            cash_flows: vec![dec!(600), dec!(600)],
            annual_discount_rate: dec!(0.20),
            period_days: 360,
        }
    }

    #[test]
    fn test_indicator_set_on_annual_periods() {
        let set = compute(&annual_flows_input()).unwrap();

        // 360-day periods make the period discount rate the annual rate.
        assert_close(set.period_discount_rate, dec!(0.20), RATE_TOL, "period discount");
        // 1000 - 600/1.2 - 600/1.44
        assert_eq!(set.npv, dec!(83.33));
        // Root of 5y^2 - 3y - 3 = 0, y = 1 + r.
        assert_close(set.period_irr, dec!(0.13066239), RATE_TOL, "period irr");
        assert_close(set.annual_irr, set.period_irr, dec!(0.000000001), "annualized irr");
    }

    #[test]
    fn test_cost_rate_exceeds_irr_when_upfront_costs_bite() {
        let set = compute(&annual_flows_input()).unwrap();
        // Root of 19y^2 - 12y - 12 = 0 against the received 950.
        assert_close(set.annual_cost_rate, dec!(0.17095142), RATE_TOL, "cost rate");
        assert!(set.annual_cost_rate > set.annual_irr);
    }

    #[test]
    fn test_standalone_cost_rate_matches_the_set() {
        let input = annual_flows_input();
        let set = compute(&input).unwrap();
        assert_eq!(
            annual_cost_rate(input.received_principal, &input.cash_flows, input.period_days),
            set.annual_cost_rate
        );
    }

    #[test]
    fn test_degenerate_principals_yield_zero_rates() {
        let mut input = annual_flows_input();
        input.received_principal = Decimal::ZERO;
        input.financed_principal = Decimal::ZERO;
        let set = compute(&input).unwrap();
        assert_eq!(set.period_irr, Decimal::ZERO);
        assert_eq!(set.annual_irr, Decimal::ZERO);
        assert_eq!(set.annual_cost_rate, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_zero_period_days() {
        let mut input = annual_flows_input();
        input.period_days = 0;
        let HousingFinanceError::InvalidParameters { field, .. } =
            compute(&input).unwrap_err();
        assert_eq!(field, "period_days");
    }

    #[test]
    fn test_monthly_mortgage_indicators_are_consistent() {
        let flows = vec![dec!(8856.21); 12];
        let input = IndicatorInput {
            received_principal: dec!(96000),
            financed_principal: dec!(100000),
            cash_flows: flows.clone(),
            annual_discount_rate: dec!(0.20),
            period_days: 30,
        };
        let set = compute(&input).unwrap();

        // Flows are the exact annuity of a TEA 12% loan.
        assert_close(set.annual_irr, dec!(0.12), RATE_TOL, "annual irr");
        assert!(set.npv > Decimal::ZERO);
        assert_eq!(
            set.npv,
            cashflow::net_present_value(dec!(100000), &flows, set.period_discount_rate)
                .round_dp(2)
        );
        assert!(set.annual_cost_rate > set.annual_irr);
    }
}
