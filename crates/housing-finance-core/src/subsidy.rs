use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::HousingFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::HousingFinanceResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum qualifying monthly household income.
const INCOME_CEILING: Decimal = dec!(3715);

/// Prices at or below this use the lower savings requirement.
const LOW_SAVINGS_PRICE_LIMIT: Decimal = dec!(70000);
const LOW_SAVINGS_RATE: Decimal = dec!(0.01);
const HIGH_SAVINGS_RATE: Decimal = dec!(0.03);

struct SubsidyTier {
    price_limit: Decimal,
    amount: Decimal,
    category: &'static str,
    description: &'static str,
}

/// Ascending price brackets with the subsidy granted in each.
const TIERS: [SubsidyTier; 4] = [
    SubsidyTier {
        price_limit: dec!(60000),
        amount: dec!(56710),
        category: "VIS Priorizada Lote",
        description: "Housing priced up to 60,000",
    },
    SubsidyTier {
        price_limit: dec!(70000),
        amount: dec!(51895),
        category: "VIS Priorizada Multi",
        description: "Housing priced up to 70,000",
    },
    SubsidyTier {
        price_limit: dec!(109000),
        amount: dec!(50825),
        category: "VIS Lote Unifamiliar",
        description: "Housing priced up to 109,000",
    },
    SubsidyTier {
        price_limit: dec!(136000),
        amount: dec!(46545),
        category: "VIS Multifamiliar",
        description: "Housing priced up to 136,000",
    },
];

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Applicant facts for a subsidy check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsidyInput {
    pub monthly_income: Money,
    /// False when the applicant already owns housing.
    #[serde(default = "default_first_time_buyer")]
    pub first_time_buyer: bool,
    pub property_price: Money,
}

fn default_first_time_buyer() -> bool {
    true
}

/// Outcome of a subsidy evaluation, eligible or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsidyOutcome {
    pub eligible: bool,
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_savings: Option<Money>,
    /// Rationale, present whether eligible or not.
    pub message: String,
}

impl SubsidyOutcome {
    fn ineligible(message: String) -> SubsidyOutcome {
        SubsidyOutcome {
            eligible: false,
            amount: Decimal::ZERO,
            category: None,
            tier: None,
            minimum_savings: None,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate Bono Techo Propio eligibility.
///
/// Rules in order: the subsidy covers first homes only; monthly income is
/// capped; the property price selects the first qualifying tier; prices
/// above the highest tier do not qualify. Minimum savings are 1% of price
/// up to 70,000 and 3% beyond.
pub fn evaluate(input: &SubsidyInput) -> HousingFinanceResult<ComputationOutput<SubsidyOutcome>> {
    let start = Instant::now();

    validate_subsidy_input(input)?;
    let outcome = decide(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bono Techo Propio — income ceiling, four ascending price tiers, savings floor",
        &serde_json::json!({
            "monthly_income": input.monthly_income.to_string(),
            "first_time_buyer": input.first_time_buyer,
            "property_price": input.property_price.to_string(),
            "income_ceiling": INCOME_CEILING.to_string(),
        }),
        Vec::new(),
        elapsed,
        outcome,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_subsidy_input(input: &SubsidyInput) -> HousingFinanceResult<()> {
    if input.monthly_income < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "monthly_income".into(),
            reason: "Income cannot be negative".into(),
        });
    }
    if input.property_price < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "property_price".into(),
            reason: "Property price cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn decide(input: &SubsidyInput) -> SubsidyOutcome {
    if !input.first_time_buyer {
        return SubsidyOutcome::ineligible(
            "The subsidy applies to a first home only".to_string(),
        );
    }

    if input.monthly_income > INCOME_CEILING {
        return SubsidyOutcome::ineligible(format!(
            "Monthly income {} exceeds the program ceiling of {}",
            input.monthly_income, INCOME_CEILING
        ));
    }

    let tier = match TIERS
        .iter()
        .find(|tier| input.property_price <= tier.price_limit)
    {
        Some(tier) => tier,
        None => {
            return SubsidyOutcome::ineligible(format!(
                "Property price {} exceeds the highest qualifying tier of {}",
                input.property_price,
                TIERS[TIERS.len() - 1].price_limit
            ));
        }
    };

    let savings_rate = if input.property_price <= LOW_SAVINGS_PRICE_LIMIT {
        LOW_SAVINGS_RATE
    } else {
        HIGH_SAVINGS_RATE
    };
    let minimum_savings = (input.property_price * savings_rate).round_dp(2);

    SubsidyOutcome {
        eligible: true,
        amount: tier.amount,
        category: Some(tier.category.to_string()),
        tier: Some(tier.description.to_string()),
        minimum_savings: Some(minimum_savings),
        message: format!(
            "Qualifies for {}: subsidy of {}",
            tier.category, tier.amount
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn applicant(income: Decimal, first_time: bool, price: Decimal) -> SubsidyInput {
        SubsidyInput {
            monthly_income: income,
            first_time_buyer: first_time,
            property_price: price,
        }
    }

    #[test]
    fn test_first_tier_grant_with_one_percent_savings() {
        let output = evaluate(&applicant(dec!(3000), true, dec!(55000))).unwrap();
        let outcome = output.result;

        assert!(outcome.eligible);
        assert_eq!(outcome.amount, dec!(56710));
        assert_eq!(outcome.category.as_deref(), Some("VIS Priorizada Lote"));
        assert_eq!(outcome.minimum_savings, Some(dec!(550.00)));
        assert!(outcome.message.contains("56710"));
    }

    #[test]
    fn test_income_over_ceiling_disqualifies_any_price() {
        for price in [dec!(40000), dec!(100000)] {
            let outcome = evaluate(&applicant(dec!(4000), true, price))
                .unwrap()
                .result;
            assert!(!outcome.eligible);
            assert_eq!(outcome.amount, Decimal::ZERO);
            assert_eq!(outcome.category, None);
            assert!(outcome.message.contains("ceiling"));
        }
    }

    #[test]
    fn test_existing_homeowners_do_not_qualify() {
        let outcome = evaluate(&applicant(dec!(2000), false, dec!(50000)))
            .unwrap()
            .result;
        assert!(!outcome.eligible);
        assert!(outcome.message.contains("first home"));
    }

    #[test]
    fn test_each_tier_maps_price_to_its_grant() {
        let cases = [
            (dec!(60000), dec!(56710), "VIS Priorizada Lote"),
            (dec!(65000), dec!(51895), "VIS Priorizada Multi"),
            (dec!(100000), dec!(50825), "VIS Lote Unifamiliar"),
            (dec!(136000), dec!(46545), "VIS Multifamiliar"),
        ];
        for (price, amount, category) in cases {
            let outcome = evaluate(&applicant(dec!(3000), true, price)).unwrap().result;
            assert!(outcome.eligible, "price {} should qualify", price);
            assert_eq!(outcome.amount, amount);
            assert_eq!(outcome.category.as_deref(), Some(category));
        }
    }

    #[test]
    fn test_price_above_highest_tier_disqualifies() {
        let outcome = evaluate(&applicant(dec!(3000), true, dec!(136001)))
            .unwrap()
            .result;
        assert!(!outcome.eligible);
        assert!(outcome.message.contains("exceeds the highest"));
    }

    #[test]
    fn test_savings_rate_switches_at_seventy_thousand() {
        let low = evaluate(&applicant(dec!(3000), true, dec!(70000)))
            .unwrap()
            .result;
        assert_eq!(low.minimum_savings, Some(dec!(700.00)));

        let high = evaluate(&applicant(dec!(3000), true, dec!(70001)))
            .unwrap()
            .result;
        assert_eq!(high.minimum_savings, Some(dec!(2100.03)));
    }

    #[test]
    fn test_income_at_ceiling_still_qualifies() {
        let outcome = evaluate(&applicant(INCOME_CEILING, true, dec!(55000)))
            .unwrap()
            .result;
        assert!(outcome.eligible);
    }

    #[test]
    fn test_negative_inputs_are_structurally_invalid() {
        let HousingFinanceError::InvalidParameters { field, .. } =
            evaluate(&applicant(dec!(-1), true, dec!(50000))).unwrap_err();
        assert_eq!(field, "monthly_income");

        let HousingFinanceError::InvalidParameters { field, .. } =
            evaluate(&applicant(dec!(3000), true, dec!(-50000))).unwrap_err();
        assert_eq!(field, "property_price");
    }
}
