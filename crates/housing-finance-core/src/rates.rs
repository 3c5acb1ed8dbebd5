use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::Rate;

/// Financial year length in days. Fixed convention, not configurable per call.
pub const DAYS_PER_YEAR: Decimal = dec!(360);

/// Default period length for monthly installment plans.
pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Effective rate of a `period_days` period from an annual effective rate.
///
/// `(1 + annual)^(period_days / 360) - 1` on the 360-day financial year.
pub fn period_rate_from_annual(annual_rate: Rate, period_days: u32) -> Rate {
    let exponent = Decimal::from(period_days) / DAYS_PER_YEAR;
    (Decimal::ONE + annual_rate).powd(exponent) - Decimal::ONE
}

/// Annual effective rate from the effective rate of a `period_days` period.
///
/// `(1 + period)^(360 / period_days) - 1`, inverse of [`period_rate_from_annual`].
pub fn annual_rate_from_period(period_rate: Rate, period_days: u32) -> Rate {
    let exponent = DAYS_PER_YEAR / Decimal::from(period_days);
    (Decimal::ONE + period_rate).powd(exponent) - Decimal::ONE
}

/// Effective rate of a 30-day month from an annual effective rate.
pub fn monthly_rate_from_annual(annual_rate: Rate) -> Rate {
    period_rate_from_annual(annual_rate, DEFAULT_PERIOD_DAYS)
}

/// Effective annual rate from a nominal annual rate.
///
/// The compounding frequency comes from the capitalization label:
/// monthly 12, quarterly 4, semiannual 2, annual 1. An unrecognized
/// label falls back to monthly compounding instead of failing.
pub fn nominal_to_effective(nominal_rate: Rate, capitalization: &str) -> Rate {
    let periods = compounding_periods(capitalization);
    let per_period = nominal_rate / Decimal::from(periods);
    (Decimal::ONE + per_period).powd(Decimal::from(periods)) - Decimal::ONE
}

fn compounding_periods(capitalization: &str) -> u32 {
    match capitalization {
        "annual" => 1,
        "semiannual" => 2,
        "quarterly" => 4,
        // "monthly" and anything unrecognized
        _ => 12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE_TOL: Decimal = dec!(0.00000001);
    const INVERSE_TOL: Decimal = dec!(0.000000001);

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

    #[test]
    fn test_monthly_period_rate_from_annual() {
        let r = period_rate_from_annual(dec!(0.12), 30);
        assert_close(r, dec!(0.00948879), RATE_TOL, "30-day rate at TEA 12%");
    }

    #[test]
    fn test_full_year_period_is_identity() {
        let r = period_rate_from_annual(dec!(0.12), 360);
        assert_close(r, dec!(0.12), INVERSE_TOL, "360-day period rate");
    }

    #[test]
    fn test_zero_rate_maps_to_zero() {
        assert_eq!(period_rate_from_annual(Decimal::ZERO, 30), Decimal::ZERO);
        assert_eq!(annual_rate_from_period(Decimal::ZERO, 30), Decimal::ZERO);
    }

    #[test]
    fn test_conversions_are_mutual_inverses() {
        let cases = [
            (dec!(0.12), 30),
            (dec!(0.085), 90),
            (dec!(0.30), 180),
            (dec!(0.045), 15),
        ];
        for (annual, days) in cases {
            let round_trip = annual_rate_from_period(period_rate_from_annual(annual, days), days);
            assert_close(
                round_trip,
                annual,
                INVERSE_TOL,
                "annual -> period -> annual round trip",
            );
        }
    }

    #[test]
    fn test_monthly_helper_matches_30_day_period() {
        assert_eq!(
            monthly_rate_from_annual(dec!(0.12)),
            period_rate_from_annual(dec!(0.12), 30)
        );
    }

    #[test]
    fn test_nominal_to_effective_monthly() {
        let tea = nominal_to_effective(dec!(0.12), "monthly");
        assert_close(tea, dec!(0.12682503), RATE_TOL, "TNA 12% monthly");
    }

    #[test]
    fn test_nominal_to_effective_other_frequencies() {
        assert_close(
            nominal_to_effective(dec!(0.12), "quarterly"),
            dec!(0.12550881),
            RATE_TOL,
            "TNA 12% quarterly",
        );
        assert_close(
            nominal_to_effective(dec!(0.12), "semiannual"),
            dec!(0.1236),
            RATE_TOL,
            "TNA 12% semiannual",
        );
        assert_close(
            nominal_to_effective(dec!(0.12), "annual"),
            dec!(0.12),
            RATE_TOL,
            "TNA 12% annual",
        );
    }

    #[test]
    fn test_unknown_capitalization_defaults_to_monthly() {
        assert_eq!(
            nominal_to_effective(dec!(0.12), "weekly"),
            nominal_to_effective(dec!(0.12), "monthly")
        );
        assert_eq!(
            nominal_to_effective(dec!(0.12), ""),
            nominal_to_effective(dec!(0.12), "monthly")
        );
    }
}
