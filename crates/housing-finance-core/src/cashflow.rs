use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Rate};

const BISECTION_ITERATIONS: u32 = 100;
const BRACKET_LOW: Decimal = dec!(-0.5);
const BRACKET_HIGH: Decimal = dec!(2);
const REPAIR_LOW: Decimal = dec!(-0.3);
const REPAIR_STEP: Decimal = dec!(0.5);
const REPAIR_LIMIT: Decimal = dec!(5);

/// Net present value at the given period rate.
///
/// `initial_outlay - Σ cash_flows[i] / (1 + rate)^(i+1)`. Positive when
/// the outlay exceeds the discounted flows. Decimal cannot represent the
/// extreme discount factors a root scan walks through, so the result
/// saturates to `Decimal::MAX`/`Decimal::MIN` instead of overflowing;
/// the sign is always that of the true value.
pub fn net_present_value(initial_outlay: Money, cash_flows: &[Money], period_rate: Rate) -> Money {
    if period_rate <= dec!(-1) {
        return Decimal::MIN;
    }

    let one_plus_r = Decimal::ONE + period_rate;
    let mut discount = Decimal::ONE;
    let mut net = initial_outlay;

    for flow in cash_flows {
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) => d,
            // Factor overflow: the remaining terms are negligible.
            None => break,
        };
        if discount.is_zero() {
            // Factor underflow near rate -1: any further flow dominates.
            if flow.is_zero() {
                continue;
            }
            return saturated(-*flow);
        }
        let term = match flow.checked_div(discount) {
            Some(term) => term,
            None => return saturated(-*flow),
        };
        net = match net.checked_sub(term) {
            Some(updated) => updated,
            None => return saturated(-term),
        };
    }

    net
}

/// Internal rate of return of the flows against the outlay, by bisection.
///
/// Fixed cost, not adaptive precision: exactly 100 halvings over an
/// initial bracket of [-0.5, 2], returning the final midpoint with no
/// convergence early-exit. When the initial bracket does not straddle a
/// sign change, candidate upper bounds 0.5, 1.0, .. 5.0 are scanned
/// against a fixed lower bound of -0.3 and the first bracketing pair is
/// adopted; if none brackets, the original bracket is used regardless.
/// Flow sequences with multiple sign changes can defeat the repair scan
/// and converge on the wrong branch.
///
/// A non-positive outlay or an empty flow sequence yields rate 0.
pub fn internal_rate_of_return(initial_outlay: Money, cash_flows: &[Money]) -> Rate {
    if initial_outlay <= Decimal::ZERO || cash_flows.is_empty() {
        return Decimal::ZERO;
    }

    let mut low = BRACKET_LOW;
    let mut high = BRACKET_HIGH;

    let at_low = net_present_value(initial_outlay, cash_flows, low);
    let at_high = net_present_value(initial_outlay, cash_flows, high);
    let same_sign = (at_low > Decimal::ZERO && at_high > Decimal::ZERO)
        || (at_low < Decimal::ZERO && at_high < Decimal::ZERO);

    if same_sign {
        let at_repair_low = net_present_value(initial_outlay, cash_flows, REPAIR_LOW);
        let mut candidate = REPAIR_STEP;
        while candidate <= REPAIR_LIMIT {
            let at_candidate = net_present_value(initial_outlay, cash_flows, candidate);
            if at_repair_low < Decimal::ZERO && at_candidate > Decimal::ZERO {
                low = REPAIR_LOW;
                high = candidate;
                break;
            }
            candidate += REPAIR_STEP;
        }
    }

    let two = dec!(2);
    let mut mid = Decimal::ZERO;
    for _ in 0..BISECTION_ITERATIONS {
        mid = (low + high) / two;
        if net_present_value(initial_outlay, cash_flows, mid) < Decimal::ZERO {
            low = mid;
        } else {
            high = mid;
        }
    }

    mid
}

// Sign-preserving stand-in for an unrepresentable magnitude; the
// bisection only inspects the sign.
fn saturated(direction: Decimal) -> Decimal {
    if direction < Decimal::ZERO {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}
