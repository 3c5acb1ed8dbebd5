use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::HousingFinanceError;
use crate::rates;
use crate::types::{Money, Rate};
use crate::HousingFinanceResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Payment relief applied to the opening stretch of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraceKind {
    /// No grace phase.
    #[default]
    None,
    /// Interest is billed each period; the balance does not move.
    Partial,
    /// Nothing is billed; interest capitalizes into the balance.
    Total,
}

/// How a period was billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    GraceTotal,
    GracePartial,
    Normal,
}

/// Input for schedule generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Amount financed at period zero.
    pub principal: Money,
    /// Total number of periods, grace included.
    pub installments: u32,
    /// Annual effective rate.
    pub annual_rate: Rate,
    /// Period length in days on the 360-day year.
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default)]
    pub grace: GraceKind,
    #[serde(default)]
    pub grace_periods: u32,
    /// Reference price the property-risk premium is charged against.
    #[serde(default)]
    pub property_price: Money,
    /// Per-period life/disgravamen rate on the opening balance.
    #[serde(default)]
    pub life_insurance_rate: Rate,
    /// Annual property-risk rate on the reference price.
    #[serde(default)]
    pub risk_insurance_annual_rate: Rate,
    /// Flat charge billed every period.
    #[serde(default)]
    pub periodic_commission: Money,
    /// Flat postal/handling charge billed every period.
    #[serde(default)]
    pub postage_fee: Money,
}

fn default_period_days() -> u32 {
    rates::DEFAULT_PERIOD_DAYS
}

/// One billed period. Monetary columns are rounded to cents; the balance
/// recurrence behind them is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub period: u32,
    pub kind: PeriodKind,
    pub opening_balance: Money,
    pub amortization: Money,
    pub interest: Money,
    pub base_installment: Money,
    pub life_insurance: Money,
    pub risk_insurance: Money,
    pub commission: Money,
    pub postage: Money,
    pub total_installment: Money,
    pub closing_balance: Money,
}

/// Category sums across the whole schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub amortization: Money,
    pub interest: Money,
    pub life_insurance: Money,
    pub risk_insurance: Money,
    pub commission: Money,
    pub postage: Money,
    pub base_installment: Money,
    pub total_installment: Money,
}

/// Full amortization table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// Level installment of the amortizing phase; 0 when grace consumes the term.
    pub base_installment: Money,
    /// Effective rate applied per period.
    pub period_rate: Rate,
    pub entries: Vec<ScheduleEntry>,
    pub totals: ScheduleTotals,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the amortization table for a constant-installment loan.
///
/// Periods 1..=G bill according to the grace kind; the remaining R = N - G
/// periods pay the level annuity installment. The final period forces
/// amortization equal to the remaining balance and recomputes its base
/// installment from that, so the table always closes at exactly zero.
/// Grace counts at or beyond the term produce a schedule of grace entries
/// alone with a base installment of 0, not an error.
pub fn generate(input: &ScheduleInput) -> HousingFinanceResult<ScheduleOutput> {
    validate_schedule_input(input)?;

    let period_rate = rates::period_rate_from_annual(input.annual_rate, input.period_days);
    let periods_per_year = rates::DAYS_PER_YEAR / Decimal::from(input.period_days);
    let risk_premium = input.property_price * (input.risk_insurance_annual_rate / periods_per_year);

    let grace_periods = match input.grace {
        GraceKind::None => 0,
        GraceKind::Partial | GraceKind::Total => input.grace_periods,
    };

    let mut builder = ScheduleBuilder {
        input,
        risk_premium,
        entries: Vec::with_capacity(input.installments.max(grace_periods) as usize),
        totals: ScheduleTotals::default(),
    };
    let mut balance = input.principal;

    for period in 1..=grace_periods {
        let opening = balance;
        let accrued = opening * period_rate;
        if input.grace == GraceKind::Total {
            balance += accrued;
            builder.bill(
                period,
                PeriodKind::GraceTotal,
                opening,
                Decimal::ZERO,
                Decimal::ZERO,
                Decimal::ZERO,
                balance,
            );
        } else {
            builder.bill(
                period,
                PeriodKind::GracePartial,
                opening,
                Decimal::ZERO,
                accrued,
                accrued,
                balance,
            );
        }
    }

    let remaining = input.installments.saturating_sub(grace_periods);
    if remaining == 0 {
        return Ok(builder.finish(Decimal::ZERO, period_rate));
    }

    let installment = level_installment(balance, period_rate, remaining);

    for period in (grace_periods + 1)..=input.installments {
        let opening = balance;
        let interest = opening * period_rate;
        let mut amortization = installment - interest;
        let mut base = installment;
        if period == input.installments {
            amortization = opening;
            base = amortization + interest;
        }
        balance = (opening - amortization).max(Decimal::ZERO);
        builder.bill(
            period,
            PeriodKind::Normal,
            opening,
            amortization,
            interest,
            base,
            balance,
        );
    }

    Ok(builder.finish(installment, period_rate))
}

/// Bare schedule with 30-day periods and no insurance or fee add-ons.
pub fn monthly_schedule(
    principal: Money,
    months: u32,
    annual_rate: Rate,
    grace: GraceKind,
    grace_periods: u32,
) -> HousingFinanceResult<ScheduleOutput> {
    generate(&ScheduleInput {
        principal,
        installments: months,
        annual_rate,
        period_days: rates::DEFAULT_PERIOD_DAYS,
        grace,
        grace_periods,
        property_price: Decimal::ZERO,
        life_insurance_rate: Decimal::ZERO,
        risk_insurance_annual_rate: Decimal::ZERO,
        periodic_commission: Decimal::ZERO,
        postage_fee: Decimal::ZERO,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_schedule_input(input: &ScheduleInput) -> HousingFinanceResult<()> {
    if input.principal < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if input.installments == 0 {
        return Err(HousingFinanceError::InvalidParameters {
            field: "installments".into(),
            reason: "Installment count must be at least 1".into(),
        });
    }
    if input.period_days == 0 {
        return Err(HousingFinanceError::InvalidParameters {
            field: "period_days".into(),
            reason: "Period length must be at least 1 day".into(),
        });
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "annual_rate".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if input.property_price < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "property_price".into(),
            reason: "Reference price cannot be negative".into(),
        });
    }
    if input.life_insurance_rate < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "life_insurance_rate".into(),
            reason: "Insurance rate cannot be negative".into(),
        });
    }
    if input.risk_insurance_annual_rate < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "risk_insurance_annual_rate".into(),
            reason: "Insurance rate cannot be negative".into(),
        });
    }
    if input.periodic_commission < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "periodic_commission".into(),
            reason: "Fees cannot be negative".into(),
        });
    }
    if input.postage_fee < Decimal::ZERO {
        return Err(HousingFinanceError::InvalidParameters {
            field: "postage_fee".into(),
            reason: "Fees cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Level annuity installment for `balance` over `periods` at `rate` per
/// period. A zero rate degenerates to straight-line principal.
fn level_installment(balance: Money, rate: Rate, periods: u32) -> Money {
    if rate.is_zero() {
        return balance / Decimal::from(periods);
    }
    let growth = (Decimal::ONE + rate).powd(Decimal::from(periods));
    balance * (rate * growth) / (growth - Decimal::ONE)
}

struct ScheduleBuilder<'a> {
    input: &'a ScheduleInput,
    /// Property-risk premium, constant across periods.
    risk_premium: Money,
    entries: Vec<ScheduleEntry>,
    totals: ScheduleTotals,
}

impl ScheduleBuilder<'_> {
    /// Append one period: add-ons on the opening balance, unrounded totals,
    /// cent-rounded entry columns.
    #[allow(clippy::too_many_arguments)]
    fn bill(
        &mut self,
        period: u32,
        kind: PeriodKind,
        opening: Money,
        amortization: Money,
        interest: Money,
        base: Money,
        closing: Money,
    ) {
        let life = opening * self.input.life_insurance_rate;
        let total =
            base + life + self.risk_premium + self.input.periodic_commission + self.input.postage_fee;

        self.totals.amortization += amortization;
        self.totals.interest += interest;
        self.totals.life_insurance += life;
        self.totals.risk_insurance += self.risk_premium;
        self.totals.commission += self.input.periodic_commission;
        self.totals.postage += self.input.postage_fee;
        self.totals.base_installment += base;
        self.totals.total_installment += total;

        self.entries.push(ScheduleEntry {
            period,
            kind,
            opening_balance: opening.round_dp(2),
            amortization: amortization.round_dp(2),
            interest: interest.round_dp(2),
            base_installment: base.round_dp(2),
            life_insurance: life.round_dp(2),
            risk_insurance: self.risk_premium.round_dp(2),
            commission: self.input.periodic_commission.round_dp(2),
            postage: self.input.postage_fee.round_dp(2),
            total_installment: total.round_dp(2),
            closing_balance: closing.round_dp(2),
        });
    }

    fn finish(self, base_installment: Money, period_rate: Rate) -> ScheduleOutput {
        ScheduleOutput {
            base_installment: base_installment.round_dp(2),
            period_rate,
            entries: self.entries,
            totals: self.totals.rounded(),
        }
    }
}

impl ScheduleTotals {
    fn rounded(&self) -> ScheduleTotals {
        ScheduleTotals {
            amortization: self.amortization.round_dp(2),
            interest: self.interest.round_dp(2),
            life_insurance: self.life_insurance.round_dp(2),
            risk_insurance: self.risk_insurance.round_dp(2),
            commission: self.commission.round_dp(2),
            postage: self.postage.round_dp(2),
            base_installment: self.base_installment.round_dp(2),
            total_installment: self.total_installment.round_dp(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
