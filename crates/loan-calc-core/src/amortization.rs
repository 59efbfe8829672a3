use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Longest term the engine schedules (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// A fixed-rate, fixed-payment loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount financed.
    pub principal: Money,
    /// Nominal annual rate in percent (7.5 = 7.5%).
    pub annual_rate_percent: Percent,
    /// Number of monthly payments.
    pub term_months: u32,
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    /// True when the engine will short-circuit to the zeroed result.
    pub fn is_degenerate(&self) -> bool {
        self.principal <= Decimal::ZERO || self.term_months == 0
    }

    pub fn exceeds_max_term(&self) -> bool {
        self.term_months > MAX_TERM_MONTHS
    }
}

/// One month of the repayment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month number.
    pub month: u32,
    pub installment: Money,
    pub interest_part: Money,
    pub capital_part: Money,
    /// Outstanding principal after this payment, never negative.
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    pub total_cost: Money,
    pub total_interest: Money,
    pub schedule: Vec<AmortizationRow>,
}

impl AmortizationResult {
    /// The all-zero answer returned for degenerate loans.
    pub fn zeroed() -> Self {
        Self {
            monthly_payment: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            schedule: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly rate from an annual percentage. Negative rates are clamped to zero.
pub fn periodic_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent.max(Decimal::ZERO) / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

/// Fixed payment that fully amortizes `principal` over `term_months` at
/// `rate` per month (annuity / PMT formula).
///
/// Returns zero for a non-positive principal or a zero term. At a zero rate
/// the payment is straight-line. If `(1 + rate)^n` leaves the decimal range
/// the payment converges to the interest-only amount `principal * rate`.
/// A payment that is itself not representable comes back as zero.
pub fn monthly_payment(principal: Money, rate: Rate, term_months: u32) -> Money {
    annuity_payment(principal, rate, term_months).unwrap_or(Decimal::ZERO)
}

fn annuity_payment(principal: Money, rate: Rate, term_months: u32) -> Option<Money> {
    if principal <= Decimal::ZERO || term_months == 0 {
        return Some(Decimal::ZERO);
    }

    let n = Decimal::from(term_months);
    if rate <= Decimal::ZERO {
        return principal.checked_div(n);
    }

    let interest_only = principal.checked_mul(rate);
    let factor = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powi(i64::from(term_months)));
    match factor {
        Some(factor) => {
            let denom = factor - Decimal::ONE;
            if denom.is_zero() {
                // rate too small to register at 28 digits
                principal.checked_div(n)
            } else {
                interest_only?.checked_mul(factor.checked_div(denom)?)
            }
        }
        None => interest_only,
    }
}

/// Closed-form inverse of [`monthly_payment`]: the principal a borrower can
/// service with `payment` per month over `term_months`.
///
/// Zero for a non-positive payment, a zero term, a term above
/// [`MAX_TERM_MONTHS`] or a principal outside the decimal range.
pub fn principal_for_payment(
    payment: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> Money {
    if payment <= Decimal::ZERO || term_months == 0 || term_months > MAX_TERM_MONTHS {
        return Decimal::ZERO;
    }
    present_value(payment, periodic_rate(annual_rate_percent), term_months).unwrap_or(Decimal::ZERO)
}

fn present_value(payment: Money, rate: Rate, term_months: u32) -> Option<Money> {
    if rate.is_zero() {
        return payment.checked_mul(Decimal::from(term_months));
    }

    let factor = Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powi(i64::from(term_months)));
    match factor {
        Some(factor) if !factor.is_zero() => {
            payment.checked_mul(Decimal::ONE - Decimal::ONE / factor)?.checked_div(rate)
        }
        _ => payment.checked_div(rate),
    }
}

/// Payment, totals and the full month-by-month schedule for a loan.
///
/// Pure and deterministic: identical parameters always produce an identical
/// result. Degenerate loans (no principal, no term), terms above
/// [`MAX_TERM_MONTHS`] and loans whose amounts leave the decimal range all
/// produce [`AmortizationResult::zeroed`].
pub fn compute_amortization(params: &LoanParameters) -> AmortizationResult {
    if params.is_degenerate() || params.exceeds_max_term() {
        return AmortizationResult::zeroed();
    }
    build_amortization(params).unwrap_or_else(|| {
        tracing::debug!(principal = %params.principal, "loan amounts overflow the decimal range");
        AmortizationResult::zeroed()
    })
}

fn build_amortization(params: &LoanParameters) -> Option<AmortizationResult> {
    let rate = periodic_rate(params.annual_rate_percent);
    let payment = annuity_payment(params.principal, rate, params.term_months)?;
    let total_cost = payment.checked_mul(Decimal::from(params.term_months))?;
    let total_interest = total_cost.checked_sub(params.principal)?;

    let mut schedule = Vec::with_capacity(params.term_months as usize);
    let mut balance = params.principal;

    for month in 1..=params.term_months {
        let interest_part = balance.checked_mul(rate)?;
        let capital_part = payment.checked_sub(interest_part)?;
        balance = balance.checked_sub(capital_part)?.max(Decimal::ZERO);

        schedule.push(AmortizationRow {
            month,
            installment: payment,
            interest_part,
            capital_part,
            balance,
        });
    }

    Some(AmortizationResult {
        monthly_payment: payment,
        total_cost,
        total_interest,
        schedule,
    })
}

/// [`compute_amortization`] wrapped in the standard output envelope.
pub fn calculate_amortization(params: &LoanParameters) -> ComputationOutput<AmortizationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if params.principal <= Decimal::ZERO {
        warnings.push("Principal is not positive; returning a zeroed result".into());
    }
    if params.term_months == 0 {
        warnings.push("Term is zero months; returning a zeroed result".into());
    }
    if params.annual_rate_percent < Decimal::ZERO {
        warnings.push("Negative annual rate treated as 0%".into());
    }
    if params.exceeds_max_term() {
        warnings.push(format!(
            "Term of {} months exceeds the {MAX_TERM_MONTHS}-month maximum; returning a zeroed result",
            params.term_months
        ));
    }

    let result = compute_amortization(params);
    if result.schedule.is_empty() && !params.is_degenerate() && !params.exceeds_max_term() {
        warnings.push("Loan amounts exceed the decimal range; returning a zeroed result".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Fixed-payment annuity amortization (monthly compounding)",
        params,
        warnings,
        elapsed,
        result,
    )
}
