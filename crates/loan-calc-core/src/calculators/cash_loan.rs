use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_amortization, LoanParameters};
use crate::types::*;

/// Rough APR mark-up applied to the nominal rate for display.
const APR_MARKUP: Decimal = dec!(1.15);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashLoanInput {
    pub amount: Money,
    pub months: u32,
    pub annual_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashLoanOutput {
    pub monthly_payment: Money,
    pub total_cost: Money,
    pub total_interest: Money,
    pub apr_estimate_percent: Percent,
}

/// Consumer cash loan instalment and cost.
pub fn calculate_cash_loan(input: &CashLoanInput) -> ComputationOutput<CashLoanOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = LoanParameters::new(input.amount, input.annual_rate_percent, input.months);
    if params.is_degenerate() {
        warnings.push("Amount and term must both be positive; returning zeroes".into());
    }

    let amortization = compute_amortization(&params);
    let output = CashLoanOutput {
        monthly_payment: amortization.monthly_payment,
        total_cost: amortization.total_cost,
        total_interest: amortization.total_interest,
        apr_estimate_percent: input.annual_rate_percent.max(Decimal::ZERO) * APR_MARKUP,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Cash loan: annuity payment, APR estimated as nominal rate * 1.15",
        input,
        warnings,
        elapsed,
        output,
    )
}
