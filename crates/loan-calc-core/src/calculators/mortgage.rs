use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    compute_amortization, AmortizationResult, LoanParameters, MAX_TERM_MONTHS,
};
use crate::types::*;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub property_value: Money,
    /// Down payment paid from the borrower's own funds.
    pub own_contribution: Money,
    pub years: u32,
    pub annual_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    /// Loan-to-value in percent.
    pub ltv_percent: Percent,
    pub term_months: u32,
    pub amortization: AmortizationResult,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Loan parameters implied by a property purchase.
pub fn mortgage_parameters(input: &MortgageInput) -> LoanParameters {
    let loan_amount = (input.property_value - input.own_contribution).max(Decimal::ZERO);
    LoanParameters::new(
        loan_amount,
        input.annual_rate_percent,
        input.years.saturating_mul(12),
    )
}

/// Mortgage instalment, LTV and full repayment schedule.
pub fn calculate_mortgage(input: &MortgageInput) -> ComputationOutput<MortgageOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let params = mortgage_parameters(input);
    if params.principal.is_zero() {
        warnings.push("Own contribution covers the property value; nothing to finance".into());
    }
    if params.term_months == 0 {
        warnings.push("Loan term is zero years".into());
    }
    if params.exceeds_max_term() {
        warnings.push(format!(
            "Loan term exceeds {} years; no schedule computed",
            MAX_TERM_MONTHS / 12
        ));
    }

    let ltv_percent = percent_of(params.principal, input.property_value);
    if ltv_percent > Decimal::from(80) {
        warnings.push(format!(
            "LTV of {}% exceeds 80%; lenders usually require extra collateral insurance",
            ltv_percent.round_dp(2)
        ));
    }

    let output = MortgageOutput {
        loan_amount: params.principal,
        ltv_percent,
        term_months: params.term_months,
        amortization: compute_amortization(&params),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Mortgage: (value - own contribution) amortized monthly over years * 12",
        input,
        warnings,
        elapsed,
        output,
    )
}
