use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_amortization, LoanParameters};
use crate::types::*;

/// Dealer-network rate used when the caller does not quote one.
pub const DEFAULT_CAR_RATE_PERCENT: Decimal = dec!(9.5);

/// APR shown next to car loan quotes.
pub const CAR_APR_ESTIMATE_PERCENT: Decimal = dec!(11.2);

fn default_car_rate() -> Percent {
    DEFAULT_CAR_RATE_PERCENT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarLoanInput {
    pub price: Money,
    pub own_contribution: Money,
    pub months: u32,
    /// Model year; carried into the lead context, not priced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    #[serde(default = "default_car_rate")]
    pub annual_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarLoanOutput {
    pub loan_amount: Money,
    /// Share of the price that is financed, in percent.
    pub financing_percent: Percent,
    pub monthly_payment: Money,
    pub total_cost: Money,
    pub total_interest: Money,
    pub apr_estimate_percent: Percent,
}

/// Car loan: price less own contribution, amortized monthly.
pub fn calculate_car_loan(input: &CarLoanInput) -> ComputationOutput<CarLoanOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan_amount = (input.price - input.own_contribution).max(Decimal::ZERO);
    if loan_amount.is_zero() {
        warnings.push("Own contribution covers the price; nothing to finance".into());
    }
    if input.price > Decimal::ZERO && input.own_contribution > input.price * dec!(0.9) {
        warnings.push("Own contribution above 90% of the price is unusual for car financing".into());
    }

    let params = LoanParameters::new(loan_amount, input.annual_rate_percent, input.months);
    let amortization = compute_amortization(&params);

    let output = CarLoanOutput {
        loan_amount,
        financing_percent: percent_of(loan_amount, input.price),
        monthly_payment: amortization.monthly_payment,
        total_cost: amortization.total_cost,
        total_interest: amortization.total_interest,
        apr_estimate_percent: CAR_APR_ESTIMATE_PERCENT,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Car loan: (price - own contribution) amortized at the dealer rate",
        input,
        warnings,
        elapsed,
        output,
    )
}
