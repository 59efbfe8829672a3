use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::principal_for_payment;
use crate::types::*;

const BASE_COST_OF_LIVING: Money = dec!(1200);
const COST_PER_EXTRA_PERSON: Money = dec!(800);
/// Share of disposable income a lender will let go to instalments.
const MAX_DEBT_SERVICE_RATIO: Decimal = dec!(0.65);
/// Capacity multiple of the affordable instalment when no loan is priced.
const FLAT_CAPACITY_MULTIPLE: Decimal = dec!(110);

/// Loan against which the affordable instalment is priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLoan {
    pub annual_rate_percent: Percent,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityInput {
    /// Monthly take-home income.
    pub net_income: Money,
    pub household_size: u32,
    /// Total credit card and overdraft limits.
    pub card_limits: Money,
    /// Monthly instalments already being paid.
    pub existing_installments: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_loan: Option<ReferenceLoan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityOutput {
    pub cost_of_living: Money,
    pub total_monthly_costs: Money,
    pub disposable_income: Money,
    pub max_installment: Money,
    pub estimated_capacity: Money,
    pub method: String,
}

/// Household cost of living, by head count.
pub fn cost_of_living(household_size: u32) -> Money {
    let extra = Decimal::from(household_size.max(1) - 1);
    BASE_COST_OF_LIVING + extra * COST_PER_EXTRA_PERSON
}

/// Estimate how much a household can borrow from its monthly budget.
pub fn calculate_capacity(input: &CapacityInput) -> ComputationOutput<CapacityOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.household_size == 0 {
        warnings.push("Household size of 0 treated as a single person".into());
    }

    let living = cost_of_living(input.household_size);
    let total_monthly_costs = living + input.card_limits + input.existing_installments;
    let disposable_income = (input.net_income - total_monthly_costs).max(Decimal::ZERO);
    let max_installment = disposable_income * MAX_DEBT_SERVICE_RATIO;

    if disposable_income.is_zero() {
        warnings.push("Monthly costs absorb the whole income; no borrowing capacity".into());
    }

    let (estimated_capacity, method) = match &input.reference_loan {
        Some(loan) => (
            principal_for_payment(max_installment, loan.annual_rate_percent, loan.term_months),
            format!(
                "annuity inverse at {}% over {} months",
                loan.annual_rate_percent, loan.term_months
            ),
        ),
        None => (
            max_installment * FLAT_CAPACITY_MULTIPLE,
            "flat multiple of 110 instalments".to_string(),
        ),
    };

    let output = CapacityOutput {
        cost_of_living: living,
        total_monthly_costs,
        disposable_income,
        max_installment,
        estimated_capacity,
        method,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Credit capacity: 65% of income after living costs and existing obligations",
        input,
        warnings,
        elapsed,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input() -> CapacityInput {
        CapacityInput {
            net_income: dec!(6500),
            household_size: 1,
            card_limits: dec!(500),
            existing_installments: Decimal::ZERO,
            reference_loan: None,
        }
    }

    #[test]
    fn test_single_person_flat_multiple() {
        let out = calculate_capacity(&default_input());
        let r = &out.result;
        assert_eq!(r.cost_of_living, dec!(1200));
        assert_eq!(r.total_monthly_costs, dec!(1700));
        assert_eq!(r.disposable_income, dec!(4800));
        assert_eq!(r.max_installment, dec!(3120));
        assert_eq!(r.estimated_capacity, dec!(343200));
    }

    #[test]
    fn test_household_costs() {
        assert_eq!(cost_of_living(3), dec!(2800));
        assert_eq!(cost_of_living(0), dec!(1200));
    }

    #[test]
    fn test_reference_loan_inverts_annuity() {
        let mut input = default_input();
        input.net_income = dec!(1700) + dec!(2000) / dec!(0.65);
        input.reference_loan = Some(ReferenceLoan {
            annual_rate_percent: dec!(7.5),
            term_months: 360,
        });
        let out = calculate_capacity(&input);
        assert!((out.result.max_installment - dec!(2000)).abs() < dec!(0.0001));
        assert!((out.result.estimated_capacity - dec!(286035.25)).abs() < dec!(0.01));
    }

    #[test]
    fn test_overspent_household() {
        let mut input = default_input();
        input.net_income = dec!(1000);
        let out = calculate_capacity(&input);
        assert_eq!(out.result.estimated_capacity, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }
}
