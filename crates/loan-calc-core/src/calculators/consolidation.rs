use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_amortization, LoanParameters};
use crate::types::*;

const APR_MARKUP: Decimal = dec!(1.12);

fn default_consolidation_rate() -> Percent {
    dec!(7.5)
}

/// A loan the borrower is currently repaying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLoan {
    pub name: String,
    /// Outstanding balance.
    pub amount: Money,
    pub annual_rate_percent: Percent,
    /// Current monthly instalment.
    pub installment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub loans: Vec<ExistingLoan>,
    pub months: u32,
    #[serde(default = "default_consolidation_rate")]
    pub annual_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOutput {
    pub total_debt: Money,
    pub current_total_installment: Money,
    pub new_installment: Money,
    pub new_total_cost: Money,
    /// Monthly relief; negative when the new instalment is higher.
    pub savings: Money,
    pub savings_percent: Percent,
    pub apr_estimate_percent: Percent,
}

/// Roll every existing loan into one new loan and compare instalments.
pub fn calculate_consolidation(
    input: &ConsolidationInput,
) -> ComputationOutput<ConsolidationOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.loans.is_empty() {
        warnings.push("No loans to consolidate".into());
    }

    let total_debt: Money = input.loans.iter().map(|l| l.amount).sum();
    let current_total_installment: Money = input.loans.iter().map(|l| l.installment).sum();

    let params = LoanParameters::new(total_debt, input.annual_rate_percent, input.months);
    let amortization = compute_amortization(&params);

    let savings = current_total_installment - amortization.monthly_payment;
    if savings < Decimal::ZERO {
        warnings.push(format!(
            "Consolidated instalment exceeds the current total by {}",
            (-savings).round_dp(2)
        ));
    }

    for loan in &input.loans {
        if loan.annual_rate_percent < input.annual_rate_percent {
            warnings.push(format!(
                "'{}' already carries a lower rate ({}%) than the consolidation loan",
                loan.name, loan.annual_rate_percent
            ));
        }
    }

    let output = ConsolidationOutput {
        total_debt,
        current_total_installment,
        new_installment: amortization.monthly_payment,
        new_total_cost: amortization.total_cost,
        savings,
        savings_percent: percent_of(savings, current_total_installment),
        apr_estimate_percent: input.annual_rate_percent.max(Decimal::ZERO) * APR_MARKUP,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Debt consolidation: sum of balances amortized as a single annuity",
        input,
        warnings,
        elapsed,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(name: &str, amount: Decimal, rate: Decimal, installment: Decimal) -> ExistingLoan {
        ExistingLoan {
            name: name.into(),
            amount,
            annual_rate_percent: rate,
            installment,
        }
    }

    #[test]
    fn test_two_loans() {
        let input = ConsolidationInput {
            loans: vec![
                loan("Loan 1", dec!(30000), dec!(12), dec!(800)),
                loan("Loan 2", dec!(20000), dec!(10), dec!(550)),
            ],
            months: 84,
            annual_rate_percent: dec!(7.5),
        };
        let out = calculate_consolidation(&input);
        let r = &out.result;
        assert_eq!(r.total_debt, dec!(50000));
        assert_eq!(r.current_total_installment, dec!(1350));
        assert!((r.new_installment - dec!(766.91)).abs() < dec!(0.01));
        assert!((r.savings - dec!(583.09)).abs() < dec!(0.01));
        assert!((r.savings_percent - dec!(43.19)).abs() < dec!(0.01));
        assert_eq!(r.apr_estimate_percent, dec!(8.4));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_no_loans() {
        let input = ConsolidationInput {
            loans: Vec::new(),
            months: 84,
            annual_rate_percent: dec!(7.5),
        };
        let out = calculate_consolidation(&input);
        assert_eq!(out.result.new_installment, Decimal::ZERO);
        assert_eq!(out.result.savings_percent, Decimal::ZERO);
    }

    #[test]
    fn test_cheaper_existing_loan_is_flagged() {
        let input = ConsolidationInput {
            loans: vec![loan("Mortgage", dec!(10000), dec!(4), dec!(300))],
            months: 84,
            annual_rate_percent: dec!(7.5),
        };
        let out = calculate_consolidation(&input);
        assert!(out.warnings.iter().any(|w| w.contains("Mortgage")));
    }
}
