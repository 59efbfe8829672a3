use loan_calc_core::amortization::{
    compute_amortization, monthly_payment, periodic_rate, AmortizationResult, LoanParameters,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn sample_loans() -> Vec<LoanParameters> {
    vec![
        LoanParameters::new(dec!(320000), dec!(7.5), 300),
        LoanParameters::new(dec!(50000), dec!(8.5), 60),
        LoanParameters::new(dec!(1000), dec!(0), 7),
        LoanParameters::new(dec!(999.99), dec!(24.9), 1),
        LoanParameters::new(dec!(2500000), dec!(3.1), 600),
        LoanParameters::new(dec!(0.01), dec!(99), 12),
    ]
}

fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
    (a - b).abs() <= tol
}

// ===========================================================================
// Known answers
// ===========================================================================

#[test]
fn test_mortgage_known_answer() {
    let result = compute_amortization(&LoanParameters::new(dec!(320000), dec!(7.5), 300));

    // PMT = 320000 * r * (1+r)^300 / ((1+r)^300 - 1), r = 0.00625
    assert!(close(result.monthly_payment, dec!(2364.77), dec!(0.01)));
    assert_eq!(result.schedule.len(), 300);

    // First month interest = 320000 * 0.00625
    assert_eq!(result.schedule[0].interest_part, dec!(2000));
    assert_eq!(
        result.schedule[0].capital_part,
        result.monthly_payment - dec!(2000)
    );
}

#[test]
fn test_zero_principal_is_all_zero() {
    let result = compute_amortization(&LoanParameters::new(dec!(0), dec!(7.5), 300));
    assert_eq!(result, AmortizationResult::zeroed());
    assert!(result.schedule.is_empty());
}

#[test]
fn test_negative_principal_is_all_zero() {
    let result = compute_amortization(&LoanParameters::new(dec!(-100), dec!(7.5), 12));
    assert_eq!(result, AmortizationResult::zeroed());
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_capital_parts_sum_to_principal() {
    for params in sample_loans() {
        let result = compute_amortization(&params);
        let repaid: Decimal = result.schedule.iter().map(|r| r.capital_part).sum();
        let tol = params.principal * dec!(0.000001);
        assert!(
            close(repaid, params.principal, tol),
            "repaid {repaid} vs principal {} for {params:?}",
            params.principal
        );
    }
}

#[test]
fn test_balance_non_increasing_and_ends_at_zero() {
    for params in sample_loans() {
        let result = compute_amortization(&params);
        let mut previous = params.principal;
        for row in &result.schedule {
            assert!(row.balance <= previous, "balance rose at month {}", row.month);
            assert!(row.balance >= Decimal::ZERO);
            previous = row.balance;
        }
        let last = result.schedule.last().unwrap();
        assert!(close(last.balance, Decimal::ZERO, params.principal * dec!(0.000001)));
    }
}

#[test]
fn test_months_are_sequential_and_installments_fixed() {
    let result = compute_amortization(&LoanParameters::new(dec!(50000), dec!(8.5), 60));
    for (i, row) in result.schedule.iter().enumerate() {
        assert_eq!(row.month as usize, i + 1);
        assert_eq!(row.installment, result.monthly_payment);
        assert_eq!(row.capital_part, row.installment - row.interest_part);
    }
}

#[test]
fn test_totals_by_construction() {
    for params in sample_loans() {
        let result = compute_amortization(&params);
        assert_eq!(
            result.total_cost,
            result.monthly_payment * Decimal::from(params.term_months)
        );
        assert_eq!(result.total_interest, result.total_cost - params.principal);
    }
}

#[test]
fn test_zero_rate_is_straight_line() {
    let result = compute_amortization(&LoanParameters::new(dec!(1000), dec!(0), 7));
    assert_eq!(result.monthly_payment, dec!(1000) / dec!(7));
    assert!(result.schedule.iter().all(|r| r.interest_part.is_zero()));
}

#[test]
fn test_deterministic() {
    let params = LoanParameters::new(dec!(123456.78), dec!(6.66), 240);
    let first = compute_amortization(&params);
    let second = compute_amortization(&params);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_payment_matches_engine() {
    let params = LoanParameters::new(dec!(50000), dec!(8.5), 60);
    let direct = monthly_payment(params.principal, periodic_rate(params.annual_rate_percent), 60);
    assert_eq!(direct, compute_amortization(&params).monthly_payment);
}
