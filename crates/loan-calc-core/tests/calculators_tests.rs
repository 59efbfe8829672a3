use loan_calc_core::amortization::{compute_amortization, LoanParameters};
use loan_calc_core::calculators::{cash_loan, consolidation, leasing, mortgage};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Variants delegate to the shared engine
// ===========================================================================

#[test]
fn test_cash_loan_matches_engine() {
    let input = cash_loan::CashLoanInput {
        amount: dec!(50000),
        months: 60,
        annual_rate_percent: dec!(8.5),
    };
    let out = cash_loan::calculate_cash_loan(&input);
    let engine = compute_amortization(&LoanParameters::new(dec!(50000), dec!(8.5), 60));
    assert_eq!(out.result.monthly_payment, engine.monthly_payment);
    assert_eq!(out.result.total_cost, engine.total_cost);
}

#[test]
fn test_mortgage_schedule_is_engine_schedule() {
    let input = mortgage::MortgageInput {
        property_value: dec!(400000),
        own_contribution: dec!(80000),
        years: 25,
        annual_rate_percent: dec!(7.5),
    };
    let out = mortgage::calculate_mortgage(&input);
    let engine = compute_amortization(&mortgage::mortgage_parameters(&input));
    assert_eq!(out.result.amortization, engine);
}

#[test]
fn test_consolidation_matches_engine_on_total_debt() {
    let input: consolidation::ConsolidationInput = serde_json::from_value(serde_json::json!({
        "loans": [
            {"name": "Card", "amount": "12000", "annual_rate_percent": "19", "installment": "600"},
            {"name": "Car", "amount": "38000", "annual_rate_percent": "11", "installment": "900"}
        ],
        "months": 84
    }))
    .unwrap();
    let out = consolidation::calculate_consolidation(&input);
    let engine = compute_amortization(&LoanParameters::new(dec!(50000), dec!(7.5), 84));
    assert_eq!(out.result.new_installment, engine.monthly_payment);
    assert_eq!(out.result.savings, dec!(1500) - engine.monthly_payment);
}

#[test]
fn test_leasing_installment_is_zero_rate_engine() {
    let input = leasing::LeasingInput {
        price: dec!(150000),
        price_is_net: true,
        initial_fee_percent: dec!(20),
        redemption_percent: dec!(5),
        period_months: 48,
        income_tax_rate_percent: dec!(19),
        vat_payer: true,
    };
    let out = leasing::calculate_leasing(&input);
    let engine = compute_amortization(&LoanParameters::new(
        out.result.financed_amount,
        Decimal::ZERO,
        48,
    ));
    assert_eq!(out.result.monthly_installment, engine.monthly_payment);
}

// ===========================================================================
// Envelope
// ===========================================================================

#[test]
fn test_envelope_carries_assumptions() {
    let input = cash_loan::CashLoanInput {
        amount: dec!(10000),
        months: 12,
        annual_rate_percent: dec!(10),
    };
    let out = cash_loan::calculate_cash_loan(&input);
    assert_eq!(out.assumptions["months"], serde_json::json!(12));
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(!out.methodology.is_empty());
}
