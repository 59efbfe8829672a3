use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use loan_calc_core::amortization;
use loan_calc_core::calculators::{capacity, car_loan, cash_loan, consolidation, leasing, mortgage};
use loan_calc_core::leads;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse JSON input, run an infallible calculation, serialise the output.
fn call<I, O>(input_json: &str, f: impl FnOnce(&I) -> O) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    serde_json::to_string(&f(&input)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_amortization(input_json: String) -> NapiResult<String> {
    call(&input_json, amortization::compute_amortization)
}

#[napi]
pub fn calculate_amortization(input_json: String) -> NapiResult<String> {
    call(&input_json, amortization::calculate_amortization)
}

#[napi]
pub fn principal_for_payment(
    payment: String,
    annual_rate_percent: String,
    term_months: u32,
) -> NapiResult<String> {
    let payment: rust_decimal::Decimal = payment.parse().map_err(to_napi_error)?;
    let rate: rust_decimal::Decimal = annual_rate_percent.parse().map_err(to_napi_error)?;
    Ok(amortization::principal_for_payment(payment, rate, term_months).to_string())
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_mortgage(input_json: String) -> NapiResult<String> {
    call(&input_json, mortgage::calculate_mortgage)
}

#[napi]
pub fn calculate_cash_loan(input_json: String) -> NapiResult<String> {
    call(&input_json, cash_loan::calculate_cash_loan)
}

#[napi]
pub fn calculate_car_loan(input_json: String) -> NapiResult<String> {
    call(&input_json, car_loan::calculate_car_loan)
}

#[napi]
pub fn calculate_consolidation(input_json: String) -> NapiResult<String> {
    call(&input_json, consolidation::calculate_consolidation)
}

#[napi]
pub fn calculate_leasing(input_json: String) -> NapiResult<String> {
    call(&input_json, leasing::calculate_leasing)
}

#[napi]
pub fn calculate_capacity(input_json: String) -> NapiResult<String> {
    call(&input_json, capacity::calculate_capacity)
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// Returns `null` for a valid lead, otherwise the rejected fields.
#[napi]
pub fn validate_lead(input_json: String) -> NapiResult<String> {
    let form: leads::LeadForm = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rejected: Vec<serde_json::Value> = match leads::validate_lead(&form) {
        Ok(()) => return Ok("null".to_string()),
        Err(loan_calc_core::LoanCalcError::LeadValidation(fields)) => fields
            .into_iter()
            .map(|f| serde_json::json!({ "field": f.field, "reason": f.reason }))
            .collect(),
        Err(e) => return Err(to_napi_error(e)),
    };
    serde_json::to_string(&rejected).map_err(to_napi_error)
}
