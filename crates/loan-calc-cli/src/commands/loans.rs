use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::amortization::{calculate_amortization, LoanParameters};
use loan_calc_core::calculators::car_loan::{self, CarLoanInput, DEFAULT_CAR_RATE_PERCENT};
use loan_calc_core::calculators::cash_loan::{self, CashLoanInput};
use loan_calc_core::calculators::mortgage::{self, MortgageInput};

use crate::input;

type CmdResult = Result<Value, Box<dyn std::error::Error>>;

/// Arguments for a plain amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount financed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,

    /// Number of monthly payments
    #[arg(long, alias = "months")]
    pub term_months: Option<u32>,

    /// Print only the month-by-month rows
    #[arg(long)]
    pub schedule_only: bool,
}

/// Arguments for a mortgage quote
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property value
    #[arg(long, alias = "value")]
    pub property_value: Option<Decimal>,

    /// Own contribution (down payment)
    #[arg(long, default_value = "0")]
    pub own_contribution: Decimal,

    /// Loan term in years
    #[arg(long, default_value_t = 25)]
    pub years: u32,

    /// Nominal annual rate in percent
    #[arg(long, alias = "rate", default_value = "7.5")]
    pub annual_rate_percent: Decimal,

    /// Print only the month-by-month rows
    #[arg(long)]
    pub schedule_only: bool,
}

/// Arguments for a cash loan quote
#[derive(Args)]
pub struct CashLoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Term in months
    #[arg(long, default_value_t = 60)]
    pub months: u32,

    /// Nominal annual rate in percent
    #[arg(long, alias = "rate", default_value = "8.5")]
    pub annual_rate_percent: Decimal,
}

/// Arguments for a car loan quote
#[derive(Args)]
pub struct CarLoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Vehicle price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Own contribution
    #[arg(long, default_value = "0")]
    pub own_contribution: Decimal,

    /// Term in months
    #[arg(long, default_value_t = 60)]
    pub months: u32,

    /// Model year of the vehicle
    #[arg(long, alias = "year")]
    pub production_year: Option<i32>,

    /// Nominal annual rate in percent (dealer rate when omitted)
    #[arg(long, alias = "rate")]
    pub annual_rate_percent: Option<Decimal>,
}

pub fn run_amortize(args: AmortizeArgs) -> CmdResult {
    let params: LoanParameters = match input::load(args.input.as_deref())? {
        Some(params) => params,
        None => LoanParameters::new(
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.annual_rate_percent
                .ok_or("--annual-rate-percent is required (or provide --input)")?,
            args.term_months
                .ok_or("--term-months is required (or provide --input)")?,
        ),
    };

    let output = calculate_amortization(&params);
    if args.schedule_only {
        return Ok(serde_json::to_value(&output.result.schedule)?);
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_mortgage(args: MortgageArgs) -> CmdResult {
    let mortgage_input: MortgageInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => MortgageInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            own_contribution: args.own_contribution,
            years: args.years,
            annual_rate_percent: args.annual_rate_percent,
        },
    };

    let output = mortgage::calculate_mortgage(&mortgage_input);
    if args.schedule_only {
        return Ok(serde_json::to_value(&output.result.amortization.schedule)?);
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_cash_loan(args: CashLoanArgs) -> CmdResult {
    let loan_input: CashLoanInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => CashLoanInput {
            amount: args.amount.ok_or("--amount is required (or provide --input)")?,
            months: args.months,
            annual_rate_percent: args.annual_rate_percent,
        },
    };
    Ok(serde_json::to_value(cash_loan::calculate_cash_loan(&loan_input))?)
}

pub fn run_car_loan(args: CarLoanArgs) -> CmdResult {
    let loan_input: CarLoanInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => CarLoanInput {
            price: args.price.ok_or("--price is required (or provide --input)")?,
            own_contribution: args.own_contribution,
            months: args.months,
            production_year: args.production_year,
            annual_rate_percent: args
                .annual_rate_percent
                .unwrap_or(DEFAULT_CAR_RATE_PERCENT),
        },
    };
    Ok(serde_json::to_value(car_loan::calculate_car_loan(&loan_input))?)
}
