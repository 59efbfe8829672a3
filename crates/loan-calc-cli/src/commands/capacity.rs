use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::calculators::capacity::{self, CapacityInput, ReferenceLoan};

use crate::input;

/// Arguments for a borrowing capacity estimate
#[derive(Args)]
pub struct CapacityArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly net income
    #[arg(long, alias = "income")]
    pub net_income: Option<Decimal>,

    /// People in the household
    #[arg(long, alias = "household", default_value_t = 1)]
    pub household_size: u32,

    /// Credit card and overdraft limits
    #[arg(long, alias = "limits", default_value = "0")]
    pub card_limits: Decimal,

    /// Instalments already being paid each month
    #[arg(long, alias = "installments", default_value = "0")]
    pub existing_installments: Decimal,

    /// Price capacity as a loan at this annual rate (percent)
    #[arg(long, requires = "reference_months")]
    pub reference_rate: Option<Decimal>,

    /// Term of the reference loan in months
    #[arg(long, requires = "reference_rate")]
    pub reference_months: Option<u32>,
}

pub fn run_capacity(args: CapacityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let capacity_input: CapacityInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => CapacityInput {
            net_income: args
                .net_income
                .ok_or("--net-income is required (or provide --input)")?,
            household_size: args.household_size,
            card_limits: args.card_limits,
            existing_installments: args.existing_installments,
            reference_loan: match (args.reference_rate, args.reference_months) {
                (Some(rate), Some(months)) => Some(ReferenceLoan {
                    annual_rate_percent: rate,
                    term_months: months,
                }),
                _ => None,
            },
        },
    };
    Ok(serde_json::to_value(capacity::calculate_capacity(&capacity_input))?)
}
