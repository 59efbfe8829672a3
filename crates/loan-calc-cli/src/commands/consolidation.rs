use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::calculators::consolidation::{self, ConsolidationInput, ExistingLoan};

use crate::input;

/// Arguments for a debt consolidation comparison
#[derive(Args)]
pub struct ConsolidationArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Existing loan as AMOUNT:RATE:INSTALMENT, repeatable
    #[arg(long = "loan", value_parser = parse_loan)]
    pub loans: Vec<ExistingLoan>,

    /// Term of the consolidation loan in months
    #[arg(long, default_value_t = 84)]
    pub months: u32,

    /// Annual rate of the consolidation loan in percent
    #[arg(long, alias = "rate", default_value = "7.5")]
    pub annual_rate_percent: Decimal,
}

fn parse_loan(raw: &str) -> Result<ExistingLoan, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [amount, rate, installment] = parts.as_slice() else {
        return Err(format!("expected AMOUNT:RATE:INSTALMENT, got '{raw}'"));
    };
    let number = |s: &str, what: &str| {
        s.trim()
            .parse::<Decimal>()
            .map_err(|e| format!("{what} '{s}': {e}"))
    };
    Ok(ExistingLoan {
        name: String::new(),
        amount: number(*amount, "amount")?,
        annual_rate_percent: number(*rate, "rate")?,
        installment: number(*installment, "instalment")?,
    })
}

pub fn run_consolidation(args: ConsolidationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let consolidation_input: ConsolidationInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => {
            if args.loans.is_empty() {
                return Err("at least one --loan is required (or provide --input)".into());
            }
            let loans = args
                .loans
                .into_iter()
                .enumerate()
                .map(|(i, loan)| ExistingLoan {
                    name: format!("Loan {}", i + 1),
                    ..loan
                })
                .collect();
            ConsolidationInput {
                loans,
                months: args.months,
                annual_rate_percent: args.annual_rate_percent,
            }
        }
    };
    Ok(serde_json::to_value(
        consolidation::calculate_consolidation(&consolidation_input),
    )?)
}
