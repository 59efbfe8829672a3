use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_calc_core::calculators::leasing::{self, LeasingInput};

use crate::input;

/// Arguments for an operating lease quote
#[derive(Args)]
pub struct LeasingArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Asset price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Price is quoted gross (VAT included)
    #[arg(long)]
    pub gross: bool,

    /// Initial fee as a percentage of the net price
    #[arg(long, alias = "initial-fee", default_value = "10")]
    pub initial_fee_percent: Decimal,

    /// Buy-out value as a percentage of the net price
    #[arg(long, alias = "redemption", default_value = "1")]
    pub redemption_percent: Decimal,

    /// Contract length in months
    #[arg(long, alias = "months", default_value_t = 36)]
    pub period_months: u32,

    /// Income tax rate in percent
    #[arg(long, alias = "tax-rate", default_value = "19")]
    pub income_tax_rate_percent: Decimal,

    /// Lessee cannot reclaim VAT
    #[arg(long)]
    pub no_vat: bool,
}

pub fn run_leasing(args: LeasingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let lease_input: LeasingInput = match input::load(args.input.as_deref())? {
        Some(value) => value,
        None => LeasingInput {
            price: args.price.ok_or("--price is required (or provide --input)")?,
            price_is_net: !args.gross,
            initial_fee_percent: args.initial_fee_percent,
            redemption_percent: args.redemption_percent,
            period_months: args.period_months,
            income_tax_rate_percent: args.income_tax_rate_percent,
            vat_payer: !args.no_vat,
        },
    };
    Ok(serde_json::to_value(leasing::calculate_leasing(&lease_input))?)
}
