use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{compute_amortization, LoanParameters};
use crate::types::*;

/// Standard Polish VAT multiplier.
pub const VAT_MULTIPLIER: Decimal = dec!(1.23);
const VAT_RATE: Decimal = dec!(0.23);

const BASE_FACTOR: Decimal = dec!(1.05);
const FACTOR_PER_YEAR: Decimal = dec!(0.025);
const LARGE_TICKET_THRESHOLD: Money = dec!(200000);
const LARGE_TICKET_DISCOUNT: Decimal = dec!(0.01);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeasingInput {
    pub price: Money,
    /// Whether `price` is quoted net of VAT.
    pub price_is_net: bool,
    pub initial_fee_percent: Percent,
    /// Buy-out value at the end of the contract.
    pub redemption_percent: Percent,
    pub period_months: u32,
    /// Income tax rate used for the tax shield (19 = flat tax).
    pub income_tax_rate_percent: Percent,
    pub vat_payer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeasingOutput {
    pub base_net_price: Money,
    pub leasing_factor: Decimal,
    /// Total of all payments as a percentage of the net price.
    pub total_sum_percent: Percent,
    pub total_leasing_cost_net: Money,
    pub initial_fee_amount: Money,
    pub redemption_amount: Money,
    pub financed_amount: Money,
    pub monthly_installment: Money,
    pub income_tax_shield: Money,
    pub vat_shield: Money,
    pub total_tax_benefit: Money,
    pub gross_total_outflow: Money,
    pub real_cost: Money,
}

// ---------------------------------------------------------------------------
// VAT helpers
// ---------------------------------------------------------------------------

/// Gross price to net, rounded to whole currency units.
pub fn gross_to_net(gross: Money) -> Money {
    (gross / VAT_MULTIPLIER).round()
}

/// Net price to gross, rounded to whole currency units.
pub fn net_to_gross(net: Money) -> Money {
    (net * VAT_MULTIPLIER).round()
}

/// Total-cost multiplier for a contract of `period_months` on `net_price`.
pub fn leasing_factor(net_price: Money, period_months: u32) -> Decimal {
    let years = Decimal::from(period_months) / dec!(12);
    let mut factor = BASE_FACTOR + years * FACTOR_PER_YEAR;
    if net_price > LARGE_TICKET_THRESHOLD {
        factor -= LARGE_TICKET_DISCOUNT;
    }
    factor
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Operating lease quote with the tax shield available to a business lessee.
///
/// The financed amount is repaid in equal instalments with the leasing margin
/// already folded into the factor, so it runs through the engine at 0%.
pub fn calculate_leasing(input: &LeasingInput) -> ComputationOutput<LeasingOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base_net_price = if input.price_is_net {
        input.price
    } else {
        input.price / VAT_MULTIPLIER
    }
    .max(Decimal::ZERO);

    let factor = leasing_factor(base_net_price, input.period_months);
    let total_leasing_cost_net = base_net_price * factor;
    let initial_fee_amount = base_net_price * input.initial_fee_percent / Decimal::ONE_HUNDRED;
    let redemption_amount = base_net_price * input.redemption_percent / Decimal::ONE_HUNDRED;
    let financed_amount = total_leasing_cost_net - initial_fee_amount - redemption_amount;

    if financed_amount <= Decimal::ZERO && base_net_price > Decimal::ZERO {
        warnings.push("Initial fee and redemption cover the whole contract value".into());
    }
    if input.period_months == 0 {
        warnings.push("Contract period is zero months".into());
    }

    let schedule = compute_amortization(&LoanParameters::new(
        financed_amount,
        Decimal::ZERO,
        input.period_months,
    ));

    let income_tax_shield = total_leasing_cost_net * input.income_tax_rate_percent / Decimal::ONE_HUNDRED;
    let vat_shield = if input.vat_payer {
        total_leasing_cost_net * VAT_RATE
    } else {
        Decimal::ZERO
    };
    let total_tax_benefit = income_tax_shield + vat_shield;
    let gross_total_outflow = total_leasing_cost_net * VAT_MULTIPLIER;

    let output = LeasingOutput {
        base_net_price,
        leasing_factor: factor,
        total_sum_percent: factor * Decimal::ONE_HUNDRED,
        total_leasing_cost_net,
        initial_fee_amount,
        redemption_amount,
        financed_amount: financed_amount.max(Decimal::ZERO),
        monthly_installment: schedule.monthly_payment,
        income_tax_shield,
        vat_shield,
        total_tax_benefit,
        gross_total_outflow,
        real_cost: gross_total_outflow - total_tax_benefit,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Leasing: net price * (1.05 + 2.5% per year), less fee and buy-out, in equal instalments",
        input,
        warnings,
        elapsed,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_input() -> LeasingInput {
        LeasingInput {
            price: dec!(100000),
            price_is_net: true,
            initial_fee_percent: dec!(10),
            redemption_percent: dec!(1),
            period_months: 36,
            income_tax_rate_percent: dec!(19),
            vat_payer: true,
        }
    }

    #[test]
    fn test_default_lease() {
        let out = calculate_leasing(&default_input());
        let r = &out.result;
        assert_eq!(r.leasing_factor, dec!(1.125));
        assert_eq!(r.total_sum_percent, dec!(112.5));
        assert_eq!(r.total_leasing_cost_net, dec!(112500));
        assert_eq!(r.financed_amount, dec!(101500));
        assert!((r.monthly_installment - dec!(2819.44)).abs() < dec!(0.01));
        assert_eq!(r.income_tax_shield, dec!(21375));
        assert_eq!(r.vat_shield, dec!(25875));
        assert_eq!(r.gross_total_outflow, dec!(138375));
        assert_eq!(r.real_cost, dec!(91125));
    }

    #[test]
    fn test_large_ticket_discount() {
        assert_eq!(leasing_factor(dec!(250000), 24), dec!(1.09));
        assert_eq!(leasing_factor(dec!(200000), 24), dec!(1.1));
    }

    #[test]
    fn test_gross_price_is_netted() {
        let mut input = default_input();
        input.price = dec!(123000);
        input.price_is_net = false;
        let out = calculate_leasing(&input);
        assert_eq!(out.result.base_net_price, dec!(100000));
    }

    #[test]
    fn test_non_vat_payer_has_no_vat_shield() {
        let mut input = default_input();
        input.vat_payer = false;
        let out = calculate_leasing(&input);
        assert_eq!(out.result.vat_shield, Decimal::ZERO);
        assert_eq!(out.result.total_tax_benefit, dec!(21375));
    }

    #[test]
    fn test_zero_period_yields_zero_installment() {
        let mut input = default_input();
        input.period_months = 0;
        let out = calculate_leasing(&input);
        assert_eq!(out.result.monthly_installment, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_vat_conversion_rounds() {
        assert_eq!(net_to_gross(dec!(100000)), dec!(123000));
        assert_eq!(gross_to_net(dec!(100000)), dec!(81301));
    }
}
