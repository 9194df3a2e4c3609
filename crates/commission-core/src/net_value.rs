use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::plan::FeeRule;
use crate::types::Money;

const HUNDRED: Decimal = dec!(100);

/// Net commission base for a sale: gross price less consultant discount and
/// the plan fee, applied to the discounted price.
///
/// The result may be negative; business sanity checks belong to the caller.
pub fn net_value(gross_price: Money, discount: Money, fee_rule: &FeeRule) -> Money {
    let base = gross_price - discount;
    match fee_rule {
        FeeRule::Fixed(value) => base - value,
        FeeRule::Percentage(value) => base - base * (value / HUNDRED),
    }
}
