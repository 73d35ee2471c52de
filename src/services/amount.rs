use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::models::CartItem;

/// Minor units per major unit (kobo per naira).
pub const MINOR_UNIT_FACTOR: i64 = 100;

/// Total charge for a cart in minor currency units.
///
/// The sum is exact; only the final scaled value is rounded to a whole minor
/// unit. Arithmetic saturates rather than overflowing.
pub fn calculate_order_amount(items: &[CartItem]) -> i64 {
    let total = items.iter().fold(Decimal::ZERO, |acc, item| {
        acc.saturating_add(item.price().saturating_mul(Decimal::from(item.quantity())))
    });

    total
        .saturating_mul(Decimal::from(MINOR_UNIT_FACTOR))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(i64::MAX)
}
