//! Tax computation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Tax due on `amount` at `rate`, rounded half away from zero to 2 decimal places.
pub fn calculate_tax(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
