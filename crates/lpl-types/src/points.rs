//! Point accrual arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::TypeError;

/// Decimal places carried by `pointToBeAccrued`.
pub const POINT_SCALE: u32 = 2;

/// Points earned for `amount` (in the transaction currency) converted to USD
/// at `currency_to_usd_rate`, priced at `cpp` currency units per point.
///
/// The result is rounded half away from zero and always carries exactly
/// `scale` decimal places, so 50 points render as `50.00`.
pub fn accrue_points(
    amount: Decimal,
    currency_to_usd_rate: Decimal,
    cpp: Decimal,
    scale: u32,
) -> Result<Decimal, TypeError> {
    if cpp <= Decimal::ZERO {
        return Err(TypeError::NonPositiveRate(cpp.to_string()));
    }
    let usd = amount
        .checked_mul(currency_to_usd_rate)
        .ok_or(TypeError::Overflow)?;
    let raw = usd.checked_div(cpp).ok_or(TypeError::Overflow)?;
    let mut points = raw.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    points.rescale(scale);
    Ok(points)
}
