use crate::error::PoolError;

/// Fixed-point scale for fractions: `MANTISSA` is 100%.
pub const MANTISSA: i128 = 1_000_000_000;

/// `amount × mantissa / MANTISSA`, rounded down.
pub fn mul_mantissa(amount: i128, mantissa: i128) -> Result<i128, PoolError> {
    amount
        .checked_mul(mantissa)
        .map(|scaled| scaled / MANTISSA)
        .ok_or(PoolError::MathOverflow)
}

/// `value × numerator / denominator`, rounded up. Zero denominator yields zero.
pub fn mul_div_ceil(value: i128, numerator: i128, denominator: i128) -> Result<i128, PoolError> {
    if denominator == 0 {
        return Ok(0);
    }
    let product = value
        .checked_mul(numerator)
        .ok_or(PoolError::MathOverflow)?;
    let quotient = product / denominator;
    if product % denominator == 0 {
        Ok(quotient)
    } else {
        Ok(quotient + 1)
    }
}

pub fn require_mantissa(mantissa: i128) -> Result<(), PoolError> {
    if (0..=MANTISSA).contains(&mantissa) {
        Ok(())
    } else {
        Err(PoolError::InvalidMantissa)
    }
}
