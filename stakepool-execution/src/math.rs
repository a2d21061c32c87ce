use crate::error::{PoolError, Result};

/// `floor(a * b / c)` with a 128-bit intermediate product.
pub fn wide_ratio(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(PoolError::InvalidInput("wide_ratio divisor is zero".into()));
    }
    let quotient = (a as u128 * b as u128) / c as u128;
    u64::try_from(quotient).map_err(|_| PoolError::ArithmeticOverflow("wide_ratio"))
}
