//! Checked fixed-point helpers
//!
//! Every division rounds toward zero. The truncated remainder is dropped on
//! purpose and never carried into a later computation. Overflow and underflow
//! surface as [`ShareError::ArithmeticOverflow`] naming the failed step.
//!
//! Reward-per-share products are taken in 256 bits. A tiny stake can push the
//! accumulator far past `u128::MAX / amount`. Only the final reward amounts
//! are narrowed back to `u128`.

use crate::constants::SCALE;
use primitive_types::U256;
use sharefarm_core::{Result, ShareError};

pub fn add(a: u128, b: u128, what: &'static str) -> Result<u128> {
    a.checked_add(b).ok_or(ShareError::ArithmeticOverflow(what))
}

pub fn sub(a: u128, b: u128, what: &'static str) -> Result<u128> {
    a.checked_sub(b).ok_or(ShareError::ArithmeticOverflow(what))
}

pub fn mul(a: u128, b: u128, what: &'static str) -> Result<u128> {
    a.checked_mul(b).ok_or(ShareError::ArithmeticOverflow(what))
}

/// `a * b / denominator`, truncating
pub fn mul_div(a: u128, b: u128, denominator: u128, what: &'static str) -> Result<u128> {
    mul(a, b, what)?
        .checked_div(denominator)
        .ok_or(ShareError::ArithmeticOverflow(what))
}

/// `a * b / denominator` in 256 bits, truncating
pub fn mul_div_wide(a: U256, b: U256, denominator: U256, what: &'static str) -> Result<U256> {
    a.checked_mul(b)
        .and_then(|product| product.checked_div(denominator))
        .ok_or(ShareError::ArithmeticOverflow(what))
}

pub fn add_wide(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or(ShareError::ArithmeticOverflow(what))
}

pub fn sub_wide(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_sub(b).ok_or(ShareError::ArithmeticOverflow(what))
}

/// `amount × acc_reward_per_share / SCALE`
pub fn scaled_share(amount: u128, acc_reward_per_share: U256, what: &'static str) -> Result<U256> {
    mul_div_wide(U256::from(amount), acc_reward_per_share, U256::from(SCALE), what)
}

/// Narrow a 256-bit reward amount back to `u128`
pub fn narrow(value: U256, what: &'static str) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(ShareError::ArithmeticOverflow(what));
    }
    Ok(value.low_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_truncates() {
        assert_eq!(mul_div(10, 1, 3, "t").unwrap(), 3);
        assert_eq!(mul_div(9_000, 1_000_000_000_000, 70, "t").unwrap(), 128_571_428_571_428);
    }

    #[test]
    fn test_fails_closed() {
        assert_eq!(
            mul(u128::MAX, 2, "scaled reward"),
            Err(ShareError::ArithmeticOverflow("scaled reward"))
        );
        assert!(sub(1, 2, "pending").is_err());
        assert!(add(u128::MAX, 1, "total").is_err());
        assert!(mul_div(1, 1, 0, "share").is_err());
    }

    #[test]
    fn test_scaled_share_exceeds_u128_intermediate() {
        // 1e18 × 5.4e32 does not fit in u128, the result after SCALE does not either
        let acc = U256::from(540_000_000_000_000_000_000_000_000_000_000u128);
        let debt = scaled_share(1_000_000_000_000_000_000, acc, "debt").unwrap();
        assert!(debt > U256::from(u128::MAX));
        assert_eq!(narrow(debt, "debt"), Err(ShareError::ArithmeticOverflow("debt")));

        // The difference of two such products is an ordinary amount again
        let later = add_wide(acc, U256::from(7 * SCALE), "acc").unwrap();
        let grown = scaled_share(1_000_000_000_000_000_000, later, "debt").unwrap();
        let earned = sub_wide(grown, debt, "pending").unwrap();
        assert_eq!(narrow(earned, "pending").unwrap(), 7_000_000_000_000_000_000);
    }

    #[test]
    fn test_wide_helpers_fail_closed() {
        assert!(mul_div_wide(U256::MAX, U256::from(2), U256::one(), "t").is_err());
        assert!(mul_div_wide(U256::one(), U256::one(), U256::zero(), "t").is_err());
        assert!(sub_wide(U256::zero(), U256::one(), "t").is_err());
        assert!(add_wide(U256::MAX, U256::one(), "t").is_err());
        assert_eq!(narrow(U256::from(u128::MAX), "t").unwrap(), u128::MAX);
    }
}
