//! # Reward Accrual
//!
//! Brings a pool's `acc_reward_per_share` up to a block.
//!
//! ```text
//! emission      = Σ reward_per_block(b)  for b in (last_reward_block, now]
//! pool_reward   = emission × weight / total_weight
//! dev_reward    = pool_reward / DEV_SHARE_DIVISOR
//! staker_reward = pool_reward - dev_reward
//! acc_reward_per_share += staker_reward × SCALE / total_staked
//! ```
//!
//! Every division truncates. Blocks during which a pool is empty, unweighted,
//! or when no pool has weight, are skipped: their emission is never minted.

use crate::constants::*;
use crate::emission::EmissionSchedule;
use crate::math;
use crate::pool::PoolInfo;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sharefarm_core::{BlockNumber, Result};

/// Outcome of one accrual step that emitted reward
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accrual {
    /// Exclusive lower bound of the accrued range
    pub from_block: BlockNumber,
    /// Inclusive upper bound of the accrued range
    pub to_block: BlockNumber,
    /// Pool's weighted share of the emission
    pub pool_reward: u128,
    /// Portion minted to the beneficiary
    pub dev_reward: u128,
    /// Portion credited to depositors through the per-share accumulator
    pub staker_reward: u128,
    /// Increase of `acc_reward_per_share`
    pub acc_delta: U256,
}

/// Split a pool's reward into `(dev_reward, staker_reward)`
///
/// The beneficiary's tenth is carved out of the pool reward, not minted on
/// top of it: depositors receive `pool_reward - pool_reward / 10` and the two
/// parts always sum to `pool_reward`. Total minting therefore never exceeds
/// the scheduled emission. The truncated remainder of the tenth goes to the
/// depositors.
pub fn split_pool_reward(pool_reward: u128) -> (u128, u128) {
    let dev = pool_reward / DEV_SHARE_DIVISOR;
    (dev, pool_reward - dev)
}

/// Advance `pool` to `now`
///
/// Idempotent for a given block: a second call at the same `now` is a no-op.
/// On error the pool is left untouched.
pub fn accrue(
    pool: &mut PoolInfo,
    schedule: &EmissionSchedule,
    total_allocation_weight: u64,
    now: BlockNumber,
) -> Result<Option<Accrual>> {
    if now <= pool.last_reward_block {
        return Ok(None);
    }

    if pool.total_staked == 0 || pool.allocation_weight == 0 || total_allocation_weight == 0 {
        pool.last_reward_block = now;
        return Ok(None);
    }

    let from_block = pool.last_reward_block;
    let emission = schedule.emission_between(from_block, now)?;
    let pool_reward = math::mul_div(
        emission,
        pool.allocation_weight as u128,
        total_allocation_weight as u128,
        "pool reward",
    )?;
    let (dev_reward, staker_reward) = split_pool_reward(pool_reward);
    let acc_delta = math::mul_div_wide(
        U256::from(staker_reward),
        U256::from(SCALE),
        U256::from(pool.total_staked),
        "reward per share",
    )?;
    let acc_reward_per_share = math::add_wide(pool.acc_reward_per_share, acc_delta, "reward per share")?;

    pool.acc_reward_per_share = acc_reward_per_share;
    pool.last_reward_block = now;

    Ok(Some(Accrual {
        from_block,
        to_block: now,
        pool_reward,
        dev_reward,
        staker_reward,
        acc_delta,
    }))
}

/// Accumulator value `pool` would have at `now`, without touching the pool
pub fn projected_acc_reward_per_share(
    pool: &PoolInfo,
    schedule: &EmissionSchedule,
    total_allocation_weight: u64,
    now: BlockNumber,
) -> Result<U256> {
    let mut preview = pool.clone();
    accrue(&mut preview, schedule, total_allocation_weight, now)?;
    Ok(preview.acc_reward_per_share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharefarm_core::AssetId;

    fn schedule() -> EmissionSchedule {
        EmissionSchedule::new(100, 200, 1000)
    }

    fn staked_pool(weight: u64, staked: u128, last: BlockNumber) -> PoolInfo {
        let mut pool = PoolInfo::new(AssetId::from_label("lp"), weight, last);
        pool.total_staked = staked;
        pool
    }

    #[test]
    fn test_single_pool_accrual() {
        let mut pool = staked_pool(100, 10, 210);
        let accrual = accrue(&mut pool, &schedule(), 100, 220).unwrap().unwrap();
        assert_eq!(accrual.pool_reward, 10_000);
        assert_eq!(accrual.dev_reward, 1_000);
        assert_eq!(accrual.staker_reward, 9_000);
        assert_eq!(pool.acc_reward_per_share, U256::from(900 * SCALE));
        assert_eq!(pool.last_reward_block, 220);
    }

    #[test]
    fn test_same_block_is_idempotent() {
        let mut once = staked_pool(1, 10, 210);
        accrue(&mut once, &schedule(), 1, 230).unwrap();

        let mut twice = staked_pool(1, 10, 210);
        accrue(&mut twice, &schedule(), 1, 230).unwrap();
        assert_eq!(accrue(&mut twice, &schedule(), 1, 230).unwrap(), None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_past_block_is_a_no_op() {
        let mut pool = staked_pool(1, 10, 300);
        assert_eq!(accrue(&mut pool, &schedule(), 1, 250).unwrap(), None);
        assert_eq!(pool.last_reward_block, 300);
        assert!(pool.acc_reward_per_share.is_zero());
    }

    #[test]
    fn test_empty_pool_skips_emission() {
        let mut pool = staked_pool(1, 0, 200);
        assert_eq!(accrue(&mut pool, &schedule(), 1, 260).unwrap(), None);
        assert_eq!(pool.last_reward_block, 260);
        assert!(pool.acc_reward_per_share.is_zero());
    }

    #[test]
    fn test_zero_weight_accrues_nothing() {
        let mut pool = staked_pool(0, 10, 200);
        assert_eq!(accrue(&mut pool, &schedule(), 30, 260).unwrap(), None);
        assert!(pool.acc_reward_per_share.is_zero());
        assert_eq!(pool.last_reward_block, 260);

        let mut orphan = staked_pool(5, 10, 200);
        assert_eq!(accrue(&mut orphan, &schedule(), 0, 260).unwrap(), None);
    }

    #[test]
    fn test_weight_share_truncates() {
        // One third of 10 blocks × 1000
        let mut pool = staked_pool(10, 3, 400);
        let accrual = accrue(&mut pool, &schedule(), 30, 410).unwrap().unwrap();
        assert_eq!(accrual.pool_reward, 3_333);
        assert_eq!(accrual.dev_reward, 333);
        assert_eq!(accrual.staker_reward, 3_000);
        assert_eq!(pool.acc_reward_per_share, U256::from(1_000 * SCALE));
    }

    #[test]
    fn test_overflow_leaves_pool_untouched() {
        let huge = EmissionSchedule::new(u128::MAX / 100, 0, 0);
        let mut pool = staked_pool(1, 1, 0);
        let before = pool.clone();
        assert!(accrue(&mut pool, &huge, 1, 1_000).is_err());
        assert_eq!(pool, before);
    }

    #[test]
    fn test_projection_does_not_mutate() {
        let pool = staked_pool(100, 10, 210);
        let acc = projected_acc_reward_per_share(&pool, &schedule(), 100, 220).unwrap();
        assert_eq!(acc, U256::from(900 * SCALE));
        assert!(pool.acc_reward_per_share.is_zero());
        assert_eq!(pool.last_reward_block, 210);
    }

    #[test]
    fn test_split_pool_reward() {
        assert_eq!(split_pool_reward(10_000), (1_000, 9_000));
        assert_eq!(split_pool_reward(9), (0, 9));
        assert_eq!(split_pool_reward(19), (1, 18));
        assert_eq!(split_pool_reward(0), (0, 0));
    }

    #[test]
    fn test_dev_share_is_carved_out_of_pool_reward() {
        let mut pool = staked_pool(1, 10, 210);
        let accrual = accrue(&mut pool, &schedule(), 3, 223).unwrap().unwrap();
        assert_eq!(accrual.pool_reward, 4_333);
        assert_eq!(accrual.dev_reward + accrual.staker_reward, accrual.pool_reward);
        assert_eq!(accrual.staker_reward, 4_333 - 433);
    }

    #[test]
    fn test_tiny_stake_accumulator_is_kept_wide() {
        // 1 unit alone for 10 bonus blocks at 6e18 × 10 per block
        let bonus = EmissionSchedule::new(6_000_000_000_000_000_000, 100, 182_000);
        let mut pool = staked_pool(1, 1, 100);
        let accrual = accrue(&mut pool, &bonus, 1, 110).unwrap().unwrap();
        assert_eq!(accrual.staker_reward, 540_000_000_000_000_000_000);
        assert_eq!(
            pool.acc_reward_per_share,
            U256::from(540_000_000_000_000_000_000u128) * U256::from(SCALE)
        );

        // A 1e18 stake's debt at this accumulator is past u128
        let debt = math::scaled_share(1_000_000_000_000_000_000, pool.acc_reward_per_share, "debt").unwrap();
        assert!(debt > U256::from(u128::MAX));
    }
}
