//! # Position Ledger
//!
//! Per-(pool, account) stake and reward-debt records.
//!
//! ## Lifecycle
//!
//! | State | Meaning |
//! |-------|---------|
//! | absent | no record (reads as a zero position) |
//! | staked | `amount > 0`, debt tracks what has already been credited |
//!
//! A full withdrawal or an emergency exit takes a position back to absent.

use crate::math;
use indexmap::IndexMap;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sharefarm_core::{AccountId, PoolId, Result};

/// One account's stake in one pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Staked amount
    pub amount: u128,

    /// `amount × acc_reward_per_share / SCALE` at the last interaction
    ///
    /// Kept at the accumulator's width: after a tiny first stake this product
    /// can exceed `u128` even though every pending reward fits.
    pub reward_debt: U256,
}

impl Position {
    /// A zero position is indistinguishable from an absent one
    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.reward_debt.is_zero()
    }

    /// Reward earned since the last interaction at `acc_reward_per_share`
    ///
    /// A negative result means the ledger is inconsistent, so it is reported
    /// as an arithmetic failure rather than clamped.
    pub fn pending(&self, acc_reward_per_share: U256) -> Result<u128> {
        let accumulated = math::scaled_share(self.amount, acc_reward_per_share, "accumulated reward")?;
        let pending = math::sub_wide(accumulated, self.reward_debt, "pending reward")?;
        math::narrow(pending, "pending reward")
    }

    /// Re-snapshot the debt against `acc_reward_per_share`
    pub fn settle(&mut self, acc_reward_per_share: U256) -> Result<()> {
        self.reward_debt = math::scaled_share(self.amount, acc_reward_per_share, "reward debt")?;
        Ok(())
    }
}

/// Stored position with its key, used for snapshots and record stores
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub pool: PoolId,
    pub account: AccountId,
    pub position: Position,
}

/// All positions, keyed by (pool, account)
#[derive(Clone, Debug, Default)]
pub struct PositionLedger {
    positions: IndexMap<(PoolId, AccountId), Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position, zero when absent
    pub fn get(&self, pool: PoolId, account: &AccountId) -> Position {
        self.positions
            .get(&(pool, *account))
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, pool: PoolId, account: &AccountId) -> bool {
        self.positions.contains_key(&(pool, *account))
    }

    /// Store a position; empty positions are removed
    pub fn store(&mut self, pool: PoolId, account: AccountId, position: Position) {
        if position.is_empty() {
            self.positions.shift_remove(&(pool, account));
        } else {
            self.positions.insert((pool, account), position);
        }
    }

    /// Drop a position, returning what it held
    pub fn remove(&mut self, pool: PoolId, account: &AccountId) -> Position {
        self.positions
            .shift_remove(&(pool, *account))
            .unwrap_or_default()
    }

    /// Index and value of a stored position
    pub fn slot(&self, pool: PoolId, account: &AccountId) -> Option<(usize, Position)> {
        self.positions
            .get_full(&(pool, *account))
            .map(|(index, _, position)| (index, *position))
    }

    /// Put a position back exactly as [`PositionLedger::slot`] saw it
    pub fn reinstate(&mut self, pool: PoolId, account: AccountId, slot: Option<(usize, Position)>) {
        self.positions.shift_remove(&(pool, account));
        if let Some((index, position)) = slot {
            let index = index.min(self.positions.len());
            self.positions.shift_insert(index, (pool, account), position);
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions of one pool
    pub fn in_pool(&self, pool: PoolId) -> impl Iterator<Item = (&AccountId, &Position)> {
        self.positions
            .iter()
            .filter(move |((p, _), _)| *p == pool)
            .map(|((_, account), position)| (account, position))
    }

    /// Sum of staked amounts in a pool, used to audit the incremental total
    pub fn staked_in_pool(&self, pool: PoolId) -> Result<u128> {
        self.in_pool(pool)
            .try_fold(0u128, |acc, (_, p)| math::add(acc, p.amount, "pool stake audit"))
    }

    pub fn records(&self) -> Vec<PositionRecord> {
        self.positions
            .iter()
            .map(|(&(pool, account), &position)| PositionRecord {
                pool,
                account,
                position,
            })
            .collect()
    }

    pub fn from_records(records: impl IntoIterator<Item = PositionRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger.store(record.pool, record.account, record.position);
        }
        ledger
    }
}
