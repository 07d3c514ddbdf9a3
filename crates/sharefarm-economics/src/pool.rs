//! # Pool Registry
//!
//! Ordered, append-only list of staking pools. A pool's id is its insertion
//! index and pools are never removed.
//!
//! The registry keeps the total allocation weight incrementally; it is never
//! recomputed by summing the pools.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sharefarm_core::{AssetId, BlockNumber, PoolId, Result, ShareError};

/// Accounting state of one pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolInfo {
    /// Asset this pool accepts
    pub staked_asset: AssetId,

    /// Relative share of total emission
    pub allocation_weight: u64,

    /// Last block whose emission has been folded into `acc_reward_per_share`
    pub last_reward_block: BlockNumber,

    /// Reward per staked unit since inception, scaled by `SCALE`
    pub acc_reward_per_share: U256,

    /// Sum of every position's staked amount
    pub total_staked: u128,
}

impl PoolInfo {
    /// Create an empty pool that starts accruing after `last_reward_block`
    pub fn new(staked_asset: AssetId, allocation_weight: u64, last_reward_block: BlockNumber) -> Self {
        Self {
            staked_asset,
            allocation_weight,
            last_reward_block,
            acc_reward_per_share: U256::zero(),
            total_staked: 0,
        }
    }
}

/// Append-only pool registry
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: Vec<PoolInfo>,
    total_allocation_weight: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from stored pools, checking the weight total
    pub fn from_parts(pools: Vec<PoolInfo>, total_allocation_weight: u64) -> Result<Self> {
        let sum = pools
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.allocation_weight))
            .ok_or(ShareError::ArithmeticOverflow("total allocation weight"))?;
        if sum != total_allocation_weight {
            return Err(ShareError::Storage(format!(
                "allocation weight total {} does not match pools ({})",
                total_allocation_weight, sum
            )));
        }
        Ok(Self {
            pools,
            total_allocation_weight,
        })
    }

    /// Append a pool and return its id
    pub fn add(&mut self, pool: PoolInfo) -> Result<PoolId> {
        let id = u32::try_from(self.pools.len())
            .map_err(|_| ShareError::ArithmeticOverflow("pool id"))?;
        self.total_allocation_weight = self
            .total_allocation_weight
            .checked_add(pool.allocation_weight)
            .ok_or(ShareError::ArithmeticOverflow("total allocation weight"))?;
        self.pools.push(pool);
        Ok(PoolId(id))
    }

    /// Replace a pool's weight, returning the previous one
    pub fn set_allocation(&mut self, pid: PoolId, weight: u64) -> Result<u64> {
        let previous = self.get(pid)?.allocation_weight;
        let total = self
            .total_allocation_weight
            .checked_sub(previous)
            .and_then(|t| t.checked_add(weight))
            .ok_or(ShareError::ArithmeticOverflow("total allocation weight"))?;
        self.total_allocation_weight = total;
        self.get_mut(pid)?.allocation_weight = weight;
        Ok(previous)
    }

    pub fn get(&self, pid: PoolId) -> Result<&PoolInfo> {
        self.pools.get(pid.index()).ok_or(ShareError::PoolNotFound(pid))
    }

    pub fn get_mut(&mut self, pid: PoolId) -> Result<&mut PoolInfo> {
        self.pools
            .get_mut(pid.index())
            .ok_or(ShareError::PoolNotFound(pid))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn total_allocation_weight(&self) -> u64 {
        self.total_allocation_weight
    }

    /// Pool ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = PoolId> {
        (0..self.pools.len() as u32).map(PoolId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &PoolInfo)> {
        self.pools
            .iter()
            .enumerate()
            .map(|(i, p)| (PoolId(i as u32), p))
    }

    /// Whether some pool already accepts `asset`
    pub fn contains_asset(&self, asset: &AssetId) -> bool {
        self.pools.iter().any(|p| &p.staked_asset == asset)
    }

    pub fn pools(&self) -> &[PoolInfo] {
        &self.pools
    }
}
