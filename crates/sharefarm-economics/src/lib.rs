//! # Sharefarm Economics - Staking Pools & Reward Distribution
//!
//! Pooled staking engine that emits a reward token every block and splits it
//! between pools by allocation weight, then between stakers by share.
//!
//! ## Key Features
//!
//! - **Halving emission**: the base rate halves every epoch (one week of blocks)
//! - **Bonus window**: early blocks emit `BONUS_MULTIPLIER` times the base rate
//! - **Lazy accrual**: pools catch up on the next touch, O(1) per operation
//! - **Dev share**: a tenth of each pool emission goes to the beneficiary
//! - **All-or-nothing operations**: host effects revert with engine state
//!
//! ## Reward Accounting
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PER-POOL ACCRUAL                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  pool_reward  = emission(last, now] × weight / total_weight             │
//! │  dev_reward   = pool_reward / 10                                        │
//! │  acc_per_share += (pool_reward - dev_reward) × 10^12 / total_staked     │
//! │                                                                         │
//! │  pending      = amount × acc_per_share / 10^12 - reward_debt            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `acc_per_share` and `reward_debt` are 256-bit ([`U256`]). Reward amounts
//! themselves stay `u128`.
//!
//! ## Emission Schedule
//!
//! | Epoch | Blocks after start | Rate (bonus) | Rate |
//! |-------|--------------------|--------------|------|
//! | 0 | 0 - 45,499 | 10 × base | base |
//! | 1 | 45,500 - 90,999 | 5 × base | base / 2 |
//! | 2 | 91,000 - 136,499 | 2.5 × base | base / 4 |
//! | ... | ... | (halving continues) | ... |

pub mod accrual;
pub mod capability;
pub mod config;
pub mod emission;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod position;
pub mod store;

// Re-exports
pub use accrual::Accrual;
pub use capability::{Environment, RewardMinter, StakeCustody};
pub use config::{EngineConfig, RoleConfig, ScheduleConfig};
pub use emission::EmissionSchedule;
pub use engine::{EngineSnapshot, ShareManager};
pub use events::EngineEvent;
pub use ledger::MemoryLedger;
pub use pool::{PoolInfo, PoolRegistry};
pub use position::{Position, PositionLedger, PositionRecord};
pub use store::RecordStore;
pub use primitive_types::U256;

/// Accounting constants
pub mod constants {
    /// Fixed-point scale of `acc_reward_per_share`
    pub const SCALE: u128 = 1_000_000_000_000; // 10^12

    /// Blocks per day at ~13 second block time
    pub const BLOCKS_PER_DAY: u64 = 6_500;

    /// Halving epoch: one week of blocks
    pub const EPOCH_LENGTH: u64 = 7 * BLOCKS_PER_DAY; // 45,500 blocks

    /// Rate multiplier inside the bonus window
    pub const BONUS_MULTIPLIER: u128 = 10;

    /// Beneficiary receives `pool_reward / DEV_SHARE_DIVISOR`
    pub const DEV_SHARE_DIVISOR: u128 = 10;
}

pub use constants::*;
