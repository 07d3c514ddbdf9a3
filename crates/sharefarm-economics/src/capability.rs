//! External capabilities the engine drives
//!
//! The reward token ledger and the staked-asset custody live outside the
//! engine. The host that executes operations also provides the block clock and
//! the transaction boundary that reverts external effects on failure.

use sharefarm_core::{AccountId, AssetId, BlockClock, Result};

/// Reward-token issuance
pub trait RewardMinter {
    /// Mint `amount` reward units to `to`; fails with `MintUnauthorized` when
    /// the engine does not hold the minter role
    fn mint(&mut self, to: &AccountId, amount: u128) -> Result<()>;

    /// Reward-token balance of `account`
    fn balance_of(&self, account: &AccountId) -> u128;
}

/// Staked-asset custody movements
pub trait StakeCustody {
    /// Pull `amount` of `asset` from `from` into the engine's custody
    fn transfer_in(&mut self, asset: &AssetId, from: &AccountId, amount: u128) -> Result<()>;

    /// Return `amount` of `asset` from custody to `to`
    fn transfer_out(&mut self, asset: &AssetId, to: &AccountId, amount: u128) -> Result<()>;
}

/// Host ledger an operation executes against
///
/// `begin_operation` is called before an operation's first external call.
/// Exactly one of `commit_operation` or `revert_operation` follows; a revert
/// must undo every mint and transfer made since `begin_operation`.
pub trait Environment: RewardMinter + StakeCustody + BlockClock {
    fn begin_operation(&mut self);

    fn commit_operation(&mut self);

    fn revert_operation(&mut self);
}
