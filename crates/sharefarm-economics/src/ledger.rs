//! # In-Memory Host Ledger
//!
//! Reference [`Environment`] holding the reward token, staked-asset balances,
//! allowances granted to the engine and the engine's custody. Used for
//! simulations and integration tests.
//!
//! ## Transaction boundary
//!
//! ```text
//! begin_operation  → snapshot balances
//! commit_operation → drop snapshot
//! revert_operation → restore snapshot (undoes mints and transfers)
//! ```

use crate::capability::{Environment, RewardMinter, StakeCustody};
use crate::math;
use sharefarm_core::{AccountId, AssetId, BlockClock, BlockNumber, ManualClock, Result, ShareError};
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Balances {
    /// Reward-token balances
    reward: HashMap<AccountId, u128>,
    /// Reward-token supply
    reward_supply: u128,
    /// Staked-asset balances held by accounts
    assets: HashMap<(AssetId, AccountId), u128>,
    /// Amount each account lets the engine pull
    allowances: HashMap<(AssetId, AccountId), u128>,
    /// Staked assets held by the engine
    custody: HashMap<AssetId, u128>,
}

/// In-memory ledger with a manual block clock
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    balances: Balances,
    journal: Option<Balances>,
    minter: bool,
    clock: ManualClock,
}

impl MemoryLedger {
    /// Ledger at `block` where the engine already holds the minter role
    pub fn new(block: BlockNumber) -> Self {
        Self {
            minter: true,
            clock: ManualClock::at(block),
            ..Self::default()
        }
    }

    /// Ledger at `block` without the minter role
    pub fn without_minter(block: BlockNumber) -> Self {
        Self {
            clock: ManualClock::at(block),
            ..Self::default()
        }
    }

    pub fn grant_minter(&mut self) {
        self.minter = true;
    }

    pub fn revoke_minter(&mut self) {
        self.minter = false;
    }

    pub fn is_minter(&self) -> bool {
        self.minter
    }

    /// Advance the clock to `block`
    pub fn advance_to(&mut self, block: BlockNumber) -> BlockNumber {
        self.clock.advance_to(block)
    }

    /// Mine one block
    pub fn tick(&mut self) -> BlockNumber {
        self.clock.tick()
    }

    /// Credit `amount` of a staked asset to `account`
    pub fn fund(&mut self, asset: &AssetId, account: &AccountId, amount: u128) -> Result<()> {
        let balance = self.balances.assets.entry((*asset, *account)).or_insert(0);
        *balance = math::add(*balance, amount, "asset balance")?;
        Ok(())
    }

    /// Let the engine pull up to `amount` of `asset` from `account`
    pub fn approve(&mut self, asset: &AssetId, account: &AccountId, amount: u128) {
        self.balances.allowances.insert((*asset, *account), amount);
    }

    pub fn asset_balance(&self, asset: &AssetId, account: &AccountId) -> u128 {
        self.balances
            .assets
            .get(&(*asset, *account))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, asset: &AssetId, account: &AccountId) -> u128 {
        self.balances
            .allowances
            .get(&(*asset, *account))
            .copied()
            .unwrap_or(0)
    }

    /// Staked assets held by the engine
    pub fn custody_balance(&self, asset: &AssetId) -> u128 {
        self.balances.custody.get(asset).copied().unwrap_or(0)
    }

    /// Reward-token supply
    pub fn total_supply(&self) -> u128 {
        self.balances.reward_supply
    }

    /// Whether an operation is open
    pub fn in_operation(&self) -> bool {
        self.journal.is_some()
    }
}

impl RewardMinter for MemoryLedger {
    fn mint(&mut self, to: &AccountId, amount: u128) -> Result<()> {
        if !self.minter {
            return Err(ShareError::MintUnauthorized(
                "engine does not hold the minter role".to_string(),
            ));
        }
        let supply = math::add(self.balances.reward_supply, amount, "reward supply")?;
        let balance = self.balances.reward.entry(*to).or_insert(0);
        *balance = math::add(*balance, amount, "reward balance")?;
        self.balances.reward_supply = supply;
        Ok(())
    }

    fn balance_of(&self, account: &AccountId) -> u128 {
        self.balances.reward.get(account).copied().unwrap_or(0)
    }
}

impl StakeCustody for MemoryLedger {
    fn transfer_in(&mut self, asset: &AssetId, from: &AccountId, amount: u128) -> Result<()> {
        let key = (*asset, *from);
        let allowance = self.balances.allowances.get(&key).copied().unwrap_or(0);
        if allowance < amount {
            return Err(ShareError::TransferFailed(format!(
                "allowance {} below {}",
                allowance, amount
            )));
        }
        let balance = self.balances.assets.get(&key).copied().unwrap_or(0);
        if balance < amount {
            return Err(ShareError::TransferFailed(format!(
                "balance {} below {}",
                balance, amount
            )));
        }
        let held = self.balances.custody.get(asset).copied().unwrap_or(0);
        let held = math::add(held, amount, "custody balance")?;

        self.balances.allowances.insert(key, allowance - amount);
        self.balances.assets.insert(key, balance - amount);
        self.balances.custody.insert(*asset, held);
        Ok(())
    }

    fn transfer_out(&mut self, asset: &AssetId, to: &AccountId, amount: u128) -> Result<()> {
        let held = self.balances.custody.get(asset).copied().unwrap_or(0);
        if held < amount {
            return Err(ShareError::TransferFailed(format!(
                "custody {} below {}",
                held, amount
            )));
        }
        let key = (*asset, *to);
        let balance = self.balances.assets.get(&key).copied().unwrap_or(0);
        let balance = math::add(balance, amount, "asset balance")?;

        self.balances.custody.insert(*asset, held - amount);
        self.balances.assets.insert(key, balance);
        Ok(())
    }
}

impl BlockClock for MemoryLedger {
    fn current_block(&self) -> BlockNumber {
        self.clock.current_block()
    }
}

impl Environment for MemoryLedger {
    fn begin_operation(&mut self) {
        self.journal = Some(self.balances.clone());
    }

    fn commit_operation(&mut self) {
        self.journal = None;
    }

    fn revert_operation(&mut self) {
        if let Some(saved) = self.journal.take() {
            self.balances = saved;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lp() -> AssetId {
        AssetId::from_label("lp")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    #[test]
    fn test_mint_requires_role() {
        let mut ledger = MemoryLedger::without_minter(0);
        assert!(matches!(
            ledger.mint(&bob(), 5),
            Err(ShareError::MintUnauthorized(_))
        ));
        ledger.grant_minter();
        ledger.mint(&bob(), 5).unwrap();
        assert_eq!(ledger.balance_of(&bob()), 5);
        assert_eq!(ledger.total_supply(), 5);
    }

    #[test]
    fn test_transfer_in_checks_allowance_and_balance() {
        let mut ledger = MemoryLedger::new(0);
        ledger.fund(&lp(), &bob(), 1000).unwrap();
        assert!(ledger.transfer_in(&lp(), &bob(), 100).is_err());

        ledger.approve(&lp(), &bob(), 2000);
        ledger.transfer_in(&lp(), &bob(), 100).unwrap();
        assert_eq!(ledger.asset_balance(&lp(), &bob()), 900);
        assert_eq!(ledger.custody_balance(&lp()), 100);
        assert_eq!(ledger.allowance(&lp(), &bob()), 1900);

        assert!(matches!(
            ledger.transfer_in(&lp(), &bob(), 901),
            Err(ShareError::TransferFailed(_))
        ));
    }

    #[test]
    fn test_transfer_out_limited_by_custody() {
        let mut ledger = MemoryLedger::new(0);
        assert!(ledger.transfer_out(&lp(), &bob(), 1).is_err());
        ledger.fund(&lp(), &bob(), 10).unwrap();
        ledger.approve(&lp(), &bob(), 10);
        ledger.transfer_in(&lp(), &bob(), 10).unwrap();
        ledger.transfer_out(&lp(), &bob(), 10).unwrap();
        assert_eq!(ledger.asset_balance(&lp(), &bob()), 10);
        assert_eq!(ledger.custody_balance(&lp()), 0);
    }

    #[test]
    fn test_revert_restores_balances() {
        let mut ledger = MemoryLedger::new(0);
        ledger.begin_operation();
        assert!(ledger.in_operation());
        ledger.mint(&bob(), 42).unwrap();
        ledger.revert_operation();
        assert!(!ledger.in_operation());
        assert_eq!(ledger.balance_of(&bob()), 0);
        assert_eq!(ledger.total_supply(), 0);

        ledger.begin_operation();
        ledger.mint(&bob(), 7).unwrap();
        ledger.commit_operation();
        ledger.revert_operation();
        assert_eq!(ledger.balance_of(&bob()), 7);
    }

    #[test]
    fn test_clock() {
        let mut ledger = MemoryLedger::new(10);
        assert_eq!(ledger.current_block(), 10);
        ledger.advance_to(20);
        assert_eq!(ledger.tick(), 21);
    }
}
