//! Shared fixtures for the engine integration tests

#![allow(dead_code)]

use sharefarm_core::{AccountId, AssetId, BlockNumber, PoolId};
use sharefarm_economics::{EmissionSchedule, EngineConfig, MemoryLedger, ShareManager};
use tracing_subscriber::EnvFilter;

pub const STARTING_BALANCE: u128 = 1_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn owner() -> AccountId {
    AccountId::from_label("alice")
}

pub fn alice() -> AccountId {
    AccountId::from_label("alice")
}

pub fn bob() -> AccountId {
    AccountId::from_label("bob")
}

pub fn carol() -> AccountId {
    AccountId::from_label("carol")
}

pub fn dev() -> AccountId {
    AccountId::from_label("dev")
}

pub fn lp() -> AssetId {
    AssetId::from_label("lp")
}

pub fn lp2() -> AssetId {
    AssetId::from_label("lp2")
}

/// Engine plus the ledger it runs against
pub struct Farm {
    pub engine: ShareManager,
    pub ledger: MemoryLedger,
}

impl Farm {
    /// Fresh farm at `block`; alice, bob and carol each hold 1,000 of both LP assets
    pub fn new(reward_per_block: u128, start_block: BlockNumber, bonus_end_block: BlockNumber, block: BlockNumber) -> Self {
        init_tracing();
        let config = EngineConfig::new(
            EmissionSchedule::new(reward_per_block, start_block, bonus_end_block),
            owner(),
            dev(),
        );
        let engine = ShareManager::new(&config).unwrap();
        let mut ledger = MemoryLedger::new(block);
        for account in [alice(), bob(), carol()] {
            for asset in [lp(), lp2()] {
                ledger.fund(&asset, &account, STARTING_BALANCE).unwrap();
                ledger.approve(&asset, &account, STARTING_BALANCE);
            }
        }
        Self { engine, ledger }
    }

    pub fn add_pool(&mut self, weight: u64, asset: AssetId) -> PoolId {
        self.engine
            .add_pool(&mut self.ledger, &owner(), weight, asset, true)
            .unwrap()
    }

    pub fn at(&mut self, block: BlockNumber) -> &mut Self {
        self.ledger.advance_to(block);
        self
    }

    pub fn deposit(&mut self, account: AccountId, pid: PoolId, amount: u128) -> u128 {
        self.engine
            .deposit(&mut self.ledger, &account, pid, amount)
            .unwrap()
    }

    pub fn withdraw(&mut self, account: AccountId, pid: PoolId, amount: u128) -> u128 {
        self.engine
            .withdraw(&mut self.ledger, &account, pid, amount)
            .unwrap()
    }

    pub fn reward_balance(&self, account: AccountId) -> u128 {
        use sharefarm_economics::RewardMinter;
        self.ledger.balance_of(&account)
    }

    pub fn asset_balance(&self, asset: AssetId, account: AccountId) -> u128 {
        self.ledger.asset_balance(&asset, &account)
    }
}
