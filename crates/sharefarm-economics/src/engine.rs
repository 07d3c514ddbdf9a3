//! # Share Manager
//!
//! Operation surface of the staking engine. Each operation runs as one unit
//! against the host [`Environment`]:
//!
//! ```text
//! authorize → accrue pool → update pool/position → mint → transfer asset
//!                                                         (always last)
//! ```
//!
//! Any failure restores the engine state captured before the operation and
//! asks the host to revert its side of the operation. Nothing is retried.

use crate::accrual::{self, Accrual};
use crate::capability::Environment;
use crate::config::EngineConfig;
use crate::emission::EmissionSchedule;
use crate::events::EngineEvent;
use crate::math;
use crate::pool::{PoolInfo, PoolRegistry};
use crate::position::{Position, PositionLedger, PositionRecord};
use serde::{Deserialize, Serialize};
use sharefarm_core::{
    AccountId, AssetId, BlockClock, BlockNumber, PoolId, Result, Role, ShareError,
};
use tracing::{debug, info, warn};

/// Full engine state, for persistence and inspection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub schedule: EmissionSchedule,
    pub owner: AccountId,
    pub beneficiary: AccountId,
    pub pools: Vec<PoolInfo>,
    pub total_allocation_weight: u64,
    pub positions: Vec<PositionRecord>,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ShareError::Storage(e.to_string()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ShareError::Storage(e.to_string()))
    }
}

/// Engine state saved before an operation touches anything
struct Checkpoint {
    registry: PoolRegistry,
    owner: AccountId,
    beneficiary: AccountId,
    position: Option<(PoolId, AccountId, Option<(usize, Position)>)>,
    events: usize,
}

/// Staking and reward-distribution engine
#[derive(Clone, Debug)]
pub struct ShareManager {
    schedule: EmissionSchedule,
    owner: AccountId,
    beneficiary: AccountId,
    registry: PoolRegistry,
    positions: PositionLedger,
    events: Vec<EngineEvent>,
}

impl ShareManager {
    /// Create an engine with no pools
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schedule: config.emission_schedule(),
            owner: config.roles.owner,
            beneficiary: config.roles.beneficiary,
            registry: PoolRegistry::new(),
            positions: PositionLedger::new(),
            events: Vec::new(),
        })
    }

    // === Queries ===

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn beneficiary(&self) -> AccountId {
        self.beneficiary
    }

    pub fn pool_length(&self) -> usize {
        self.registry.len()
    }

    pub fn pool_info(&self, pid: PoolId) -> Result<&PoolInfo> {
        self.registry.get(pid)
    }

    pub fn pools(&self) -> impl Iterator<Item = (PoolId, &PoolInfo)> {
        self.registry.iter()
    }

    pub fn total_allocation_weight(&self) -> u64 {
        self.registry.total_allocation_weight()
    }

    /// Position of `account` in `pid` (zero when absent)
    pub fn position(&self, pid: PoolId, account: &AccountId) -> Position {
        self.positions.get(pid, account)
    }

    /// Reward units mintable for `block`
    pub fn reward_per_block(&self, block: BlockNumber) -> Result<u128> {
        self.schedule.reward_per_block(block)
    }

    pub fn epoch_for_block(&self, block: BlockNumber) -> u64 {
        self.schedule.epoch_for_block(block)
    }

    /// Total emission for blocks in `(from, to]`
    pub fn emission_between(&self, from: BlockNumber, to: BlockNumber) -> Result<u128> {
        self.schedule.emission_between(from, to)
    }

    /// Configuration equivalent to the engine's current schedule and roles
    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(self.schedule.clone(), self.owner, self.beneficiary)
    }

    /// Reward `account` could harvest from `pid` at `block`, without changing state
    pub fn pending_reward(&self, pid: PoolId, account: &AccountId, block: BlockNumber) -> Result<u128> {
        let pool = self.registry.get(pid)?;
        let acc = accrual::projected_acc_reward_per_share(
            pool,
            &self.schedule,
            self.registry.total_allocation_weight(),
            block,
        )?;
        self.positions.get(pid, account).pending(acc)
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take the recorded events
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check the incremental totals against the stored records
    pub fn audit(&self) -> Result<()> {
        for (pid, pool) in self.registry.iter() {
            let staked = self.positions.staked_in_pool(pid)?;
            if staked != pool.total_staked {
                return Err(ShareError::Storage(format!(
                    "pool {} tracks {} staked but positions hold {}",
                    pid, pool.total_staked, staked
                )));
            }
        }
        for record in self.positions.records() {
            self.registry.get(record.pool)?;
        }
        PoolRegistry::from_parts(
            self.registry.pools().to_vec(),
            self.registry.total_allocation_weight(),
        )?;
        Ok(())
    }

    // === Administration ===

    /// Register a pool for `staked_asset`
    ///
    /// With `with_update`, every existing pool is accrued first so blocks
    /// already elapsed are shared out under the old total weight.
    pub fn add_pool<E: Environment>(
        &mut self,
        env: &mut E,
        caller: &AccountId,
        allocation_weight: u64,
        staked_asset: AssetId,
        with_update: bool,
    ) -> Result<PoolId> {
        self.ensure_role(Role::Owner, caller)?;

        self.atomically(env, "add_pool", None, |engine, env| {
            let now = env.current_block();
            if with_update {
                engine.accrue_all(env, now)?;
            }
            if engine.registry.contains_asset(&staked_asset) {
                warn!(asset = %staked_asset, "asset already has a pool, registering another");
            }

            let last_reward_block = now.max(engine.schedule.start_block);
            let pid = engine
                .registry
                .add(PoolInfo::new(staked_asset, allocation_weight, last_reward_block))?;

            info!(pool = %pid, asset = %staked_asset, weight = allocation_weight, block = now, "pool added");
            engine.events.push(EngineEvent::PoolAdded {
                pool: pid,
                staked_asset,
                allocation_weight,
                block: now,
            });
            Ok(pid)
        })
    }

    /// Change the allocation weight of `pid`
    pub fn set_allocation<E: Environment>(
        &mut self,
        env: &mut E,
        caller: &AccountId,
        pid: PoolId,
        allocation_weight: u64,
        with_update: bool,
    ) -> Result<()> {
        self.ensure_role(Role::Owner, caller)?;
        self.registry.get(pid)?;

        self.atomically(env, "set_allocation", None, |engine, env| {
            let now = env.current_block();
            if with_update {
                engine.accrue_all(env, now)?;
            }
            let previous_weight = engine.registry.set_allocation(pid, allocation_weight)?;

            info!(pool = %pid, previous_weight, weight = allocation_weight, "allocation set");
            engine.events.push(EngineEvent::AllocationSet {
                pool: pid,
                previous_weight,
                allocation_weight,
                block: now,
            });
            Ok(())
        })
    }

    /// Hand the beneficiary role to `new_beneficiary`; only the current beneficiary may
    pub fn update_beneficiary<C: BlockClock + ?Sized>(
        &mut self,
        clock: &C,
        caller: &AccountId,
        new_beneficiary: AccountId,
    ) -> Result<()> {
        self.ensure_role(Role::Beneficiary, caller)?;
        if new_beneficiary.is_zero() {
            return Err(ShareError::InvalidConfig("beneficiary cannot be the zero account".into()));
        }

        let previous = std::mem::replace(&mut self.beneficiary, new_beneficiary);
        info!(%previous, beneficiary = %new_beneficiary, "beneficiary updated");
        self.events.push(EngineEvent::BeneficiaryUpdated {
            previous,
            beneficiary: new_beneficiary,
            block: clock.current_block(),
        });
        Ok(())
    }

    /// Hand the owner role to `new_owner`
    pub fn transfer_ownership<C: BlockClock + ?Sized>(
        &mut self,
        clock: &C,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<()> {
        self.ensure_role(Role::Owner, caller)?;
        if new_owner.is_zero() {
            return Err(ShareError::InvalidConfig("owner cannot be the zero account".into()));
        }

        let previous = std::mem::replace(&mut self.owner, new_owner);
        info!(%previous, owner = %new_owner, "ownership transferred");
        self.events.push(EngineEvent::OwnershipTransferred {
            previous,
            owner: new_owner,
            block: clock.current_block(),
        });
        Ok(())
    }

    // === Accrual drivers ===

    /// Bring one pool up to the current block
    pub fn update_pool<E: Environment>(&mut self, env: &mut E, pid: PoolId) -> Result<Option<Accrual>> {
        self.registry.get(pid)?;
        self.atomically(env, "update_pool", None, |engine, env| {
            let now = env.current_block();
            engine.accrue(env, pid, now)
        })
    }

    /// Bring every pool up to the current block
    pub fn mass_update_pools<E: Environment>(&mut self, env: &mut E) -> Result<()> {
        self.atomically(env, "mass_update_pools", None, |engine, env| {
            let now = env.current_block();
            engine.accrue_all(env, now)
        })
    }

    // === Depositor operations ===

    /// Stake `amount` into `pid`, harvesting pending reward first
    ///
    /// A zero amount only harvests. Returns the harvested reward.
    pub fn deposit<E: Environment>(
        &mut self,
        env: &mut E,
        caller: &AccountId,
        pid: PoolId,
        amount: u128,
    ) -> Result<u128> {
        self.registry.get(pid)?;

        self.atomically(env, "deposit", Some((pid, *caller)), |engine, env| {
            let now = env.current_block();
            engine.accrue(env, pid, now)?;

            let pool = engine.registry.get(pid)?;
            let acc = pool.acc_reward_per_share;
            let asset = pool.staked_asset;
            let total_staked = math::add(pool.total_staked, amount, "pool stake")?;

            let mut position = engine.positions.get(pid, caller);
            let pending = position.pending(acc)?;
            position.amount = math::add(position.amount, amount, "position stake")?;
            position.settle(acc)?;

            engine.registry.get_mut(pid)?.total_staked = total_staked;
            engine.positions.store(pid, *caller, position);
            engine.harvest(env, pid, caller, pending, now)?;

            debug!(pool = %pid, account = %caller, amount, block = now, "deposit");
            engine.events.push(EngineEvent::Deposit {
                pool: pid,
                account: *caller,
                amount,
                block: now,
            });

            if amount > 0 {
                env.transfer_in(&asset, caller, amount)?;
            }
            Ok(pending)
        })
    }

    /// Unstake `amount` from `pid`, harvesting pending reward first
    ///
    /// Returns the harvested reward.
    pub fn withdraw<E: Environment>(
        &mut self,
        env: &mut E,
        caller: &AccountId,
        pid: PoolId,
        amount: u128,
    ) -> Result<u128> {
        self.registry.get(pid)?;
        let staked = self.positions.get(pid, caller).amount;
        if amount > staked {
            return Err(ShareError::InsufficientStake {
                requested: amount,
                staked,
            });
        }

        self.atomically(env, "withdraw", Some((pid, *caller)), |engine, env| {
            let now = env.current_block();
            engine.accrue(env, pid, now)?;

            let pool = engine.registry.get(pid)?;
            let acc = pool.acc_reward_per_share;
            let asset = pool.staked_asset;
            let total_staked = math::sub(pool.total_staked, amount, "pool stake")?;

            let mut position = engine.positions.get(pid, caller);
            let pending = position.pending(acc)?;
            position.amount = math::sub(position.amount, amount, "position stake")?;
            position.settle(acc)?;

            engine.registry.get_mut(pid)?.total_staked = total_staked;
            engine.positions.store(pid, *caller, position);
            engine.harvest(env, pid, caller, pending, now)?;

            debug!(pool = %pid, account = %caller, amount, block = now, "withdraw");
            engine.events.push(EngineEvent::Withdraw {
                pool: pid,
                account: *caller,
                amount,
                block: now,
            });

            if amount > 0 {
                env.transfer_out(&asset, caller, amount)?;
            }
            Ok(pending)
        })
    }

    /// Return the whole stake without accruing or harvesting
    ///
    /// Pending reward is forfeited. Returns the amount sent back.
    pub fn emergency_withdraw<E: Environment>(
        &mut self,
        env: &mut E,
        caller: &AccountId,
        pid: PoolId,
    ) -> Result<u128> {
        self.registry.get(pid)?;

        self.atomically(env, "emergency_withdraw", Some((pid, *caller)), |engine, env| {
            let now = env.current_block();
            let position = engine.positions.get(pid, caller);

            let pool = engine.registry.get_mut(pid)?;
            pool.total_staked = math::sub(pool.total_staked, position.amount, "pool stake")?;
            let asset = pool.staked_asset;
            engine.positions.remove(pid, caller);

            warn!(pool = %pid, account = %caller, amount = position.amount, "emergency withdraw, pending reward forfeited");
            engine.events.push(EngineEvent::EmergencyWithdraw {
                pool: pid,
                account: *caller,
                amount: position.amount,
                block: now,
            });

            if position.amount > 0 {
                env.transfer_out(&asset, caller, position.amount)?;
            }
            Ok(position.amount)
        })
    }

    // === Snapshots ===

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            schedule: self.schedule.clone(),
            owner: self.owner,
            beneficiary: self.beneficiary,
            pools: self.registry.pools().to_vec(),
            total_allocation_weight: self.registry.total_allocation_weight(),
            positions: self.positions.records(),
        }
    }

    /// Rebuild an engine from a snapshot, rejecting inconsistent totals
    ///
    /// The schedule goes through the same checks as a loaded configuration.
    pub fn restore(snapshot: EngineSnapshot) -> Result<Self> {
        if snapshot.owner.is_zero() || snapshot.beneficiary.is_zero() {
            return Err(ShareError::InvalidConfig("snapshot roles are not set".into()));
        }
        snapshot.schedule.validate()?;
        let engine = Self {
            schedule: snapshot.schedule,
            owner: snapshot.owner,
            beneficiary: snapshot.beneficiary,
            registry: PoolRegistry::from_parts(snapshot.pools, snapshot.total_allocation_weight)?,
            positions: PositionLedger::from_records(snapshot.positions),
            events: Vec::new(),
        };
        engine.audit()?;
        Ok(engine)
    }

    // === Internals ===

    fn ensure_role(&self, role: Role, caller: &AccountId) -> Result<()> {
        let holder = match role {
            Role::Owner => self.owner,
            Role::Beneficiary => self.beneficiary,
        };
        if *caller != holder {
            return Err(ShareError::Unauthorized {
                role,
                caller: *caller,
            });
        }
        Ok(())
    }

    /// Run `body` as one all-or-nothing operation
    fn atomically<E, T, F>(
        &mut self,
        env: &mut E,
        operation: &'static str,
        touched: Option<(PoolId, AccountId)>,
        body: F,
    ) -> Result<T>
    where
        E: Environment,
        F: FnOnce(&mut Self, &mut E) -> Result<T>,
    {
        let checkpoint = self.checkpoint(touched);
        env.begin_operation();

        match body(self, env) {
            Ok(value) => {
                env.commit_operation();
                Ok(value)
            }
            Err(err) => {
                self.rollback(checkpoint);
                env.revert_operation();
                warn!(operation, error = %err, "operation aborted");
                Err(err)
            }
        }
    }

    fn checkpoint(&self, touched: Option<(PoolId, AccountId)>) -> Checkpoint {
        Checkpoint {
            registry: self.registry.clone(),
            owner: self.owner,
            beneficiary: self.beneficiary,
            position: touched.map(|(pid, account)| (pid, account, self.positions.slot(pid, &account))),
            events: self.events.len(),
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.registry = checkpoint.registry;
        self.owner = checkpoint.owner;
        self.beneficiary = checkpoint.beneficiary;
        if let Some((pid, account, slot)) = checkpoint.position {
            self.positions.reinstate(pid, account, slot);
        }
        self.events.truncate(checkpoint.events);
    }

    /// Advance one pool and mint the beneficiary's cut
    fn accrue<E: Environment>(&mut self, env: &mut E, pid: PoolId, now: BlockNumber) -> Result<Option<Accrual>> {
        let total_weight = self.registry.total_allocation_weight();
        let pool = self.registry.get_mut(pid)?;
        let Some(accrual) = accrual::accrue(pool, &self.schedule, total_weight, now)? else {
            return Ok(None);
        };
        let acc_reward_per_share = pool.acc_reward_per_share;

        debug!(
            pool = %pid,
            from = accrual.from_block,
            to = accrual.to_block,
            pool_reward = accrual.pool_reward,
            dev_reward = accrual.dev_reward,
            "pool accrued"
        );
        self.events.push(EngineEvent::PoolUpdated {
            pool: pid,
            acc_reward_per_share,
            dev_reward: accrual.dev_reward,
            staker_reward: accrual.staker_reward,
            block: now,
        });

        if accrual.dev_reward > 0 {
            env.mint(&self.beneficiary, accrual.dev_reward)?;
        }
        Ok(Some(accrual))
    }

    fn accrue_all<E: Environment>(&mut self, env: &mut E, now: BlockNumber) -> Result<()> {
        let ids: Vec<PoolId> = self.registry.ids().collect();
        for pid in ids {
            self.accrue(env, pid, now)?;
        }
        Ok(())
    }

    fn harvest<E: Environment>(
        &mut self,
        env: &mut E,
        pid: PoolId,
        account: &AccountId,
        pending: u128,
        now: BlockNumber,
    ) -> Result<()> {
        if pending == 0 {
            return Ok(());
        }
        env.mint(account, pending)?;
        debug!(pool = %pid, %account, amount = pending, "harvested");
        self.events.push(EngineEvent::Harvest {
            pool: pid,
            account: *account,
            amount: pending,
            block: now,
        });
        Ok(())
    }
}
