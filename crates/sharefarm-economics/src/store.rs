//! Engine persistence
//!
//! Records are bincode-encoded and keyed the way the engine addresses them:
//!
//! - header - emission schedule, roles and total allocation weight
//! - `pools` - one `PoolInfo` per `PoolId`
//! - `positions` - one `Position` per `(PoolId, AccountId)`
//!
//! Saving replaces every record at once, so readers never observe a half
//! written engine.

use crate::emission::EmissionSchedule;
use crate::engine::{EngineSnapshot, ShareManager};
use crate::pool::PoolInfo;
use crate::position::{Position, PositionRecord};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sharefarm_core::{AccountId, PoolId, Result, ShareError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Header {
    schedule: EmissionSchedule,
    owner: AccountId,
    beneficiary: AccountId,
    total_allocation_weight: u64,
    pool_count: u32,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ShareError::Storage(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| ShareError::Storage(e.to_string()))
}

/// In-memory record store for engine state
pub struct RecordStore {
    header: RwLock<Option<Vec<u8>>>,
    pools: RwLock<HashMap<PoolId, Vec<u8>>>,
    positions: RwLock<IndexMap<(PoolId, AccountId), Vec<u8>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            header: RwLock::new(None),
            pools: RwLock::new(HashMap::new()),
            positions: RwLock::new(IndexMap::new()),
        }
    }

    /// Replace the stored state with `snapshot`
    pub fn save_snapshot(&self, snapshot: &EngineSnapshot) -> Result<()> {
        let pool_count = u32::try_from(snapshot.pools.len())
            .map_err(|_| ShareError::Storage("too many pools".into()))?;
        let header = encode(&Header {
            schedule: snapshot.schedule.clone(),
            owner: snapshot.owner,
            beneficiary: snapshot.beneficiary,
            total_allocation_weight: snapshot.total_allocation_weight,
            pool_count,
        })?;

        let mut pools = HashMap::with_capacity(snapshot.pools.len());
        for (index, pool) in snapshot.pools.iter().enumerate() {
            pools.insert(PoolId(index as u32), encode(pool)?);
        }
        let mut positions = IndexMap::with_capacity(snapshot.positions.len());
        for record in &snapshot.positions {
            positions.insert((record.pool, record.account), encode(&record.position)?);
        }

        // Lock order: header, pools, positions
        let mut header_slot = self.header.write();
        let mut pool_slot = self.pools.write();
        let mut position_slot = self.positions.write();
        *header_slot = Some(header);
        *pool_slot = pools;
        *position_slot = positions;

        debug!(pools = pool_count, positions = position_slot.len(), "engine records saved");
        Ok(())
    }

    /// Stored state, or `None` when nothing was saved yet
    pub fn load_snapshot(&self) -> Result<Option<EngineSnapshot>> {
        let header_slot = self.header.read();
        let pool_slot = self.pools.read();
        let position_slot = self.positions.read();

        let Some(bytes) = header_slot.as_ref() else {
            return Ok(None);
        };
        let header: Header = decode(bytes)?;

        let mut pools = Vec::with_capacity(header.pool_count as usize);
        for index in 0..header.pool_count {
            let pid = PoolId(index);
            let bytes = pool_slot
                .get(&pid)
                .ok_or_else(|| ShareError::Storage(format!("pool record {} missing", pid)))?;
            pools.push(decode::<PoolInfo>(bytes)?);
        }

        let mut positions = Vec::with_capacity(position_slot.len());
        for ((pool, account), bytes) in position_slot.iter() {
            positions.push(PositionRecord {
                pool: *pool,
                account: *account,
                position: decode(bytes)?,
            });
        }

        Ok(Some(EngineSnapshot {
            schedule: header.schedule,
            owner: header.owner,
            beneficiary: header.beneficiary,
            pools,
            total_allocation_weight: header.total_allocation_weight,
            positions,
        }))
    }

    pub fn pool_record(&self, pid: PoolId) -> Result<Option<PoolInfo>> {
        self.pools.read().get(&pid).map(|bytes| decode(bytes)).transpose()
    }

    pub fn position_record(&self, pid: PoolId, account: &AccountId) -> Result<Option<Position>> {
        self.positions
            .read()
            .get(&(pid, *account))
            .map(|bytes| decode(bytes))
            .transpose()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    pub fn position_count(&self) -> usize {
        self.positions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.read().is_none()
    }

    /// Write the stored state to `path` as a single bincode image
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self
            .load_snapshot()?
            .ok_or_else(|| ShareError::Storage("nothing to write".into()))?;
        std::fs::write(path, encode(&snapshot)?)
            .map_err(|e| ShareError::Storage(format!("cannot write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "engine image written");
        Ok(())
    }

    /// Open a store from an image produced by [`RecordStore::write_to`]
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ShareError::Storage(format!("cannot read {}: {}", path.display(), e)))?;
        let store = Self::new();
        store.save_snapshot(&decode(&bytes)?)?;
        Ok(store)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareManager {
    /// Save the engine's state into `store`
    pub fn persist(&self, store: &RecordStore) -> Result<()> {
        store.save_snapshot(&self.snapshot())
    }

    /// Rebuild an engine from `store`
    pub fn load(store: &RecordStore) -> Result<Self> {
        let snapshot = store
            .load_snapshot()?
            .ok_or_else(|| ShareError::Storage("store holds no engine".into()))?;
        Self::restore(snapshot)
    }
}
