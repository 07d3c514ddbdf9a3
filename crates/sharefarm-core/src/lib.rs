//! # Sharefarm Core
//!
//! Shared building blocks for the sharefarm staking engine:
//! - `AccountId` / `AssetId` - 32-byte identities for holders and staked assets
//! - `PoolId` - index into the append-only pool registry
//! - `ShareError` - the error taxonomy every operation reports through
//! - `BlockClock` - the host ledger's monotonic block counter

pub mod clock;
pub mod error;
pub mod types;

pub use clock::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{BlockClock, ManualClock};
    pub use crate::error::{Result, Role, ShareError};
    pub use crate::types::{AccountId, AssetId, BlockNumber, PoolId};
}
