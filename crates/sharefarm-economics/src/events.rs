//! Events recorded by successful operations
//!
//! Failed operations leave no events behind.
//!
//! Events serialize adjacently tagged, `{"kind": "deposit", "data": {..}}`.
//! An internal tag would route decoding through serde's buffered content,
//! which cannot carry `u128` amounts.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sharefarm_core::{AccountId, AssetId, BlockNumber, PoolId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EngineEvent {
    PoolAdded {
        pool: PoolId,
        staked_asset: AssetId,
        allocation_weight: u64,
        block: BlockNumber,
    },
    AllocationSet {
        pool: PoolId,
        previous_weight: u64,
        allocation_weight: u64,
        block: BlockNumber,
    },
    /// A pool's accumulator advanced and reward was emitted
    PoolUpdated {
        pool: PoolId,
        acc_reward_per_share: U256,
        dev_reward: u128,
        staker_reward: u128,
        block: BlockNumber,
    },
    Deposit {
        pool: PoolId,
        account: AccountId,
        amount: u128,
        block: BlockNumber,
    },
    Withdraw {
        pool: PoolId,
        account: AccountId,
        amount: u128,
        block: BlockNumber,
    },
    Harvest {
        pool: PoolId,
        account: AccountId,
        amount: u128,
        block: BlockNumber,
    },
    EmergencyWithdraw {
        pool: PoolId,
        account: AccountId,
        amount: u128,
        block: BlockNumber,
    },
    BeneficiaryUpdated {
        previous: AccountId,
        beneficiary: AccountId,
        block: BlockNumber,
    },
    OwnershipTransferred {
        previous: AccountId,
        owner: AccountId,
        block: BlockNumber,
    },
}

impl EngineEvent {
    /// Block the event was recorded at
    pub fn block(&self) -> BlockNumber {
        match self {
            Self::PoolAdded { block, .. }
            | Self::AllocationSet { block, .. }
            | Self::PoolUpdated { block, .. }
            | Self::Deposit { block, .. }
            | Self::Withdraw { block, .. }
            | Self::Harvest { block, .. }
            | Self::EmergencyWithdraw { block, .. }
            | Self::BeneficiaryUpdated { block, .. }
            | Self::OwnershipTransferred { block, .. } => *block,
        }
    }

    /// Pool the event concerns, if any
    pub fn pool(&self) -> Option<PoolId> {
        match self {
            Self::PoolAdded { pool, .. }
            | Self::AllocationSet { pool, .. }
            | Self::PoolUpdated { pool, .. }
            | Self::Deposit { pool, .. }
            | Self::Withdraw { pool, .. }
            | Self::Harvest { pool, .. }
            | Self::EmergencyWithdraw { pool, .. } => Some(*pool),
            Self::BeneficiaryUpdated { .. } | Self::OwnershipTransferred { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = EngineEvent::Deposit {
            pool: PoolId(2),
            account: AccountId::from_label("carol"),
            amount: 30,
            block: 318,
        };
        assert_eq!(event.block(), 318);
        assert_eq!(event.pool(), Some(PoolId(2)));

        let event = EngineEvent::BeneficiaryUpdated {
            previous: AccountId::from_label("dev"),
            beneficiary: AccountId::from_label("bob"),
            block: 5,
        };
        assert_eq!(event.pool(), None);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = EngineEvent::Harvest {
            pool: PoolId(0),
            account: AccountId::from_label("bob"),
            amount: 9000,
            block: 220,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "harvest");
        assert_eq!(json["data"]["amount"], 9000);
    }

    #[test]
    fn test_event_log_reads_back_full_width_amounts() {
        let log = vec![
            EngineEvent::Deposit {
                pool: PoolId(0),
                account: AccountId::from_label("bob"),
                amount: u128::MAX,
                block: 111,
            },
            EngineEvent::PoolUpdated {
                pool: PoolId(0),
                acc_reward_per_share: U256::from(u128::MAX) * U256::from(1_000u64),
                dev_reward: 60_000_000_000_000_000_000,
                staker_reward: 540_000_000_000_000_000_000,
                block: 121,
            },
        ];
        let text = serde_json::to_string(&log).unwrap();
        assert!(text.contains(&u128::MAX.to_string()));
        let read: Vec<EngineEvent> = serde_json::from_str(&text).unwrap();
        assert_eq!(read, log);
    }
}
