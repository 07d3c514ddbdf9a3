//! Engine configuration
//!
//! ```toml
//! [schedule]
//! reward_per_block = 100
//! start_block = 200
//! bonus_end_block = 1000
//!
//! [roles]
//! owner = "<64 hex chars>"
//! beneficiary = "<64 hex chars>"
//! ```

use crate::emission::EmissionSchedule;
use serde::{Deserialize, Serialize};
use sharefarm_core::{AccountId, BlockNumber, Result, ShareError};
use std::path::Path;

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Emission parameters
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Administrative accounts
    #[serde(default)]
    pub roles: RoleConfig,
}

/// Emission parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Base reward per block before halving and bonus
    #[serde(default = "default_reward_per_block", with = "amount")]
    pub reward_per_block: u128,

    /// First emitting block
    #[serde(default)]
    pub start_block: BlockNumber,

    /// Last block of the bonus window (inclusive)
    #[serde(default = "default_bonus_end_block")]
    pub bonus_end_block: BlockNumber,

    /// Minimum base rate once halving has run its course
    #[serde(default, with = "amount")]
    pub reward_floor: u128,
}

/// TOML integers stop at i64, so reward amounts also accept decimal strings
/// and are written back as strings
mod amount {
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        struct AmountVisitor;

        impl<'de> de::Visitor<'de> for AmountVisitor {
            type Value = u128;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a non-negative integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                u128::try_from(v).map_err(|_| E::custom("amount must not be negative"))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.trim().replace('_', "").parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

fn default_reward_per_block() -> u128 {
    100
}

fn default_bonus_end_block() -> BlockNumber {
    1_000
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reward_per_block: default_reward_per_block(),
            start_block: 0,
            bonus_end_block: default_bonus_end_block(),
            reward_floor: 0,
        }
    }
}

impl ScheduleConfig {
    pub fn to_schedule(&self) -> EmissionSchedule {
        EmissionSchedule::new(self.reward_per_block, self.start_block, self.bonus_end_block)
            .with_floor(self.reward_floor)
    }
}

/// Administrative accounts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// May add pools and change allocation weights
    #[serde(default)]
    pub owner: AccountId,

    /// Receives the dev share of every emission; may hand the role on
    #[serde(default)]
    pub beneficiary: AccountId,
}

impl EngineConfig {
    /// Build a configuration from its parts
    pub fn new(schedule: EmissionSchedule, owner: AccountId, beneficiary: AccountId) -> Self {
        Self {
            schedule: ScheduleConfig {
                reward_per_block: schedule.reward_per_block,
                start_block: schedule.start_block,
                bonus_end_block: schedule.bonus_end_block,
                reward_floor: schedule.reward_floor,
            },
            roles: RoleConfig { owner, beneficiary },
        }
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ShareError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShareError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ShareError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.roles.owner.is_zero() {
            return Err(ShareError::InvalidConfig("owner is not set".into()));
        }
        if self.roles.beneficiary.is_zero() {
            return Err(ShareError::InvalidConfig("beneficiary is not set".into()));
        }
        self.emission_schedule().validate()
    }

    pub fn emission_schedule(&self) -> EmissionSchedule {
        self.schedule.to_schedule()
    }
}
