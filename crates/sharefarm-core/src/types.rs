//! Core type definitions for the sharefarm engine
//!
//! Accounts and staked assets are both named by 32-byte identifiers. Pools are
//! named by their position in the append-only registry.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Block height supplied by the host ledger
pub type BlockNumber = u64;

macro_rules! byte_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name {
            bytes: [u8; 32],
        }

        impl $name {
            /// Zero identifier, never a valid holder
            pub const ZERO: Self = Self { bytes: [0u8; 32] };

            pub fn new(bytes: [u8; 32]) -> Self {
                Self { bytes }
            }

            /// Derive an identifier from a readable label using BLAKE3
            pub fn from_label(label: &str) -> Self {
                Self {
                    bytes: *blake3::hash(label.as_bytes()).as_bytes(),
                }
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.bytes
            }

            pub fn is_zero(&self) -> bool {
                self.bytes == [0u8; 32]
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.bytes)
            }

            /// Parse from a 64-character hex string
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let decoded = hex::decode(s)?;
                let bytes: [u8; 32] = decoded
                    .try_into()
                    .map_err(|_| hex::FromHexError::InvalidStringLength)?;
                Ok(Self { bytes })
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), &self.to_hex()[..12])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.to_hex()[..12])
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(de::Error::custom)
            }
        }
    };
}

byte_id!(
    /// AccountId - a depositor, the owner, or the beneficiary
    AccountId,
    "AccountId"
);

byte_id!(
    /// AssetId - identity of the fungible asset a pool accepts
    AssetId,
    "AssetId"
);

/// PoolId - insertion index into the pool registry
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct PoolId(pub u32);

impl PoolId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PoolId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
