//! Error types for sharefarm operations

use crate::types::{AccountId, PoolId};
use thiserror::Error;

/// Result type alias for sharefarm operations
pub type Result<T> = std::result::Result<T, ShareError>;

/// Role a caller must hold for an administrative operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Beneficiary,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Beneficiary => write!(f, "beneficiary"),
        }
    }
}

/// Errors that can occur while driving the staking engine
///
/// Every variant aborts the whole operation that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    // === Authorization ===
    /// Caller does not hold the role the operation requires
    #[error("Caller {caller} is not the {role}")]
    Unauthorized { role: Role, caller: AccountId },

    // === Balances ===
    /// Withdrawal exceeds the staked amount
    #[error("Insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u128, staked: u128 },

    /// Staked-asset custody movement was refused
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    // === Minting ===
    /// Engine is not allowed to mint the reward token
    #[error("Mint not authorized: {0}")]
    MintUnauthorized(String),

    // === Arithmetic ===
    /// An intermediate value left the integer range
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    // === Registry ===
    /// Pool index outside the registry
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    // === Configuration & storage ===
    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record store or encoding failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShareError {
    /// Stable numeric code for the error
    pub fn code(&self) -> u32 {
        match self {
            Self::Unauthorized { .. } => 2001,
            Self::InsufficientStake { .. } => 2002,
            Self::TransferFailed(_) => 2003,
            Self::MintUnauthorized(_) => 2004,
            Self::ArithmeticOverflow(_) => 2005,
            Self::PoolNotFound(_) => 2006,
            Self::InvalidConfig(_) => 2007,
            Self::Storage(_) => 2008,
        }
    }

    /// Operations have side effects, so nothing is retried on the caller's behalf
    pub fn is_recoverable(&self) -> bool {
        false
    }

    /// Whether the error belongs to the insufficient-balance family
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::InsufficientStake { .. } | Self::TransferFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ShareError::Unauthorized {
            role: Role::Beneficiary,
            caller: AccountId::from_label("bob"),
        };
        assert_eq!(err.code(), 2001);
        assert_eq!(ShareError::ArithmeticOverflow("pending").code(), 2005);
        assert_eq!(ShareError::PoolNotFound(PoolId(7)).code(), 2006);
    }

    #[test]
    fn test_error_display() {
        let err = ShareError::InsufficientStake {
            requested: 11,
            staked: 10,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("requested 11"));
        assert!(msg.contains("staked 10"));

        let err = ShareError::Unauthorized {
            role: Role::Owner,
            caller: AccountId::from_label("carol"),
        };
        assert!(err.to_string().contains("is not the owner"));
    }

    #[test]
    fn test_balance_family() {
        assert!(ShareError::TransferFailed("allowance".into()).is_insufficient_balance());
        assert!(!ShareError::MintUnauthorized("role".into()).is_insufficient_balance());
        assert!(!ShareError::Storage("x".into()).is_recoverable());
    }
}
