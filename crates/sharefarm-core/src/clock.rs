//! Block clock
//!
//! The host ledger is the only source of time. Operations read the current
//! block number through [`BlockClock`] and never consult wall-clock time.

use crate::types::BlockNumber;
use serde::{Deserialize, Serialize};

/// Monotonic block counter supplied by the environment
pub trait BlockClock {
    /// Current block number
    fn current_block(&self) -> BlockNumber;
}

/// Manually driven clock for simulations and tests
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClock {
    block: BlockNumber,
}

impl ManualClock {
    /// Create a clock positioned at `block`
    pub fn at(block: BlockNumber) -> Self {
        Self { block }
    }

    /// Advance to `block`; earlier targets are ignored so the clock never runs backwards
    pub fn advance_to(&mut self, block: BlockNumber) -> BlockNumber {
        self.block = self.block.max(block);
        self.block
    }

    /// Mine a single block
    pub fn tick(&mut self) -> BlockNumber {
        self.block = self.block.saturating_add(1);
        self.block
    }
}

impl BlockClock for ManualClock {
    fn current_block(&self) -> BlockNumber {
        self.block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = ManualClock::at(100);
        assert_eq!(clock.advance_to(150), 150);
        assert_eq!(clock.advance_to(120), 150);
        assert_eq!(clock.tick(), 151);
        assert_eq!(clock.current_block(), 151);
    }
}
