//! # Emission Schedule
//!
//! Block-indexed halving schedule for the reward token.
//!
//! ## Rate per block
//!
//! ```text
//! block <  start_block          → 0
//! epoch  = (block - start_block) / EPOCH_LENGTH
//! base   = max(reward_per_block >> epoch, reward_floor)
//! block <= bonus_end_block      → base × BONUS_MULTIPLIER
//! block >  bonus_end_block      → base
//! ```
//!
//! With the default one-week epoch (45,500 blocks) and a 100 unit base:
//!
//! | Epoch | Blocks after start | Base | Inside bonus |
//! |-------|--------------------|------|--------------|
//! | 0 | 0 - 45,499 | 100 | 1,000 |
//! | 1 | 45,500 - 90,999 | 50 | 500 |
//! | 2 | 91,000 - 136,499 | 25 | 250 |
//! | ... | ... | (halving continues down to the floor) | ... |

use crate::constants::*;
use crate::math;
use serde::{Deserialize, Serialize};
use sharefarm_core::{BlockNumber, Result, ShareError};

/// Emission schedule (halving with an initial bonus window)
///
/// A pure function of the block number. Querying past or future blocks has no
/// side effects, so the same schedule serves accrual and previews.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSchedule {
    /// Base reward per block in the smallest reward unit, before halving and bonus
    pub reward_per_block: u128,
    /// First block that emits
    pub start_block: BlockNumber,
    /// Last block (inclusive) that receives the bonus multiplier
    pub bonus_end_block: BlockNumber,
    /// Lower bound for the halved base rate; 0 lets emission decay to nothing
    pub reward_floor: u128,
}

impl EmissionSchedule {
    /// Create a schedule with no floor
    pub fn new(reward_per_block: u128, start_block: BlockNumber, bonus_end_block: BlockNumber) -> Self {
        Self {
            reward_per_block,
            start_block,
            bonus_end_block,
            reward_floor: 0,
        }
    }

    /// Set the minimum base rate
    pub fn with_floor(mut self, reward_floor: u128) -> Self {
        self.reward_floor = reward_floor;
        self
    }

    /// Reject a schedule whose peak rate cannot be computed
    ///
    /// The highest rate the schedule ever pays is its larger base rate under
    /// the bonus multiplier. Every other block pays less.
    pub fn validate(&self) -> Result<()> {
        let peak = self.reward_per_block.max(self.reward_floor);
        if peak.checked_mul(BONUS_MULTIPLIER).is_none() {
            return Err(ShareError::InvalidConfig(
                "reward_per_block overflows under the bonus multiplier".into(),
            ));
        }
        Ok(())
    }

    /// Halving epoch a block falls in (0 before the start block)
    pub fn epoch_for_block(&self, block: BlockNumber) -> u64 {
        if block < self.start_block {
            return 0;
        }
        (block - self.start_block) / EPOCH_LENGTH
    }

    /// Base rate for an epoch, without the floor
    fn halved_rate(&self, epoch: u64) -> u128 {
        if epoch >= u128::BITS as u64 {
            return 0;
        }
        self.reward_per_block >> epoch
    }

    /// Base rate for an epoch (halving applied, floor applied, no bonus)
    pub fn base_rate_for_epoch(&self, epoch: u64) -> u128 {
        self.halved_rate(epoch).max(self.reward_floor)
    }

    /// Bonus multiplier in force at `block`
    pub fn multiplier_at(&self, block: BlockNumber) -> u128 {
        if block <= self.bonus_end_block {
            BONUS_MULTIPLIER
        } else {
            1
        }
    }

    /// Reward units mintable for `block`
    pub fn reward_per_block(&self, block: BlockNumber) -> Result<u128> {
        if block < self.start_block {
            return Ok(0);
        }
        let base = self.base_rate_for_epoch(self.epoch_for_block(block));
        math::mul(base, self.multiplier_at(block), "reward per block")
    }

    /// Last block of `epoch`
    fn epoch_last_block(&self, epoch: u64) -> BlockNumber {
        (epoch + 1)
            .checked_mul(EPOCH_LENGTH)
            .and_then(|span| self.start_block.checked_add(span))
            .map(|next_start| next_start - 1)
            .unwrap_or(BlockNumber::MAX)
    }

    /// Total emission for blocks in `(from, to]`
    ///
    /// Closed form over constant-rate segments. Segments break at the start
    /// block, after the bonus window and at every epoch boundary. Once the base
    /// rate has decayed to the floor it stays there, so the rest of the range
    /// (or of the bonus window) is settled in one step.
    pub fn emission_between(&self, from: BlockNumber, to: BlockNumber) -> Result<u128> {
        if to <= from {
            return Ok(0);
        }

        let mut total: u128 = 0;
        let mut cursor = (from + 1).max(self.start_block);

        while cursor <= to {
            let epoch = self.epoch_for_block(cursor);
            let in_bonus = cursor <= self.bonus_end_block;

            let decayed = self.halved_rate(epoch) <= self.reward_floor;

            let mut segment_last = if decayed {
                to
            } else {
                to.min(self.epoch_last_block(epoch))
            };
            if in_bonus {
                segment_last = segment_last.min(self.bonus_end_block);
            }

            let rate = math::mul(
                self.base_rate_for_epoch(epoch),
                self.multiplier_at(cursor),
                "reward per block",
            )?;
            let blocks = (segment_last - cursor + 1) as u128;
            total = math::add(total, math::mul(rate, blocks, "segment emission")?, "emission total")?;

            if segment_last >= to {
                break;
            }
            cursor = segment_last + 1;
        }

        Ok(total)
    }
}
