//! Prize distribution.
//!
//! Every entrant pays a flat fee into the pot. Two places always pay;
//! one more place opens for every 25 entries. First takes 40% of the pot,
//! second 20%, and the remaining paid places split the other 40% evenly.
//! Payouts are floored to whole currency units.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Entry count from which a daily-leader prize is offered.
const DAILY_PRIZE_MIN_ENTRIES: u64 = 100;
/// Daily-leader prize grows in steps of this many entries (and dollars).
const DAILY_PRIZE_STEP: u64 = 50;

/// Pot and payout parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrizeSchedule {
    pub entry_fee: u64,
    /// One extra paid place per this many entries.
    pub entries_per_extra_place: u64,
    pub first_share: Decimal,
    pub second_share: Decimal,
    /// Share of the pot split among places 3 and below.
    pub field_share: Decimal,
}

impl Default for PrizeSchedule {
    fn default() -> Self {
        Self {
            entry_fee: 25,
            entries_per_extra_place: 25,
            first_share: dec!(0.40),
            second_share: dec!(0.20),
            field_share: dec!(0.40),
        }
    }
}

/// A single paid place, for the prize-distribution table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub position: u64,
    pub amount: u64,
}

impl PrizeSchedule {
    pub fn total_pot(&self, total_entries: u64) -> u64 {
        total_entries * self.entry_fee
    }

    pub fn paid_positions(&self, total_entries: u64) -> u64 {
        total_entries / self.entries_per_extra_place.max(1) + 2
    }

    /// Prize for a 1-based finishing position.
    pub fn prize_for(&self, position: u64, total_entries: u64) -> u64 {
        let paid = self.paid_positions(total_entries);
        if position == 0 || position > paid {
            return 0;
        }

        let pot = Decimal::from(self.total_pot(total_entries));
        let prize = match position {
            1 => pot * self.first_share,
            2 => pot * self.second_share,
            // paid > 2 here since position >= 3 and position <= paid
            _ => pot * self.field_share / Decimal::from(paid - 2),
        };

        prize.floor().to_u64().unwrap_or(0)
    }

    /// Every paid place with its amount, best first.
    pub fn payouts(&self, total_entries: u64) -> Vec<Payout> {
        (1..=self.paid_positions(total_entries))
            .map(|position| Payout {
                position,
                amount: self.prize_for(position, total_entries),
            })
            .collect()
    }

    /// Bonus for the leader after each round, offered on big pools only.
    pub fn daily_leader_prize(&self, total_entries: u64) -> Option<u64> {
        (total_entries >= DAILY_PRIZE_MIN_ENTRIES)
            .then(|| total_entries / DAILY_PRIZE_STEP * DAILY_PRIZE_STEP)
    }
}

/// Prize for `position` under the standard $25 schedule.
pub fn compute_prize(position: u64, total_entries: u64) -> u64 {
    PrizeSchedule::default().prize_for(position, total_entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
