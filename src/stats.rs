use serde::{Deserialize, Serialize};

/// Per-identity counters from `getBlockProduction`.
///
/// The node reports `byIdentity[identity]` as a two-element array; the
/// counters are read positionally, first as `blocks_produced`, second as
/// `leader_slots_attributed`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct BlockProduction {
    pub blocks_produced: u64,
    pub leader_slots_attributed: u64,
}

impl From<[u64; 2]> for BlockProduction {
    fn from(pair: [u64; 2]) -> Self {
        Self {
            blocks_produced: pair[0],
            leader_slots_attributed: pair[1],
        }
    }
}

impl From<BlockProduction> for [u64; 2] {
    fn from(p: BlockProduction) -> Self {
        [p.blocks_produced, p.leader_slots_attributed]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionSummary {
    pub skipped: u64,
    pub produced: u64,
    pub total_leader_slots: usize,
    pub produced_percentage: f64,
    pub skipped_percentage: f64,
}

impl ProductionSummary {
    /// `total_leader_slots` is the length of the tracked schedule.
    pub fn derive(production: BlockProduction, total_leader_slots: usize) -> Self {
        let skipped = production
            .blocks_produced
            .saturating_sub(production.leader_slots_attributed);
        let produced = production.blocks_produced - skipped;

        let produced_percentage = if total_leader_slots > 0 {
            production.blocks_produced as f64 / total_leader_slots as f64 * 100.0
        } else {
            0.0
        };
        let skipped_percentage = if production.leader_slots_attributed > 0 {
            skipped as f64 / production.leader_slots_attributed as f64 * 100.0
        } else {
            0.0
        };

        Self {
            skipped,
            produced,
            total_leader_slots,
            produced_percentage,
            skipped_percentage,
        }
    }
}
