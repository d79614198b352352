// Leader schedule model: slot arithmetic, builder and status tracking
pub mod cache;
pub mod tracker;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::MonitorError;

pub use cache::JsonFileCache;
pub use tracker::apply_current_slot;

pub type Slot = u64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Pending,
    Done,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderSlot {
    pub slot: Slot,
    pub status: SlotStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub absolute_slot: Slot,
    pub slot_index: Slot,
    #[serde(default)]
    pub epoch: u64,
}

impl EpochInfo {
    pub fn epoch_start_slot(&self) -> Slot {
        self.absolute_slot.saturating_sub(self.slot_index)
    }
}

/// Converts an epoch-relative slot index into the global slot number.
///
/// Saturates at `u64::MAX` when the node reports a malformed epoch.
pub fn absolute_slot(relative_slot: Slot, epoch_info: &EpochInfo) -> Slot {
    epoch_info.epoch_start_slot().saturating_add(relative_slot)
}

/// `getLeaderSchedule` result: identity -> relative slot indices.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct RawLeaderSchedule(pub HashMap<String, Vec<Slot>>);

impl RawLeaderSchedule {
    pub fn slots_for(&self, identity: &str) -> Result<&[Slot], MonitorError> {
        self.0
            .get(identity)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                MonitorError::NotFound(format!("no schedule found for validator {}", identity))
            })
    }
}

/// Ordered leader slots of one validator, ascending and free of duplicates.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Schedule(Vec<LeaderSlot>);

impl Schedule {
    pub fn from_relative(relative_slots: &[Slot], epoch_info: &EpochInfo) -> Self {
        let mut entries: Vec<LeaderSlot> = relative_slots
            .iter()
            .map(|relative| LeaderSlot {
                slot: absolute_slot(*relative, epoch_info),
                status: SlotStatus::Pending,
            })
            .collect();
        entries.sort_by_key(|entry| entry.slot);
        entries.dedup_by_key(|entry| entry.slot);
        Self(entries)
    }

    pub fn entries(&self) -> &[LeaderSlot] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn count(&self, status: SlotStatus) -> usize {
        self.0.iter().filter(|entry| entry.status == status).count()
    }

    /// First leader slot strictly after `current_slot`.
    pub fn next_after(&self, current_slot: Slot) -> Option<&LeaderSlot> {
        let idx = self.0.partition_point(|entry| entry.slot <= current_slot);
        self.0.get(idx)
    }

    /// Flips every pending entry below `current_slot` to done.
    pub(crate) fn mark_completed(&mut self, current_slot: Slot) -> usize {
        let mut changed = 0;
        for entry in self.0.iter_mut() {
            if entry.slot < current_slot && entry.status == SlotStatus::Pending {
                entry.status = SlotStatus::Done;
                changed += 1;
            }
        }
        changed
    }
}

/// Builds the absolute schedule for `identity` and writes it to `store`.
///
/// Returns the epoch snapshot the schedule was anchored to alongside it.
///
/// The identity is checked before `epoch_info` is awaited, so a missing
/// validator never costs an RPC round trip and never touches the store.
pub async fn build_schedule<F>(
    raw: &RawLeaderSchedule,
    identity: &str,
    epoch_info: F,
    store: &JsonFileCache<Schedule>,
) -> Result<(Schedule, EpochInfo), MonitorError>
where
    F: std::future::Future<Output = Result<EpochInfo, MonitorError>>,
{
    let relative_slots = raw.slots_for(identity)?;
    let epoch_info = epoch_info.await?;

    let schedule = Schedule::from_relative(relative_slots, &epoch_info);
    store.store(&schedule)?;
    Ok((schedule, epoch_info))
}
