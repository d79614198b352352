use tracing::{info, warn};

use super::{JsonFileCache, Schedule, Slot};

/// Marks leader slots that fell behind `current_slot` as done.
///
/// Without a current slot nothing changes and nothing is written. The
/// calculated snapshot is rewritten only when an entry actually flipped, and a
/// failed write is logged rather than returned: the in-memory schedule stays
/// authoritative for the rest of the run.
pub fn apply_current_slot(
    schedule: &mut Schedule,
    current_slot: Option<Slot>,
    store: &JsonFileCache<Schedule>,
) -> usize {
    let Some(current_slot) = current_slot else {
        warn!("Unable to get current slot, skipping status update");
        return 0;
    };

    let changed = schedule.mark_completed(current_slot);
    if changed > 0 {
        info!("{} leader slot(s) passed as of slot {}", changed, current_slot);
        if let Err(e) = store.store(schedule) {
            warn!("Failed to persist schedule to {}: {}", store.path().display(), e);
        }
    }
    changed
}
