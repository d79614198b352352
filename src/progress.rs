use chrono::{DateTime, Duration, Local};

use crate::schedule::{Schedule, Slot};

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEstimate {
    pub next_slot: Slot,
    pub slots_remaining: u64,
    pub seconds_until_next: f64,
    /// Wall-clock estimate of when `next_slot` is produced, `None` when it
    /// falls outside the representable date range.
    pub target_time: Option<DateTime<Local>>,
    /// `None` when the anchor is at or past the target, or there is no target.
    pub fraction: Option<f64>,
}

/// Share of the anchor..target window already elapsed, clamped to [0, 1].
pub fn progress_fraction(elapsed_secs: f64, total_secs: f64) -> Option<f64> {
    if total_secs > 0.0 && elapsed_secs.is_finite() && total_secs.is_finite() {
        Some((elapsed_secs / total_secs).clamp(0.0, 1.0))
    } else {
        None
    }
}

fn seconds_between(from: DateTime<Local>, to: DateTime<Local>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

/// `now + seconds`, or `None` if the offset does not fit a `DateTime`.
fn offset_by(now: DateTime<Local>, seconds: f64) -> Option<DateTime<Local>> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = Duration::try_milliseconds(millis as i64)?;
    now.checked_add_signed(delta)
}

/// Estimates progress toward the first leader slot after `current_slot`.
///
/// Returns `None` when the schedule has no upcoming slots.
pub fn estimate(
    schedule: &Schedule,
    current_slot: Slot,
    slot_duration_secs: f64,
    now: DateTime<Local>,
    anchor: DateTime<Local>,
) -> Option<ProgressEstimate> {
    let next = schedule.next_after(current_slot)?;
    let slots_remaining = next.slot - current_slot;
    let seconds_until_next = slots_remaining as f64 * slot_duration_secs;
    let target_time = offset_by(now, seconds_until_next);

    let fraction = target_time.and_then(|target| {
        progress_fraction(seconds_between(anchor, now), seconds_between(anchor, target))
    });

    Some(ProgressEstimate {
        next_slot: next.slot,
        slots_remaining,
        seconds_until_next,
        target_time,
        fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::EpochInfo;

    fn schedule() -> Schedule {
        let info = EpochInfo { absolute_slot: 1000, slot_index: 100, epoch: 1 };
        Schedule::from_relative(&[3, 5, 10], &info)
    }

    #[test]
    fn test_fraction_bounds() {
        assert_eq!(progress_fraction(5.0, 10.0), Some(0.5));
        assert_eq!(progress_fraction(0.0, 10.0), Some(0.0));
        assert_eq!(progress_fraction(15.0, 10.0), Some(1.0));
        assert_eq!(progress_fraction(-3.0, 10.0), Some(0.0));
        assert_eq!(progress_fraction(1.0, 0.0), None);
        assert_eq!(progress_fraction(1.0, -4.0), None);
        assert_eq!(progress_fraction(f64::NAN, 4.0), None);
    }

    #[test]
    fn test_estimate_next_slot() {
        let now = Local::now();
        let anchor = now - Duration::seconds(6);

        let est = estimate(&schedule(), 905, 0.4, now, anchor).unwrap();
        assert_eq!(est.next_slot, 910);
        assert_eq!(est.slots_remaining, 5);
        assert!((est.seconds_until_next - 2.0).abs() < 1e-9);
        assert_eq!(est.target_time, Some(now + Duration::seconds(2)));
        // 6s elapsed of an 8s window
        assert!((est.fraction.unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_none_past_schedule() {
        let now = Local::now();
        assert_eq!(estimate(&schedule(), 910, 0.4, now, now), None);
        assert_eq!(estimate(&Schedule::default(), 0, 0.4, now, now), None);
    }

    #[test]
    fn test_fresh_anchor_starts_at_zero() {
        let now = Local::now();
        let est = estimate(&schedule(), 900, 0.4, now, now).unwrap();
        assert_eq!(est.fraction, Some(0.0));
    }

    #[test]
    fn test_zero_duration_is_indeterminate() {
        let now = Local::now();
        let est = estimate(&schedule(), 900, 0.0, now, now).unwrap();
        assert_eq!(est.fraction, None);
    }

    #[test]
    fn test_huge_duration_has_no_target() {
        let now = Local::now();
        let est = estimate(&schedule(), 900, 1e18, now, now).unwrap();
        assert_eq!(est.next_slot, 903);
        assert_eq!(est.target_time, None);
        assert_eq!(est.fraction, None);

        let est = estimate(&schedule(), 900, f64::INFINITY, now, now).unwrap();
        assert_eq!(est.target_time, None);
        assert_eq!(est.fraction, None);
    }

    #[test]
    fn test_anchor_in_future_clamps() {
        let now = Local::now();
        let anchor = now + Duration::seconds(1);
        let est = estimate(&schedule(), 900, 0.4, now, anchor).unwrap();
        // window is 0.2s long after the skewed anchor, none of it elapsed
        assert_eq!(est.fraction, Some(0.0));

        let far_anchor = now + Duration::seconds(60);
        let est = estimate(&schedule(), 900, 0.4, now, far_anchor).unwrap();
        assert_eq!(est.fraction, None);
    }
}
