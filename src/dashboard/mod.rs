pub mod plain;
pub mod terminal;

use chrono::{DateTime, Local};

use crate::error::MonitorError;
use crate::progress::ProgressEstimate;
use crate::schedule::Slot;
use crate::stats::ProductionSummary;

pub use plain::PlainRenderer;
pub use terminal::TerminalDashboard;

#[derive(Debug, Clone, PartialEq)]
pub enum NextSlot {
    Upcoming(ProgressEstimate),
    /// Every leader slot of the epoch is behind us.
    Exhausted,
    /// Current slot was unavailable this cycle.
    Unknown,
}

/// One cycle's worth of data handed to a renderer.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub identity: String,
    pub epoch: u64,
    pub observed_at: DateTime<Local>,
    pub current_slot: Result<Slot, MonitorError>,
    pub pending: usize,
    pub done: usize,
    pub total: usize,
    pub production: Result<ProductionSummary, MonitorError>,
    pub next: NextSlot,
    pub slot_duration_secs: f64,
    pub slot_duration_estimated: bool,
}

pub trait Renderer {
    fn render(&mut self, view: &DashboardView) -> Result<(), MonitorError>;
}

/// Whole seconds as `H:MM:SS`, with a day prefix past 24 hours.
pub fn format_countdown(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 { seconds as u64 } else { 0 };
    let days = total / 86_400;
    let rem = total % 86_400;
    let hms = format!("{}:{:02}:{:02}", rem / 3600, (rem % 3600) / 60, rem % 60);
    match days {
        0 => hms,
        1 => format!("1 day, {}", hms),
        n => format!("{} days, {}", n, hms),
    }
}

impl DashboardView {
    /// Key/value lines shared by every renderer.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::with_capacity(9);
        rows.push((
            "current slot",
            match &self.current_slot {
                Ok(slot) => slot.to_string(),
                Err(e) => format!("Error: {}", e),
            },
        ));
        rows.push(("epoch", self.epoch.to_string()));
        rows.push(("pending | done", format!("{} | {}", self.pending, self.done)));
        rows.push((
            "skipped | produced | all",
            match &self.production {
                Ok(s) => format!(
                    "{} ({:.2}%) | {} | {}",
                    s.skipped, s.skipped_percentage, s.produced, s.total_leader_slots
                ),
                Err(e) => format!("Error: {}", e),
            },
        ));

        match &self.next {
            NextSlot::Upcoming(est) => {
                let next = match est.target_time {
                    Some(target) => {
                        format!("{} at {}", est.next_slot, target.format("%Y-%m-%d %H:%M:%S"))
                    }
                    None => est.next_slot.to_string(),
                };
                rows.push(("next leader slot", next));
                rows.push(("slots until next leader slot", est.slots_remaining.to_string()));
                rows.push((
                    "time until next leader slot",
                    format_countdown(est.seconds_until_next),
                ));
            }
            NextSlot::Exhausted => {
                rows.push(("next leader slot", "no upcoming leader slots found".to_string()))
            }
            NextSlot::Unknown => {
                rows.push(("next leader slot", "unknown (current slot unavailable)".to_string()))
            }
        }

        rows.push((
            "slot duration",
            format!(
                "{:.3}s ({})",
                self.slot_duration_secs,
                if self.slot_duration_estimated { "estimated" } else { "default" }
            ),
        ));
        rows
    }

    /// Progress toward the next leader slot, if it can be shown.
    pub fn progress(&self) -> Option<f64> {
        match &self.next {
            NextSlot::Upcoming(est) => est.fraction,
            _ => None,
        }
    }
}
