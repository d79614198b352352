use chrono::{DateTime, Local};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::client::ChainSource;
use crate::config::{is_plausible_slot_duration, MonitorConfig};
use crate::dashboard::{DashboardView, NextSlot, Renderer};
use crate::error::MonitorError;
use crate::progress;
use crate::schedule::{
    apply_current_slot, build_schedule, JsonFileCache, RawLeaderSchedule, Schedule, Slot,
    SlotStatus,
};
use crate::stats::ProductionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Polling,
    Rendering,
    Terminated,
}

/// State carried from one poll cycle to the next.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub schedule: Schedule,
    pub epoch: u64,
    pub slot_duration_secs: f64,
    pub slot_duration_estimated: bool,
    pub progress_anchor: DateTime<Local>,
    /// Next leader slot as seen by the previous cycle.
    pub target_slot: Option<Slot>,
}

impl MonitorState {
    pub fn new(
        schedule: Schedule,
        epoch: u64,
        slot_duration_secs: f64,
        slot_duration_estimated: bool,
        anchor: DateTime<Local>,
    ) -> Self {
        Self {
            schedule,
            epoch,
            slot_duration_secs,
            slot_duration_estimated,
            progress_anchor: anchor,
            target_slot: None,
        }
    }

    /// Moves the progress window forward for an observed `current_slot`.
    ///
    /// Once the slot targeted last cycle is reached the anchor jumps to `now`,
    /// so the bar restarts from zero toward the following leader slot.
    pub fn advance(&mut self, current_slot: Slot, now: DateTime<Local>) -> NextSlot {
        if let Some(target) = self.target_slot {
            if current_slot >= target {
                info!("Reached leader slot {} (current slot {})", target, current_slot);
                self.progress_anchor = now;
            }
        }

        match progress::estimate(
            &self.schedule,
            current_slot,
            self.slot_duration_secs,
            now,
            self.progress_anchor,
        ) {
            Some(estimate) => {
                self.target_slot = Some(estimate.next_slot);
                NextSlot::Upcoming(estimate)
            }
            None => {
                self.target_slot = None;
                NextSlot::Exhausted
            }
        }
    }
}

pub struct LeaderMonitor<S> {
    identity: String,
    source: S,
    calculated: JsonFileCache<Schedule>,
    poll_interval: Duration,
    state: MonitorState,
    phase: Phase,
}

impl<S: ChainSource> LeaderMonitor<S> {
    /// Loads or fetches the raw schedule, builds the absolute one and
    /// estimates the slot duration. Any error here except the duration
    /// estimate is fatal to the caller.
    pub async fn initialize(
        identity: String,
        source: S,
        config: &MonitorConfig,
        refresh_schedule: bool,
    ) -> Result<Self, MonitorError> {
        info!("Initializing leader monitor for {}", identity);
        let raw_cache = JsonFileCache::<RawLeaderSchedule>::new(&config.cache.raw_schedule_path);
        let calculated = JsonFileCache::<Schedule>::new(&config.cache.calculated_schedule_path);

        let fetch = || source.leader_schedule(&identity);
        let raw = if refresh_schedule {
            raw_cache.fetch_and_store(fetch).await?
        } else {
            raw_cache.load_or_fetch(fetch).await?
        };

        let (schedule, epoch_info) =
            build_schedule(&raw, &identity, source.epoch_info(), &calculated).await?;
        info!(
            "Epoch {} starts at slot {}; {} leader slot(s) scheduled",
            epoch_info.epoch,
            epoch_info.epoch_start_slot(),
            schedule.len()
        );

        let default_duration = config.poll.default_slot_duration_secs;
        let (slot_duration_secs, estimated) = match source.slot_duration().await {
            Ok(duration) if is_plausible_slot_duration(duration) => (duration, true),
            Ok(duration) => {
                warn!(
                    "Implausible slot duration {}, using default value of {} seconds",
                    duration, default_duration
                );
                (default_duration, false)
            }
            Err(e) => {
                warn!(
                    "Could not calculate slot duration ({}), using default value of {} seconds",
                    e, default_duration
                );
                (default_duration, false)
            }
        };

        Ok(Self {
            identity,
            source,
            calculated,
            poll_interval: Duration::from_secs(config.poll.interval_secs),
            state: MonitorState::new(
                schedule,
                epoch_info.epoch,
                slot_duration_secs,
                estimated,
                Local::now(),
            ),
            phase: Phase::Initializing,
        })
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// One refresh: observe the chain, update statuses and progress.
    ///
    /// Failures only degrade the returned view.
    pub async fn poll_cycle(&mut self, now: DateTime<Local>) -> DashboardView {
        self.phase = Phase::Polling;

        let current_slot = self.source.current_slot().await;
        if let Err(e) = &current_slot {
            warn!("Current slot unavailable: {}", e);
        }
        apply_current_slot(
            &mut self.state.schedule,
            current_slot.as_ref().ok().copied(),
            &self.calculated,
        );

        let production = self
            .source
            .block_production(&self.identity)
            .await
            .map(|p| ProductionSummary::derive(p, self.state.schedule.len()));
        if let Err(e) = &production {
            warn!("Error fetching block production: {}", e);
        }

        let next = match &current_slot {
            Ok(slot) => self.state.advance(*slot, now),
            Err(_) => NextSlot::Unknown,
        };
        debug!("Cycle at {}: {:?}", now, next);

        DashboardView {
            identity: self.identity.clone(),
            epoch: self.state.epoch,
            observed_at: now,
            current_slot,
            pending: self.state.schedule.count(SlotStatus::Pending),
            done: self.state.schedule.count(SlotStatus::Done),
            total: self.state.schedule.len(),
            production,
            next,
            slot_duration_secs: self.state.slot_duration_secs,
            slot_duration_estimated: self.state.slot_duration_estimated,
        }
    }

    /// Polls, then hands the view to `renderer`.
    pub async fn render_cycle(
        &mut self,
        renderer: &mut dyn Renderer,
        now: DateTime<Local>,
    ) -> Result<(), MonitorError> {
        let view = self.poll_cycle(now).await;
        self.phase = Phase::Rendering;
        renderer.render(&view)
    }

    /// Runs until Ctrl+C. The interrupt listener is registered before the
    /// first cycle, and an interrupt is honoured between cycles.
    pub async fn run(&mut self, renderer: &mut dyn Renderer) -> Result<(), MonitorError> {
        let mut interrupt = Interrupt::install()?;
        info!("Monitoring every {:?}", self.poll_interval);

        loop {
            self.render_cycle(renderer, Local::now()).await?;

            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                received = interrupt.recv() => {
                    self.phase = Phase::Terminated;
                    return match received {
                        Some(()) => {
                            info!("Interrupted, exiting");
                            Ok(())
                        }
                        None => Err(MonitorError::LocalIoFailure(
                            "Ctrl+C listener closed".to_string(),
                        )),
                    };
                }
            }
        }
    }
}

/// Ctrl+C listener. The OS handler is in place once `install` returns.
#[cfg(unix)]
struct Interrupt(tokio::signal::unix::Signal);

#[cfg(unix)]
impl Interrupt {
    fn install() -> Result<Self, MonitorError> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self(signal(SignalKind::interrupt())?))
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

#[cfg(windows)]
struct Interrupt(tokio::signal::windows::CtrlC);

#[cfg(windows)]
impl Interrupt {
    fn install() -> Result<Self, MonitorError> {
        Ok(Self(tokio::signal::windows::ctrl_c()?))
    }

    async fn recv(&mut self) -> Option<()> {
        self.0.recv().await
    }
}
