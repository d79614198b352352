// Client module
pub mod rpc_client;
pub mod slot_probe;

use async_trait::async_trait;
use std::time::Duration;

use crate::config::{MonitorConfig, SlotSource};
use crate::error::MonitorError;
use crate::schedule::{EpochInfo, RawLeaderSchedule, Slot};
use crate::stats::BlockProduction;

pub use rpc_client::{PerformanceSample, RpcClient};
pub use slot_probe::CommandSlotProbe;

/// Everything the monitor reads from the outside world.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn leader_schedule(&self, identity: &str) -> Result<RawLeaderSchedule, MonitorError>;
    async fn epoch_info(&self) -> Result<EpochInfo, MonitorError>;
    async fn block_production(&self, identity: &str) -> Result<BlockProduction, MonitorError>;
    /// Seconds per slot from the most recent performance sample.
    async fn slot_duration(&self) -> Result<f64, MonitorError>;
    async fn current_slot(&self) -> Result<Slot, MonitorError>;
}

/// JSON-RPC node plus the configured current-slot source.
pub struct NodeSource {
    rpc: RpcClient,
    slot_source: SlotSource,
    probe: CommandSlotProbe,
}

impl NodeSource {
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let timeout = Duration::from_secs(config.rpc.request_timeout_secs);
        Ok(Self {
            rpc: RpcClient::new(config.rpc.url.clone(), timeout)?,
            slot_source: config.slot_probe.source,
            probe: CommandSlotProbe::new(
                config.slot_probe.command.clone(),
                config.slot_probe.args.clone(),
                timeout,
            ),
        })
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc.url()
    }
}

#[async_trait]
impl ChainSource for NodeSource {
    async fn leader_schedule(&self, identity: &str) -> Result<RawLeaderSchedule, MonitorError> {
        self.rpc.get_leader_schedule(identity).await
    }

    async fn epoch_info(&self) -> Result<EpochInfo, MonitorError> {
        self.rpc.get_epoch_info().await
    }

    async fn block_production(&self, identity: &str) -> Result<BlockProduction, MonitorError> {
        self.rpc.get_block_production(identity).await
    }

    async fn slot_duration(&self) -> Result<f64, MonitorError> {
        self.rpc.get_recent_performance_sample().await?.slot_duration_secs()
    }

    async fn current_slot(&self) -> Result<Slot, MonitorError> {
        match self.slot_source {
            SlotSource::Cli => self.probe.current_slot().await,
            SlotSource::Rpc => self.rpc.get_slot().await,
        }
    }
}
