use serde::{Deserialize, Serialize};

/// Longest slot duration accepted from the config file or the node.
pub const MAX_SLOT_DURATION_SECS: f64 = 60.0;

pub fn is_plausible_slot_duration(secs: f64) -> bool {
    secs.is_finite() && secs > 0.0 && secs <= MAX_SLOT_DURATION_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct MonitorConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub slot_probe: SlotProbeConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RpcConfig {
    pub url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Where the current absolute slot comes from each cycle.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotSource {
    /// Run an external command (`solana slot`) and parse its stdout.
    Cli,
    /// Ask the RPC node with `getSlot`.
    Rpc,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlotProbeConfig {
    pub source: SlotSource,
    pub command: String,
    #[serde(default = "default_probe_args")]
    pub args: Vec<String>,
}

fn default_probe_args() -> Vec<String> {
    vec!["slot".to_string()]
}

impl Default for SlotProbeConfig {
    fn default() -> Self {
        Self {
            source: SlotSource::Cli,
            command: "solana".to_string(),
            args: default_probe_args(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PollConfig {
    pub interval_secs: u64,
    /// Used when the slot duration cannot be estimated from performance samples.
    pub default_slot_duration_secs: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            default_slot_duration_secs: 0.4,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    pub raw_schedule_path: String,
    pub calculated_schedule_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            raw_schedule_path: "leader_schedule.json".to_string(),
            calculated_schedule_path: "leader_schedule_calculated.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub log_level: String,
    pub log_file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: "leader_monitor.log".to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn load_or_default(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            match std::fs::read_to_string(path) {
                Ok(s) => match toml::from_str::<Self>(&s) {
                    Ok(c) => c.validated(),
                    Err(e) => {
                        eprintln!("Error parsing config: {}. Using defaults.", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    eprintln!("Error reading config: {}. Using defaults.", e);
                    Self::default()
                }
            }
        } else {
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            config
        }
    }

    /// Replaces values the monitor cannot work with by their defaults.
    fn validated(mut self) -> Self {
        let duration = self.poll.default_slot_duration_secs;
        if !is_plausible_slot_duration(duration) {
            let fallback = PollConfig::default().default_slot_duration_secs;
            eprintln!(
                "Invalid poll.default_slot_duration_secs {} (expected 0 < x <= {}). Using {}.",
                duration, MAX_SLOT_DURATION_SECS, fallback
            );
            self.poll.default_slot_duration_secs = fallback;
        }
        self
    }
}
