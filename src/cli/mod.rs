use clap::Parser;

use crate::config::MonitorConfig;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

#[derive(Parser, Debug)]
#[command(name = "leader_monitor")]
#[command(about = "Solana leader schedule monitor", long_about = None)]
pub struct Cli {
    /// Validator identity public key
    #[arg(short = 'i', long, value_parser = parse_identity)]
    pub identity: String,
    /// Path to the TOML config file (created with defaults if missing)
    #[arg(short = 'c', long, default_value = "leader_monitor.toml")]
    pub config: String,
    /// Override the JSON-RPC endpoint from the config file
    #[arg(long)]
    pub rpc_url: Option<String>,
    /// Fetch the leader schedule again even if a cached copy exists
    #[arg(long)]
    pub refresh_schedule: bool,
    /// Print plain lines instead of the full-screen dashboard
    #[arg(long)]
    pub plain: bool,
}

impl Cli {
    pub fn apply_overrides(&self, config: &mut MonitorConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
    }
}

/// Accepts base58 strings of public-key length (32..=44 characters).
pub fn parse_identity(value: &str) -> Result<String, String> {
    let value = value.trim();
    if !(32..=44).contains(&value.len()) {
        return Err(format!(
            "expected a base58 public key of 32-44 characters, got {}",
            value.len()
        ));
    }
    if let Some(bad) = value.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(format!("'{}' is not a base58 character", bad));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: &str = "4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F";

    #[test]
    fn test_parse_identity() {
        assert_eq!(parse_identity(IDENTITY).unwrap(), IDENTITY);
        assert!(parse_identity("short").is_err());
        assert!(parse_identity("0Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F").is_err());
        assert!(parse_identity("lQkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F").is_err());
    }

    #[test]
    fn test_identity_is_required() {
        assert!(Cli::try_parse_from(["leader_monitor"]).is_err());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "leader_monitor",
            "-i",
            IDENTITY,
            "--rpc-url",
            "http://127.0.0.1:8899",
            "--plain",
        ])
        .unwrap();
        assert_eq!(cli.identity, IDENTITY);
        assert_eq!(cli.config, "leader_monitor.toml");
        assert!(cli.plain);
        assert!(!cli.refresh_schedule);

        let mut config = MonitorConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.rpc.url, "http://127.0.0.1:8899");
    }

    #[test]
    fn test_no_override_keeps_config() {
        let cli =
            Cli::try_parse_from(["leader_monitor", "--identity", IDENTITY, "--refresh-schedule"])
                .unwrap();
        assert!(cli.refresh_schedule);

        let mut config = MonitorConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config, MonitorConfig::default());
    }
}
