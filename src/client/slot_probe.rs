use std::io::ErrorKind;
use std::time::Duration;
use tokio::process::Command;

use crate::error::MonitorError;
use crate::schedule::Slot;

/// Reads the current absolute slot from an external CLI (`solana slot`).
pub struct CommandSlotProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSlotProbe {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self { program, args, timeout }
    }

    pub async fn current_slot(&self) -> Result<Slot, MonitorError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        let output = command.output();

        let output = match tokio::time::timeout(self.timeout, output).await {
            Err(_) => {
                return Err(MonitorError::UpstreamUnavailable(format!(
                    "'{}' timed out after {:?}",
                    self.program, self.timeout
                )))
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(MonitorError::DependencyMissing(format!(
                    "'{}' command not found, please ensure it is installed and in your PATH",
                    self.program
                )))
            }
            Ok(Err(e)) => {
                return Err(MonitorError::UpstreamUnavailable(format!(
                    "failed to run '{}': {}",
                    self.program, e
                )))
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(MonitorError::UpstreamUnavailable(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_slot(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_slot(stdout: &str) -> Result<Slot, MonitorError> {
    let trimmed = stdout.trim();
    trimmed.parse().map_err(|_| {
        MonitorError::UpstreamUnavailable(format!("unexpected slot output '{}'", trimmed))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(program: &str, args: &[&str]) -> CommandSlotProbe {
        CommandSlotProbe::new(
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("348125110\n").unwrap(), 348125110);
        assert!(parse_slot("Error: RPC request error").is_err());
        assert!(parse_slot("").is_err());
    }

    #[tokio::test]
    async fn test_reads_stdout() {
        let slot = probe("echo", &["123456"]).current_slot().await.unwrap();
        assert_eq!(slot, 123456);
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = probe("leader-monitor-no-such-binary", &["slot"])
            .current_slot()
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::DependencyMissing(_)));
    }

    #[tokio::test]
    async fn test_failing_program() {
        let err = probe("false", &[]).current_slot().await.unwrap_err();
        assert!(matches!(err, MonitorError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let probe = CommandSlotProbe::new(
            "sleep".to_string(),
            vec!["5".to_string()],
            Duration::from_millis(100),
        );
        let err = probe.current_slot().await.unwrap_err();
        assert!(matches!(err, MonitorError::UpstreamUnavailable(_)));
    }
}
