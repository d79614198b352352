use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// RPC call failed, timed out, or returned a payload we could not use.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// Cache file unreadable, unwritable, or holding corrupt JSON.
    #[error("Local I/O failure: {0}")]
    LocalIoFailure(String),
    #[error("Missing dependency: {0}")]
    DependencyMissing(String),
}

impl From<std::io::Error> for MonitorError {
    fn from(e: std::io::Error) -> Self {
        MonitorError::LocalIoFailure(e.to_string())
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(e: serde_json::Error) -> Self {
        MonitorError::LocalIoFailure(format!("invalid JSON: {}", e))
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(e: reqwest::Error) -> Self {
        MonitorError::UpstreamUnavailable(e.to_string())
    }
}
