// RPC client for making JSON-RPC requests
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::error::MonitorError;
use crate::schedule::{EpochInfo, RawLeaderSchedule, Slot};
use crate::stats::BlockProduction;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub num_slots: u64,
    pub sample_period_secs: u64,
}

impl PerformanceSample {
    pub fn slot_duration_secs(&self) -> Result<f64, MonitorError> {
        if self.num_slots == 0 {
            return Err(MonitorError::UpstreamUnavailable(
                "performance sample contains no slots".to_string(),
            ));
        }
        Ok(self.sample_period_secs as f64 / self.num_slots as f64)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockProductionValue {
    by_identity: HashMap<String, BlockProduction>,
}

#[derive(Deserialize)]
struct RpcResponseContext<T> {
    value: T,
}

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, MonitorError> {
        Ok(Self {
            url,
            client: Client::builder().timeout(timeout).build()?,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // Helper for sending requests
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, MonitorError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        debug!("RPC {} (id {})", method, id);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                MonitorError::UpstreamUnavailable(format!("{} request failed: {}", method, e))
            })?
            .error_for_status()
            .map_err(|e| MonitorError::UpstreamUnavailable(format!("{}: {}", method, e)))?;

        let mut json: Value = response.json().await.map_err(|e| {
            MonitorError::UpstreamUnavailable(format!(
                "{}: failed to parse response: {}",
                method, e
            ))
        })?;

        if let Some(error) = json.get("error") {
            return Err(MonitorError::UpstreamUnavailable(format!(
                "{}: {}",
                method,
                error["message"].as_str().unwrap_or("Unknown error")
            )));
        }

        match json.get_mut("result").map(Value::take) {
            Some(Value::Null) | None => Err(MonitorError::UpstreamUnavailable(format!(
                "{}: empty result",
                method
            ))),
            Some(result) => Ok(result),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, MonitorError> {
        let result = self.send_request(method, params).await?;
        serde_json::from_value(result).map_err(|e| {
            MonitorError::UpstreamUnavailable(format!("{}: malformed result: {}", method, e))
        })
    }

    /// Current-epoch leader schedule, filtered server-side to `identity`.
    pub async fn get_leader_schedule(
        &self,
        identity: &str,
    ) -> Result<RawLeaderSchedule, MonitorError> {
        self.call("getLeaderSchedule", json!([null, { "identity": identity }]))
            .await
    }

    pub async fn get_epoch_info(&self) -> Result<EpochInfo, MonitorError> {
        self.call("getEpochInfo", json!([])).await
    }

    pub async fn get_block_production(
        &self,
        identity: &str,
    ) -> Result<BlockProduction, MonitorError> {
        let context: RpcResponseContext<BlockProductionValue> = self
            .call("getBlockProduction", json!([{ "identity": identity }]))
            .await?;
        context
            .value
            .by_identity
            .get(identity)
            .copied()
            .ok_or_else(|| MonitorError::NotFound(format!("no block production for {}", identity)))
    }

    pub async fn get_recent_performance_sample(&self) -> Result<PerformanceSample, MonitorError> {
        let samples: Vec<PerformanceSample> =
            self.call("getRecentPerformanceSamples", json!([1])).await?;
        samples.into_iter().next().ok_or_else(|| {
            MonitorError::UpstreamUnavailable("no recent performance samples".to_string())
        })
    }

    pub async fn get_slot(&self) -> Result<Slot, MonitorError> {
        self.call("getSlot", json!([])).await
    }
}

#[cfg(test)]
mod tests {
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> RpcClient {
        RpcClient::new(server.url("/"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_epoch_info() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/").body_includes("\"getEpochInfo\"");
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "absoluteSlot": 166598,
                        "blockHeight": 166500,
                        "epoch": 27,
                        "slotIndex": 2790,
                        "slotsInEpoch": 8192,
                        "transactionCount": 22661093
                    }
                }));
            })
            .await;

        let info = client(&server).get_epoch_info().await.unwrap();
        mock.assert_async().await;
        assert_eq!(info, EpochInfo { absolute_slot: 166598, slot_index: 2790, epoch: 27 });
    }

    #[tokio::test]
    async fn test_get_leader_schedule() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .body_includes("\"getLeaderSchedule\"")
                    .body_includes("4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F");
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F": [0, 1, 2, 3] }
                }));
            })
            .await;

        let raw = client(&server)
            .get_leader_schedule("4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F")
            .await
            .unwrap();
        assert_eq!(
            raw.slots_for("4Qkev8aNZcqFNSRhQzwyLMFSsi94jHqE8WNVTJzTP99F").unwrap(),
            &[0, 1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_null_leader_schedule_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "jsonrpc": "2.0", "id": 1, "result": null }));
            })
            .await;

        let err = client(&server).get_leader_schedule("Nobody").await.unwrap_err();
        assert!(matches!(err, MonitorError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_get_block_production() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_includes("\"getBlockProduction\"");
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "context": { "slot": 9887 },
                        "value": {
                            "byIdentity": { "Validator1": [9888, 9886] },
                            "range": { "firstSlot": 0, "lastSlot": 9887 }
                        }
                    }
                }));
            })
            .await;

        let rpc = client(&server);
        let production = rpc.get_block_production("Validator1").await.unwrap();
        assert_eq!(production, BlockProduction::from([9888, 9886]));

        let err = rpc.get_block_production("Validator2").await.unwrap_err();
        assert!(matches!(err, MonitorError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_performance_sample_duration() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).body_includes("\"getRecentPerformanceSamples\"");
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": [{
                        "numSlots": 150,
                        "numTransactions": 1000,
                        "samplePeriodSecs": 60,
                        "slot": 348125
                    }]
                }));
            })
            .await;

        let sample = client(&server).get_recent_performance_sample().await.unwrap();
        assert!((sample.slot_duration_secs().unwrap() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sample_has_no_duration() {
        let sample = PerformanceSample { num_slots: 0, sample_period_secs: 60 };
        assert!(sample.slot_duration_secs().is_err());
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32601, "message": "Method not found" }
                }));
            })
            .await;

        let err = client(&server).get_slot().await.unwrap_err();
        assert_eq!(
            err,
            MonitorError::UpstreamUnavailable("getSlot: Method not found".to_string())
        );
    }

    #[tokio::test]
    async fn test_http_failure_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503);
            })
            .await;

        let err = client(&server).get_epoch_info().await.unwrap_err();
        assert!(matches!(err, MonitorError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "absoluteSlot": "x" }
                }));
            })
            .await;

        let err = client(&server).get_epoch_info().await.unwrap_err();
        assert!(matches!(err, MonitorError::UpstreamUnavailable(_)));
    }
}
