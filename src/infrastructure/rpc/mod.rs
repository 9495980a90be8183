//! JSON-RPC chain client

use alloy_primitives::U256;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::application::errors::RpcError;
use crate::domain::entities::ChainAddress;
use crate::domain::traits::ChainReader;

/// Block tag used for account queries
const LATEST: &str = "latest";

/// Ethereum-style JSON-RPC client
pub struct RpcClient {
    endpoint: String,
    client: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    /// Issue one call and return the raw `result` value
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!("RPC {} (id {})", method, request.id);

        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Network(format!("status: {}, body: {}", status, body)));
        }

        let data: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(error) = data.error {
            return Err(RpcError::Node {
                code: error.code,
                message: error.message,
            });
        }

        data.result
            .ok_or_else(|| RpcError::InvalidResponse(format!("No result for {}", method)))
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<U256, RpcError> {
        let result = self.call(method, params).await?;
        let hex = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("Expected hex string, got {}", result)))?;
        parse_quantity(hex)
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize, Debug)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize, Debug)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Decode a `0x`-prefixed hex quantity
pub fn parse_quantity(hex: &str) -> Result<U256, RpcError> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .ok_or_else(|| RpcError::InvalidResponse(format!("Missing 0x prefix: {}", hex)))?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidResponse(format!("Invalid hex quantity: {}", hex)));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|_| RpcError::InvalidResponse(format!("Quantity out of range: {}", hex)))
}

fn to_u64(value: U256) -> Result<u64, RpcError> {
    u64::try_from(value)
        .map_err(|_| RpcError::InvalidResponse(format!("Quantity out of range: {}", value)))
}

#[async_trait]
impl ChainReader for RpcClient {
    async fn get_balance(&self, address: &ChainAddress) -> Result<U256, RpcError> {
        self.call_quantity("eth_getBalance", json!([address.as_str(), LATEST])).await
    }

    async fn get_gas_price(&self) -> Result<U256, RpcError> {
        self.call_quantity("eth_gasPrice", json!([])).await
    }

    async fn get_transaction_count(&self, address: &ChainAddress) -> Result<u64, RpcError> {
        let count = self
            .call_quantity("eth_getTransactionCount", json!([address.as_str(), LATEST]))
            .await?;
        to_u64(count)
    }

    async fn get_block_number(&self) -> Result<u64, RpcError> {
        let height = self.call_quantity("eth_blockNumber", json!([])).await?;
        to_u64(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_result(server: &MockServer, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "jsonrpc": "2.0", "method": rpc_method })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result })),
            )
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> RpcClient {
        RpcClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x3039").unwrap(), U256::from(12345u64));
        assert_eq!(
            parse_quantity("0xDE0B6B3A7640000").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("3039").is_err());
        assert!(parse_quantity("0x+1").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_parse_quantity_full_uint256_range() {
        let two_pow_128 = format!("0x1{}", "0".repeat(32));
        assert_eq!(parse_quantity(&two_pow_128).unwrap(), U256::from(1u8) << 128usize);

        let max = format!("0x{}", "f".repeat(64));
        assert_eq!(parse_quantity(&max).unwrap(), U256::MAX);

        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(matches!(parse_quantity(&too_wide), Err(RpcError::InvalidResponse(_))));
    }

    #[test]
    fn test_counts_must_fit_u64() {
        assert_eq!(to_u64(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert!(to_u64(U256::from(u64::MAX) + U256::from(1u8)).is_err());
    }

    #[tokio::test]
    async fn test_get_balance() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_getBalance",
                "params": ["0xabc", "latest"]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": "0xde0b6b3a7640000" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let balance = client(&server).get_balance(&ChainAddress::new("0xabc")).await.unwrap();
        assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_gas_price_and_block_number() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_gasPrice", json!("0x4a817c800")).await;
        mock_result(&server, "eth_blockNumber", json!("0x3039")).await;
        mock_result(&server, "eth_getTransactionCount", json!("0x7")).await;

        let rpc = client(&server);
        assert_eq!(rpc.get_gas_price().await.unwrap(), U256::from(20_000_000_000u64));
        assert_eq!(rpc.get_block_number().await.unwrap(), 12345);
        assert_eq!(
            rpc.get_transaction_count(&ChainAddress::new("0xabc")).await.unwrap(),
            7
        );
    }

    #[tokio::test]
    async fn test_node_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "invalid address" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_balance(&ChainAddress::new("0xBAD"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RpcError::Node {
                code: -32602,
                message: "invalid address".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = client(&server).get_block_number().await.unwrap_err();
        assert!(matches!(err, RpcError::Network(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_malformed_result() {
        let server = MockServer::start().await;
        mock_result(&server, "eth_blockNumber", json!(12345)).await;

        let err = client(&server).get_block_number().await.unwrap_err();
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout_reports_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": "0x1" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri(), Duration::from_millis(200)).unwrap();
        let err = rpc.get_gas_price().await.unwrap_err();
        assert!(matches!(err, RpcError::Network(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let rpc = RpcClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(matches!(rpc.get_block_number().await, Err(RpcError::Network(_))));
    }
}
