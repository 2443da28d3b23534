//! Provider trait and the HTTP JSON-RPC implementation

use crate::factory::ClientError;
use crate::rpc::{BlockHeader, JsonRpcRequest, JsonRpcResponse, RpcError};
use async_trait::async_trait;
use chainswitch_types::constants::RPC_PARSE_ERROR_CODE;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use url::Url;

/// An object exposing a JSON-RPC `request` method against a specific
/// endpoint.
#[async_trait]
pub trait Provider: Send + Sync {
	async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// Typed conveniences over raw `request`, available on every provider.
#[async_trait]
pub trait ProviderExt: Provider {
	/// `net_version`: the network's decimal-string identifier.
	async fn net_version(&self) -> Result<String, RpcError> {
		let result = self.request("net_version", json!([])).await?;
		result
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| RpcError::InvalidResponse(format!("net_version returned {result}")))
	}

	/// `eth_getBlockByNumber("latest", false)`: the head block header, if
	/// the node has one.
	async fn latest_block(&self) -> Result<Option<BlockHeader>, RpcError> {
		let result = self
			.request("eth_getBlockByNumber", json!(["latest", false]))
			.await?;
		if result.is_null() {
			return Ok(None);
		}
		serde_json::from_value(result)
			.map(Some)
			.map_err(|error| RpcError::InvalidResponse(format!("malformed block header: {error}")))
	}

	/// `eth_blockNumber`: the head block number as a hex quantity.
	async fn block_number(&self) -> Result<String, RpcError> {
		let result = self.request("eth_blockNumber", json!([])).await?;
		result
			.as_str()
			.map(str::to_string)
			.ok_or_else(|| RpcError::InvalidResponse(format!("eth_blockNumber returned {result}")))
	}
}

#[async_trait]
impl<P: Provider + ?Sized> ProviderExt for P {}

/// JSON-RPC over HTTP.
pub struct HttpProvider {
	client: Client,
	endpoint: Url,
	next_request_id: AtomicU64,
}

impl HttpProvider {
	pub fn new(endpoint: Url) -> Result<Self, ClientError> {
		let mut headers = HeaderMap::new();
		headers.insert("Content-Type", HeaderValue::from_static("application/json"));

		let client = Client::builder().default_headers(headers).build()?;

		Ok(Self {
			client,
			endpoint,
			next_request_id: AtomicU64::new(1),
		})
	}
}

#[async_trait]
impl Provider for HttpProvider {
	async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
		// The endpoint may embed a credential; log the method only.
		debug!(method, id, "dispatching JSON-RPC request");

		let envelope = JsonRpcRequest {
			jsonrpc: "2.0",
			id,
			method,
			params: &params,
		};

		let response = self
			.client
			.post(self.endpoint.clone())
			.json(&envelope)
			.send()
			.await?;
		let status = response.status();
		let body = response.text().await?;

		match serde_json::from_str::<JsonRpcResponse>(&body) {
			Ok(JsonRpcResponse {
				error: Some(error), ..
			}) => Err(RpcError::Rpc {
				code: error.code,
				message: error.message,
				data: error.data,
			}),
			Ok(JsonRpcResponse {
				result: Some(result),
				..
			}) => Ok(result),
			Ok(_) => Err(RpcError::InvalidResponse(format!(
				"response carried neither result nor error (HTTP {status})"
			))),
			// Endpoints that refuse service answer with a bare JSON or text
			// body; carry it so callers can classify.
			Err(_) if !status.is_success() => Err(RpcError::Rpc {
				code: RPC_PARSE_ERROR_CODE,
				message: body.trim().to_string(),
				data: None,
			}),
			Err(error) => Err(RpcError::InvalidResponse(format!(
				"unparseable response body: {error}"
			))),
		}
	}
}
