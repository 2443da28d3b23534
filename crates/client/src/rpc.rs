//! JSON-RPC 2.0 envelope and error types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by a provider's `request`.
#[derive(Error, Debug)]
pub enum RpcError {
	/// The HTTP round-trip itself failed.
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	/// The endpoint answered with a JSON-RPC error object, or with a
	/// non-success HTTP status whose body is carried in `message`.
	#[error("RPC error {code}: {message}")]
	Rpc {
		code: i64,
		message: String,
		data: Option<Value>,
	},

	/// The endpoint answered 200 with a body that is not a JSON-RPC response.
	#[error("invalid RPC response: {0}")]
	InvalidResponse(String),
}

impl RpcError {
	pub fn code(&self) -> Option<i64> {
		match self {
			RpcError::Rpc { code, .. } => Some(*code),
			_ => None,
		}
	}

	pub fn rpc_message(&self) -> Option<&str> {
		match self {
			RpcError::Rpc { message, .. } => Some(message),
			_ => None,
		}
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
	pub jsonrpc: &'static str,
	pub id: u64,
	pub method: &'a str,
	pub params: &'a Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorBody {
	pub code: i64,
	pub message: String,
	#[serde(default)]
	pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
	#[serde(default)]
	pub result: Option<Value>,
	#[serde(default)]
	pub error: Option<JsonRpcErrorBody>,
}

/// The subset of an `eth_getBlockByNumber` header the controller inspects.
///
/// Remaining fields ride along in `extra` so nothing is lost when the header
/// is logged or forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
	#[serde(default)]
	pub number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base_fee_per_gas: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
