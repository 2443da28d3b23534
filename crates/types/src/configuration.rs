//! User-defined custom network configurations

use crate::chain_id::{ChainId, ChainIdError};
use crate::provider::RpcPrefs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for custom network configurations
#[derive(Error, Debug)]
pub enum NetworkConfigurationError {
	#[error(transparent)]
	ChainId(#[from] ChainIdError),

	#[error("Invalid RPC URL: {rpc_url} - {reason}")]
	InvalidRpcUrl { rpc_url: String, reason: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: &'static str },

	#[error("Network configuration not found: {id}")]
	NotFound { id: Uuid },
}

pub type NetworkConfigurationResult<T> = Result<T, NetworkConfigurationError>;

/// A user-defined network endpoint, keyed by URL and chain id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfiguration {
	pub id: Uuid,
	pub rpc_url: String,
	pub chain_id: ChainId,
	pub ticker: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nickname: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rpc_prefs: Option<RpcPrefs>,
}

impl NetworkConfiguration {
	/// Whether this entry answers for the given URL, compared
	/// case-insensitively.
	pub fn matches_rpc_url(&self, rpc_url: &str) -> bool {
		self.rpc_url.eq_ignore_ascii_case(rpc_url)
	}
}

/// Registry of custom networks, keyed by id.
///
/// Ids are unique by construction; `rpc_url` uniqueness (case-insensitive)
/// is enforced by the controller's upsert path.
pub type NetworkConfigurations = HashMap<Uuid, NetworkConfiguration>;
