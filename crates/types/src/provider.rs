//! Active provider configuration

use crate::chain_id::ChainId;
use crate::constants::DEFAULT_TICKER;
use crate::networks::{BuiltInNetwork, ProviderType};
use serde::{Deserialize, Serialize};

/// Optional per-network UI preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcPrefs {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block_explorer_url: Option<String>,
}

/// The configuration of the currently selected network.
///
/// When `kind` is [`ProviderType::Rpc`], `rpc_url` is required; when it is a
/// built-in network, `chain_id` equals the table value and `rpc_url` is unused.
/// The constructors enforce both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfiguration {
	#[serde(rename = "type")]
	pub kind: ProviderType,
	pub chain_id: ChainId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rpc_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ticker: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nickname: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rpc_prefs: Option<RpcPrefs>,
}

impl ProviderConfiguration {
	/// Configuration for a first-party hosted network, from the built-in table.
	pub fn for_built_in(network: BuiltInNetwork) -> Self {
		Self {
			kind: ProviderType::BuiltIn(network),
			chain_id: network.chain_id(),
			rpc_url: None,
			ticker: Some(network.ticker().to_string()),
			nickname: None,
			rpc_prefs: network.block_explorer_url().map(|url| RpcPrefs {
				block_explorer_url: Some(url.to_string()),
			}),
		}
	}

	/// Development default pointing at a local node.
	pub fn localhost() -> Self {
		Self {
			kind: ProviderType::Rpc,
			chain_id: ChainId::known("0x539"),
			rpc_url: Some("http://localhost:8545".to_string()),
			ticker: Some(DEFAULT_TICKER.to_string()),
			nickname: Some("Localhost 8545".to_string()),
			rpc_prefs: None,
		}
	}

	/// Configuration for a user-defined endpoint.
	pub fn for_custom(
		rpc_url: impl Into<String>,
		chain_id: ChainId,
		ticker: Option<String>,
		nickname: Option<String>,
		rpc_prefs: Option<RpcPrefs>,
	) -> Self {
		Self {
			kind: ProviderType::Rpc,
			chain_id,
			rpc_url: Some(rpc_url.into()),
			ticker,
			nickname,
			rpc_prefs,
		}
	}
}
