//! Built-in network table and provider type

use crate::chain_id::ChainId;
use crate::constants::DEFAULT_TICKER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProviderTypeError {
	#[error("Unknown built-in network: {shortname}")]
	UnknownShortname { shortname: String },

	#[error("\"rpc\" is not a built-in network; activate a network configuration instead")]
	RpcIsNotBuiltIn,
}

/// The closed set of first-party hosted networks, keyed by shortname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuiltInNetwork {
	Mainnet,
	Goerli,
	Sepolia,
	LineaGoerli,
	LineaMainnet,
}

impl BuiltInNetwork {
	pub const ALL: [BuiltInNetwork; 5] = [
		BuiltInNetwork::Mainnet,
		BuiltInNetwork::Goerli,
		BuiltInNetwork::Sepolia,
		BuiltInNetwork::LineaGoerli,
		BuiltInNetwork::LineaMainnet,
	];

	/// The shortname used in hosted endpoint URLs and persisted state.
	pub fn as_str(&self) -> &'static str {
		match self {
			BuiltInNetwork::Mainnet => "mainnet",
			BuiltInNetwork::Goerli => "goerli",
			BuiltInNetwork::Sepolia => "sepolia",
			BuiltInNetwork::LineaGoerli => "linea-goerli",
			BuiltInNetwork::LineaMainnet => "linea-mainnet",
		}
	}

	pub fn chain_id(&self) -> ChainId {
		match self {
			BuiltInNetwork::Mainnet => ChainId::known("0x1"),
			BuiltInNetwork::Goerli => ChainId::known("0x5"),
			BuiltInNetwork::Sepolia => ChainId::known("0xaa36a7"),
			BuiltInNetwork::LineaGoerli => ChainId::known("0xe704"),
			BuiltInNetwork::LineaMainnet => ChainId::known("0xe708"),
		}
	}

	/// Currency ticker, falling back to ETH where the network defines none.
	pub fn ticker(&self) -> &'static str {
		match self {
			BuiltInNetwork::Mainnet => DEFAULT_TICKER,
			BuiltInNetwork::Goerli => "GoerliETH",
			BuiltInNetwork::Sepolia => "SepoliaETH",
			BuiltInNetwork::LineaGoerli => "LineaETH",
			BuiltInNetwork::LineaMainnet => DEFAULT_TICKER,
		}
	}

	pub fn block_explorer_url(&self) -> Option<&'static str> {
		match self {
			BuiltInNetwork::Mainnet => Some("https://etherscan.io"),
			BuiltInNetwork::Goerli => Some("https://goerli.etherscan.io"),
			BuiltInNetwork::Sepolia => Some("https://sepolia.etherscan.io"),
			BuiltInNetwork::LineaGoerli => Some("https://goerli.lineascan.build"),
			BuiltInNetwork::LineaMainnet => Some("https://lineascan.build"),
		}
	}
}

impl fmt::Display for BuiltInNetwork {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for BuiltInNetwork {
	type Err = ProviderTypeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"mainnet" => Ok(BuiltInNetwork::Mainnet),
			"goerli" => Ok(BuiltInNetwork::Goerli),
			"sepolia" => Ok(BuiltInNetwork::Sepolia),
			"linea-goerli" => Ok(BuiltInNetwork::LineaGoerli),
			"linea-mainnet" => Ok(BuiltInNetwork::LineaMainnet),
			"rpc" => Err(ProviderTypeError::RpcIsNotBuiltIn),
			other => Err(ProviderTypeError::UnknownShortname {
				shortname: other.to_string(),
			}),
		}
	}
}

impl From<BuiltInNetwork> for String {
	fn from(network: BuiltInNetwork) -> Self {
		network.as_str().to_string()
	}
}

impl TryFrom<String> for BuiltInNetwork {
	type Error = ProviderTypeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// Which kind of endpoint the active provider points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderType {
	/// A first-party hosted endpoint keyed by shortname.
	BuiltIn(BuiltInNetwork),
	/// A user-defined endpoint keyed by URL and chain id.
	Rpc,
}

impl ProviderType {
	pub fn is_built_in(&self) -> bool {
		matches!(self, ProviderType::BuiltIn(_))
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			ProviderType::BuiltIn(network) => network.as_str(),
			ProviderType::Rpc => "rpc",
		}
	}
}

impl fmt::Display for ProviderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<ProviderType> for String {
	fn from(provider_type: ProviderType) -> Self {
		provider_type.as_str().to_string()
	}
}

impl TryFrom<String> for ProviderType {
	type Error = ProviderTypeError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		if value == "rpc" {
			return Ok(ProviderType::Rpc);
		}
		Ok(ProviderType::BuiltIn(value.parse()?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn shortnames_round_trip() {
		for network in BuiltInNetwork::ALL {
			assert_eq!(network.as_str().parse::<BuiltInNetwork>(), Ok(network));
		}
	}

	#[test]
	fn rpc_is_rejected_as_shortname() {
		assert_eq!(
			"rpc".parse::<BuiltInNetwork>(),
			Err(ProviderTypeError::RpcIsNotBuiltIn)
		);
		assert!(matches!(
			"ropsten".parse::<BuiltInNetwork>(),
			Err(ProviderTypeError::UnknownShortname { .. })
		));
	}

	#[test]
	fn chain_ids_match_the_table() {
		assert_eq!(BuiltInNetwork::Mainnet.chain_id().as_str(), "0x1");
		assert_eq!(BuiltInNetwork::Sepolia.chain_id().to_u64(), 11155111);
	}

	#[test]
	fn provider_type_serializes_as_shortname() {
		let mainnet = ProviderType::BuiltIn(BuiltInNetwork::Mainnet);
		assert_eq!(serde_json::to_string(&mainnet).unwrap(), "\"mainnet\"");
		assert_eq!(serde_json::to_string(&ProviderType::Rpc).unwrap(), "\"rpc\"");

		let parsed: ProviderType = serde_json::from_str("\"linea-goerli\"").unwrap();
		assert_eq!(
			parsed,
			ProviderType::BuiltIn(BuiltInNetwork::LineaGoerli)
		);
	}
}
