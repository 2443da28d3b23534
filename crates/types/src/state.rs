//! Persisted composite state

use crate::configuration::NetworkConfigurations;
use crate::details::NetworkDetails;
use crate::network_id::NetworkId;
use crate::networks::BuiltInNetwork;
use crate::provider::ProviderConfiguration;
use crate::status::NetworkStatus;
use serde::{Deserialize, Serialize};

/// The whole-value record written by the embedding persistence layer on
/// every store change, and accepted back at construction time.
///
/// Every field carries a serde default so partially restored state from
/// older versions still deserializes; unknown sibling fields are the
/// embedding layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkControllerState {
	pub provider: ProviderConfiguration,
	#[serde(rename = "previousProviderStore")]
	pub previous_provider: ProviderConfiguration,
	pub network_id: Option<NetworkId>,
	pub network_status: NetworkStatus,
	pub network_details: NetworkDetails,
	pub network_configurations: NetworkConfigurations,
}

impl Default for NetworkControllerState {
	fn default() -> Self {
		let provider = ProviderConfiguration::for_built_in(BuiltInNetwork::Mainnet);
		Self {
			previous_provider: provider.clone(),
			provider,
			network_id: None,
			network_status: NetworkStatus::default(),
			network_details: NetworkDetails::default(),
			network_configurations: NetworkConfigurations::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_state_mirrors_provider_into_previous() {
		let state = NetworkControllerState::default();
		assert_eq!(state.provider, state.previous_provider);
		assert_eq!(state.network_id, None);
		assert_eq!(state.network_status, NetworkStatus::Unknown);
	}

	#[test]
	fn partial_state_deserializes_with_defaults() {
		let state: NetworkControllerState =
			serde_json::from_str(r#"{"networkStatus":"available"}"#).unwrap();

		assert_eq!(state.network_status, NetworkStatus::Available);
		assert_eq!(state.network_id, None);
		assert_eq!(
			state.provider,
			ProviderConfiguration::for_built_in(BuiltInNetwork::Mainnet)
		);
	}

	#[test]
	fn persisted_shape_uses_wire_keys() {
		let state = NetworkControllerState::default();
		let value = serde_json::to_value(&state).unwrap();

		assert!(value.get("provider").is_some());
		assert!(value.get("previousProviderStore").is_some());
		assert!(value.get("networkDetails").is_some());
		assert!(value.get("networkConfigurations").is_some());
	}
}
