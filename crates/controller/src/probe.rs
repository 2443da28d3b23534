//! Probe outcome classification

use chainswitch_client::{BlockHeader, RpcError};
use chainswitch_types::constants::{BLOCKED_REGION_SENTINEL, RPC_INTERNAL_ERROR_CODE};
use chainswitch_types::{NetworkId, NetworkStatus};
use serde_json::Value;
use tracing::warn;

/// What a concluded probe determined about the active network.
#[derive(Debug, PartialEq)]
pub(crate) struct ProbeOutcome {
	pub status: NetworkStatus,
	pub network_id: Option<NetworkId>,
	pub eip1559: Option<bool>,
}

impl ProbeOutcome {
	fn degraded(status: NetworkStatus) -> Self {
		Self {
			status,
			network_id: None,
			eip1559: None,
		}
	}
}

/// Classify the paired probe results into exactly one status.
pub(crate) fn classify_probe(
	version: Result<String, RpcError>,
	block: Result<Option<BlockHeader>, RpcError>,
) -> ProbeOutcome {
	match (version, block) {
		(Ok(version), Ok(block)) => match NetworkId::new(version) {
			Ok(network_id) => ProbeOutcome {
				status: NetworkStatus::Available,
				network_id: Some(network_id),
				eip1559: Some(
					block
						.map(|header| header.base_fee_per_gas.is_some())
						.unwrap_or(false),
				),
			},
			Err(error) => {
				warn!(%error, "probe succeeded but returned an unusable network id");
				ProbeOutcome::degraded(NetworkStatus::Unknown)
			}
		},
		(Err(error), _) | (_, Err(error)) => classify_error(&error),
	}
}

fn classify_error(error: &RpcError) -> ProbeOutcome {
	if is_blocked_error(error) {
		return ProbeOutcome::degraded(NetworkStatus::Blocked);
	}
	match error {
		RpcError::Rpc { code, .. } if *code == RPC_INTERNAL_ERROR_CODE => {
			ProbeOutcome::degraded(NetworkStatus::Unknown)
		}
		RpcError::Rpc { .. } | RpcError::Transport(_) => {
			ProbeOutcome::degraded(NetworkStatus::Unavailable)
		}
		RpcError::InvalidResponse(body) => {
			warn!(body = %body, "probe error could not be classified");
			ProbeOutcome::degraded(NetworkStatus::Unknown)
		}
	}
}

/// A hosted endpoint refusing service for the user's region answers with a
/// body that JSON-parses to `{"error": "countryBlocked"}`.
fn is_blocked_error(error: &RpcError) -> bool {
	let Some(message) = error.rpc_message() else {
		return false;
	};
	let Ok(parsed) = serde_json::from_str::<Value>(message) else {
		return false;
	};
	parsed
		.as_object()
		.and_then(|body| body.get("error"))
		.and_then(Value::as_str)
		== Some(BLOCKED_REGION_SENTINEL)
}
