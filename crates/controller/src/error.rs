//! Error types for controller operations

use chainswitch_client::ClientError;
use chainswitch_types::configuration::NetworkConfigurationError;
use chainswitch_types::networks::ProviderTypeError;
use thiserror::Error;

/// Failures surfaced synchronously from user-initiated controller calls.
///
/// Probe failures never appear here; they are classified into the network
/// status instead.
#[derive(Error, Debug)]
pub enum NetworkControllerError {
	#[error("An Infura project id is required")]
	InvalidInfuraProjectId,

	#[error(transparent)]
	ProviderType(#[from] ProviderTypeError),

	#[error(transparent)]
	Configuration(#[from] NetworkConfigurationError),

	#[error(transparent)]
	Client(#[from] ClientError),
}
