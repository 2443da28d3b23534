//! Network client factory

use crate::block_tracker::{BlockTracker, PollingBlockTracker};
use crate::provider::{HttpProvider, Provider};
use chainswitch_types::constants::DEFAULT_POLLING_INTERVAL_MS;
use chainswitch_types::{BuiltInNetwork, ChainId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use url::Url;

/// Errors raised while assembling a network client.
#[derive(Error, Debug)]
pub enum ClientError {
	#[error("Invalid endpoint URL: {url} - {reason}")]
	InvalidEndpoint { url: String, reason: String },

	#[error("HTTP client error: {0}")]
	Http(#[from] reqwest::Error),
}

/// A provider plus the block tracker subscribed to it.
#[derive(Clone)]
pub struct NetworkClient {
	pub provider: Arc<dyn Provider>,
	pub block_tracker: Arc<dyn BlockTracker>,
}

/// What kind of endpoint to build a client for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkClientSpec {
	/// First-party hosted endpoint, credentialed by project id.
	BuiltIn {
		network: BuiltInNetwork,
		infura_project_id: String,
	},
	/// Generic HTTP JSON-RPC endpoint.
	Custom { rpc_url: String, chain_id: ChainId },
}

/// Seam between the controller and the client stack.
///
/// The factory is pure: the same spec yields an independent
/// provider/tracker pair on every call.
#[cfg_attr(test, mockall::automock)]
pub trait ClientFactory: Send + Sync {
	fn create_network_client(&self, spec: &NetworkClientSpec)
		-> Result<NetworkClient, ClientError>;
}

fn hosted_endpoint(network: BuiltInNetwork, infura_project_id: &str) -> Result<Url, ClientError> {
	let url = format!("https://{network}.infura.io/v3/{infura_project_id}");
	Url::parse(&url).map_err(|error| ClientError::InvalidEndpoint {
		url,
		reason: error.to_string(),
	})
}

/// Builds HTTP providers and polling block trackers.
pub struct HttpClientFactory {
	polling_interval: Duration,
}

impl HttpClientFactory {
	pub fn new() -> Self {
		Self {
			polling_interval: Duration::from_millis(DEFAULT_POLLING_INTERVAL_MS),
		}
	}

	pub fn with_polling_interval(mut self, interval: Duration) -> Self {
		self.polling_interval = interval;
		self
	}
}

impl Default for HttpClientFactory {
	fn default() -> Self {
		Self::new()
	}
}

impl ClientFactory for HttpClientFactory {
	fn create_network_client(
		&self,
		spec: &NetworkClientSpec,
	) -> Result<NetworkClient, ClientError> {
		let endpoint = match spec {
			NetworkClientSpec::BuiltIn {
				network,
				infura_project_id,
			} => {
				info!(network = %network, "building hosted network client");
				hosted_endpoint(*network, infura_project_id)?
			}
			NetworkClientSpec::Custom { rpc_url, chain_id } => {
				info!(chain_id = %chain_id, "building custom network client");
				Url::parse(rpc_url).map_err(|error| ClientError::InvalidEndpoint {
					url: rpc_url.clone(),
					reason: error.to_string(),
				})?
			}
		};

		let provider: Arc<dyn Provider> = Arc::new(HttpProvider::new(endpoint)?);
		let block_tracker: Arc<dyn BlockTracker> = Arc::new(PollingBlockTracker::new(
			Arc::clone(&provider),
			self.polling_interval,
		));

		Ok(NetworkClient {
			provider,
			block_tracker,
		})
	}
}
