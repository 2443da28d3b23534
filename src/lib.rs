//! Chainswitch
//!
//! The network-connection subsystem of a wallet backend: a single,
//! swappable live connection to a blockchain JSON-RPC endpoint, lifecycle
//! management across user-initiated network switches, and authoritative
//! status publication for the rest of the application.

pub mod mocks;

pub use chainswitch_client::{
	BlockHeader, BlockTracker, BlockTrackerProxy, ClientError, ClientFactory, EventEmitter,
	EventFilter, HttpClientFactory, HttpProvider, Listener, ListenerId, NetworkClient,
	NetworkClientSpec, Provider, ProviderExt, ProviderProxy, RpcError, ERROR_EVENT, LATEST_EVENT,
};
pub use chainswitch_controller::{
	Messenger, NetworkController, NetworkControllerError, NetworkControllerOptions, NetworkEvent,
	NewNetworkConfiguration, ProviderHandles, RestrictedMessenger, SubscriptionId,
	UpsertNetworkOptions,
};
pub use chainswitch_store::{ComposedStore, ObservableStore, Subscription};
pub use chainswitch_types::{
	BuiltInNetwork, ChainId, ChainIdError, MetricsEvent, MetricsEventCategory,
	MetricsEventReferrer, NetworkConfiguration, NetworkConfigurations, NetworkControllerState,
	NetworkDetails, NetworkId, NetworkStatus, ProviderConfiguration, ProviderType, RpcPrefs,
	TrackEventFn,
};

use std::sync::Arc;

/// Namespace the controller's events are published under.
pub const CONTROLLER_NAMESPACE: &str = "NetworkController";

/// Composition-root helper wiring a controller onto a fresh bus.
///
/// The embedding application owns the returned [`Messenger`] and hands the
/// controller out to its subsystems; the controller is explicitly
/// constructed and explicitly destroyed, never a module global.
pub struct ControllerBuilder {
	state: Option<NetworkControllerState>,
	infura_project_id: String,
	track_event: Option<TrackEventFn>,
	factory: Option<Arc<dyn ClientFactory>>,
}

impl ControllerBuilder {
	pub fn new() -> Self {
		Self {
			state: None,
			infura_project_id: String::new(),
			track_event: None,
			factory: None,
		}
	}

	/// Restore previously persisted state.
	pub fn with_state(mut self, state: NetworkControllerState) -> Self {
		self.state = Some(state);
		self
	}

	/// Credential for first-party hosted endpoints. Required.
	pub fn with_infura_project_id(mut self, infura_project_id: impl Into<String>) -> Self {
		self.infura_project_id = infura_project_id.into();
		self
	}

	/// Analytics sink; defaults to a drop-everything sink.
	pub fn with_track_event(mut self, track_event: TrackEventFn) -> Self {
		self.track_event = Some(track_event);
		self
	}

	/// Client factory override; defaults to [`HttpClientFactory`].
	pub fn with_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
		self.factory = Some(factory);
		self
	}

	/// Construct the controller and the bus it publishes on.
	///
	/// No network activity happens until
	/// [`NetworkController::initialize_provider`] is called.
	pub fn build(self) -> Result<(NetworkController, Messenger), NetworkControllerError> {
		let messenger = Messenger::new();
		let controller = NetworkController::new(NetworkControllerOptions {
			messenger: messenger.restrict(CONTROLLER_NAMESPACE),
			state: self.state,
			infura_project_id: self.infura_project_id,
			track_event: self.track_event.unwrap_or_else(|| Arc::new(|_| {})),
			factory: self
				.factory
				.unwrap_or_else(|| Arc::new(HttpClientFactory::new())),
		})?;
		tracing::info!("network controller constructed");
		Ok((controller, messenger))
	}
}

impl Default for ControllerBuilder {
	fn default() -> Self {
		Self::new()
	}
}
