//! Network controller
//!
//! Owns the observable stores, the live provider/block-tracker pair and
//! their swappable proxies, and the probe state machine that classifies
//! each newly selected network.

use crate::error::NetworkControllerError;
use crate::messenger::{NetworkEvent, RestrictedMessenger};
use crate::probe;
use chainswitch_client::{
	BlockTrackerProxy, ClientError, ClientFactory, EventFilter, NetworkClient, NetworkClientSpec,
	ProviderExt, ProviderProxy,
};
use chainswitch_store::{ComposedStore, ObservableStore};
use chainswitch_types::configuration::NetworkConfigurationError;
use chainswitch_types::{
	ChainId, MetricsEvent, MetricsEventCategory, MetricsEventReferrer, NetworkConfiguration,
	NetworkConfigurations, NetworkControllerState, NetworkDetails, NetworkId, NetworkStatus,
	ProviderConfiguration, ProviderType, RpcPrefs, TrackEventFn,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Construction inputs for [`NetworkController::new`].
pub struct NetworkControllerOptions {
	/// The controller's namespaced view of the application bus.
	pub messenger: RestrictedMessenger,
	/// Restored state, or `None` for profile defaults.
	pub state: Option<NetworkControllerState>,
	/// Credential for first-party hosted endpoints. Must be non-empty.
	pub infura_project_id: String,
	/// Sink for controller-originated analytics events.
	pub track_event: TrackEventFn,
	/// Builds provider/block-tracker pairs; injected so tests can script
	/// the network.
	pub factory: Arc<dyn ClientFactory>,
}

/// The swappable handles long-lived subscribers hold.
///
/// Both are `None` until the first [`NetworkController::initialize_provider`]
/// call; afterwards their identities are stable across every switch.
#[derive(Clone)]
pub struct ProviderHandles {
	pub provider: Option<Arc<ProviderProxy>>,
	pub block_tracker: Option<Arc<BlockTrackerProxy>>,
}

/// Fields accepted by [`NetworkController::upsert_network_configuration`].
///
/// `chain_id` arrives as a raw string so validation failures surface from
/// the upsert call itself.
#[derive(Debug, Clone)]
pub struct NewNetworkConfiguration {
	pub rpc_url: String,
	pub chain_id: String,
	pub ticker: String,
	pub nickname: Option<String>,
	pub rpc_prefs: Option<RpcPrefs>,
}

#[derive(Debug, Clone)]
pub struct UpsertNetworkOptions {
	/// Switch to the upserted network once it is registered.
	pub set_active: bool,
	/// Where in the application the addition originated.
	pub referrer: String,
	/// How the user triggered it.
	pub source: String,
}

struct ControllerInner {
	messenger: RestrictedMessenger,
	factory: Arc<dyn ClientFactory>,
	infura_project_id: String,
	track_event: TrackEventFn,

	provider_store: ObservableStore<ProviderConfiguration>,
	previous_provider_store: ObservableStore<ProviderConfiguration>,
	network_id_store: ObservableStore<Option<NetworkId>>,
	network_status_store: ObservableStore<NetworkStatus>,
	network_details_store: ObservableStore<NetworkDetails>,
	network_configurations_store: ObservableStore<NetworkConfigurations>,
	composed: ComposedStore,

	client: Mutex<Option<NetworkClient>>,
	provider_proxy: Mutex<Option<Arc<ProviderProxy>>>,
	block_tracker_proxy: Mutex<Option<Arc<BlockTrackerProxy>>>,
}

/// The network controller. Cheap to clone; clones share one instance.
///
/// Strictly single-active-network: building the client for a new selection
/// drops the prior pair, and subscribers follow along through the proxies.
#[derive(Clone)]
pub struct NetworkController {
	inner: Arc<ControllerInner>,
}

fn default_provider_config() -> ProviderConfiguration {
	if cfg!(feature = "integration-test") {
		ProviderConfiguration::localhost()
	} else if cfg!(debug_assertions) {
		ProviderConfiguration::for_built_in(chainswitch_types::BuiltInNetwork::Goerli)
	} else {
		ProviderConfiguration::for_built_in(chainswitch_types::BuiltInNetwork::Mainnet)
	}
}

impl NetworkController {
	pub fn new(options: NetworkControllerOptions) -> Result<Self, NetworkControllerError> {
		if options.infura_project_id.trim().is_empty() {
			return Err(NetworkControllerError::InvalidInfuraProjectId);
		}

		let state = options.state.unwrap_or_else(|| NetworkControllerState {
			provider: default_provider_config(),
			previous_provider: default_provider_config(),
			..NetworkControllerState::default()
		});

		let provider_store = ObservableStore::new(state.provider.clone());
		// the previous-provider slot mirrors the active provider at
		// construction, whatever was persisted
		let previous_provider_store = ObservableStore::new(state.provider.clone());
		let network_id_store = ObservableStore::new(state.network_id.clone());
		let network_status_store = ObservableStore::new(state.network_status);
		let network_details_store = ObservableStore::new(state.network_details.clone());
		let network_configurations_store =
			ObservableStore::new(state.network_configurations.clone());

		let composed = ComposedStore::new();
		composed.add_child("provider", &provider_store);
		composed.add_child("previousProviderStore", &previous_provider_store);
		composed.add_child("networkId", &network_id_store);
		composed.add_child("networkStatus", &network_status_store);
		composed.add_child("networkDetails", &network_details_store);
		composed.add_child("networkConfigurations", &network_configurations_store);

		Ok(Self {
			inner: Arc::new(ControllerInner {
				messenger: options.messenger,
				factory: options.factory,
				infura_project_id: options.infura_project_id,
				track_event: options.track_event,
				provider_store,
				previous_provider_store,
				network_id_store,
				network_status_store,
				network_details_store,
				network_configurations_store,
				composed,
				client: Mutex::new(None),
				provider_proxy: Mutex::new(None),
				block_tracker_proxy: Mutex::new(None),
			}),
		})
	}

	/// Build the client for the current configuration, install the proxies,
	/// and run the first probe.
	///
	/// Idempotent: calling twice is equivalent to calling once with the
	/// latest configuration.
	pub async fn initialize_provider(&self) -> Result<(), NetworkControllerError> {
		let config = self.inner.provider_store.get_state();
		info!(kind = %config.kind, chain_id = %config.chain_id, "initializing provider");
		self.configure_client(&config)?;
		self.lookup_network().await;
		Ok(())
	}

	/// The proxies long-lived subscribers should hold. `None` before the
	/// first `initialize_provider`.
	pub fn get_provider_and_block_tracker(&self) -> ProviderHandles {
		ProviderHandles {
			provider: self.provider_proxy(),
			block_tracker: self
				.inner
				.block_tracker_proxy
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner())
				.clone(),
		}
	}

	/// Whether the active network supports EIP-1559 fee mechanics.
	///
	/// Memoizing: an already-probed answer is returned as-is. With no
	/// provider this reports `false` without touching state; callers
	/// depend on that shape.
	pub async fn get_eip1559_compatibility(
		&self,
	) -> Result<bool, chainswitch_client::RpcError> {
		if let Some(supported) = self.inner.network_details_store.get_state().eip1559() {
			return Ok(supported);
		}
		let Some(provider) = self.provider_proxy() else {
			return Ok(false);
		};

		let block = provider.latest_block().await?;
		let supported = block
			.map(|header| header.base_fee_per_gas.is_some())
			.unwrap_or(false);
		self.inner
			.network_details_store
			.update_state(|details| details.set_eip1559(supported));
		Ok(supported)
	}

	/// Probe the live network and classify the outcome.
	///
	/// If the active network changes while the probe's round-trips are in
	/// flight, the stale results are discarded without publishing; the
	/// switch that invalidated them has already queued a fresh probe.
	pub async fn lookup_network(&self) {
		let config = self.inner.provider_store.get_state();
		let Some(provider) = self.provider_proxy() else {
			warn!("network lookup requested before a provider exists; resetting derived state");
			self.reset_derived_state();
			return;
		};
		let is_built_in = config.kind.is_built_in();

		let network_changed = Arc::new(AtomicBool::new(false));
		let changed_flag = Arc::clone(&network_changed);
		let subscription = self
			.inner
			.messenger
			.subscribe_once(NetworkEvent::NetworkDidChange, move || {
				changed_flag.store(true, Ordering::SeqCst);
			});

		debug!(chain_id = %config.chain_id, "probing active network");
		let (version, block) = futures::join!(provider.net_version(), provider.latest_block());
		let outcome = probe::classify_probe(version, block);

		if network_changed.load(Ordering::SeqCst) {
			debug!("network changed while the probe was in flight; discarding results");
			return;
		}
		self.inner
			.messenger
			.unsubscribe(NetworkEvent::NetworkDidChange, subscription);

		self.inner.network_status_store.put_state(outcome.status);
		if outcome.status == NetworkStatus::Available {
			self.inner.network_id_store.put_state(outcome.network_id);
			if let Some(supported) = outcome.eip1559 {
				self.inner
					.network_details_store
					.update_state(|details| details.set_eip1559(supported));
			}
		} else {
			self.inner.network_id_store.put_state(None);
			self.inner
				.network_details_store
				.put_state(NetworkDetails::default());
		}

		match (is_built_in, outcome.status) {
			(true, NetworkStatus::Available) => {
				self.inner.messenger.publish(NetworkEvent::InfuraIsUnblocked);
			}
			(true, NetworkStatus::Blocked) => {
				self.inner.messenger.publish(NetworkEvent::InfuraIsBlocked);
			}
			(true, _) => {}
			// a custom endpoint cannot be region-blocked; always clear any
			// latched blocked state from a prior hosted connection
			(false, _) => {
				self.inner.messenger.publish(NetworkEvent::InfuraIsUnblocked);
			}
		}
	}

	/// Activate a registered custom network. Returns its RPC URL.
	pub fn set_active_network(&self, id: Uuid) -> Result<String, NetworkControllerError> {
		let configurations = self.inner.network_configurations_store.get_state();
		let configuration = configurations
			.get(&id)
			.ok_or(NetworkConfigurationError::NotFound { id })?;

		let rpc_url = configuration.rpc_url.clone();
		let provider_config = ProviderConfiguration::for_custom(
			configuration.rpc_url.clone(),
			configuration.chain_id.clone(),
			Some(configuration.ticker.clone()),
			configuration.nickname.clone(),
			configuration.rpc_prefs.clone(),
		);

		info!(%id, "activating custom network");
		self.set_provider_config(provider_config)?;
		Ok(rpc_url)
	}

	/// Switch to a built-in network by shortname.
	///
	/// `"rpc"` is rejected; custom networks go through
	/// [`NetworkController::set_active_network`].
	pub fn set_provider_type(&self, shortname: &str) -> Result<(), NetworkControllerError> {
		let network: chainswitch_types::BuiltInNetwork = shortname.parse()?;
		info!(network = %network, "switching to built-in network");
		self.set_provider_config(ProviderConfiguration::for_built_in(network))
	}

	/// Re-apply the current configuration, forcing a fresh client pair and
	/// a fresh probe.
	pub fn reset_connection(&self) -> Result<(), NetworkControllerError> {
		let config = self.inner.provider_store.get_state();
		info!(kind = %config.kind, "resetting connection");
		self.switch_network(config)
	}

	/// Return to the previously selected network.
	///
	/// The current configuration is not snapshotted first, so rolling back
	/// a rollback does not oscillate.
	pub fn rollback_to_previous_provider(&self) -> Result<(), NetworkControllerError> {
		let previous = self.inner.previous_provider_store.get_state();
		info!(kind = %previous.kind, "rolling back to previous provider");
		self.inner.provider_store.put_state(previous.clone());
		self.switch_network(previous)
	}

	/// Insert or update a custom network, keyed case-insensitively by URL.
	///
	/// Returns the configuration's id: the existing one when the URL is
	/// already registered, a fresh one otherwise. The analytics sink is
	/// invoked only for first-time insertions.
	pub fn upsert_network_configuration(
		&self,
		update: NewNetworkConfiguration,
		options: UpsertNetworkOptions,
	) -> Result<Uuid, NetworkControllerError> {
		let chain_id =
			ChainId::new(update.chain_id).map_err(NetworkConfigurationError::ChainId)?;
		Url::parse(&update.rpc_url).map_err(|error| {
			NetworkConfigurationError::InvalidRpcUrl {
				rpc_url: update.rpc_url.clone(),
				reason: error.to_string(),
			}
		})?;
		if update.ticker.trim().is_empty() {
			return Err(NetworkConfigurationError::MissingRequiredField { field: "ticker" }.into());
		}
		if options.referrer.trim().is_empty() {
			return Err(
				NetworkConfigurationError::MissingRequiredField { field: "referrer" }.into(),
			);
		}
		if options.source.trim().is_empty() {
			return Err(NetworkConfigurationError::MissingRequiredField { field: "source" }.into());
		}

		let configurations = self.inner.network_configurations_store.get_state();
		let existing_id = configurations
			.values()
			.find(|configuration| configuration.matches_rpc_url(&update.rpc_url))
			.map(|configuration| configuration.id);
		let id = existing_id.unwrap_or_else(Uuid::new_v4);

		let configuration = NetworkConfiguration {
			id,
			rpc_url: update.rpc_url,
			chain_id: chain_id.clone(),
			ticker: update.ticker.clone(),
			nickname: update.nickname,
			rpc_prefs: update.rpc_prefs,
		};
		self.inner
			.network_configurations_store
			.update_state(|configurations| {
				configurations.insert(id, configuration);
			});

		if existing_id.is_none() {
			info!(%id, "custom network added");
			let mut properties = serde_json::Map::new();
			properties.insert("chain_id".to_string(), json!(chain_id.as_str()));
			properties.insert("symbol".to_string(), json!(update.ticker));
			properties.insert("source".to_string(), json!(options.source));
			(self.inner.track_event)(MetricsEvent {
				event: "Custom Network Added".to_string(),
				category: MetricsEventCategory::Network,
				referrer: MetricsEventReferrer {
					url: options.referrer,
				},
				properties,
			});
		}

		if options.set_active {
			self.set_active_network(id)?;
		}
		Ok(id)
	}

	/// Remove a custom network by id; a no-op when absent.
	///
	/// Does not switch away when the removed network is active; that
	/// coordination belongs to the caller.
	pub fn remove_network_configuration(&self, id: Uuid) {
		self.inner
			.network_configurations_store
			.update_state(|configurations| {
				configurations.remove(&id);
			});
	}

	/// Stop the block tracker's polling task. In-flight requests are not
	/// aborted.
	pub async fn destroy(&self) -> Result<(), ClientError> {
		let block_tracker = self
			.inner
			.client
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.as_ref()
			.map(|client| Arc::clone(&client.block_tracker));
		if let Some(block_tracker) = block_tracker {
			block_tracker.destroy().await?;
		}
		Ok(())
	}

	/// Snapshot of the persisted composite state.
	pub fn state(&self) -> NetworkControllerState {
		NetworkControllerState {
			provider: self.inner.provider_store.get_state(),
			previous_provider: self.inner.previous_provider_store.get_state(),
			network_id: self.inner.network_id_store.get_state(),
			network_status: self.inner.network_status_store.get_state(),
			network_details: self.inner.network_details_store.get_state(),
			network_configurations: self.inner.network_configurations_store.get_state(),
		}
	}

	/// The composed store the persistence layer subscribes to.
	pub fn store(&self) -> ComposedStore {
		self.inner.composed.clone()
	}

	/// Chain id of the active configuration.
	pub fn chain_id(&self) -> ChainId {
		self.inner.provider_store.get_state().chain_id
	}

	/// Stable identifier of the active endpoint: the shortname for
	/// built-in networks, the RPC URL for custom ones.
	pub fn network_identifier(&self) -> String {
		let config = self.inner.provider_store.get_state();
		match config.kind {
			ProviderType::BuiltIn(network) => network.as_str().to_string(),
			ProviderType::Rpc => config.rpc_url.unwrap_or_else(|| "rpc".to_string()),
		}
	}

	fn provider_proxy(&self) -> Option<Arc<ProviderProxy>> {
		self.inner
			.provider_proxy
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	fn reset_derived_state(&self) {
		self.inner.network_id_store.put_state(None);
		self.inner
			.network_status_store
			.put_state(NetworkStatus::Unknown);
		self.inner
			.network_details_store
			.put_state(NetworkDetails::default());
	}

	fn client_spec(
		&self,
		config: &ProviderConfiguration,
	) -> Result<NetworkClientSpec, NetworkControllerError> {
		match config.kind {
			ProviderType::BuiltIn(network) => Ok(NetworkClientSpec::BuiltIn {
				network,
				infura_project_id: self.inner.infura_project_id.clone(),
			}),
			ProviderType::Rpc => {
				let rpc_url = config.rpc_url.clone().ok_or(
					NetworkConfigurationError::MissingRequiredField { field: "rpcUrl" },
				)?;
				Ok(NetworkClientSpec::Custom {
					rpc_url,
					chain_id: config.chain_id.clone(),
				})
			}
		}
	}

	/// Build the client pair for `config` and point the proxies at it,
	/// creating them on the first call. The prior pair is dropped.
	fn configure_client(
		&self,
		config: &ProviderConfiguration,
	) -> Result<(), NetworkControllerError> {
		let spec = self.client_spec(config)?;
		let client = self.inner.factory.create_network_client(&spec)?;

		{
			let mut provider_proxy = self
				.inner
				.provider_proxy
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner());
			match provider_proxy.as_ref() {
				Some(proxy) => proxy.set_target(Arc::clone(&client.provider)),
				None => *provider_proxy = Some(ProviderProxy::new(Arc::clone(&client.provider))),
			}
		}
		{
			let mut block_tracker_proxy = self
				.inner
				.block_tracker_proxy
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner());
			match block_tracker_proxy.as_ref() {
				Some(proxy) => proxy.set_target(Arc::clone(&client.block_tracker)),
				None => {
					*block_tracker_proxy = Some(BlockTrackerProxy::new(
						Arc::clone(&client.block_tracker),
						EventFilter::SkipInternal,
					))
				}
			}
		}

		*self
			.inner
			.client
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(client);
		Ok(())
	}

	/// Snapshot the current configuration into the previous-provider slot,
	/// install the new one, and run the switch sequence.
	fn set_provider_config(
		&self,
		config: ProviderConfiguration,
	) -> Result<(), NetworkControllerError> {
		let current = self.inner.provider_store.get_state();
		self.inner.previous_provider_store.put_state(current);
		self.inner.provider_store.put_state(config.clone());
		self.switch_network(config)
	}

	/// The switch sequence: announce, reset derived state, reinstall the
	/// client behind the proxies, announce completion, then probe.
	///
	/// Must run inside a Tokio runtime; the probe is spawned, not awaited.
	fn switch_network(&self, config: ProviderConfiguration) -> Result<(), NetworkControllerError> {
		self.inner.messenger.publish(NetworkEvent::NetworkWillChange);
		self.reset_derived_state();
		self.configure_client(&config)?;
		self.inner.messenger.publish(NetworkEvent::NetworkDidChange);

		let controller = self.clone();
		tokio::spawn(async move {
			controller.lookup_network().await;
		});
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::messenger::Messenger;
	use async_trait::async_trait;
	use chainswitch_client::{
		BlockTracker, EventEmitter, Listener, ListenerId, Provider, RpcError,
	};
	use chainswitch_types::BuiltInNetwork;
	use serde_json::Value;
	use std::collections::HashMap;

	/// Provider answering from a fixed method table.
	struct TableProvider {
		answers: HashMap<&'static str, Value>,
	}

	#[async_trait]
	impl Provider for TableProvider {
		async fn request(&self, method: &str, _params: Value) -> Result<Value, RpcError> {
			self.answers
				.get(method)
				.cloned()
				.ok_or_else(|| RpcError::InvalidResponse(format!("no answer for {method}")))
		}
	}

	struct ManualTracker {
		emitter: EventEmitter,
	}

	#[async_trait]
	impl BlockTracker for ManualTracker {
		fn on(&self, event: &str, listener: Listener) -> ListenerId {
			self.emitter.on(event, listener)
		}

		fn once(&self, event: &str, listener: Listener) -> ListenerId {
			self.emitter.once(event, listener)
		}

		fn off(&self, event: &str, id: ListenerId) -> bool {
			self.emitter.off(event, id)
		}

		fn latest_block(&self) -> Option<String> {
			None
		}

		async fn destroy(&self) -> Result<(), ClientError> {
			Ok(())
		}
	}

	/// Factory handing out table providers, recording each requested spec.
	struct TableFactory {
		answers: HashMap<&'static str, Value>,
		specs: Mutex<Vec<NetworkClientSpec>>,
	}

	impl TableFactory {
		fn healthy_mainnet_like() -> Self {
			let mut answers = HashMap::new();
			answers.insert("net_version", json!("1"));
			answers.insert(
				"eth_getBlockByNumber",
				json!({ "number": "0x1", "baseFeePerGas": "0x1" }),
			);
			Self {
				answers,
				specs: Mutex::new(Vec::new()),
			}
		}
	}

	impl ClientFactory for TableFactory {
		fn create_network_client(
			&self,
			spec: &NetworkClientSpec,
		) -> Result<NetworkClient, ClientError> {
			self.specs.lock().unwrap().push(spec.clone());
			Ok(NetworkClient {
				provider: Arc::new(TableProvider {
					answers: self.answers.clone(),
				}),
				block_tracker: Arc::new(ManualTracker {
					emitter: EventEmitter::new(),
				}),
			})
		}
	}

	struct Harness {
		controller: NetworkController,
		tracked: Arc<Mutex<Vec<MetricsEvent>>>,
	}

	fn harness_with_factory(factory: Arc<dyn ClientFactory>) -> Harness {
		let messenger = Messenger::new().restrict("NetworkController");
		let tracked = Arc::new(Mutex::new(Vec::new()));
		let tracked_by_sink = Arc::clone(&tracked);
		let controller = NetworkController::new(NetworkControllerOptions {
			messenger,
			state: None,
			infura_project_id: "test-project".to_string(),
			track_event: Arc::new(move |event| {
				tracked_by_sink.lock().unwrap().push(event);
			}),
			factory,
		})
		.unwrap();
		Harness {
			controller,
			tracked,
		}
	}

	fn harness() -> Harness {
		harness_with_factory(Arc::new(TableFactory::healthy_mainnet_like()))
	}

	fn custom_network_update() -> NewNetworkConfiguration {
		NewNetworkConfiguration {
			rpc_url: "https://rpc.example.test/".to_string(),
			chain_id: "0x539".to_string(),
			ticker: "TST".to_string(),
			nickname: None,
			rpc_prefs: None,
		}
	}

	fn upsert_options(set_active: bool) -> UpsertNetworkOptions {
		UpsertNetworkOptions {
			set_active,
			referrer: "wallet".to_string(),
			source: "ui".to_string(),
		}
	}

	#[test]
	fn construction_requires_a_project_id() {
		let messenger = Messenger::new().restrict("NetworkController");
		let result = NetworkController::new(NetworkControllerOptions {
			messenger,
			state: None,
			infura_project_id: "  ".to_string(),
			track_event: Arc::new(|_| {}),
			factory: Arc::new(TableFactory::healthy_mainnet_like()),
		});

		assert!(matches!(
			result,
			Err(NetworkControllerError::InvalidInfuraProjectId)
		));
	}

	#[test]
	fn proxies_are_absent_before_initialization() {
		let harness = harness();
		let handles = harness.controller.get_provider_and_block_tracker();

		assert!(handles.provider.is_none());
		assert!(handles.block_tracker.is_none());
	}

	#[tokio::test]
	async fn initialization_probes_and_populates_derived_state() {
		let harness = harness();
		harness.controller.initialize_provider().await.unwrap();

		let state = harness.controller.state();
		assert_eq!(state.network_status, NetworkStatus::Available);
		assert_eq!(state.network_id, Some(NetworkId::new("1").unwrap()));
		assert_eq!(state.network_details.eip1559(), Some(true));

		let handles = harness.controller.get_provider_and_block_tracker();
		assert!(handles.provider.is_some());
		assert!(handles.block_tracker.is_some());
	}

	#[tokio::test]
	async fn proxy_identities_are_stable_across_switches() {
		let harness = harness();
		harness.controller.initialize_provider().await.unwrap();
		let before = harness.controller.get_provider_and_block_tracker();

		harness.controller.set_provider_type("sepolia").unwrap();
		let after = harness.controller.get_provider_and_block_tracker();

		assert!(Arc::ptr_eq(
			&before.provider.unwrap(),
			&after.provider.unwrap()
		));
		assert!(Arc::ptr_eq(
			&before.block_tracker.unwrap(),
			&after.block_tracker.unwrap()
		));
	}

	#[test]
	fn set_provider_type_rejects_rpc_and_unknown_names() {
		let harness = harness();

		assert!(matches!(
			harness.controller.set_provider_type("rpc"),
			Err(NetworkControllerError::ProviderType(
				chainswitch_types::ProviderTypeError::RpcIsNotBuiltIn
			))
		));
		assert!(matches!(
			harness.controller.set_provider_type("ropsten"),
			Err(NetworkControllerError::ProviderType(
				chainswitch_types::ProviderTypeError::UnknownShortname { .. }
			))
		));
	}

	#[tokio::test]
	async fn set_provider_type_snapshots_the_prior_configuration() {
		let harness = harness();
		let initial = harness.controller.state().provider;

		harness.controller.set_provider_type("sepolia").unwrap();

		let state = harness.controller.state();
		assert_eq!(
			state.provider.kind,
			ProviderType::BuiltIn(BuiltInNetwork::Sepolia)
		);
		assert_eq!(state.previous_provider, initial);
	}

	#[test]
	fn set_active_network_requires_a_registered_id() {
		let harness = harness();
		let result = harness.controller.set_active_network(Uuid::new_v4());

		assert!(matches!(
			result,
			Err(NetworkControllerError::Configuration(
				NetworkConfigurationError::NotFound { .. }
			))
		));
	}

	#[tokio::test]
	async fn upsert_validates_inputs_before_mutating() {
		let harness = harness();

		let mut bad_chain = custom_network_update();
		bad_chain.chain_id = "539".to_string();
		assert!(harness
			.controller
			.upsert_network_configuration(bad_chain, upsert_options(false))
			.is_err());

		let mut bad_url = custom_network_update();
		bad_url.rpc_url = "not a url".to_string();
		assert!(harness
			.controller
			.upsert_network_configuration(bad_url, upsert_options(false))
			.is_err());

		let mut no_ticker = custom_network_update();
		no_ticker.ticker = String::new();
		assert!(harness
			.controller
			.upsert_network_configuration(no_ticker, upsert_options(false))
			.is_err());

		let mut no_referrer = upsert_options(false);
		no_referrer.referrer = String::new();
		assert!(harness
			.controller
			.upsert_network_configuration(custom_network_update(), no_referrer)
			.is_err());

		assert!(harness.controller.state().network_configurations.is_empty());
		assert!(harness.tracked.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn upsert_reuses_the_id_for_case_insensitive_url_matches() {
		let harness = harness();

		let mut first = custom_network_update();
		first.rpc_url = "https://Foo.example.test/".to_string();
		let first_id = harness
			.controller
			.upsert_network_configuration(first, upsert_options(false))
			.unwrap();

		let mut second = custom_network_update();
		second.rpc_url = "https://foo.example.test/".to_string();
		second.ticker = "NEW".to_string();
		let second_id = harness
			.controller
			.upsert_network_configuration(second, upsert_options(false))
			.unwrap();

		assert_eq!(first_id, second_id);
		let configurations = harness.controller.state().network_configurations;
		assert_eq!(configurations.len(), 1);
		assert_eq!(configurations[&first_id].ticker, "NEW");
		// analytics fire only for the first insertion
		assert_eq!(harness.tracked.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn upsert_with_set_active_switches_to_the_new_network() {
		let harness = harness();

		let id = harness
			.controller
			.upsert_network_configuration(custom_network_update(), upsert_options(true))
			.unwrap();

		let state = harness.controller.state();
		assert_eq!(state.provider.kind, ProviderType::Rpc);
		assert_eq!(
			state.provider.rpc_url.as_deref(),
			Some("https://rpc.example.test/")
		);
		assert_eq!(state.provider.chain_id.as_str(), "0x539");

		let tracked = harness.tracked.lock().unwrap();
		assert_eq!(tracked.len(), 1);
		assert_eq!(tracked[0].event, "Custom Network Added");
		assert_eq!(tracked[0].referrer.url, "wallet");
		assert_eq!(tracked[0].properties["chain_id"], "0x539");
		assert_eq!(tracked[0].properties["symbol"], "TST");
		assert_eq!(tracked[0].properties["source"], "ui");
		drop(tracked);

		assert_eq!(
			harness.controller.state().network_configurations[&id].rpc_url,
			"https://rpc.example.test/"
		);
	}

	#[tokio::test]
	async fn remove_network_configuration_is_a_silent_no_op_when_absent() {
		let harness = harness();
		harness
			.controller
			.remove_network_configuration(Uuid::new_v4());

		let id = harness
			.controller
			.upsert_network_configuration(custom_network_update(), upsert_options(false))
			.unwrap();
		harness.controller.remove_network_configuration(id);

		assert!(harness.controller.state().network_configurations.is_empty());
	}

	#[tokio::test]
	async fn rollback_restores_the_pre_switch_configuration() {
		let harness = harness();
		harness.controller.initialize_provider().await.unwrap();
		let original = harness.controller.state().provider;

		harness
			.controller
			.upsert_network_configuration(custom_network_update(), upsert_options(true))
			.unwrap();
		harness.controller.rollback_to_previous_provider().unwrap();

		assert_eq!(harness.controller.state().provider, original);
	}

	#[tokio::test]
	async fn eip1559_compatibility_is_memoized_and_false_without_provider() {
		let harness = harness();

		// no provider yet: reports false and leaves state untouched
		assert!(!harness.controller.get_eip1559_compatibility().await.unwrap());
		assert_eq!(harness.controller.state().network_details.eip1559(), None);

		harness.controller.initialize_provider().await.unwrap();
		assert!(harness.controller.get_eip1559_compatibility().await.unwrap());
	}

	#[tokio::test]
	async fn factory_receives_the_expected_specs() {
		let factory = Arc::new(TableFactory::healthy_mainnet_like());
		let harness = harness_with_factory(Arc::clone(&factory) as Arc<dyn ClientFactory>);
		harness.controller.initialize_provider().await.unwrap();

		harness
			.controller
			.upsert_network_configuration(custom_network_update(), upsert_options(true))
			.unwrap();

		let specs = factory.specs.lock().unwrap();
		assert_eq!(specs.len(), 2);
		assert!(matches!(
			&specs[0],
			NetworkClientSpec::BuiltIn {
				infura_project_id,
				..
			} if infura_project_id == "test-project"
		));
		assert!(matches!(
			&specs[1],
			NetworkClientSpec::Custom { rpc_url, .. }
				if rpc_url == "https://rpc.example.test/"
		));
	}

	#[tokio::test]
	async fn destroy_without_initialization_is_a_no_op() {
		let harness = harness();
		harness.controller.destroy().await.unwrap();
	}
}
