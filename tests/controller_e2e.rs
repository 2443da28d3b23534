//! End-to-end controller lifecycle tests

mod mocks;

use chainswitch::mocks::{mock_network_client, MockRpcProvider};
use chainswitch::{
	BuiltInNetwork, NetworkClientSpec, NetworkId, NetworkStatus, NewNetworkConfiguration,
	ProviderType, UpsertNetworkOptions,
};
use mocks::{record_network_events, setup, wait_until};

fn custom_network(rpc_url: &str) -> NewNetworkConfiguration {
	NewNetworkConfiguration {
		rpc_url: rpc_url.to_string(),
		chain_id: "0x539".to_string(),
		ticker: "TST".to_string(),
		nickname: Some("Test Net".to_string()),
		rpc_prefs: None,
	}
}

fn from_ui(set_active: bool) -> UpsertNetworkOptions {
	UpsertNetworkOptions {
		set_active,
		referrer: "wallet".to_string(),
		source: "ui".to_string(),
	}
}

#[tokio::test]
async fn fresh_initialization_probes_the_default_network() {
	let test = setup();
	let events = record_network_events(&test.messenger);

	test.factory
		.push(mock_network_client(MockRpcProvider::healthy("1")).client);
	test.controller.initialize_provider().await.unwrap();

	let state = test.controller.state();
	assert_eq!(state.network_status, NetworkStatus::Available);
	assert_eq!(state.network_id, Some(NetworkId::new("1").unwrap()));
	assert_eq!(state.network_details.eip1559(), Some(true));

	// initialization is not a switch: only the probe outcome is announced
	assert_eq!(*events.lock().unwrap(), vec!["infuraIsUnblocked"]);

	let specs = test.factory.specs();
	assert_eq!(specs.len(), 1);
	assert!(matches!(
		&specs[0],
		NetworkClientSpec::BuiltIn {
			network: BuiltInNetwork::Mainnet,
			infura_project_id,
		} if infura_project_id == "test-project"
	));
}

#[tokio::test]
async fn activating_an_upserted_network_switches_and_announces() {
	let test = setup();
	test.controller.initialize_provider().await.unwrap();
	let events = record_network_events(&test.messenger);

	let id = test
		.controller
		.upsert_network_configuration(custom_network("https://x.example/"), from_ui(true))
		.unwrap();

	let state = test.controller.state();
	assert_eq!(state.provider.kind, ProviderType::Rpc);
	assert_eq!(state.provider.rpc_url.as_deref(), Some("https://x.example/"));
	assert_eq!(state.network_configurations.len(), 1);
	assert_eq!(state.network_configurations[&id].nickname.as_deref(), Some("Test Net"));
	assert_eq!(test.tracked.lock().unwrap().len(), 1);

	let controller = test.controller.clone();
	wait_until(move || controller.state().network_status == NetworkStatus::Available).await;
	assert_eq!(
		*events.lock().unwrap(),
		vec!["networkWillChange", "networkDidChange", "infuraIsUnblocked"]
	);
}

#[tokio::test]
async fn set_active_network_returns_the_rpc_url() {
	let test = setup();
	test.controller.initialize_provider().await.unwrap();

	let id = test
		.controller
		.upsert_network_configuration(custom_network("https://x.example/"), from_ui(false))
		.unwrap();
	let rpc_url = test.controller.set_active_network(id).unwrap();

	assert_eq!(rpc_url, "https://x.example/");
}

#[tokio::test]
async fn rollback_returns_to_the_pre_switch_network() {
	let test = setup();
	test.controller.initialize_provider().await.unwrap();

	test.controller
		.upsert_network_configuration(custom_network("https://x.example/"), from_ui(true))
		.unwrap();
	assert_eq!(test.controller.state().provider.kind, ProviderType::Rpc);

	test.controller.rollback_to_previous_provider().unwrap();

	let state = test.controller.state();
	assert_eq!(
		state.provider.kind,
		ProviderType::BuiltIn(BuiltInNetwork::Mainnet)
	);

	// rolling back again stays put: the rollback did not snapshot
	test.controller.rollback_to_previous_provider().unwrap();
	assert_eq!(
		test.controller.state().provider.kind,
		ProviderType::BuiltIn(BuiltInNetwork::Mainnet)
	);
}

#[tokio::test]
async fn upsert_is_idempotent_on_case_insensitive_urls() {
	let test = setup();

	let first_id = test
		.controller
		.upsert_network_configuration(custom_network("https://Foo.example/"), from_ui(false))
		.unwrap();
	let second_id = test
		.controller
		.upsert_network_configuration(custom_network("https://foo.example/"), from_ui(false))
		.unwrap();

	assert_eq!(first_id, second_id);
	assert_eq!(test.controller.state().network_configurations.len(), 1);
	assert_eq!(test.tracked.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn destroy_stops_the_block_tracker() {
	let test = setup();
	let mock = mock_network_client(MockRpcProvider::healthy("1"));
	let tracker = std::sync::Arc::clone(&mock.block_tracker);
	test.factory.push(mock.client);

	test.controller.initialize_provider().await.unwrap();
	assert!(!tracker.is_destroyed());

	test.controller.destroy().await.unwrap();
	assert!(tracker.is_destroyed());
}

#[tokio::test]
async fn composed_store_exposes_the_persisted_shape() {
	let test = setup();
	let composite = test.controller.store().get_state();

	for key in [
		"provider",
		"previousProviderStore",
		"networkId",
		"networkStatus",
		"networkDetails",
		"networkConfigurations",
	] {
		assert!(composite.contains_key(key), "missing composite key {key}");
	}
	assert_eq!(composite["networkStatus"], "unknown");
	assert_eq!(composite["provider"]["type"], "mainnet");
}

#[tokio::test]
async fn store_subscribers_observe_switches() {
	let test = setup();
	test.controller.initialize_provider().await.unwrap();

	let observed = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
	let observed_by_subscriber = std::sync::Arc::clone(&observed);
	let _subscription = test.controller.store().subscribe(move |state| {
		observed_by_subscriber
			.lock()
			.unwrap()
			.push(state["provider"]["type"].clone());
	});

	test.controller.set_provider_type("sepolia").unwrap();

	let observed = observed.lock().unwrap();
	assert!(observed.iter().any(|kind| *kind == "sepolia"));
}
