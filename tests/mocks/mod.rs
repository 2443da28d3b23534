//! Shared helpers for integration tests

use chainswitch::mocks::ScriptedClientFactory;
use chainswitch::{
	ClientFactory, ControllerBuilder, Messenger, MetricsEvent, NetworkController,
	NetworkControllerState, NetworkEvent, CONTROLLER_NAMESPACE,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct TestSetup {
	pub controller: NetworkController,
	pub messenger: Messenger,
	pub factory: Arc<ScriptedClientFactory>,
	pub tracked: Arc<Mutex<Vec<MetricsEvent>>>,
}

/// Controller wired to a scripted factory, restored from mainnet-default
/// state so tests behave the same in debug and release profiles.
#[allow(dead_code)]
pub fn setup() -> TestSetup {
	setup_with_state(NetworkControllerState::default())
}

pub fn setup_with_state(state: NetworkControllerState) -> TestSetup {
	let factory = ScriptedClientFactory::new();
	let tracked = Arc::new(Mutex::new(Vec::new()));
	let tracked_by_sink = Arc::clone(&tracked);

	let (controller, messenger) = ControllerBuilder::new()
		.with_state(state)
		.with_infura_project_id("test-project")
		.with_track_event(Arc::new(move |event| {
			tracked_by_sink.lock().unwrap().push(event);
		}))
		.with_factory(Arc::clone(&factory) as Arc<dyn ClientFactory>)
		.build()
		.expect("controller construction");

	TestSetup {
		controller,
		messenger,
		factory,
		tracked,
	}
}

/// Record the controller's published events in arrival order.
#[allow(dead_code)]
pub fn record_network_events(messenger: &Messenger) -> Arc<Mutex<Vec<&'static str>>> {
	let events = Arc::new(Mutex::new(Vec::new()));
	let network = messenger.restrict(CONTROLLER_NAMESPACE);
	for event in [
		NetworkEvent::NetworkWillChange,
		NetworkEvent::NetworkDidChange,
		NetworkEvent::InfuraIsBlocked,
		NetworkEvent::InfuraIsUnblocked,
	] {
		let events = Arc::clone(&events);
		network.subscribe(event, move || events.lock().unwrap().push(event.as_str()));
	}
	events
}

/// Poll until `condition` holds; panics after a generous deadline so a
/// wedged probe fails loudly instead of hanging the suite.
#[allow(dead_code)]
pub async fn wait_until(condition: impl Fn() -> bool) {
	for _ in 0..200 {
		if condition() {
			return;
		}
		tokio::time::sleep(Duration::from_millis(10)).await;
	}
	panic!("condition not reached within deadline");
}
