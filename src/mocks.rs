//! Programmable network mocks for tests and demos
//!
//! These stand in for the HTTP provider stack so controller behavior can
//! be driven without a live endpoint.

use async_trait::async_trait;
use chainswitch_client::{
	BlockTracker, ClientError, ClientFactory, EventEmitter, Listener, ListenerId, NetworkClient,
	NetworkClientSpec, Provider, RpcError, LATEST_EVENT,
};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A scripted JSON-RPC error, cloneable unlike the real transport errors.
#[derive(Debug, Clone)]
pub struct MockRpcFailure {
	pub code: i64,
	pub message: String,
}

impl MockRpcFailure {
	fn into_error(self) -> RpcError {
		RpcError::Rpc {
			code: self.code,
			message: self.message,
			data: None,
		}
	}
}

type MockResult = Result<Value, MockRpcFailure>;

/// Provider answering from scripted per-method responses.
///
/// One-shot responses queued with [`MockRpcProvider::respond_once`] are
/// consumed before the standing answers set with
/// [`MockRpcProvider::respond_to`]. An optional delay suspends every
/// request, which is how switch-during-probe races are staged.
#[derive(Default)]
pub struct MockRpcProvider {
	standing: Mutex<HashMap<String, MockResult>>,
	queued: Mutex<HashMap<String, VecDeque<MockResult>>>,
	delay: Mutex<Option<Duration>>,
	calls: Mutex<Vec<(String, Value)>>,
}

impl MockRpcProvider {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// A provider that answers like a healthy post-London network.
	pub fn healthy(network_id: &str) -> Arc<Self> {
		let provider = Self::new();
		provider.respond_to("net_version", json!(network_id));
		provider.respond_to(
			"eth_getBlockByNumber",
			json!({ "number": "0x1", "baseFeePerGas": "0x1" }),
		);
		provider.respond_to("eth_blockNumber", json!("0x1"));
		provider
	}

	pub fn respond_to(&self, method: &str, response: Value) {
		self.standing
			.lock()
			.unwrap()
			.insert(method.to_string(), Ok(response));
	}

	pub fn fail_with(&self, method: &str, code: i64, message: &str) {
		self.standing.lock().unwrap().insert(
			method.to_string(),
			Err(MockRpcFailure {
				code,
				message: message.to_string(),
			}),
		);
	}

	pub fn respond_once(&self, method: &str, response: MockResult) {
		self.queued
			.lock()
			.unwrap()
			.entry(method.to_string())
			.or_default()
			.push_back(response);
	}

	/// Suspend every request for `delay` before answering.
	pub fn set_delay(&self, delay: Duration) {
		*self.delay.lock().unwrap() = Some(delay);
	}

	/// Every `(method, params)` pair received, in order.
	pub fn calls(&self) -> Vec<(String, Value)> {
		self.calls.lock().unwrap().clone()
	}
}

#[async_trait]
impl Provider for MockRpcProvider {
	async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		self.calls
			.lock()
			.unwrap()
			.push((method.to_string(), params));

		let delay = *self.delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		let queued = self
			.queued
			.lock()
			.unwrap()
			.get_mut(method)
			.and_then(VecDeque::pop_front);
		let result = match queued {
			Some(result) => result,
			None => self
				.standing
				.lock()
				.unwrap()
				.get(method)
				.cloned()
				.unwrap_or_else(|| {
					Err(MockRpcFailure {
						code: -32601,
						message: format!("no mock response for {method}"),
					})
				}),
		};
		result.map_err(MockRpcFailure::into_error)
	}
}

/// Block tracker driven by hand instead of a polling task.
pub struct ManualBlockTracker {
	emitter: EventEmitter,
	destroyed: AtomicBool,
}

impl ManualBlockTracker {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			emitter: EventEmitter::new(),
			destroyed: AtomicBool::new(false),
		})
	}

	/// Emit `latest` with a block number, as the polling task would.
	pub fn emit_latest(&self, block_number: &str) {
		self.emitter.emit(LATEST_EVENT, &json!(block_number));
	}

	pub fn emit(&self, event: &str, payload: &Value) {
		self.emitter.emit(event, payload);
	}

	pub fn is_destroyed(&self) -> bool {
		self.destroyed.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl BlockTracker for ManualBlockTracker {
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
		self.destroyed.store(true, Ordering::SeqCst);
		Ok(())
	}
}

/// A mock client pair plus handles to drive it.
pub struct MockNetworkClient {
	pub client: NetworkClient,
	pub provider: Arc<MockRpcProvider>,
	pub block_tracker: Arc<ManualBlockTracker>,
}

/// Build a client pair around a scripted provider.
pub fn mock_network_client(provider: Arc<MockRpcProvider>) -> MockNetworkClient {
	let block_tracker = ManualBlockTracker::new();
	MockNetworkClient {
		client: NetworkClient {
			provider: Arc::clone(&provider) as Arc<dyn Provider>,
			block_tracker: Arc::clone(&block_tracker) as Arc<dyn BlockTracker>,
		},
		provider,
		block_tracker,
	}
}

/// Factory handing out queued mock clients and recording requested specs.
///
/// When the queue runs dry it falls back to a healthy mainnet-like mock,
/// so tests only script the clients they care about.
#[derive(Default)]
pub struct ScriptedClientFactory {
	queue: Mutex<VecDeque<NetworkClient>>,
	specs: Mutex<Vec<NetworkClientSpec>>,
}

impl ScriptedClientFactory {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Queue the client handed out for the next `create_network_client`.
	pub fn push(&self, client: NetworkClient) {
		self.queue.lock().unwrap().push_back(client);
	}

	/// Every spec the controller asked for, in order.
	pub fn specs(&self) -> Vec<NetworkClientSpec> {
		self.specs.lock().unwrap().clone()
	}
}

impl ClientFactory for ScriptedClientFactory {
	fn create_network_client(
		&self,
		spec: &NetworkClientSpec,
	) -> Result<NetworkClient, ClientError> {
		self.specs.lock().unwrap().push(spec.clone());
		let client = self
			.queue
			.lock()
			.unwrap()
			.pop_front()
			.unwrap_or_else(|| mock_network_client(MockRpcProvider::healthy("1")).client);
		Ok(client)
	}
}
