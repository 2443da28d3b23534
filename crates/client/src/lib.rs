//! Chainswitch Client
//!
//! The JSON-RPC provider stack: HTTP transport, polling block tracker, the
//! swappable proxies long-lived subscribers hold, and the factory that
//! builds `{provider, block_tracker}` pairs for hosted and custom endpoints.

pub mod block_tracker;
pub mod emitter;
pub mod factory;
pub mod provider;
pub mod proxy;
pub mod rpc;

pub use block_tracker::{
	BlockTracker, PollingBlockTracker, ERROR_EVENT, LATEST_EVENT, STARTED_EVENT, STOPPED_EVENT,
};
pub use emitter::{is_internal_event, EventEmitter, Listener, ListenerId};
pub use factory::{
	ClientError, ClientFactory, HttpClientFactory, NetworkClient, NetworkClientSpec,
};
pub use provider::{HttpProvider, Provider, ProviderExt};
pub use proxy::{BlockTrackerProxy, EventFilter, ProviderProxy};
pub use rpc::{BlockHeader, JsonRpcErrorBody, RpcError};
