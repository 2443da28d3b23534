//! Swappable proxies
//!
//! Long-lived subscribers hold these façades instead of the raw provider
//! and block tracker, so a network switch can retarget the connection
//! without breaking captured references.

use crate::block_tracker::BlockTracker;
use crate::emitter::{is_internal_event, Listener, ListenerId};
use crate::factory::ClientError;
use crate::provider::Provider;
use crate::rpc::RpcError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// A stable façade over the current provider. Calls dispatch against the
/// target installed at call time, not the one installed at retrieval time.
pub struct ProviderProxy {
	target: RwLock<Arc<dyn Provider>>,
}

impl ProviderProxy {
	pub fn new(target: Arc<dyn Provider>) -> Arc<Self> {
		Arc::new(Self {
			target: RwLock::new(target),
		})
	}

	/// Atomically replace the backing target.
	pub fn set_target(&self, target: Arc<dyn Provider>) {
		*self
			.target
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = target;
	}

	fn current(&self) -> Arc<dyn Provider> {
		Arc::clone(
			&self
				.target
				.read()
				.unwrap_or_else(|poisoned| poisoned.into_inner()),
		)
	}
}

#[async_trait]
impl Provider for ProviderProxy {
	async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
		self.current().request(method, params).await
	}
}

/// Whether the event-emitter proxy carries target-private events across a
/// swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
	/// Re-bind every ledger entry on the new target.
	#[default]
	None,
	/// Drop events marked internal (underscore-prefixed) instead of
	/// re-binding them; they belong to the old target's lifecycle.
	SkipInternal,
}

struct LedgerEntry {
	proxy_id: ListenerId,
	event: String,
	listener: Listener,
	target_id: ListenerId,
	internal: bool,
	once: bool,
}

struct TrackerProxyInner {
	target: RwLock<Arc<dyn BlockTracker>>,
	ledger: Mutex<Vec<LedgerEntry>>,
	filter: EventFilter,
	next_proxy_id: AtomicU64,
}

/// A stable façade over the current block tracker.
///
/// Every listener registered through the proxy is recorded in a
/// subscription ledger; [`BlockTrackerProxy::set_target`] deregisters each
/// entry from the old target and re-registers it on the new one, so a
/// subscriber that captured the proxy before a swap keeps receiving events
/// afterwards, with no duplicates from the old target.
pub struct BlockTrackerProxy {
	inner: Arc<TrackerProxyInner>,
}

impl BlockTrackerProxy {
	pub fn new(target: Arc<dyn BlockTracker>, filter: EventFilter) -> Arc<Self> {
		Arc::new(Self {
			inner: Arc::new(TrackerProxyInner {
				target: RwLock::new(target),
				ledger: Mutex::new(Vec::new()),
				filter,
				next_proxy_id: AtomicU64::new(0),
			}),
		})
	}

	/// Atomically replace the backing target, migrating the ledger.
	pub fn set_target(&self, new_target: Arc<dyn BlockTracker>) {
		let mut ledger = self
			.inner
			.ledger
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let old_target = self.current();

		for entry in ledger.iter() {
			old_target.off(&entry.event, entry.target_id);
		}
		if self.inner.filter == EventFilter::SkipInternal {
			ledger.retain(|entry| !entry.internal);
		}
		for entry in ledger.iter_mut() {
			entry.target_id = if entry.once {
				new_target.once(&entry.event, Arc::clone(&entry.listener))
			} else {
				new_target.on(&entry.event, Arc::clone(&entry.listener))
			};
		}

		*self
			.inner
			.target
			.write()
			.unwrap_or_else(|poisoned| poisoned.into_inner()) = new_target;
	}

	fn current(&self) -> Arc<dyn BlockTracker> {
		Arc::clone(
			&self
				.inner
				.target
				.read()
				.unwrap_or_else(|poisoned| poisoned.into_inner()),
		)
	}

	fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
		let proxy_id = self.inner.next_proxy_id.fetch_add(1, Ordering::Relaxed);

		let effective: Listener = if once {
			// a consumed one-shot must also leave the ledger, or a later
			// swap would resurrect it on the new target
			let ledger_ref: Weak<TrackerProxyInner> = Arc::downgrade(&self.inner);
			let user_listener = Arc::clone(&listener);
			Arc::new(move |payload: &Value| {
				if let Some(inner) = ledger_ref.upgrade() {
					inner
						.ledger
						.lock()
						.unwrap_or_else(|poisoned| poisoned.into_inner())
						.retain(|entry| entry.proxy_id != proxy_id);
				}
				user_listener(payload);
			})
		} else {
			listener
		};

		let target = self.current();
		let target_id = if once {
			target.once(event, Arc::clone(&effective))
		} else {
			target.on(event, Arc::clone(&effective))
		};

		self.inner
			.ledger
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push(LedgerEntry {
				proxy_id,
				event: event.to_string(),
				listener: effective,
				target_id,
				internal: is_internal_event(event),
				once,
			});
		proxy_id
	}
}

#[async_trait]
impl BlockTracker for BlockTrackerProxy {
	fn on(&self, event: &str, listener: Listener) -> ListenerId {
		self.register(event, listener, false)
	}

	fn once(&self, event: &str, listener: Listener) -> ListenerId {
		self.register(event, listener, true)
	}

	fn off(&self, event: &str, id: ListenerId) -> bool {
		let mut ledger = self
			.inner
			.ledger
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let Some(position) = ledger
			.iter()
			.position(|entry| entry.proxy_id == id && entry.event == event)
		else {
			return false;
		};
		let entry = ledger.remove(position);
		drop(ledger);

		self.current().off(event, entry.target_id)
	}

	fn latest_block(&self) -> Option<String> {
		self.current().latest_block()
	}

	async fn destroy(&self) -> Result<(), ClientError> {
		self.current().destroy().await
	}
}
