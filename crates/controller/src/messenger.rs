//! Restricted publish/subscribe bus

use dashmap::DashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

pub type SubscriptionId = u64;
type Callback = Arc<dyn Fn() + Send + Sync>;

struct Registration {
	id: SubscriptionId,
	callback: Callback,
	once: bool,
}

struct BusInner {
	channels: DashMap<String, Vec<Registration>>,
	next_id: AtomicU64,
}

/// Application-wide event bus with ordered synchronous delivery.
///
/// Controllers receive a namespaced [`RestrictedMessenger`] carved out of
/// this bus rather than the bus itself.
pub struct Messenger {
	inner: Arc<BusInner>,
}

impl Clone for Messenger {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl Default for Messenger {
	fn default() -> Self {
		Self::new()
	}
}

impl Messenger {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(BusInner {
				channels: DashMap::new(),
				next_id: AtomicU64::new(0),
			}),
		}
	}

	/// Carve out a namespaced view; event names are prefixed with
	/// `{namespace}:`.
	pub fn restrict(&self, namespace: impl Into<String>) -> RestrictedMessenger {
		RestrictedMessenger {
			bus: self.clone(),
			namespace: namespace.into(),
		}
	}

	pub fn publish(&self, event: &str) {
		// Snapshot under the entry lock, invoke outside it, so a callback
		// may subscribe or publish without deadlocking.
		let to_invoke: Vec<Callback> = match self.inner.channels.get_mut(event) {
			Some(mut registrations) => {
				let snapshot = registrations
					.iter()
					.map(|registration| Arc::clone(&registration.callback))
					.collect();
				registrations.retain(|registration| !registration.once);
				snapshot
			}
			None => Vec::new(),
		};

		for callback in to_invoke {
			if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
				warn!(event, "event subscriber panicked; continuing");
			}
		}
	}

	pub fn subscribe(
		&self,
		event: &str,
		callback: impl Fn() + Send + Sync + 'static,
	) -> SubscriptionId {
		self.register(event, Arc::new(callback), false)
	}

	/// Subscribe for a single delivery; the registration is removed before
	/// the callback runs.
	pub fn subscribe_once(
		&self,
		event: &str,
		callback: impl Fn() + Send + Sync + 'static,
	) -> SubscriptionId {
		self.register(event, Arc::new(callback), true)
	}

	fn register(&self, event: &str, callback: Callback, once: bool) -> SubscriptionId {
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		self.inner
			.channels
			.entry(event.to_string())
			.or_default()
			.push(Registration { id, callback, once });
		id
	}

	/// Remove a subscription; a no-op when it already fired or was removed.
	pub fn unsubscribe(&self, event: &str, id: SubscriptionId) {
		if let Some(mut registrations) = self.inner.channels.get_mut(event) {
			registrations.retain(|registration| registration.id != id);
		}
	}
}

/// The events the network controller publishes on its namespace.
///
/// None of them carry a payload; subscribers read controller state for
/// detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
	NetworkWillChange,
	NetworkDidChange,
	InfuraIsBlocked,
	InfuraIsUnblocked,
}

impl NetworkEvent {
	pub fn as_str(&self) -> &'static str {
		match self {
			NetworkEvent::NetworkWillChange => "networkWillChange",
			NetworkEvent::NetworkDidChange => "networkDidChange",
			NetworkEvent::InfuraIsBlocked => "infuraIsBlocked",
			NetworkEvent::InfuraIsUnblocked => "infuraIsUnblocked",
		}
	}
}

/// A namespaced view of the bus, owned by one controller.
#[derive(Clone)]
pub struct RestrictedMessenger {
	bus: Messenger,
	namespace: String,
}

impl RestrictedMessenger {
	fn qualified(&self, event: &str) -> String {
		format!("{}:{}", self.namespace, event)
	}

	pub fn publish(&self, event: NetworkEvent) {
		self.bus.publish(&self.qualified(event.as_str()));
	}

	pub fn subscribe(
		&self,
		event: NetworkEvent,
		callback: impl Fn() + Send + Sync + 'static,
	) -> SubscriptionId {
		self.bus.subscribe(&self.qualified(event.as_str()), callback)
	}

	pub fn subscribe_once(
		&self,
		event: NetworkEvent,
		callback: impl Fn() + Send + Sync + 'static,
	) -> SubscriptionId {
		self.bus
			.subscribe_once(&self.qualified(event.as_str()), callback)
	}

	pub fn unsubscribe(&self, event: NetworkEvent, id: SubscriptionId) {
		self.bus.unsubscribe(&self.qualified(event.as_str()), id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::AtomicUsize;
	use std::sync::Mutex;

	#[test]
	fn delivery_follows_subscription_order() {
		let messenger = Messenger::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		for tag in ["a", "b", "c"] {
			let order = Arc::clone(&order);
			messenger.subscribe("event", move || order.lock().unwrap().push(tag));
		}

		messenger.publish("event");
		assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
	}

	#[test]
	fn subscribe_once_fires_a_single_time() {
		let messenger = Messenger::new();
		let calls = Arc::new(AtomicUsize::new(0));

		let calls_by_subscriber = Arc::clone(&calls);
		messenger.subscribe_once("event", move || {
			calls_by_subscriber.fetch_add(1, Ordering::SeqCst);
		});

		messenger.publish("event");
		messenger.publish("event");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn unsubscribe_is_a_no_op_after_fire() {
		let messenger = Messenger::new();
		let id = messenger.subscribe_once("event", || {});
		messenger.publish("event");

		// already removed; must not disturb other subscriptions
		let calls = Arc::new(AtomicUsize::new(0));
		let calls_by_subscriber = Arc::clone(&calls);
		messenger.subscribe("event", move || {
			calls_by_subscriber.fetch_add(1, Ordering::SeqCst);
		});
		messenger.unsubscribe("event", id);

		messenger.publish("event");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn namespaces_are_isolated() {
		let messenger = Messenger::new();
		let network = messenger.restrict("NetworkController");
		let calls = Arc::new(AtomicUsize::new(0));

		let calls_by_subscriber = Arc::clone(&calls);
		network.subscribe(NetworkEvent::NetworkDidChange, move || {
			calls_by_subscriber.fetch_add(1, Ordering::SeqCst);
		});

		// same suffix on the bare bus does not cross the namespace
		messenger.publish("networkDidChange");
		assert_eq!(calls.load(Ordering::SeqCst), 0);

		messenger.publish("NetworkController:networkDidChange");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn publishing_inside_a_callback_does_not_deadlock() {
		let messenger = Messenger::new();
		let chained = Arc::new(AtomicUsize::new(0));

		let inner_messenger = messenger.clone();
		messenger.subscribe("outer", move || inner_messenger.publish("inner"));
		let chained_by_subscriber = Arc::clone(&chained);
		messenger.subscribe("inner", move || {
			chained_by_subscriber.fetch_add(1, Ordering::SeqCst);
		});

		messenger.publish("outer");
		assert_eq!(chained.load(Ordering::SeqCst), 1);
	}
}
