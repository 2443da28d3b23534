//! Ordered listener registry for target-emitted events

use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

pub type ListenerId = u64;
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Events whose name starts with an underscore are target-private lifecycle
/// signals.
pub fn is_internal_event(event: &str) -> bool {
	event.starts_with('_')
}

struct Registration {
	id: ListenerId,
	event: String,
	listener: Listener,
	once: bool,
}

struct EmitterInner {
	registrations: Mutex<Vec<Registration>>,
	next_id: AtomicU64,
}

/// String-named events with ordered synchronous dispatch.
///
/// Listeners run in registration order on the emitting task; a panicking
/// listener is isolated so the rest still run. `once` listeners are removed
/// before their single invocation.
pub struct EventEmitter {
	inner: Arc<EmitterInner>,
}

impl Clone for EventEmitter {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl Default for EventEmitter {
	fn default() -> Self {
		Self::new()
	}
}

impl EventEmitter {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(EmitterInner {
				registrations: Mutex::new(Vec::new()),
				next_id: AtomicU64::new(0),
			}),
		}
	}

	pub fn on(&self, event: &str, listener: Listener) -> ListenerId {
		self.register(event, listener, false)
	}

	pub fn once(&self, event: &str, listener: Listener) -> ListenerId {
		self.register(event, listener, true)
	}

	fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
		let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
		self.inner
			.registrations
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push(Registration {
				id,
				event: event.to_string(),
				listener,
				once,
			});
		id
	}

	/// Remove a listener; returns whether it was registered.
	pub fn off(&self, event: &str, id: ListenerId) -> bool {
		let mut registrations = self
			.inner
			.registrations
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let before = registrations.len();
		registrations.retain(|registration| {
			!(registration.id == id && registration.event == event)
		});
		registrations.len() != before
	}

	pub fn listener_count(&self, event: &str) -> usize {
		self.inner
			.registrations
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.iter()
			.filter(|registration| registration.event == event)
			.count()
	}

	pub fn emit(&self, event: &str, payload: &Value) {
		let to_invoke: Vec<Listener> = {
			let mut registrations = self
				.inner
				.registrations
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner());
			let matched: Vec<Listener> = registrations
				.iter()
				.filter(|registration| registration.event == event)
				.map(|registration| Arc::clone(&registration.listener))
				.collect();
			// one-shot listeners fire at most once even if the handler
			// itself re-emits
			registrations
				.retain(|registration| !(registration.event == event && registration.once));
			matched
		};

		for listener in to_invoke {
			if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
				warn!(event, "event listener panicked; continuing");
			}
		}
	}
}
