//! Read-only aggregation of named observable stores

use crate::{ObservableStore, Subscription};
use serde::Serialize;
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

type Getter = Box<dyn Fn() -> Value + Send + Sync>;
type SubscriberFn = Arc<dyn Fn(&Map<String, Value>) + Send + Sync>;

struct ComposedInner {
	children: Mutex<Vec<(String, Getter)>>,
	subscribers: Mutex<Vec<(u64, SubscriberFn)>>,
	next_subscriber_id: AtomicU64,
	// Child subscriptions are kept for the lifetime of the composed store.
	child_subscriptions: Mutex<Vec<Subscription>>,
}

impl ComposedInner {
	fn compose(&self) -> Map<String, Value> {
		let children = self
			.children
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		let mut composite = Map::new();
		for (name, getter) in children.iter() {
			composite.insert(name.clone(), getter());
		}
		composite
	}

	fn emit(&self) {
		let composite = self.compose();
		let subscribers: Vec<SubscriberFn> = self
			.subscribers
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.iter()
			.map(|(_, subscriber)| Arc::clone(subscriber))
			.collect();

		for subscriber in subscribers {
			if catch_unwind(AssertUnwindSafe(|| subscriber(&composite))).is_err() {
				warn!("composed store subscriber panicked; continuing");
			}
		}
	}
}

/// Aggregates several named observable stores into one read-only observable
/// of the composite record `{ name: child value }`.
///
/// The composite is aggregated by field, recomputed and re-emitted on any
/// child change.
pub struct ComposedStore {
	inner: Arc<ComposedInner>,
}

impl Clone for ComposedStore {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl Default for ComposedStore {
	fn default() -> Self {
		Self::new()
	}
}

impl ComposedStore {
	pub fn new() -> Self {
		Self {
			inner: Arc::new(ComposedInner {
				children: Mutex::new(Vec::new()),
				subscribers: Mutex::new(Vec::new()),
				next_subscriber_id: AtomicU64::new(0),
				child_subscriptions: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Register a child store under `name`. Its serialized value becomes the
	/// composite's `name` field and its changes re-emit the composite.
	pub fn add_child<S>(&self, name: impl Into<String>, child: &ObservableStore<S>)
	where
		S: Clone + PartialEq + Serialize + Send + 'static,
	{
		let name = name.into();
		let child_for_getter = child.clone();
		let getter: Getter = Box::new(move || {
			serde_json::to_value(child_for_getter.get_state()).unwrap_or_else(|error| {
				warn!(%error, "composed child failed to serialize");
				Value::Null
			})
		});

		self.inner
			.children
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push((name, getter));

		let weak: Weak<ComposedInner> = Arc::downgrade(&self.inner);
		let subscription = child.subscribe(move |_| {
			if let Some(inner) = weak.upgrade() {
				inner.emit();
			}
		});
		self.inner
			.child_subscriptions
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push(subscription);
	}

	pub fn get_state(&self) -> Map<String, Value> {
		self.inner.compose()
	}

	pub fn subscribe(
		&self,
		subscriber: impl Fn(&Map<String, Value>) + Send + Sync + 'static,
	) -> Subscription {
		let id = self
			.inner
			.next_subscriber_id
			.fetch_add(1, Ordering::Relaxed);
		self.inner
			.subscribers
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push((id, Arc::new(subscriber)));

		let inner = Arc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = inner.upgrade() {
				inner
					.subscribers
					.lock()
					.unwrap_or_else(|poisoned| poisoned.into_inner())
					.retain(|(existing, _)| *existing != id);
			}
		})
	}
}
