//! Single-valued observable cell

use crate::Subscription;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

type SubscriberFn<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct StoreInner<S> {
	value: Mutex<S>,
	subscribers: Mutex<Vec<(u64, SubscriberFn<S>)>>,
	next_subscriber_id: AtomicU64,
}

/// A single-valued cell with whole-value replace, closure-shaped merge, and
/// synchronous ordered change notification.
///
/// Handles are cheap to clone and share one cell. Notification fires iff the
/// new value differs from the prior one (`PartialEq`), on the mutating call,
/// in subscription order.
pub struct ObservableStore<S> {
	inner: Arc<StoreInner<S>>,
}

impl<S> Clone for ObservableStore<S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S> ObservableStore<S>
where
	S: Clone + PartialEq + Send + 'static,
{
	pub fn new(initial: S) -> Self {
		Self {
			inner: Arc::new(StoreInner {
				value: Mutex::new(initial),
				subscribers: Mutex::new(Vec::new()),
				next_subscriber_id: AtomicU64::new(0),
			}),
		}
	}

	pub fn get_state(&self) -> S {
		self.inner
			.value
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	/// Replace the whole value, notifying subscribers iff it changed.
	pub fn put_state(&self, next: S) {
		{
			let mut value = self
				.inner
				.value
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner());
			if *value == next {
				return;
			}
			*value = next.clone();
		}
		self.notify(&next);
	}

	/// Mutate a copy of the current value in place, then apply `put_state`
	/// semantics to the result.
	pub fn update_state(&self, apply: impl FnOnce(&mut S)) {
		let mut next = self.get_state();
		apply(&mut next);
		self.put_state(next);
	}

	/// Register a change subscriber. Runs synchronously on the mutating
	/// call; a panicking subscriber is isolated so the rest still run.
	pub fn subscribe(&self, subscriber: impl Fn(&S) + Send + Sync + 'static) -> Subscription {
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

	fn notify(&self, value: &S) {
		let subscribers: Vec<SubscriberFn<S>> = self
			.inner
			.subscribers
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.iter()
			.map(|(_, subscriber)| Arc::clone(subscriber))
			.collect();

		for subscriber in subscribers {
			if catch_unwind(AssertUnwindSafe(|| subscriber(value))).is_err() {
				warn!("store subscriber panicked; continuing with remaining subscribers");
			}
		}
	}
}
