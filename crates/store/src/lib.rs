//! Chainswitch Store
//!
//! Observable single-value stores and the composed read-only aggregate the
//! persistence layer consumes.

pub mod composed;
pub mod observable;

pub use composed::ComposedStore;
pub use observable::ObservableStore;

/// Handle returned from `subscribe` calls.
///
/// Dropping the handle leaves the subscription in place; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
	pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	pub fn unsubscribe(mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}
