//! Polling block tracker

use crate::emitter::{EventEmitter, Listener, ListenerId};
use crate::factory::ClientError;
use crate::provider::{Provider, ProviderExt};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Emitted with the hex block number whenever the chain head advances.
pub const LATEST_EVENT: &str = "latest";
/// Emitted with `{message}` when a poll round-trip fails.
pub const ERROR_EVENT: &str = "error";
/// Target-private lifecycle signal: the polling task started.
pub const STARTED_EVENT: &str = "_started";
/// Target-private lifecycle signal: the polling task stopped.
pub const STOPPED_EVENT: &str = "_stopped";

/// A background poller that emits when the chain head advances.
#[async_trait]
pub trait BlockTracker: Send + Sync {
	fn on(&self, event: &str, listener: Listener) -> ListenerId;
	fn once(&self, event: &str, listener: Listener) -> ListenerId;
	fn off(&self, event: &str, id: ListenerId) -> bool;

	/// The most recent block number seen, if any poll has succeeded.
	fn latest_block(&self) -> Option<String>;

	/// Stop the polling task. In-flight requests are not aborted.
	async fn destroy(&self) -> Result<(), ClientError>;
}

struct TrackerInner {
	provider: Arc<dyn Provider>,
	emitter: EventEmitter,
	interval: Duration,
	current_block: Mutex<Option<String>>,
	poll_task: Mutex<Option<JoinHandle<()>>>,
	destroyed: AtomicBool,
}

impl TrackerInner {
	async fn poll_once(self: &Arc<Self>) {
		match self.provider.block_number().await {
			Ok(block_number) => {
				let changed = {
					let mut current = self
						.current_block
						.lock()
						.unwrap_or_else(|poisoned| poisoned.into_inner());
					if current.as_deref() == Some(block_number.as_str()) {
						false
					} else {
						*current = Some(block_number.clone());
						true
					}
				};
				if changed {
					self.emitter.emit(LATEST_EVENT, &json!(block_number));
				}
			}
			Err(error) => {
				warn!(%error, "block poll failed");
				self.emitter
					.emit(ERROR_EVENT, &json!({ "message": error.to_string() }));
			}
		}
	}
}

/// Polls `eth_blockNumber` at a fixed cadence and emits `latest` with the
/// new block number.
///
/// The polling task runs only while at least one `latest` listener is
/// attached; it starts with the first and stops with the last, or on
/// `destroy`.
pub struct PollingBlockTracker {
	inner: Arc<TrackerInner>,
}

impl PollingBlockTracker {
	pub fn new(provider: Arc<dyn Provider>, interval: Duration) -> Self {
		Self {
			inner: Arc::new(TrackerInner {
				provider,
				emitter: EventEmitter::new(),
				interval,
				current_block: Mutex::new(None),
				poll_task: Mutex::new(None),
				destroyed: AtomicBool::new(false),
			}),
		}
	}

	fn maybe_start(&self) {
		if self.inner.destroyed.load(Ordering::SeqCst) {
			return;
		}
		let mut poll_task = self
			.inner
			.poll_task
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner());
		if poll_task.is_some() || self.inner.emitter.listener_count(LATEST_EVENT) == 0 {
			return;
		}

		debug!("starting block poll task");
		let weak = Arc::downgrade(&self.inner);
		*poll_task = Some(tokio::spawn(async move {
			loop {
				let Some(inner) = weak.upgrade() else { break };
				inner.poll_once().await;
				let interval = inner.interval;
				drop(inner);
				tokio::time::sleep(interval).await;
			}
		}));
		self.inner.emitter.emit(STARTED_EVENT, &json!(null));
	}

	fn maybe_stop(&self) {
		if self.inner.emitter.listener_count(LATEST_EVENT) > 0 {
			return;
		}
		let stopped = {
			let mut poll_task = self
				.inner
				.poll_task
				.lock()
				.unwrap_or_else(|poisoned| poisoned.into_inner());
			match poll_task.take() {
				Some(task) => {
					task.abort();
					true
				}
				None => false,
			}
		};
		if stopped {
			debug!("stopped block poll task");
			self.inner.emitter.emit(STOPPED_EVENT, &json!(null));
		}
	}
}

#[async_trait]
impl BlockTracker for PollingBlockTracker {
	fn on(&self, event: &str, listener: Listener) -> ListenerId {
		let id = self.inner.emitter.on(event, listener);
		if event == LATEST_EVENT {
			self.maybe_start();
		}
		id
	}

	fn once(&self, event: &str, listener: Listener) -> ListenerId {
		let id = self.inner.emitter.once(event, listener);
		if event == LATEST_EVENT {
			self.maybe_start();
		}
		id
	}

	fn off(&self, event: &str, id: ListenerId) -> bool {
		let removed = self.inner.emitter.off(event, id);
		if removed && event == LATEST_EVENT {
			self.maybe_stop();
		}
		removed
	}

	fn latest_block(&self) -> Option<String> {
		self.inner
			.current_block
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}

	async fn destroy(&self) -> Result<(), ClientError> {
		self.inner.destroyed.store(true, Ordering::SeqCst);
		let task = self
			.inner
			.poll_task
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.take();
		if let Some(task) = task {
			task.abort();
			self.inner.emitter.emit(STOPPED_EVENT, &json!(null));
		}
		Ok(())
	}
}
