//! Analytics event-sink contract

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Category tag attached to controller-originated analytics events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricsEventCategory {
	Network,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEventReferrer {
	pub url: String,
}

/// Payload handed to the embedding application's analytics pipeline.
///
/// Only the shape is part of the controller's contract; delivery, batching
/// and consent are the sink's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEvent {
	pub event: String,
	pub category: MetricsEventCategory,
	pub referrer: MetricsEventReferrer,
	pub properties: Map<String, Value>,
}

/// Callback invoked when the controller emits an analytics event.
pub type TrackEventFn = Arc<dyn Fn(MetricsEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn serializes_the_sink_shape() {
		let mut properties = Map::new();
		properties.insert("chain_id".to_string(), json!("0x539"));
		properties.insert("symbol".to_string(), json!("TST"));
		properties.insert("source".to_string(), json!("ui"));

		let event = MetricsEvent {
			event: "Custom Network Added".to_string(),
			category: MetricsEventCategory::Network,
			referrer: MetricsEventReferrer {
				url: "wallet".to_string(),
			},
			properties,
		};

		let value = serde_json::to_value(&event).unwrap();
		assert_eq!(value["event"], "Custom Network Added");
		assert_eq!(value["category"], "Network");
		assert_eq!(value["referrer"]["url"], "wallet");
		assert_eq!(value["properties"]["symbol"], "TST");
	}
}
