//! Network reachability status

use serde::{Deserialize, Serialize};

/// The controller's classification of the most recent probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
	/// The network may or may not be reachable; no probe has concluded.
	#[default]
	Unknown,
	/// The network answered the probe and returned a usable identity.
	Available,
	/// The hosted endpoint refused service for the user's region.
	Blocked,
	/// The network could not be reached.
	Unavailable,
}
