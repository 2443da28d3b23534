//! Probed protocol-feature support

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const EIP_1559: u64 = 1559;

/// Open record of probed EIP support for the active network.
///
/// Slot 1559 is the feature probed by the controller; other slots are
/// preserved untouched across updates so additional probes can share the
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
	#[serde(rename = "EIPS")]
	pub eips: BTreeMap<u64, Option<bool>>,
}

impl NetworkDetails {
	pub fn eip1559(&self) -> Option<bool> {
		self.eips.get(&EIP_1559).copied().flatten()
	}

	/// Record EIP-1559 support, preserving every other slot.
	pub fn set_eip1559(&mut self, supported: bool) {
		self.eips.insert(EIP_1559, Some(supported));
	}
}

impl Default for NetworkDetails {
	fn default() -> Self {
		let mut eips = BTreeMap::new();
		eips.insert(EIP_1559, None);
		Self { eips }
	}
}
