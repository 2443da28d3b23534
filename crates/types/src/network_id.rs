//! Decimal network identifier returned by `net_version`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetworkIdError {
	#[error("Invalid network ID: {value} (expected a decimal numeric string)")]
	InvalidFormat { value: String },
}

/// A decimal-string numeric network identifier as returned by `net_version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
	pub fn new(value: impl Into<String>) -> Result<Self, NetworkIdError> {
		let value = value.into();
		if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
			return Err(NetworkIdError::InvalidFormat { value });
		}
		Ok(Self(value))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NetworkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for NetworkId {
	type Err = NetworkIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
