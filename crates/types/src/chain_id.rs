//! EIP-155 chain identifier

use crate::constants::MAX_SAFE_CHAIN_ID;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Validation errors for chain identifiers
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChainIdError {
	#[error("Invalid chain ID: {value} (expected a lowercase 0x-prefixed hex string)")]
	InvalidFormat { value: String },

	#[error("Chain ID out of range: {value} (must fit within {MAX_SAFE_CHAIN_ID})")]
	OutOfRange { value: String },
}

/// A lowercase `0x`-prefixed hex string denoting an EIP-155 chain identifier.
///
/// The wrapped string is guaranteed to parse to a value within safe integer
/// bounds, so it can be handed to consumers that store chain ids as doubles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
	/// Validate and wrap a chain id string.
	pub fn new(value: impl Into<String>) -> Result<Self, ChainIdError> {
		let value = value.into();
		let digits = match value.strip_prefix("0x") {
			Some(digits) if !digits.is_empty() => digits,
			_ => return Err(ChainIdError::InvalidFormat { value }),
		};

		if !digits
			.chars()
			.all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
		{
			return Err(ChainIdError::InvalidFormat { value });
		}

		let parsed =
			u64::from_str_radix(digits, 16).map_err(|_| ChainIdError::OutOfRange {
				value: value.clone(),
			})?;
		if parsed > MAX_SAFE_CHAIN_ID {
			return Err(ChainIdError::OutOfRange { value });
		}

		Ok(Self(value))
	}

	/// Wrap a compile-time-known chain id without revalidating.
	///
	/// Reserved for the built-in network table; debug builds still assert.
	pub(crate) fn known(value: &str) -> Self {
		debug_assert!(Self::new(value).is_ok(), "invalid built-in chain id");
		Self(value.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The numeric value of the chain id.
	pub fn to_u64(&self) -> u64 {
		// Validated at construction
		u64::from_str_radix(self.0.trim_start_matches("0x"), 16).unwrap_or_default()
	}
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ChainId {
	type Err = ChainIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
