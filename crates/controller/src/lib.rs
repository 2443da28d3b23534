//! Chainswitch Controller
//!
//! The network controller proper: owns the active provider/block-tracker
//! pair and its swappable proxies, probes newly selected networks, and
//! manages the registry of user-defined networks.

pub mod controller;
pub mod error;
pub mod messenger;
mod probe;

pub use controller::{
	NetworkController, NetworkControllerOptions, NewNetworkConfiguration, ProviderHandles,
	UpsertNetworkOptions,
};
pub use error::NetworkControllerError;
pub use messenger::{Messenger, NetworkEvent, RestrictedMessenger, SubscriptionId};
