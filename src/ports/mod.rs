// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions for external collaborators.
//!
//! This module defines the interfaces the core depends on: the durable
//! configuration store and the change-notification transport. Concrete
//! implementations live in the adapters layer; tests substitute in-memory
//! fakes.

pub mod events;
pub mod store;

pub use events::{ChangeNotifier, ChangeSubscriber};
pub use store::ConfigStore;
