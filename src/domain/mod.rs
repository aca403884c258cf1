// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and business logic.
//!
//! This module contains the fundamental concepts of configuration
//! distribution: the stored record shape, typed values and conversions,
//! immutable cache snapshots, change events and the error taxonomy. It is
//! independent of any concrete store or transport.

pub mod errors;
pub mod event;
pub mod record;
pub mod snapshot;
pub mod typed_value;

// Re-export commonly used types
pub use errors::{ConfigError, Result};
pub use event::{ChangeAction, ChangeEvent};
pub use record::ConfigRecord;
pub use snapshot::Snapshot;
pub use typed_value::{FromTypedValue, TypedValue};
