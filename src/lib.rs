// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic configuration distribution with live-refreshing typed readers.
//!
//! This crate distributes named, typed configuration values from a shared
//! document store to independent service instances. Each instance runs a
//! [`ConfigReader`](reader::ConfigReader) that caches only the records owned
//! by its own application identity, serves typed reads from that cache with
//! no blocking I/O, and keeps the cache eventually consistent through a
//! periodic timer plus a push-notification listener.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`ConfigRecord`, `TypedValue`, `Snapshot`,
//!   `ChangeEvent`, errors)
//! - **Ports**: Trait definitions for collaborators (`ConfigStore`,
//!   `ChangeNotifier`, `ChangeSubscriber`)
//! - **Adapters**: MongoDB store and RabbitMQ transport implementations
//! - **Reader**: The refresh coordinator and the public reader facade
//! - **Admin**: The write surface that publishes one change event per write
//!
//! # Consistency model
//!
//! Readers are eventually consistent with the store. The cache is an
//! immutable snapshot replaced wholesale by an atomic reference swap; a
//! failed refresh keeps the previous snapshot in place (fail-open), and a
//! read never raises: missing or unconvertible values fall back to the
//! requested type's default with a logged diagnostic.
//!
//! # Feature Flags
//!
//! - `mongo`: Enable the MongoDB store adapter (default)
//! - `amqp`: Enable the RabbitMQ notification adapters (default)
//! - `remote`: Enable both remote adapters
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use dynconfig::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let reader = ConfigReader::connect(
//!     ReaderOptions::new("SERVICE-A", "mongodb://localhost:27017")
//!         .amqp_uri("amqp://localhost:5672"),
//! )
//! .await?;
//!
//! let site_name: String = reader.get("SiteName");
//! let is_basket_enabled: bool = reader.get("IsBasketEnabled");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod admin;
pub mod domain;
pub mod ports;
pub mod reader;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for
/// convenient access.
pub mod prelude {
    pub use crate::admin::ConfigAdmin;
    pub use crate::domain::{
        ChangeAction, ChangeEvent, ConfigError, ConfigRecord, FromTypedValue, Result, Snapshot,
        TypedValue,
    };
    pub use crate::ports::{ChangeNotifier, ChangeSubscriber, ConfigStore};
    pub use crate::reader::{ConfigReader, ReaderOptions};

    // Re-export adapters based on feature flags
    #[cfg(feature = "amqp")]
    pub use crate::adapters::{RabbitMqNotifier, RabbitMqSubscriber};
    #[cfg(feature = "mongo")]
    pub use crate::adapters::MongoStore;
}
