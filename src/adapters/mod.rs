// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing concrete collaborator implementations.
//!
//! This module contains the implementations of the ports for the external
//! systems this crate actually ships against: MongoDB as the durable record
//! store and RabbitMQ as the change-notification transport. Both are
//! feature-gated so embedders can bring their own implementations instead.

#[cfg(feature = "mongo")]
pub mod mongo;
#[cfg(feature = "amqp")]
pub mod rabbitmq;

// Re-export adapters based on feature flags
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;
#[cfg(feature = "amqp")]
pub use rabbitmq::{RabbitMqNotifier, RabbitMqSubscriber, CONFIG_EXCHANGE};
