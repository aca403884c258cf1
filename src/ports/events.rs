// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notification trait definitions.
//!
//! Two ports cover the pub/sub collaborator: `ChangeNotifier` is the publish
//! side used by the administrative surface, `ChangeSubscriber` is the
//! consume side used by readers. The transport is fanout-style: every
//! subscriber sees every event, and filtering happens in the listener.

use crate::domain::{ChangeEvent, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Publishes one change event per configuration write.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Publishes `event` to the fanout topic.
    async fn publish(&self, event: &ChangeEvent) -> Result<()>;
}

/// Delivers change events published by writers anywhere in the system.
///
/// A successful subscription yields a channel receiver; the adapter owns the
/// transport connection and forwards decoded events into the channel from its
/// own task, so a slow consumer never stalls message acknowledgment. The
/// channel closing signals that the transport is gone; readers then fall
/// back to timer-driven refreshes.
#[async_trait]
pub trait ChangeSubscriber: Send + Sync {
    /// Establishes the subscription and returns the event stream.
    ///
    /// Fails with
    /// [`ConfigError::TransportUnavailable`](crate::domain::ConfigError::TransportUnavailable)
    /// when the transport cannot be reached; callers treat that as a
    /// degraded mode, not a fatal error.
    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>>;
}
