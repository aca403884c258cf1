// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change events published on every configuration write.
//!
//! Events travel over a fanout transport, so every reader instance of every
//! application receives every event; filtering by application identity is the
//! listener's responsibility, not the transport's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of write that produced a change event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeAction {
    /// A record was created.
    Created,
    /// A record was updated.
    Updated,
    /// A record was deleted.
    Deleted,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "Created"),
            ChangeAction::Updated => write!(f, "Updated"),
            ChangeAction::Deleted => write!(f, "Deleted"),
        }
    }
}

/// A notification that configuration changed for one application, or for all.
///
/// An absent or empty `application_name` is a deliberate wildcard: it marks
/// the event as relevant to every reader, regardless of identity. Field names
/// serialize in PascalCase to match the payloads already flowing through the
/// `config.updates` exchange.
///
/// # Examples
///
/// ```
/// use dynconfig::domain::{ChangeAction, ChangeEvent};
///
/// let event = ChangeEvent::for_application("SERVICE-A", ChangeAction::Updated);
/// assert!(event.is_relevant_to("SERVICE-A"));
/// assert!(!event.is_relevant_to("SERVICE-B"));
///
/// let broadcast = ChangeEvent::broadcast(ChangeAction::Deleted);
/// assert!(broadcast.is_relevant_to("SERVICE-B"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeEvent {
    /// The application the change applies to; `None` (or empty) broadcasts
    /// to all readers.
    #[serde(default)]
    pub application_name: Option<String>,
    /// What kind of write happened.
    pub action: ChangeAction,
    /// When the write happened.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Creates an event scoped to one application identity.
    pub fn for_application(application_name: impl Into<String>, action: ChangeAction) -> Self {
        ChangeEvent {
            application_name: Some(application_name.into()),
            action,
            timestamp: Utc::now(),
        }
    }

    /// Creates a wildcard event relevant to every reader.
    pub fn broadcast(action: ChangeAction) -> Self {
        ChangeEvent {
            application_name: None,
            action,
            timestamp: Utc::now(),
        }
    }

    /// Whether a reader with the given identity should act on this event.
    pub fn is_relevant_to(&self, application_name: &str) -> bool {
        match self.application_name.as_deref() {
            None | Some("") => true,
            Some(name) => name == application_name,
        }
    }
}
