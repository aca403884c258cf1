// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration record as stored by the backing document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One named, typed configuration entry owned by an application.
///
/// Records are authored through the administrative surface and read by
/// [`ConfigReader`](crate::reader::ConfigReader) instances. Field names
/// serialize in PascalCase to stay wire-compatible with the store's existing
/// document shape (`Name`, `Type`, `Value`, `IsActive`, `ApplicationName`,
/// `LastUpdatedAt`).
///
/// # Examples
///
/// ```
/// use dynconfig::domain::ConfigRecord;
///
/// let record = ConfigRecord::new("SERVICE-A", "SiteName", "string", "soty.io");
/// assert!(record.is_active);
/// assert_eq!(record.application_name, "SERVICE-A");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigRecord {
    /// Store-assigned identifier, absent until the record is persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Case-sensitive lookup key, unique within one application identity.
    pub name: String,
    /// Declared type tag selecting the conversion rule.
    #[serde(rename = "Type")]
    pub type_tag: String,
    /// Raw string representation of the value.
    pub value: String,
    /// Inactive records never appear in a reader's cache.
    pub is_active: bool,
    /// The owning application identity.
    pub application_name: String,
    /// Timestamp of the last write; informational for readers, used by
    /// "changed since" queries.
    pub last_updated_at: DateTime<Utc>,
}

impl ConfigRecord {
    /// Creates a new active record stamped with the current time.
    pub fn new(
        application_name: impl Into<String>,
        name: impl Into<String>,
        type_tag: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        ConfigRecord {
            id: None,
            name: name.into(),
            type_tag: type_tag.into(),
            value: value.into(),
            is_active: true,
            application_name: application_name.into(),
            last_updated_at: Utc::now(),
        }
    }

    /// Returns the same record with `is_active` set as given.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}
