// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative write surface.
//!
//! Ordinary request/response CRUD over the record store, with one twist:
//! every successful write publishes exactly one change event so that reader
//! instances learn about it without waiting for their next timer tick. The
//! event is published after the durable write; a notification failure is
//! logged and does not fail the write, readers will still converge on the
//! next poll.

use crate::domain::{ChangeAction, ChangeEvent, ConfigError, ConfigRecord, Result};
use crate::ports::{ChangeNotifier, ConfigStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// CRUD service over configuration records with change notification.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconfig::admin::ConfigAdmin;
/// use dynconfig::adapters::{MongoStore, RabbitMqNotifier};
/// use dynconfig::domain::ConfigRecord;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MongoStore::connect("mongodb://localhost:27017").await?);
/// let notifier = Arc::new(RabbitMqNotifier::connect("amqp://localhost:5672").await?);
/// let admin = ConfigAdmin::new(store, notifier);
///
/// let record = ConfigRecord::new("SERVICE-A", "MaxItemCount", "int", "50");
/// let created = admin.create(record).await?;
/// println!("created {:?}", created.id);
/// # Ok(())
/// # }
/// ```
pub struct ConfigAdmin {
    store: Arc<dyn ConfigStore>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl ConfigAdmin {
    /// Creates the service over a store and a notifier.
    pub fn new(store: Arc<dyn ConfigStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        ConfigAdmin { store, notifier }
    }

    /// Lists all active records, optionally filtered by a case-insensitive
    /// substring of the record name.
    pub async fn list_active(&self, name_filter: Option<&str>) -> Result<Vec<ConfigRecord>> {
        let mut records = self.store.fetch_all_active().await?;
        if let Some(filter) = name_filter.map(str::to_lowercase).filter(|f| !f.is_empty()) {
            records.retain(|record| record.name.to_lowercase().contains(&filter));
        }
        tracing::debug!(records = records.len(), "listed active configurations");
        Ok(records)
    }

    /// Lists the active records of one application.
    pub async fn list_for_application(&self, application_name: &str) -> Result<Vec<ConfigRecord>> {
        self.store.fetch_active(application_name).await
    }

    /// Fetches one record by identifier.
    pub async fn get(&self, id: &str) -> Result<Option<ConfigRecord>> {
        self.store.get(id).await
    }

    /// Persists a new record and publishes a `Created` event.
    pub async fn create(&self, record: ConfigRecord) -> Result<ConfigRecord> {
        validate(&record)?;
        let created = self.store.insert(record).await?;
        self.notify(&created.application_name, ChangeAction::Created)
            .await;
        Ok(created)
    }

    /// Replaces an existing record and publishes an `Updated` event.
    ///
    /// Returns `Ok(false)` without publishing when the record does not
    /// exist.
    pub async fn update(&self, record: &ConfigRecord) -> Result<bool> {
        validate(record)?;
        let updated = self.store.update(record).await?;
        if updated {
            self.notify(&record.application_name, ChangeAction::Updated)
                .await;
        }
        Ok(updated)
    }

    /// Deletes a record and publishes a `Deleted` event scoped to the owning
    /// application. Returns `Ok(false)` without publishing when absent.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let Some(existing) = self.store.get(id).await? else {
            tracing::warn!(id, "configuration record not found for deletion");
            return Ok(false);
        };
        let deleted = self.store.delete(id).await?;
        if deleted {
            self.notify(&existing.application_name, ChangeAction::Deleted)
                .await;
        }
        Ok(deleted)
    }

    /// Fetches an application's active records written after `since`.
    pub async fn updated_since(
        &self,
        application_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConfigRecord>> {
        self.store.updated_since(application_name, since).await
    }

    /// Publishes a wildcard event telling every reader to refresh.
    ///
    /// Unlike the per-write notifications this propagates transport errors,
    /// since the broadcast is the caller's whole intent.
    pub async fn notify_all(&self, action: ChangeAction) -> Result<()> {
        self.notifier.publish(&ChangeEvent::broadcast(action)).await
    }

    async fn notify(&self, application_name: &str, action: ChangeAction) {
        let event = ChangeEvent::for_application(application_name, action);
        match self.notifier.publish(&event).await {
            Ok(()) => {
                tracing::info!(application = application_name, action = %action, "change notification sent");
            }
            Err(e) => {
                tracing::warn!(
                    application = application_name,
                    "change notification could not be published: {e}"
                );
            }
        }
    }
}

fn validate(record: &ConfigRecord) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(ConfigError::invalid_argument("name", "must not be empty"));
    }
    if record.application_name.trim().is_empty() {
        return Err(ConfigError::invalid_argument(
            "application_name",
            "must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_name() {
        let record = ConfigRecord::new("SERVICE-A", "  ", "int", "1");
        assert!(matches!(
            validate(&record).unwrap_err(),
            ConfigError::InvalidArgument { name: "name", .. }
        ));
    }

    #[test]
    fn test_validate_rejects_blank_application() {
        let record = ConfigRecord::new("", "MaxItemCount", "int", "1");
        assert!(matches!(
            validate(&record).unwrap_err(),
            ConfigError::InvalidArgument {
                name: "application_name",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_accepts_complete_record() {
        let record = ConfigRecord::new("SERVICE-A", "MaxItemCount", "int", "1");
        assert!(validate(&record).is_ok());
    }
}
