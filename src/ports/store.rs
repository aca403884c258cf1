// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration store trait definition.
//!
//! This module defines the `ConfigStore` trait, the port through which the
//! crate talks to the durable document store holding configuration records.
//! The reader core only ever calls [`ConfigStore::fetch_active`]; the
//! remaining operations serve the administrative write surface.

use crate::domain::{ConfigRecord, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A durable store of configuration records.
///
/// Implementations must be `Send + Sync`; a store handle is shared between
/// the timer task, the change listener task and arbitrary caller tasks.
///
/// # Errors
///
/// Connectivity or query failures surface as
/// [`ConfigError::StoreUnavailable`](crate::domain::ConfigError::StoreUnavailable).
/// "Not found" is not an error: lookups return `Ok(None)` and deletions
/// return `Ok(false)`.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches every active record owned by `application_name`.
    ///
    /// Returns an empty list when the application has no active records.
    /// Inactive records and records for other applications are never
    /// returned.
    async fn fetch_active(&self, application_name: &str) -> Result<Vec<ConfigRecord>>;

    /// Fetches every active record across all applications.
    async fn fetch_all_active(&self) -> Result<Vec<ConfigRecord>>;

    /// Fetches one record by its store-assigned identifier.
    async fn get(&self, id: &str) -> Result<Option<ConfigRecord>>;

    /// Persists a new record and returns it with its assigned identifier
    /// and a fresh `last_updated_at` stamp.
    async fn insert(&self, record: ConfigRecord) -> Result<ConfigRecord>;

    /// Replaces an existing record, stamping `last_updated_at`.
    ///
    /// Returns `Ok(false)` when no record with the given identifier exists.
    async fn update(&self, record: &ConfigRecord) -> Result<bool>;

    /// Deletes a record by identifier. Returns `Ok(false)` when absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Fetches the active records of `application_name` written after
    /// `since`.
    async fn updated_since(
        &self,
        application_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConfigRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigError;

    struct UnreachableStore;

    #[async_trait]
    impl ConfigStore for UnreachableStore {
        async fn fetch_active(&self, _application_name: &str) -> Result<Vec<ConfigRecord>> {
            Err(ConfigError::StoreUnavailable {
                message: "down".to_string(),
                source: None,
            })
        }

        async fn fetch_all_active(&self) -> Result<Vec<ConfigRecord>> {
            Ok(vec![])
        }

        async fn get(&self, _id: &str) -> Result<Option<ConfigRecord>> {
            Ok(None)
        }

        async fn insert(&self, record: ConfigRecord) -> Result<ConfigRecord> {
            Ok(record)
        }

        async fn update(&self, _record: &ConfigRecord) -> Result<bool> {
            Ok(false)
        }

        async fn delete(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }

        async fn updated_since(
            &self,
            _application_name: &str,
            _since: DateTime<Utc>,
        ) -> Result<Vec<ConfigRecord>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_store_is_object_safe() {
        let store: Box<dyn ConfigStore> = Box::new(UnreachableStore);
        assert!(store.fetch_active("SERVICE-A").await.is_err());
        assert!(store.get("any").await.unwrap().is_none());
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<Box<dyn ConfigStore>>();
    }
}
