// SPDX-License-Identifier: MIT OR Apache-2.0

//! MongoDB configuration store adapter.
//!
//! This module provides the `ConfigStore` implementation backed by the
//! `DynamicConfig` database's `configurations` collection. Document field
//! names are PascalCase to match the collection's existing shape.

use crate::domain::{ConfigError, ConfigRecord, Result};
use crate::ports::ConfigStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

const DATABASE: &str = "DynamicConfig";
const COLLECTION: &str = "configurations";

/// On-disk document shape. Kept separate from the domain record so the
/// `_id`/`ObjectId` representation stays an adapter concern.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    type_tag: String,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "IsActive")]
    is_active: bool,
    #[serde(rename = "ApplicationName")]
    application_name: String,
    #[serde(
        rename = "LastUpdatedAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    last_updated_at: DateTime<Utc>,
}

impl From<ConfigDocument> for ConfigRecord {
    fn from(doc: ConfigDocument) -> Self {
        ConfigRecord {
            id: doc.id.map(|oid| oid.to_hex()),
            name: doc.name,
            type_tag: doc.type_tag,
            value: doc.value,
            is_active: doc.is_active,
            application_name: doc.application_name,
            last_updated_at: doc.last_updated_at,
        }
    }
}

impl ConfigDocument {
    fn from_record(record: &ConfigRecord, id: Option<ObjectId>) -> Self {
        ConfigDocument {
            id,
            name: record.name.clone(),
            type_tag: record.type_tag.clone(),
            value: record.value.clone(),
            is_active: record.is_active,
            application_name: record.application_name.clone(),
            last_updated_at: record.last_updated_at,
        }
    }
}

/// Configuration store adapter for MongoDB.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconfig::adapters::MongoStore;
/// use dynconfig::ports::ConfigStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MongoStore::connect("mongodb://localhost:27017").await?;
/// let records = store.fetch_active("SERVICE-A").await?;
/// println!("{} active records", records.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    collection: Collection<ConfigDocument>,
}

impl MongoStore {
    /// Connects to MongoDB and prepares the `configurations` collection.
    ///
    /// Index creation is best-effort: a store reachable but unwilling to
    /// create indexes still works, just slower.
    pub async fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| ConfigError::store_unavailable("cannot create MongoDB client", e))?;
        let collection = client.database(DATABASE).collection(COLLECTION);
        let store = MongoStore { collection };
        store.ensure_indexes().await;
        Ok(store)
    }

    async fn ensure_indexes(&self) {
        let indexes = [
            IndexModel::builder()
                .keys(doc! { "ApplicationName": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "Name": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "ApplicationName": 1, "Name": 1 })
                .build(),
        ];
        for index in indexes {
            if let Err(e) = self.collection.create_index(index).await {
                tracing::warn!("could not create configuration index: {e}");
            }
        }
    }

    async fn find_records(&self, filter: mongodb::bson::Document) -> Result<Vec<ConfigRecord>> {
        let cursor = self
            .collection
            .find(filter)
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration query failed", e))?;
        let documents: Vec<ConfigDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration cursor failed", e))?;
        Ok(documents.into_iter().map(ConfigRecord::from).collect())
    }
}

#[async_trait]
impl ConfigStore for MongoStore {
    async fn fetch_active(&self, application_name: &str) -> Result<Vec<ConfigRecord>> {
        let records = self
            .find_records(doc! { "ApplicationName": application_name, "IsActive": true })
            .await?;
        tracing::debug!(
            application = application_name,
            records = records.len(),
            "fetched active configuration records"
        );
        Ok(records)
    }

    async fn fetch_all_active(&self) -> Result<Vec<ConfigRecord>> {
        self.find_records(doc! { "IsActive": true }).await
    }

    async fn get(&self, id: &str) -> Result<Option<ConfigRecord>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => {
                tracing::debug!(id, "not a valid record identifier");
                return Ok(None);
            }
        };
        let document = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration lookup failed", e))?;
        Ok(document.map(ConfigRecord::from))
    }

    async fn insert(&self, mut record: ConfigRecord) -> Result<ConfigRecord> {
        record.last_updated_at = Utc::now();
        let document = ConfigDocument::from_record(&record, None);
        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration insert failed", e))?;
        record.id = result.inserted_id.as_object_id().map(|oid| oid.to_hex());
        tracing::info!(
            application = %record.application_name,
            name = %record.name,
            "configuration record created"
        );
        Ok(record)
    }

    async fn update(&self, record: &ConfigRecord) -> Result<bool> {
        let oid = match record.id.as_deref().map(ObjectId::parse_str) {
            Some(Ok(oid)) => oid,
            _ => return Ok(false),
        };
        let mut stamped = record.clone();
        stamped.last_updated_at = Utc::now();
        let document = ConfigDocument::from_record(&stamped, Some(oid));
        let result = self
            .collection
            .replace_one(doc! { "_id": oid }, document)
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration update failed", e))?;
        let updated = result.modified_count > 0;
        if updated {
            tracing::info!(
                application = %record.application_name,
                name = %record.name,
                "configuration record updated"
            );
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|e| ConfigError::store_unavailable("configuration delete failed", e))?;
        let deleted = result.deleted_count > 0;
        if deleted {
            tracing::info!(id, "configuration record deleted");
        }
        Ok(deleted)
    }

    async fn updated_since(
        &self,
        application_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConfigRecord>> {
        self.find_records(doc! {
            "ApplicationName": application_name,
            "IsActive": true,
            "LastUpdatedAt": { "$gt": mongodb::bson::DateTime::from_chrono(since) },
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_record_round_trip() {
        let oid = ObjectId::new();
        let document = ConfigDocument {
            id: Some(oid),
            name: "MaxItemCount".to_string(),
            type_tag: "int".to_string(),
            value: "50".to_string(),
            is_active: true,
            application_name: "SERVICE-A".to_string(),
            last_updated_at: Utc::now(),
        };
        let record = ConfigRecord::from(document);
        assert_eq!(record.id.as_deref(), Some(oid.to_hex().as_str()));
        let back = ConfigDocument::from_record(&record, Some(oid));
        assert_eq!(back.name, "MaxItemCount");
        assert_eq!(back.id, Some(oid));
    }

    #[test]
    fn test_document_field_names_match_collection_shape() {
        let document = ConfigDocument {
            id: None,
            name: "SiteName".to_string(),
            type_tag: "string".to_string(),
            value: "soty.io".to_string(),
            is_active: true,
            application_name: "SERVICE-A".to_string(),
            last_updated_at: Utc::now(),
        };
        let bson = mongodb::bson::to_document(&document).unwrap();
        assert!(bson.contains_key("Name"));
        assert!(bson.contains_key("Type"));
        assert!(bson.contains_key("IsActive"));
        assert!(bson.contains_key("ApplicationName"));
        assert!(bson.contains_key("LastUpdatedAt"));
        assert!(!bson.contains_key("_id"));
    }
}
