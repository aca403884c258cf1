// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared in-memory fakes for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dynconfig::domain::{ChangeEvent, ConfigError, ConfigRecord, Result};
use dynconfig::ports::{ChangeNotifier, ChangeSubscriber, ConfigStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Builds an active record owned by `application_name`.
pub fn record(application_name: &str, name: &str, type_tag: &str, value: &str) -> ConfigRecord {
    ConfigRecord::new(application_name, name, type_tag, value)
}

/// An in-memory `ConfigStore` with togglable availability, an optional
/// per-fetch delay, and a fetch counter for asserting refresh behavior.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ConfigRecord>>,
    unavailable: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryStore::default())
    }

    pub fn with_records(records: Vec<ConfigRecord>) -> Arc<Self> {
        let store = MemoryStore::new();
        store.set_records(records);
        store
    }

    /// Replaces the stored records wholesale.
    pub fn set_records(&self, records: Vec<ConfigRecord>) {
        *self.records.lock().unwrap() = records;
    }

    /// Makes every fetch fail with `StoreUnavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Adds an artificial delay to every `fetch_active`, to hold a refresh
    /// in flight while other callers pile up.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Number of `fetch_active` calls observed, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ConfigError::StoreUnavailable {
                message: "memory store marked unavailable".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn fetch_active(&self, application_name: &str) -> Result<Vec<ConfigRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active && r.application_name == application_name)
            .cloned()
            .collect())
    }

    async fn fetch_all_active(&self) -> Result<Vec<ConfigRecord>> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ConfigRecord>> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id.as_deref() == Some(id))
            .cloned())
    }

    async fn insert(&self, mut record: ConfigRecord) -> Result<ConfigRecord> {
        self.check_available()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.id = Some(format!("mem-{n}"));
        record.last_updated_at = Utc::now();
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, record: &ConfigRecord) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id.is_some() && r.id == record.id)
        {
            Some(existing) => {
                *existing = record.clone();
                existing.last_updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        Ok(records.len() < before)
    }

    async fn updated_since(
        &self,
        application_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConfigRecord>> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.is_active && r.application_name == application_name && r.last_updated_at > since
            })
            .cloned()
            .collect())
    }
}

/// A subscriber backed by a plain channel, letting tests inject change
/// events as if a broker had delivered them.
pub struct ChannelSubscriber {
    receiver: Mutex<Option<mpsc::Receiver<ChangeEvent>>>,
}

impl ChannelSubscriber {
    /// Returns the subscriber and the sender half used to inject events.
    pub fn pair() -> (Arc<Self>, mpsc::Sender<ChangeEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let subscriber = Arc::new(ChannelSubscriber {
            receiver: Mutex::new(Some(rx)),
        });
        (subscriber, tx)
    }
}

#[async_trait]
impl ChangeSubscriber for ChannelSubscriber {
    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>> {
        self.receiver
            .lock()
            .unwrap()
            .take()
            .ok_or(ConfigError::TransportUnavailable {
                message: "channel already subscribed".to_string(),
                source: None,
            })
    }
}

/// A subscriber whose transport can never be reached.
pub struct FailingSubscriber;

#[async_trait]
impl ChangeSubscriber for FailingSubscriber {
    async fn subscribe(&self) -> Result<mpsc::Receiver<ChangeEvent>> {
        Err(ConfigError::TransportUnavailable {
            message: "broker unreachable".to_string(),
            source: None,
        })
    }
}

/// A notifier that records every event it is asked to publish.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingNotifier::default())
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn publish(&self, event: &ChangeEvent) -> Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// A notifier whose transport is down.
pub struct FailingNotifier;

#[async_trait]
impl ChangeNotifier for FailingNotifier {
    async fn publish(&self, _event: &ChangeEvent) -> Result<()> {
        Err(ConfigError::TransportUnavailable {
            message: "broker unreachable".to_string(),
            source: None,
        })
    }
}
