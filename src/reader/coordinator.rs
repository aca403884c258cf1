// SPDX-License-Identifier: MIT OR Apache-2.0

//! Refresh coordination.
//!
//! The coordinator is the single choke point that replaces a reader's cache
//! reference. Timer ticks, change events and manual refresh calls all funnel
//! through [`RefreshCoordinator::refresh_now`], which guarantees at most one
//! fetch-and-convert cycle in flight per reader instance.

use crate::domain::{Result, Snapshot};
use crate::ports::ConfigStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

pub(crate) struct RefreshCoordinator {
    application_name: String,
    store: Arc<dyn ConfigStore>,
    /// The live snapshot reference. Replaced wholesale under a short write
    /// lock; readers clone the `Arc` and keep the old snapshot if a swap
    /// races them.
    snapshot: RwLock<Arc<Snapshot>>,
    /// In-flight-refresh guard. Held across the whole fetch-and-convert
    /// cycle; released on every exit path by the guard's scope.
    refresh_guard: Mutex<()>,
    last_refreshed_at: RwLock<Option<DateTime<Utc>>>,
}

impl RefreshCoordinator {
    pub(crate) fn new(application_name: String, store: Arc<dyn ConfigStore>) -> Self {
        RefreshCoordinator {
            application_name,
            store,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            refresh_guard: Mutex::new(()),
            last_refreshed_at: RwLock::new(None),
        }
    }

    pub(crate) fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Returns the current snapshot. Never blocks on I/O or on an in-flight
    /// refresh.
    pub(crate) fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        *self
            .last_refreshed_at
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetches active records and installs a fresh snapshot.
    ///
    /// If a refresh is already in flight, this call coalesces onto it: it
    /// waits for the in-progress cycle to finish and adopts its outcome
    /// instead of starting a second concurrent fetch. On store failure the
    /// previous snapshot stays in place and the error is returned; only the
    /// manual refresh path propagates it further.
    pub(crate) async fn refresh_now(&self) -> Result<()> {
        let _guard = match self.refresh_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                drop(self.refresh_guard.lock().await);
                return Ok(());
            }
        };
        self.load_once().await
    }

    async fn load_once(&self) -> Result<()> {
        let records = match self.store.fetch_active(&self.application_name).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    application = %self.application_name,
                    last_refreshed_at = ?self.last_refreshed_at(),
                    "configuration fetch failed, keeping current snapshot: {e}"
                );
                return Err(e);
            }
        };

        if records.is_empty() {
            // Intentional: an empty result keeps the working cache instead
            // of wiping it.
            tracing::warn!(
                application = %self.application_name,
                "store returned no active configuration records, keeping current snapshot"
            );
            return Ok(());
        }

        let snapshot = Arc::new(Snapshot::from_records(&records));
        let loaded = snapshot.len();
        *self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = snapshot;
        *self
            .last_refreshed_at
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Utc::now());

        tracing::info!(
            application = %self.application_name,
            records = loaded,
            "configuration snapshot refreshed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("application_name", &self.application_name)
            .field("last_refreshed_at", &self.last_refreshed_at())
            .finish()
    }
}
