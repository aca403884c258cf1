// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration reader facade.
//!
//! A [`ConfigReader`] is the per-process component that caches one
//! application's active configuration in memory and keeps that cache fresh
//! through two complementary paths: a periodic timer and a push notification
//! listener. Reads are served from an immutable snapshot and never block on
//! I/O.
//!
//! # Lifecycle
//!
//! Construction validates its arguments, performs one awaited initial load
//! (fail-open: a store outage leaves the reader running with an empty cache)
//! and spawns the background tasks. [`ConfigReader::close`] stops future
//! refresh scheduling without interrupting one already in flight, and is
//! idempotent; dropping the reader closes it as well.

mod coordinator;

use crate::domain::{ConfigError, FromTypedValue, Result};
use crate::ports::{ChangeSubscriber, ConfigStore};
use chrono::{DateTime, Utc};
use coordinator::RefreshCoordinator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Default refresh interval: five minutes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(300_000);

/// Connection settings for a [`ConfigReader`].
///
/// # Examples
///
/// ```
/// use dynconfig::reader::ReaderOptions;
/// use std::time::Duration;
///
/// let options = ReaderOptions::new("SERVICE-A", "mongodb://localhost:27017")
///     .refresh_interval(Duration::from_secs(30))
///     .amqp_uri("amqp://localhost:5672");
/// assert_eq!(options.application_name, "SERVICE-A");
/// ```
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// The application identity whose records this reader loads.
    pub application_name: String,
    /// Connection target of the configuration store.
    pub store_uri: String,
    /// How often the timer path refreshes the cache.
    pub refresh_interval: Duration,
    /// Optional change-notification transport target. When absent the reader
    /// runs on the timer path alone.
    pub amqp_uri: Option<String>,
}

impl ReaderOptions {
    /// Creates options with the default five minute refresh interval and no
    /// notification transport.
    pub fn new(application_name: impl Into<String>, store_uri: impl Into<String>) -> Self {
        ReaderOptions {
            application_name: application_name.into(),
            store_uri: store_uri.into(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            amqp_uri: None,
        }
    }

    /// Sets the timer refresh interval.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Sets the change-notification transport target.
    pub fn amqp_uri(mut self, uri: impl Into<String>) -> Self {
        self.amqp_uri = Some(uri.into());
        self
    }
}

/// A live-refreshing, typed view over one application's configuration.
///
/// Reads are always non-throwing: a missing key or an unconvertible value
/// yields the requested type's default and a logged diagnostic. Staleness is
/// the designed degradation mode; during a store outage the reader keeps
/// serving the last snapshot it loaded.
///
/// # Examples
///
/// ```rust,no_run
/// use dynconfig::prelude::*;
///
/// # #[tokio::main]
/// # async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
/// let reader = ConfigReader::connect(
///     ReaderOptions::new("SERVICE-A", "mongodb://localhost:27017")
///         .amqp_uri("amqp://localhost:5672"),
/// )
/// .await?;
///
/// let site_name: String = reader.get("SiteName");
/// let max_items: i32 = reader.get("MaxItemCount");
/// println!("{site_name} allows {max_items} items");
/// # Ok(())
/// # }
/// ```
pub struct ConfigReader {
    coordinator: Arc<RefreshCoordinator>,
    shutdown: watch::Sender<bool>,
    closed: AtomicBool,
}

impl ConfigReader {
    /// Connects to the configured store and transport and starts the reader.
    ///
    /// The initial load is awaited so the reader is immediately usable on
    /// return; if it fails the construction still succeeds with an empty
    /// cache and the background paths retry. A transport that cannot be
    /// reached downgrades the reader to polling-only with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidArgument`] for an empty application
    /// name, an empty store target or a zero refresh interval.
    #[cfg(feature = "mongo")]
    pub async fn connect(options: ReaderOptions) -> Result<Self> {
        use crate::adapters::MongoStore;

        if options.store_uri.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "store_uri",
                "must not be empty",
            ));
        }

        let store: Arc<dyn ConfigStore> = Arc::new(MongoStore::connect(&options.store_uri).await?);

        #[cfg(feature = "amqp")]
        let subscriber: Option<Arc<dyn ChangeSubscriber>> = options
            .amqp_uri
            .as_deref()
            .map(|uri| Arc::new(crate::adapters::RabbitMqSubscriber::new(uri)) as _);
        #[cfg(not(feature = "amqp"))]
        let subscriber: Option<Arc<dyn ChangeSubscriber>> = None;

        Self::with_store(
            options.application_name,
            options.refresh_interval,
            store,
            subscriber,
        )
        .await
    }

    /// Starts a reader over an already-constructed store and optional
    /// subscriber.
    ///
    /// This is the seam the integration tests use; [`ConfigReader::connect`]
    /// is a thin wrapper that builds the concrete adapters first.
    pub async fn with_store(
        application_name: impl Into<String>,
        refresh_interval: Duration,
        store: Arc<dyn ConfigStore>,
        subscriber: Option<Arc<dyn ChangeSubscriber>>,
    ) -> Result<Self> {
        let application_name = application_name.into();
        if application_name.trim().is_empty() {
            return Err(ConfigError::invalid_argument(
                "application_name",
                "must not be empty",
            ));
        }
        if refresh_interval.is_zero() {
            return Err(ConfigError::invalid_argument(
                "refresh_interval",
                "must be greater than zero",
            ));
        }

        let coordinator = Arc::new(RefreshCoordinator::new(application_name, store));
        tracing::info!(
            application = %coordinator.application_name(),
            "starting configuration reader"
        );

        // Fail-open: an unreachable store at construction leaves an empty
        // cache for the timer and listener paths to fill in later.
        if let Err(e) = coordinator.refresh_now().await {
            tracing::error!(
                application = %coordinator.application_name(),
                "initial configuration load failed: {e}"
            );
        }

        let (shutdown, _) = watch::channel(false);

        tokio::spawn(run_timer(
            coordinator.clone(),
            refresh_interval,
            shutdown.subscribe(),
        ));

        if let Some(subscriber) = subscriber {
            match subscriber.subscribe().await {
                Ok(events) => {
                    tokio::spawn(run_listener(
                        coordinator.clone(),
                        events,
                        shutdown.subscribe(),
                    ));
                    tracing::info!(
                        application = %coordinator.application_name(),
                        "change listener started"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        application = %coordinator.application_name(),
                        "change subscription unavailable, refreshing on the timer only: {e}"
                    );
                }
            }
        }

        Ok(ConfigReader {
            coordinator,
            shutdown,
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the configuration value for `key` as `T`.
    ///
    /// Serves the live snapshot without blocking on I/O or on an in-flight
    /// refresh. A blank key, a missing key or a value that cannot represent
    /// `T` all return `T::default()` with a logged diagnostic; this method
    /// never fails.
    pub fn get<T: FromTypedValue>(&self, key: &str) -> T {
        if key.trim().is_empty() {
            tracing::warn!("configuration lookup with an empty key");
            return T::default();
        }
        let snapshot = self.coordinator.snapshot();
        match snapshot.get(key) {
            Some(value) => match T::from_typed(value) {
                Some(converted) => converted,
                None => {
                    tracing::error!(
                        key,
                        stored = value.tag(),
                        "stored configuration value cannot represent the requested type"
                    );
                    T::default()
                }
            },
            None => {
                tracing::warn!(key, "configuration key not found");
                T::default()
            }
        }
    }

    /// Async variant of [`ConfigReader::get`], for call sites that want a
    /// uniform async surface. The lookup itself never suspends.
    pub async fn get_async<T: FromTypedValue>(&self, key: &str) -> T {
        self.get(key)
    }

    /// Forces a refresh now and propagates its outcome.
    ///
    /// This is the only operation that forwards a refresh error to its
    /// caller; the timer and listener paths log and swallow theirs. A call
    /// arriving while another refresh is in flight coalesces onto it.
    pub async fn refresh(&self) -> Result<()> {
        self.coordinator.refresh_now().await
    }

    /// The application identity this reader serves.
    pub fn application_name(&self) -> &str {
        self.coordinator.application_name()
    }

    /// When the cache was last replaced by a successful refresh, if ever.
    pub fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.coordinator.last_refreshed_at()
    }

    /// Stops the background timer and listener.
    ///
    /// Idempotent; later calls are no-ops. A refresh already in flight runs
    /// to completion, only future scheduling stops. Reads keep working
    /// against the last snapshot after close.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.shutdown.send(true);
        tracing::info!(
            application = %self.coordinator.application_name(),
            "configuration reader closed"
        );
    }
}

impl Drop for ConfigReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ConfigReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigReader")
            .field("application_name", &self.application_name())
            .field("last_refreshed_at", &self.last_refreshed_at())
            .finish()
    }
}

/// Timer-driven refresh loop. Shutdown is only observed between cycles, so
/// an in-flight refresh always completes before the task exits.
async fn run_timer(
    coordinator: Arc<RefreshCoordinator>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = tokio::time::Instant::now() + period;
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.changed() => break,
        }
        if let Err(e) = coordinator.refresh_now().await {
            tracing::warn!(
                application = %coordinator.application_name(),
                "scheduled configuration refresh failed: {e}"
            );
        }
    }
    tracing::debug!(
        application = %coordinator.application_name(),
        "refresh timer stopped"
    );
}

/// Event-driven refresh loop. Filters the fanout stream down to events
/// relevant to this reader's identity, then refreshes; failures are logged
/// and never terminate the loop.
async fn run_listener(
    coordinator: Arc<RefreshCoordinator>,
    mut events: mpsc::Receiver<crate::domain::ChangeEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.changed() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => {
                    tracing::warn!(
                        application = %coordinator.application_name(),
                        "change event stream closed, refreshing on the timer only"
                    );
                    break;
                }
            },
        };

        if !event.is_relevant_to(coordinator.application_name()) {
            tracing::debug!(
                application = %coordinator.application_name(),
                event_application = ?event.application_name,
                "ignoring change event for another application"
            );
            continue;
        }

        tracing::info!(
            application = %coordinator.application_name(),
            action = %event.action,
            "change event received, refreshing configuration"
        );
        if let Err(e) = coordinator.refresh_now().await {
            tracing::warn!(
                application = %coordinator.application_name(),
                "event-driven configuration refresh failed: {e}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_refresh_interval_is_five_minutes() {
        assert_eq!(DEFAULT_REFRESH_INTERVAL, Duration::from_secs(300));
    }

    #[test]
    fn test_reader_options_builder() {
        let options = ReaderOptions::new("SERVICE-A", "mongodb://localhost:27017")
            .refresh_interval(Duration::from_secs(1))
            .amqp_uri("amqp://localhost:5672");
        assert_eq!(options.refresh_interval, Duration::from_secs(1));
        assert_eq!(options.amqp_uri.as_deref(), Some("amqp://localhost:5672"));
    }

    #[test]
    fn test_reader_options_default_interval() {
        let options = ReaderOptions::new("SERVICE-A", "mongodb://localhost:27017");
        assert_eq!(options.refresh_interval, DEFAULT_REFRESH_INTERVAL);
        assert!(options.amqp_uri.is_none());
    }
}
