// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error taxonomy for configuration distribution.
//! All errors use `thiserror` for proper error handling and conversion.
//!
//! Note that key lookups are deliberately absent from this taxonomy: reads
//! against a snapshot never fail, they fall back to the requested type's
//! default value and log a diagnostic instead.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible errors that can occur when loading,
/// converting, or distributing configuration records. It is marked as
/// `#[non_exhaustive]` to allow for future additions without breaking
/// backwards compatibility.
///
/// # Examples
///
/// ```
/// use dynconfig::domain::errors::ConfigError;
///
/// fn validate(name: &str) -> Result<(), ConfigError> {
///     if name.trim().is_empty() {
///         return Err(ConfigError::invalid_argument(
///             "application_name",
///             "must not be empty",
///         ));
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A construction argument was missing or malformed. Fatal; raised
    /// immediately instead of degrading.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument {
        /// The name of the offending argument
        name: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The configuration store could not be reached or queried. Recovered by
    /// serving the last known snapshot until a later refresh succeeds.
    #[error("configuration store unavailable: {message}")]
    StoreUnavailable {
        /// The error message
        message: String,
        /// The underlying store error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single record's raw value could not be parsed into its declared
    /// type. The record is dropped from the snapshot; the batch continues.
    #[error("cannot parse '{value}' as '{type_tag}': {message}")]
    ConversionFailure {
        /// The declared type tag of the record
        type_tag: String,
        /// The raw value that failed to parse
        value: String,
        /// The parser's error message
        message: String,
    },

    /// The change-notification transport could not be reached. Recovered by
    /// falling back to timer-driven refreshes only.
    #[error("change notification transport unavailable: {message}")]
    TransportUnavailable {
        /// The error message
        message: String,
        /// The underlying transport error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A change event payload could not be encoded or decoded.
    #[error("change event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an `InvalidArgument` error for the named argument.
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Creates a `StoreUnavailable` error wrapping an underlying store error.
    pub fn store_unavailable(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::StoreUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a `TransportUnavailable` error wrapping an underlying
    /// transport error.
    pub fn transport_unavailable(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::TransportUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a `ConversionFailure` for a record value that did not parse
    /// into its declared type.
    pub fn conversion_failure(
        type_tag: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ConfigError::ConversionFailure {
            type_tag: type_tag.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
