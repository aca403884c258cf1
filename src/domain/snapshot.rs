// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable cache snapshots.
//!
//! A snapshot is the unit of cache replacement: it is built in full from one
//! successful store fetch and then never mutated. Readers holding an old
//! snapshot keep seeing it unchanged while a new one is published.

use crate::domain::record::ConfigRecord;
use crate::domain::typed_value::TypedValue;
use std::collections::HashMap;

/// An immutable mapping from configuration name to converted value.
///
/// Lookups are O(1), never block and never touch I/O. Snapshots are either
/// fully populated from one fetch or not installed at all; there is no
/// partially-applied state visible to readers.
///
/// # Examples
///
/// ```
/// use dynconfig::domain::{ConfigRecord, Snapshot, TypedValue};
///
/// let records = vec![ConfigRecord::new("SERVICE-A", "MaxItemCount", "int", "50")];
/// let snapshot = Snapshot::from_records(&records);
/// assert_eq!(snapshot.get("MaxItemCount"), Some(&TypedValue::Int(50)));
/// assert_eq!(snapshot.get("missing"), None);
/// ```
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: HashMap<String, TypedValue>,
}

impl Snapshot {
    /// Creates an empty snapshot, as held by a reader before its first
    /// successful load.
    pub fn empty() -> Self {
        Snapshot::default()
    }

    /// Builds a snapshot by running every record through the type converter.
    ///
    /// A record whose value does not parse into its declared type is dropped
    /// from the snapshot with an error log; the rest of the batch still
    /// loads. Duplicate names keep the last occurrence.
    pub fn from_records(records: &[ConfigRecord]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            match TypedValue::convert(&record.value, &record.type_tag) {
                Ok(value) => {
                    entries.insert(record.name.clone(), value);
                }
                Err(e) => {
                    tracing::error!(name = %record.name, "skipping configuration record: {e}");
                }
            }
        }
        Snapshot { entries }
    }

    /// Looks up the converted value for `name`.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.entries.get(name)
    }

    /// Number of entries in this snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the configuration names in this snapshot.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
