use std::collections::HashMap;

use polars::prelude::DataFrame;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Gen3Error;
use crate::export::RawDataStore;
use crate::table::flatten::flatten_records;

/// Export records nest under this field
pub const DATA_FIELD: &str = "data";

/// Flattened tables, same keys as the [`RawDataStore`] they were built from.
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    inner: HashMap<String, DataFrame>,
}

/// Outcome of one flatten pass
#[derive(Debug, Default)]
pub struct FlattenReport {
    pub flattened: Vec<String>,
    pub failed: Vec<(String, Gen3Error)>,
}

impl FlattenReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh snapshot from every raw entry.
    ///
    /// Keys are flattened independently: a failing key is reported and left
    /// out of the snapshot, the others are unaffected.
    pub fn build(raw: &RawDataStore) -> (Self, FlattenReport) {
        let mut store = Self::new();
        let mut report = FlattenReport::default();

        for (key, body) in raw {
            info!(key = %key, "converting to table");
            let data = body.get(DATA_FIELD).unwrap_or(&Value::Null);
            match flatten_records(data) {
                Ok(table) => {
                    store.inner.insert(key.clone(), table);
                    report.flattened.push(key.clone());
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "table conversion failed");
                    report.failed.push((key.clone(), e));
                }
            }
        }

        (store, report)
    }

    pub fn get(&self, key: &str) -> Option<&DataFrame> {
        self.inner.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataFrame)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
