//! In-memory catalog store.
//!
//! The catalog is loaded once from a CSV file at startup and is read-only
//! for the process lifetime. Lookups resolve identifiers against both the
//! `id` and `uniq_id` fields, since records may have been inserted under
//! either.

use crate::error::{Error, Result};
use crate::record::{RawRecord, Record};
use ahash::{AHashMap, AHashSet};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Immutable product catalog with identifier lookup maps.
pub struct Catalog {
    records: Vec<Record>,
    by_id: AHashMap<String, usize>,
    by_uniq_id: AHashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct ClusterRow {
    uniq_id: String,
    #[serde(default)]
    cluster: Option<i64>,
}

impl Catalog {
    /// Load the catalog from a CSV file with a header row.
    ///
    /// The header must contain `uniq_id`; `id` is derived from `uniq_id`
    /// when the column is absent. Rows without any identifier are skipped
    /// with a warning.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;

        let headers = reader
            .headers()
            .map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;
        if !headers.iter().any(|h| h == "uniq_id") {
            return Err(Error::DataLoad(format!(
                "{}: missing required column 'uniq_id'",
                path.display()
            )));
        }

        let mut records = Vec::new();
        for (row_idx, row) in reader.deserialize::<RawRecord>().enumerate() {
            let raw = row.map_err(|e| {
                Error::DataLoad(format!("{} row {}: {}", path.display(), row_idx + 1, e))
            })?;
            match raw.normalize() {
                Some(record) => records.push(record),
                None => warn!(row = row_idx + 1, "skipping catalog row without identifiers"),
            }
        }

        info!(records = records.len(), path = %path.display(), "catalog loaded");
        Ok(Self::from_records(records))
    }

    /// Build a catalog from already-normalized records.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut by_id = AHashMap::with_capacity(records.len());
        let mut by_uniq_id = AHashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            // First occurrence wins, matching source row order on ties.
            by_id.entry(record.id.clone()).or_insert(idx);
            by_uniq_id.entry(record.uniq_id.clone()).or_insert(idx);
        }
        Self {
            records,
            by_id,
            by_uniq_id,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by identifier, checking both `id` and `uniq_id`.
    ///
    /// Returns the earliest matching row; never errors for a missing record.
    #[must_use]
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Record> {
        let idx = match (
            self.by_id.get(identifier),
            self.by_uniq_id.get(identifier),
        ) {
            (Some(&a), Some(&b)) => a.min(b),
            (Some(&a), None) => a,
            (None, Some(&b)) => b,
            (None, None) => return None,
        };
        self.records.get(idx)
    }

    /// Resolve every record matching any of the given identifiers under
    /// either field. De-duplicated by row identity, source row order.
    #[must_use]
    pub fn find_many<I, S>(&self, identifiers: I) -> Vec<&Record>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: AHashSet<String> = identifiers
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        self.records
            .iter()
            .filter(|r| wanted.contains(&r.id) || wanted.contains(&r.uniq_id))
            .collect()
    }

    /// Merge cluster assignments from a second CSV keyed by `uniq_id`.
    ///
    /// Assignments for unknown identifiers are ignored.
    pub fn apply_clusters<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;

        let mut assigned = 0usize;
        for row in reader.deserialize::<ClusterRow>() {
            let row = row.map_err(|e| Error::DataLoad(format!("{}: {}", path.display(), e)))?;
            let Some(cluster) = row.cluster else {
                continue;
            };
            if let Some(&idx) = self.by_uniq_id.get(&row.uniq_id) {
                self.records[idx].cluster = Some(cluster);
                assigned += 1;
            }
        }

        info!(assigned, path = %path.display(), "cluster assignments merged");
        Ok(())
    }
}
