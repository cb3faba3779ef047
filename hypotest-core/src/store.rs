//! Result stores
//!
//! [`ResultStore`] is the keyed persistence seam the [`crate::Analyzer`] is
//! built on. Stores assign ids and creation timestamps under their write
//! lock, so both are strictly increasing and never collide. Readers take
//! the shared lock and receive clones.

use crate::record::{AnalysisId, AnalysisRecord, NewAnalysis};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Storage-layer failure
///
/// Distinct from validation errors: the input was fine, the store was not.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but cannot be parsed
    #[error("store file {path} is corrupt: {reason}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A record could not be encoded
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keyed persistence for analysis records
pub trait ResultStore: Send + Sync {
    /// Assign an id and timestamp, persist, and return the stored record
    fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError>;

    /// Record by id
    fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>, StoreError>;

    /// All records, most recent first
    fn list(&self) -> Result<Vec<AnalysisRecord>, StoreError>;

    /// Remove a record; `false` if it did not exist
    fn delete(&self, id: AnalysisId) -> Result<bool, StoreError>;

    /// Number of stored records
    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }

    /// Whether the store holds no records
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Records plus the id/timestamp counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    next_id: AnalysisId,
    last_created_at: Option<DateTime<Utc>>,
    #[serde(with = "records_as_list")]
    records: BTreeMap<AnalysisId, AnalysisRecord>,
}

impl StoreState {
    fn stamp(&mut self, analysis: NewAnalysis) -> AnalysisRecord {
        self.next_id += 1;
        let now = Utc::now();
        let created_at = match self.last_created_at {
            // Keep timestamps strictly increasing even within one clock tick
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);

        let record = analysis.into_record(self.next_id, created_at);
        self.records.insert(self.next_id, record.clone());
        record
    }

    fn sorted(&self) -> Vec<AnalysisRecord> {
        let mut records: Vec<AnalysisRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| {
            b.result
                .created_at
                .cmp(&a.result.created_at)
                .then(b.result.id.cmp(&a.result.id))
        });
        records
    }
}

mod records_as_list {
    use super::{AnalysisId, AnalysisRecord};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        records: &BTreeMap<AnalysisId, AnalysisRecord>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(records.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<AnalysisId, AnalysisRecord>, D::Error> {
        let list = Vec::<AnalysisRecord>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|r| (r.result.id, r)).collect())
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Empty store; the first id is 1
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let record = self.state.write().stamp(analysis);
        debug!(id = record.result.id, "stored analysis in memory");
        Ok(record)
    }

    fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.state.read().records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<AnalysisRecord>, StoreError> {
        Ok(self.state.read().sorted())
    }

    fn delete(&self, id: AnalysisId) -> Result<bool, StoreError> {
        Ok(self.state.write().records.remove(&id).is_some())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().records.len())
    }
}

/// Store backed by a JSON file
///
/// The whole state is held in memory and the file is rewritten on every
/// mutation: the new contents go to a sibling temp file which is then
/// renamed over the original. A failed write leaves both the file and the
/// in-memory state unchanged.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
}

impl JsonFileStore {
    /// Open `path`, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            StoreState::default()
        };

        debug!(path = %path.display(), records = state.records.len(), "opened JSON store");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl ResultStore for JsonFileStore {
    fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, StoreError> {
        let mut state = self.state.write();
        let mut next = state.clone();
        let record = next.stamp(analysis);
        self.persist(&next)?;
        *state = next;

        debug!(id = record.result.id, path = %self.path.display(), "stored analysis");
        Ok(record)
    }

    fn get(&self, id: AnalysisId) -> Result<Option<AnalysisRecord>, StoreError> {
        Ok(self.state.read().records.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<AnalysisRecord>, StoreError> {
        Ok(self.state.read().sorted())
    }

    fn delete(&self, id: AnalysisId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        if !state.records.contains_key(&id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.records.remove(&id);
        self.persist(&next)?;
        *state = next;
        Ok(true)
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.state.read().records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Observation;
    use crate::record::GroupSummaries;
    use hypotest_engine::{ConfidenceLevel, EngineOptions, TestConfiguration, TestKind};
    use std::sync::Arc;
    use std::thread;

    fn analysis(filename: &str) -> NewAnalysis {
        NewAnalysis {
            configuration: TestConfiguration::new(TestKind::TTestIndependent, ConfidenceLevel::DEFAULT),
            options: EngineOptions::default(),
            statistic: -5.0,
            degrees_of_freedom: None,
            median: 5.0,
            std_dev: 2.5,
            p_value: 0.25,
            effect_size: None,
            filename: filename.into(),
            groups: GroupSummaries::default(),
            observations: vec![Observation::new("A", 1.0)],
        }
    }

    fn exercise(store: &dyn ResultStore) {
        let first = store.insert(analysis("one.csv")).unwrap();
        let second = store.insert(analysis("two.csv")).unwrap();

        assert!(second.result.id > first.result.id);
        assert!(second.result.created_at > first.result.created_at);

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].result.filename, "two.csv");

        assert_eq!(store.get(first.result.id).unwrap(), Some(first.clone()));
        assert!(store.delete(first.result.id).unwrap());
        assert!(!store.delete(first.result.id).unwrap());
        assert_eq!(store.get(first.result.id).unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_json_store() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&JsonFileStore::open(dir.path().join("history.json")).unwrap());
    }

    #[test]
    fn test_json_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let id = {
            let store = JsonFileStore::open(&path).unwrap();
            store.insert(analysis("kept.csv")).unwrap().result.id
        };

        let store = JsonFileStore::open(&path).unwrap();
        let record = store.get(id).unwrap().unwrap();
        assert_eq!(record.result.filename, "kept.csv");
        assert_eq!(record.observations, vec![Observation::new("A", 1.0)]);

        // Ids keep increasing across reopen
        let next = store.insert(analysis("next.csv")).unwrap();
        assert!(next.result.id > id);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_concurrent_inserts_get_unique_ids() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            store
                                .insert(analysis(&format!("{t}-{i}.csv")))
                                .unwrap()
                                .result
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }
}
