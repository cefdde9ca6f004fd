//! Key-value persistence for the generated plan.
//!
//! The checklist never touches storage directly; callers load and save
//! through [`KeyValueStore`], so the backend can be swapped freely.
//!
//! ```text
//!   key "plan"       -> ["## Channel", "1. step", ...]
//!   key "plan_meta"  -> { submissionId, generatedAt, channels }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::plan::AggregatedPlan;

/// Key holding the flattened plan lines.
pub const PLAN_KEY: &str = "plan";

/// Key holding metadata about the stored plan.
pub const PLAN_META_KEY: &str = "plan_meta";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value is not valid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid store key {0:?}: use ASCII letters, digits, '-' or '_'")]
    InvalidKey(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Get / set / remove JSON values by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// Compile-time assertion: KeyValueStore must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn KeyValueStore) {}
};

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        check_key(key)?;
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a uniquely named temp file that is renamed over the target,
/// so a reader never sees a half-written value and concurrent writers never
/// share a temp file.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self
            .dir
            .join(format!(".{key}.{}.json.tmp", Uuid::new_v4().simple()));
        let contents = serde_json::to_string_pretty(&value)?;

        std::fs::write(&tmp, contents).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(key, path = %path.display(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan helpers
// ---------------------------------------------------------------------------

/// Metadata stored next to the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMeta {
    pub submission_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Channels in the order they were generated.
    pub channels: Vec<String>,
}

impl PlanMeta {
    pub fn new(submission_id: Uuid, channels: Vec<String>) -> Self {
        Self {
            submission_id,
            generated_at: Utc::now(),
            channels,
        }
    }
}

/// Read the stored plan. A missing key is an empty plan; a value that is not
/// an array of strings is an error.
pub fn load_plan(store: &dyn KeyValueStore) -> Result<AggregatedPlan, StoreError> {
    match store.get(PLAN_KEY)? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(AggregatedPlan::new()),
    }
}

/// Overwrite the stored plan.
pub fn save_plan(store: &dyn KeyValueStore, plan: &AggregatedPlan) -> Result<(), StoreError> {
    store.set(PLAN_KEY, serde_json::to_value(plan)?)
}

pub fn load_plan_meta(store: &dyn KeyValueStore) -> Result<Option<PlanMeta>, StoreError> {
    store
        .get(PLAN_META_KEY)?
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}

pub fn save_plan_meta(store: &dyn KeyValueStore, meta: &PlanMeta) -> Result<(), StoreError> {
    store.set(PLAN_META_KEY, serde_json::to_value(meta)?)
}

/// Remove the plan and its metadata.
pub fn clear_plan(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(PLAN_KEY)?;
    store.remove(PLAN_META_KEY)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::checklist::Checklist;

    fn sample_plan() -> AggregatedPlan {
        AggregatedPlan::from_lines(vec![
            "## Content Marketing".into(),
            "1. Write a post.".into(),
            "## SEO (Basic)".into(),
            "1. Research keywords.".into(),
            "2. Fix titles.".into(),
        ])
    }

    #[test]
    fn missing_plan_loads_empty() {
        let store = MemoryStore::new();
        assert!(load_plan(&store).unwrap().is_empty());
    }

    #[test]
    fn plan_round_trip_gives_fresh_checklist() {
        let store = MemoryStore::new();
        save_plan(&store, &sample_plan()).unwrap();

        let checklist = Checklist::new(load_plan(&store).unwrap());
        assert_eq!(checklist.len(), 5);
        assert!(checklist.completed().iter().all(|c| !c));
        assert_eq!(checklist.plan(), &sample_plan());
    }

    #[test]
    fn plan_is_stored_as_string_array() {
        let store = MemoryStore::new();
        save_plan(&store, &sample_plan()).unwrap();
        let raw = store.get(PLAN_KEY).unwrap().unwrap();
        assert_eq!(raw[0], json!("## Content Marketing"));
        assert_eq!(raw.as_array().unwrap().len(), 5);
    }

    #[test]
    fn corrupt_plan_is_an_error() {
        let store = MemoryStore::new();
        store.set(PLAN_KEY, json!({"not": "a list"})).unwrap();
        assert!(matches!(load_plan(&store), Err(StoreError::Json(_))));
    }

    #[test]
    fn invalid_keys_are_rejected() {
        let store = MemoryStore::new();
        for key in ["", "../etc", "a b", "x.json"] {
            assert!(
                matches!(store.get(key), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert!(store.get("plan").unwrap().is_none());
        store.set("plan", json!(["## A", "1. a"])).unwrap();
        assert!(dir.path().join("data/plan.json").exists());
        assert_eq!(store.get("plan").unwrap(), Some(json!(["## A", "1. a"])));

        store.remove("plan").unwrap();
        assert!(store.get("plan").unwrap().is_none());
        // Removing twice is fine.
        store.remove("plan").unwrap();
    }

    #[test]
    fn file_store_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("plan", json!(["old"])).unwrap();
        store.set("plan", json!(["new"])).unwrap();

        assert_eq!(store.get("plan").unwrap(), Some(json!(["new"])));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["plan.json"]);
    }

    #[test]
    fn file_store_concurrent_writes_to_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = &store;
                    scope.spawn(move || store.set("plan", json!([format!("writer {i}")])))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        let value = store.get("plan").unwrap().unwrap();
        assert!(value[0].as_str().unwrap().starts_with("writer "));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["plan.json"]);
    }

    #[test]
    fn meta_round_trip_and_clear() {
        let store = MemoryStore::new();
        let meta = PlanMeta::new(Uuid::new_v4(), vec!["SEO (Basic)".into()]);
        save_plan(&store, &sample_plan()).unwrap();
        save_plan_meta(&store, &meta).unwrap();

        assert_eq!(load_plan_meta(&store).unwrap(), Some(meta));

        clear_plan(&store).unwrap();
        assert!(load_plan(&store).unwrap().is_empty());
        assert!(load_plan_meta(&store).unwrap().is_none());
    }
}
