use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Every collection the engine persists. Opening a workspace touches each
/// one so a malformed file fails up front instead of on first use.
pub const COLLECTIONS: [&str; 5] = [
    "users",
    "assignments",
    "submissions",
    "clubs",
    "questionnaires",
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection {name} is corrupt: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("collection {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    fn io(name: &str, source: std::io::Error) -> Self {
        StoreError::Io {
            name: name.to_string(),
            source,
        }
    }
}

/// File-backed collection store. Each named collection is one JSON document
/// (a top-level array of records) under the workspace `data/` directory.
/// Mutations go through [`Store::update`], which holds the collection's
/// mutex across the whole read-modify-write sequence, so two operations on
/// the same collection can never lose an update to each other.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

pub fn open_store(workspace: &Path) -> Result<Store, StoreError> {
    let root = workspace.join("data");
    fs::create_dir_all(&root).map_err(|e| StoreError::io("data", e))?;
    let store = Store {
        root,
        locks: Mutex::new(HashMap::new()),
    };
    for name in COLLECTIONS {
        // Absent files are healed to an empty array; malformed ones are
        // fatal here, not auto-healed.
        store.load::<serde_json::Value>(name)?;
    }
    Ok(store)
}

impl Store {
    pub fn data_dir(&self) -> &Path {
        &self.root
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn seq_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.seq"))
    }

    /// Read a full collection. A valid snapshot, not a live view: callers
    /// that intend to write back must use [`Store::update`] instead.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.read_unlocked(name)
    }

    /// Run `apply` over the decoded records while holding the collection's
    /// exclusive lock, persisting the result only when `apply` succeeds.
    pub fn update<T, R, E, F>(&self, name: &str, apply: F) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
    {
        let lock = self.lock_for(name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut records = self.read_unlocked::<T>(name)?;
        let out = apply(&mut records)?;
        self.write_unlocked(name, &records)?;
        Ok(out)
    }

    /// Allocate the next numeric id for a collection from its sidecar
    /// sequence file. `floor` is the highest id the caller has seen in the
    /// collection itself, so hand-seeded data directories never collide.
    pub fn next_id(&self, name: &str, floor: i64) -> Result<i64, StoreError> {
        let seq_name = format!("{name}.seq");
        let lock = self.lock_for(&seq_name);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let path = self.seq_path(name);
        let last: i64 = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(text.trim()).map_err(|e| StoreError::Corrupt {
                name: seq_name.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => return Err(StoreError::io(&seq_name, e)),
        };

        let next = last.max(floor) + 1;
        let tmp = self.root.join(format!("{name}.seq.tmp"));
        fs::write(&tmp, format!("{next}\n")).map_err(|e| StoreError::io(&seq_name, e))?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&seq_name, e))?;
        Ok(next)
    }

    fn read_unlocked<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.collection_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.write_raw(name, b"[]\n")?;
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(name, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            name: name.to_string(),
            source: e,
        })
    }

    fn write_unlocked<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), StoreError> {
        let mut body = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Corrupt {
            name: name.to_string(),
            source: e,
        })?;
        body.push(b'\n');
        self.write_raw(name, &body)
    }

    fn write_raw(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = self.root.join(format!("{name}.json.tmp"));
        fs::write(&tmp, bytes).map_err(|e| StoreError::io(name, e))?;
        fs::rename(&tmp, self.collection_path(name)).map_err(|e| StoreError::io(name, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn open_heals_absent_collections_to_empty() {
        let ws = temp_workspace("clubbook-store-heal");
        let store = open_store(&ws).expect("open");
        for name in COLLECTIONS {
            let records: Vec<serde_json::Value> = store.load(name).expect("load");
            assert!(records.is_empty());
            let on_disk = std::fs::read_to_string(ws.join("data").join(format!("{name}.json")))
                .expect("collection file exists");
            assert_eq!(on_disk.trim(), "[]");
        }
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn open_fails_on_malformed_collection() {
        let ws = temp_workspace("clubbook-store-corrupt");
        std::fs::create_dir_all(ws.join("data")).expect("data dir");
        std::fs::write(ws.join("data/users.json"), "{not json").expect("seed corrupt file");
        match open_store(&ws) {
            Err(StoreError::Corrupt { name, .. }) => assert_eq!(name, "users"),
            other => panic!("expected corrupt users collection, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn update_persists_only_on_success() {
        let ws = temp_workspace("clubbook-store-update");
        let store = open_store(&ws).expect("open");

        store
            .update("users", |records: &mut Vec<serde_json::Value>| {
                records.push(serde_json::json!({ "id": "s1" }));
                Ok::<_, StoreError>(())
            })
            .expect("update");
        let records: Vec<serde_json::Value> = store.load("users").expect("load");
        assert_eq!(records.len(), 1);

        let failed: Result<(), StoreError> =
            store.update("users", |records: &mut Vec<serde_json::Value>| {
                records.push(serde_json::json!({ "id": "s2" }));
                Err(StoreError::Corrupt {
                    name: "users".into(),
                    source: serde_json::from_str::<i64>("x").unwrap_err(),
                })
            });
        assert!(failed.is_err());
        let records: Vec<serde_json::Value> = store.load("users").expect("load");
        assert_eq!(records.len(), 1, "failed update must not persist");
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn next_id_floors_at_existing_ids() {
        let ws = temp_workspace("clubbook-store-seq");
        let store = open_store(&ws).expect("open");
        assert_eq!(store.next_id("clubs", 0).expect("next"), 1);
        assert_eq!(store.next_id("clubs", 0).expect("next"), 2);
        // A hand-seeded collection may hold ids above the sequence.
        assert_eq!(store.next_id("clubs", 7).expect("next"), 8);
        assert_eq!(store.next_id("clubs", 0).expect("next"), 9);
        let _ = std::fs::remove_dir_all(ws);
    }
}
