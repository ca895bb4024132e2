//! Durable name → string record backed by one JSON file.
//!
//! Every write rewrites the whole file through a sibling `.tmp` file that is
//! renamed into place, so readers see either the old or the new record. The
//! latest value for a name wins and nothing is versioned. A missing file reads
//! as an empty record.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no entry `{name}` in {path}")]
    MissingEntry { name: String, path: PathBuf },
    #[error("reading or writing {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not a string record")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Named polygon strings persisted between runs.
#[derive(Clone, Debug)]
pub struct PolygonStore {
    path: PathBuf,
}

impl PolygonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite `name`.
    pub fn put(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.put_all(&[(name, value)])
    }

    /// Insert or overwrite several names in one file replacement; either all
    /// of them land or none do.
    pub fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut all = self.read_all()?;
        for &(name, value) in entries {
            all.insert(name.to_string(), value.to_string());
        }
        self.write_all(&all)?;
        tracing::debug!(
            names = ?entries.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            path = %self.path.display(),
            "store_put"
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<String, StoreError> {
        self.read_all()?
            .remove(name)
            .ok_or_else(|| StoreError::MissingEntry {
                name: name.to_string(),
                path: self.path.clone(),
            })
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_all()?.into_keys().collect())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| StoreError::Io { path, source }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        let temp_path = self.temp_path();
        let written = File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(source) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(&temp_path)(source));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn put_then_get() {
        let dir = tempdir().unwrap();
        let store = PolygonStore::new(dir.path().join("nested/polygons.json"));
        store.put("sky_point_list", "1.0,2.0,3.0,4.0").unwrap();
        store.put("pm_point_list", "-7.0,0.5,-6.0,1.0").unwrap();
        assert_eq!(store.get("sky_point_list").unwrap(), "1.0,2.0,3.0,4.0");
        assert_eq!(
            store.names().unwrap(),
            vec!["pm_point_list".to_string(), "sky_point_list".to_string()]
        );
    }

    #[test]
    fn repeated_put_overwrites() {
        let dir = tempdir().unwrap();
        let store = PolygonStore::new(dir.path().join("polygons.json"));
        store.put("pm_point_list", "1.0,1.0").unwrap();
        store.put("pm_point_list", "2.0,2.0").unwrap();
        assert_eq!(store.get("pm_point_list").unwrap(), "2.0,2.0");
        assert_eq!(store.names().unwrap().len(), 1);
    }

    #[test]
    fn missing_file_and_entry() {
        let dir = tempdir().unwrap();
        let store = PolygonStore::new(dir.path().join("absent.json"));
        assert!(store.names().unwrap().is_empty());
        assert!(matches!(
            store.get("sky_point_list"),
            Err(StoreError::MissingEntry { .. })
        ));
    }

    #[test]
    fn put_all_writes_every_name_at_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("polygons.json");
        let store = PolygonStore::new(&path);
        store.put("sky_point_list", "old").unwrap();
        store.put("note", "kept").unwrap();
        store
            .put_all(&[("sky_point_list", "1.0,2.0"), ("pm_point_list", "3.0,4.0")])
            .unwrap();
        assert_eq!(store.get("sky_point_list").unwrap(), "1.0,2.0");
        assert_eq!(store.get("pm_point_list").unwrap(), "3.0,4.0");
        assert_eq!(store.get("note").unwrap(), "kept");
        assert!(!dir.path().join("polygons.json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_previous_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("polygons.json");
        let store = PolygonStore::new(&path);
        store.put("sky_point_list", "old").unwrap();
        // A directory squatting on the temp path makes the write fail.
        fs::create_dir(dir.path().join("polygons.json.tmp")).unwrap();
        let err = store
            .put_all(&[("sky_point_list", "new"), ("pm_point_list", "new")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.get("sky_point_list").unwrap(), "old");
        assert!(matches!(
            store.get("pm_point_list"),
            Err(StoreError::MissingEntry { .. })
        ));
    }

    #[test]
    fn corrupt_file_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("polygons.json");
        fs::write(&path, b"[1, 2]").unwrap();
        let store = PolygonStore::new(&path);
        assert!(matches!(store.get("x"), Err(StoreError::Json { .. })));
    }
}
