//! The durable key-value seam and its desktop implementations.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed store {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("cannot encode store")]
    Encode(#[from] toml::ser::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// String values kept in a flat TOML table on disk.
///
/// Every `set` rewrites the whole file. A missing file reads as empty, and
/// a malformed one is replaced on the next `set`.
pub struct TomlFileStore {
    path: PathBuf,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e @ StoreError::Parse { .. }) => {
                warn!("overwriting {e}");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        all.insert(key.to_string(), value.to_string());
        let text = toml::to_string(&all)?;

        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, text).map_err(io_err)
    }
}

/// Process-local store, used when no store path can be resolved.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
