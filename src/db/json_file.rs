use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use super::{CACHE_DOCUMENT, ROSTER_DOCUMENT, RadarState, StateStore, decode_document};
use crate::device::ClassificationCache;
use crate::error::StoreError;
use crate::presence::PresenceRegistry;

/// Pretty-printed JSON documents in a directory. Writes go to a temp file next to
/// the target and are renamed over it, so a reader sees either the old or the new file.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn read_document(&self, name: &str) -> Result<String, StoreError> {
        let path = self.document_path(name);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    fn replace_document<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.document_path(name);
        let body = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.dir, &path, &body)
    }
}

fn write_atomic(dir: &Path, path: &Path, body: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(body).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|source| StoreError::Persist {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

impl StateStore for JsonFileStore {
    fn load_registry(&self) -> Result<PresenceRegistry, StoreError> {
        let body = self.read_document(ROSTER_DOCUMENT)?;
        Ok(decode_document(ROSTER_DOCUMENT, &body))
    }

    fn load_cache(&self) -> Result<ClassificationCache, StoreError> {
        let body = self.read_document(CACHE_DOCUMENT)?;
        Ok(decode_document(CACHE_DOCUMENT, &body))
    }

    fn persist(&self, state: &RadarState) -> Result<(), StoreError> {
        // Cache first: it may run ahead of the roster, never behind
        self.replace_document(CACHE_DOCUMENT, &state.cache)?;
        self.replace_document(ROSTER_DOCUMENT, &state.registry)
    }
}
