//! Durable state. The roster and the classification cache are two whole documents,
//! read in full at the start of an ingest call and replaced in full at the end.

mod json_file;
mod sqlite;

use std::path::PathBuf;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::device::{ClassificationCache, HardwareAddress};
use crate::error::StoreError;
use crate::presence::PresenceRegistry;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

pub(crate) const ROSTER_DOCUMENT: &str = "devices";
pub(crate) const CACHE_DOCUMENT: &str = "cache";

/// Both stores, loaded together and persisted together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarState {
    pub registry: PresenceRegistry,
    pub cache: ClassificationCache,
}

/// Backing storage for the roster and classification cache. Implementations must
/// replace each document atomically so readers never see a partial write.
pub trait StateStore: Send + Sync {
    fn load_registry(&self) -> Result<PresenceRegistry, StoreError>;

    fn load_cache(&self) -> Result<ClassificationCache, StoreError>;

    /// Replace both documents. A store that cannot replace them together writes the
    /// cache first, so a failed roster write can leave the cache one batch ahead of
    /// the roster; the next ingest reconciles them.
    fn persist(&self, state: &RadarState) -> Result<(), StoreError>;

    fn load(&self) -> Result<RadarState, StoreError> {
        Ok(RadarState {
            registry: self.load_registry()?,
            cache: self.load_cache()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// `devices.json` + `cache.json` in the data directory
    Json,
    /// `radar.db` SQLite documents table in the data directory
    Sqlite,
}

/// Open the configured store under `data_dir`, creating the directory if needed
pub fn open_store(kind: StoreKind, data_dir: PathBuf) -> Result<Box<dyn StateStore>, StoreError> {
    std::fs::create_dir_all(&data_dir).map_err(|source| StoreError::Io {
        path: data_dir.display().to_string(),
        source,
    })?;

    let store: Box<dyn StateStore> = match kind {
        StoreKind::Json => Box::new(JsonFileStore::new(data_dir)),
        StoreKind::Sqlite => Box::new(SqliteStore::open(data_dir.join("radar.db"))?),
    };
    Ok(store)
}

/// Decode a stored address-keyed document entry by entry. Entries that no longer
/// decode are logged and dropped so one bad row cannot take the rest of the
/// document with it; an unreadable document as a whole loads empty.
pub(crate) fn decode_document<V, T>(name: &str, body: &str) -> T
where
    V: DeserializeOwned,
    T: Default + FromIterator<(HardwareAddress, V)>,
{
    if body.trim().is_empty() {
        return T::default();
    }

    let raw: Map<String, Value> = match serde_json::from_str(body) {
        Ok(Value::Object(map)) => map,
        // Legacy dashboards wrote `[]` for an empty roster
        Ok(Value::Array(items)) if items.is_empty() => return T::default(),
        Ok(other) => {
            tracing::warn!("Discarding '{}' document: expected an object, got {}", name, other);
            return T::default();
        }
        Err(e) => {
            tracing::warn!("Discarding unreadable '{}' document: {}", name, e);
            return T::default();
        }
    };

    raw.into_iter()
        .filter_map(|(key, value)| {
            let decoded = key.parse::<HardwareAddress>().map_err(|e| e.to_string()).and_then(
                |address| {
                    serde_json::from_value::<V>(value)
                        .map(|entry| (address, entry))
                        .map_err(|e| e.to_string())
                },
            );
            match decoded {
                Ok(pair) => Some(pair),
                Err(e) => {
                    tracing::warn!("Skipping unreadable '{}' entry '{}': {}", name, key, e);
                    None
                }
            }
        })
        .collect()
}
