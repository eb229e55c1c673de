use crate::config::{StoreConfig, MEASUREMENTS_KEY};
use crate::error::StoreError;
use crate::kv::KeyValueStore;
use crate::saved::SavedMeasurement;
use serde_json::value::RawValue;
use tracing::{debug, info, warn};

/// Owns the persisted measurement list: one JSON array under one key.
///
/// Every mutation is a read-modify-write of the whole blob. Callers must not
/// run two appends against the same key at once.
pub struct MeasurementStore<S> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> MeasurementStore<S> {
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, MEASUREMENTS_KEY)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn from_config(kv: S, cfg: &StoreConfig) -> Self {
        Self::with_key(kv, cfg.measurements_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Appends `measurement` and returns the decodable list as written.
    ///
    /// Records already in the blob are carried over byte for byte, including
    /// ones this version cannot decode. A malformed blob is replaced; a
    /// failed read or write is returned to the caller.
    pub fn append(
        &self,
        measurement: SavedMeasurement,
    ) -> Result<Vec<SavedMeasurement>, StoreError> {
        let mut records = match self.kv.get(&self.key)? {
            Some(text) => raw_records(&self.key, &text),
            None => Vec::new(),
        };
        let serialize = |source| StoreError::Serialize {
            key: self.key.clone(),
            source,
        };
        records.push(serde_json::value::to_raw_value(&measurement).map_err(serialize)?);

        let text = serde_json::to_string(&records).map_err(serialize)?;
        self.kv.set(&self.key, &text)?;
        info!(key = %self.key, count = records.len(), "saved measurement");
        Ok(decode(&self.key, &text))
    }

    /// Every saved measurement, oldest first. Never fails: an absent key, a
    /// malformed blob and an unreachable store all read as empty.
    pub fn get_all(&self) -> Vec<SavedMeasurement> {
        self.load().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "reading measurements failed");
            Vec::new()
        })
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove(&self.key)?;
        info!(key = %self.key, "cleared measurements");
        Ok(())
    }

    fn load(&self) -> Result<Vec<SavedMeasurement>, StoreError> {
        match self.kv.get(&self.key)? {
            Some(text) => Ok(decode(&self.key, &text)),
            None => Ok(Vec::new()),
        }
    }
}

/// The stored array as untouched JSON fragments; anything that is not an
/// array reads as empty.
fn raw_records(key: &str, text: &str) -> Vec<Box<RawValue>> {
    serde_json::from_str(text).unwrap_or_else(|e| {
        warn!(%key, error = %e, "malformed measurement list, replacing it");
        Vec::new()
    })
}

/// Records that fail to decode are dropped one by one; a blob that is not a
/// JSON array at all reads as empty.
fn decode(key: &str, text: &str) -> Vec<SavedMeasurement> {
    let items: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(items) => items,
        Err(e) => {
            warn!(%key, error = %e, "malformed measurement list, treating as empty");
            return Vec::new();
        }
    };

    let total = items.len();
    let list: Vec<SavedMeasurement> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!(%key, error = %e, "skipping malformed measurement");
                None
            }
        })
        .collect();
    debug!(%key, total, decoded = list.len(), "loaded measurements");
    list
}
