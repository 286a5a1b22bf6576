//! Whole-dataset documents.
//!
//! A snapshot carries the dice, the ordered behaviors and every preset in
//! one record. Loading rebuilds dice and behaviors first and only then
//! decodes the presets, so behavior positions written by [`AppDataSet::to_record`]
//! always refer to the same collection they are read back against.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dataset::{AppDataSet, Behavior, DataSet, DataSetError, Die};
use crate::handle::DeviceId;
use crate::key::Key;
use crate::preset::{Preset, PresetRecord};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DieRecord {
    pub name: String,
    pub device_id: DeviceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSetRecord {
    pub dice: Vec<DieRecord>,
    pub behaviors: Vec<BehaviorRecord>,
    pub presets: Vec<PresetRecord>,
}

/// Error type for snapshot encoding, decoding and storage.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("json snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cbor encode: {0}")]
    CborEncode(#[from] ciborium::ser::Error<std::io::Error>),
    #[error("cbor decode: {0}")]
    CborDecode(#[from] ciborium::de::Error<std::io::Error>),
    #[error("snapshot not found: {0}")]
    NotFound(Key),
    #[error("no head named {0:?}")]
    NoHead(String),
    #[error(transparent)]
    DataSet(#[from] DataSetError),
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AppDataSet {
    pub fn to_record(&self) -> DataSetRecord {
        DataSetRecord {
            dice: self
                .dice()
                .map(|(_, d)| DieRecord {
                    name: d.name.clone(),
                    device_id: d.device_id,
                })
                .collect(),
            behaviors: self
                .behaviors()
                .map(|(_, b)| BehaviorRecord {
                    name: b.name.clone(),
                    description: b.description.clone(),
                })
                .collect(),
            presets: self.presets().iter().map(|p| p.to_record(self)).collect(),
        }
    }

    pub fn from_record(record: &DataSetRecord) -> Result<AppDataSet, SnapshotError> {
        let mut dataset = AppDataSet::new();
        for die in &record.dice {
            dataset.add_die(Die::new(die.name.clone(), die.device_id))?;
        }
        for behavior in &record.behaviors {
            dataset.add_behavior(Behavior::new(
                behavior.name.clone(),
                behavior.description.clone(),
            ))?;
        }
        for preset in &record.presets {
            let preset = Preset::from_record(preset, &dataset);
            dataset.add_preset(preset);
        }
        debug!(
            "loaded {} dice, {} behaviors, {} presets",
            record.dice.len(),
            dataset.behavior_count(),
            record.presets.len()
        );
        Ok(dataset)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> Result<AppDataSet, SnapshotError> {
        let record: DataSetRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(&self.to_record(), &mut bytes)?;
        Ok(bytes)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<AppDataSet, SnapshotError> {
        let record: DataSetRecord = ciborium::from_reader(bytes)?;
        Self::from_record(&record)
    }

    /// Writes a CBOR snapshot to `store` and returns its content key.
    ///
    /// Saving an unchanged dataset twice yields the same key.
    pub fn save<S: Store>(&self, store: &S) -> Result<Key, SnapshotError> {
        let bytes = self.to_cbor()?;
        let key = Key::from_data(&bytes);
        store
            .put(&key, &bytes)
            .map_err(|e| SnapshotError::Store(Box::new(e)))?;
        debug!("saved snapshot {key} ({} bytes)", bytes.len());
        Ok(key)
    }

    pub fn load<S: Store>(store: &S, key: &Key) -> Result<AppDataSet, SnapshotError> {
        let bytes = store
            .get(key)
            .map_err(|e| SnapshotError::Store(Box::new(e)))?
            .ok_or(SnapshotError::NotFound(*key))?;
        debug!("loading snapshot {key}");
        Self::from_cbor(&bytes)
    }

    /// Saves a snapshot and moves the head `name` to it.
    pub fn commit<S: Store>(&self, store: &S, name: &str) -> Result<Key, SnapshotError> {
        let key = self.save(store)?;
        store
            .set_head(name, &key)
            .map_err(|e| SnapshotError::Store(Box::new(e)))?;
        debug!("head {name:?} -> {key}");
        Ok(key)
    }

    /// Loads the snapshot the head `name` points at.
    pub fn checkout<S: Store>(store: &S, name: &str) -> Result<AppDataSet, SnapshotError> {
        let key = store
            .head(name)
            .map_err(|e| SnapshotError::Store(Box::new(e)))?
            .ok_or_else(|| SnapshotError::NoHead(name.to_string()))?;
        Self::load(store, &key)
    }
}
