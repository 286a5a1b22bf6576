//! Dicebind manages presets: named sets of assignments that bind physical
//! dice to behavior programs.
//!
//! Core concepts:
//! - **Die / Behavior**: entities owned by a [`DataSet`], referred to by
//!   non-owning [`DieHandle`] / [`BehaviorHandle`] values
//! - **Assignment**: one die-to-behavior binding; either side may be absent
//! - **Codec**: writes an assignment as a device id plus a behavior position,
//!   and resolves those back against a dataset
//! - **Preset**: ordered assignments with dependency queries, cascading
//!   invalidation, duplication and a liveness check
//! - **Snapshot**: a whole [`AppDataSet`] as JSON or CBOR, optionally kept in
//!   a content-addressed [`Store`] with named heads pointing at the latest one
//!
//! # Example
//!
//! ```
//! use dicebind_core::{AppDataSet, Assignment, Behavior, Die, Preset};
//!
//! let mut dataset = AppDataSet::new();
//! let die = dataset.add_die(Die::new("d20", 0x1234))?;
//! let rainbow = dataset.add_behavior(Behavior::new("rainbow", "cycles colors"))?;
//!
//! let mut preset = Preset::new("game night", "");
//! preset.die_assignments.push(Assignment::new(Some(die), Some(rainbow)));
//! let index = dataset.add_preset(preset);
//!
//! dataset.set_current_behavior(die, Some(rainbow));
//! assert!(dataset.presets()[index].is_active(&dataset));
//!
//! // Deleting the behavior clears it from every preset.
//! dataset.remove_behavior(rainbow);
//! assert!(!dataset.presets()[index].depends_on_behavior(rainbow));
//! # Ok::<(), dicebind_core::DataSetError>(())
//! ```
//!
//! # Storage
//!
//! ```
//! use dicebind_core::{AppDataSet, Behavior, Key, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let mut dataset = AppDataSet::new();
//! dataset.add_behavior(Behavior::new("rainbow", ""))?;
//!
//! // Commit moves the "default" head; checkout follows it.
//! let key = dataset.commit(&store, "default")?;
//! let latest = AppDataSet::checkout(&store, "default")?;
//! assert_eq!(latest.to_record(), dataset.to_record());
//!
//! // Snapshots can also be addressed by their hex key, e.g. from a log line.
//! let printed = key.to_string();
//! let parsed: Key = printed.parse()?;
//! let pinned = AppDataSet::load(&store, &parsed)?;
//! assert_eq!(pinned.to_record(), dataset.to_record());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Ordering
//!
//! Behaviors are persisted by position. Reordering the behavior collection
//! between writing and reading the same document silently rebinds
//! assignments to the wrong behaviors.

mod assignment;
pub mod codec;
mod dataset;
mod handle;
mod key;
mod preset;
mod snapshot;
mod store;

pub use assignment::Assignment;
pub use codec::{AssignmentRecord, CodecError};
pub use dataset::{AppDataSet, Behavior, DataSet, DataSetError, Die};
pub use handle::{BehaviorHandle, DeviceId, DieHandle, NO_BEHAVIOR, NO_DEVICE};
pub use key::{Key, KeyParseError};
pub use preset::{Preset, PresetRecord};
pub use snapshot::{BehaviorRecord, DataSetRecord, DieRecord, SnapshotError};
pub use store::{MemoryStore, Store};
