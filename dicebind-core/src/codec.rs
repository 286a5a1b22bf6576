//! Conversion between in-memory assignments and their persisted record.
//!
//! A die is written as its hardware device id and a behavior as its
//! position in the dataset's behavior collection. Decoding resolves both
//! back against the dataset; anything that no longer resolves comes back
//! absent instead of failing, so documents survive dice being disconnected
//! or behaviors being deleted.
//!
//! Positions are only meaningful as long as the behavior collection is not
//! reordered between encoding and decoding the same document.

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assignment::Assignment;
use crate::dataset::DataSet;
use crate::handle::{DeviceId, NO_BEHAVIOR, NO_DEVICE};

/// Persisted form of one assignment. All three fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub device_id: DeviceId,
    pub behavior_index: i32,
    pub default_die_assignment_index: i32,
}

/// Error type for assignment decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed assignment record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("decode target already holds an assignment")]
    Protocol,
}

/// Encodes an assignment against `dataset`.
///
/// A behavior that is bound but missing from the dataset is written the
/// same way as no behavior at all.
pub fn encode<D: DataSet + ?Sized>(assignment: &Assignment, dataset: &D) -> AssignmentRecord {
    let device_id = match assignment.die {
        Some(handle) => match dataset.die(handle) {
            Some(die) => die.device_id,
            None => {
                warn!("{handle} is not in the dataset, writing no die");
                NO_DEVICE
            }
        },
        None => NO_DEVICE,
    };

    let behavior_index = match assignment.behavior {
        Some(handle) => match dataset
            .behavior_index(handle)
            .and_then(|i| i32::try_from(i).ok())
        {
            Some(index) => index,
            None => {
                warn!("{handle} is not in the dataset, writing no behavior");
                NO_BEHAVIOR
            }
        },
        None => NO_BEHAVIOR,
    };

    trace!("encoded assignment as device {device_id:#x}, behavior {behavior_index}");
    AssignmentRecord {
        device_id,
        behavior_index,
        default_die_assignment_index: assignment.default_assignment_index,
    }
}

/// Decodes a record against `dataset`.
///
/// Device id `0` always decodes to no die, even if some die reports that id.
/// Negative or out-of-range behavior indices decode to no behavior.
pub fn decode<D: DataSet + ?Sized>(record: &AssignmentRecord, dataset: &D) -> Assignment {
    let die = match record.device_id {
        NO_DEVICE => None,
        device_id => {
            let found = dataset.find_die(device_id);
            if found.is_none() {
                warn!("no die with device id {device_id:#x}, leaving it unassigned");
            }
            found
        }
    };

    let behavior = usize::try_from(record.behavior_index)
        .ok()
        .filter(|&i| i < dataset.behavior_count())
        .and_then(|i| dataset.behavior_at(i));
    if behavior.is_none() && record.behavior_index != NO_BEHAVIOR {
        warn!(
            "behavior index {} is out of range (0..{}), leaving it unassigned",
            record.behavior_index,
            dataset.behavior_count()
        );
    }

    trace!(
        "decoded device {:#x}, behavior {} as {die:?}, {behavior:?}",
        record.device_id, record.behavior_index
    );
    Assignment {
        die,
        behavior,
        default_assignment_index: record.default_die_assignment_index,
    }
}

/// Decodes an untyped record, failing if any field is missing or mistyped.
pub fn decode_value<D: DataSet + ?Sized>(
    value: Value,
    dataset: &D,
) -> Result<Assignment, CodecError> {
    let record: AssignmentRecord = serde_json::from_value(value)?;
    Ok(decode(&record, dataset))
}

/// Decodes into an empty slot.
///
/// Decoding only constructs new assignments; a populated target is a
/// caller error and is left untouched.
pub fn decode_into<D: DataSet + ?Sized>(
    target: &mut Option<Assignment>,
    value: Value,
    dataset: &D,
) -> Result<(), CodecError> {
    if target.is_some() {
        return Err(CodecError::Protocol);
    }
    *target = Some(decode_value(value, dataset)?);
    Ok(())
}
