use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::codec::{self, AssignmentRecord};
use crate::dataset::DataSet;
use crate::handle::{BehaviorHandle, DieHandle};

/// A named, ordered set of die-to-behavior assignments.
///
/// Presets never own the dice or behaviors they point at. When the dataset
/// deletes one of those it must call [`Preset::delete_die`] or
/// [`Preset::delete_behavior`] on every preset it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub die_assignments: Vec<Assignment>,
}

/// Persisted form of a preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetRecord {
    pub name: String,
    pub description: String,
    pub die_assignments: Vec<AssignmentRecord>,
}

impl Preset {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Preset {
            name: name.into(),
            description: description.into(),
            die_assignments: Vec::new(),
        }
    }

    /// Returns true if any assignment is bound to `die`.
    pub fn check_dependency(&self, die: DieHandle) -> bool {
        self.depends_on_die(die)
    }

    pub fn depends_on_die(&self, die: DieHandle) -> bool {
        self.die_assignments.iter().any(|a| a.die == Some(die))
    }

    pub fn depends_on_behavior(&self, behavior: BehaviorHandle) -> bool {
        self.die_assignments
            .iter()
            .any(|a| a.behavior == Some(behavior))
    }

    /// Unbinds `die` from every assignment, keeping the entries.
    ///
    /// Returns how many assignments were cleared.
    pub fn delete_die(&mut self, die: DieHandle) -> usize {
        let mut cleared = 0;
        for assignment in &mut self.die_assignments {
            if assignment.die == Some(die) {
                assignment.die = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Unbinds `behavior` from every assignment, keeping the entries.
    ///
    /// Returns how many assignments were cleared.
    pub fn delete_behavior(&mut self, behavior: BehaviorHandle) -> usize {
        let mut cleared = 0;
        for assignment in &mut self.die_assignments {
            if assignment.behavior == Some(behavior) {
                assignment.behavior = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Creates an independent copy of this preset.
    ///
    /// Dice are shared with the source since they are physical devices.
    /// Behaviors are deep-copied through the dataset so that editing the
    /// copy never touches the original. Auto-assign hints reset to zero.
    pub fn duplicate<D: DataSet + ?Sized>(&self, dataset: &mut D) -> Preset {
        let die_assignments = self
            .die_assignments
            .iter()
            .map(|a| Assignment {
                die: a.die,
                behavior: a.behavior.and_then(|b| dataset.duplicate_behavior(b)),
                default_assignment_index: 0,
            })
            .collect();
        debug!("duplicated preset {:?}", self.name);
        Preset {
            name: self.name.clone(),
            description: self.description.clone(),
            die_assignments,
        }
    }

    /// Returns true if every assigned die is present and currently running
    /// exactly the assigned behavior. An empty preset is active.
    pub fn is_active<D: DataSet + ?Sized>(&self, dataset: &D) -> bool {
        self.die_assignments.iter().all(|a| {
            match a.die.and_then(|h| dataset.die(h)) {
                Some(die) => die.current_behavior == a.behavior,
                None => false,
            }
        })
    }

    /// Converts to the persisted form, resolving references against `dataset`.
    pub fn to_record<D: DataSet + ?Sized>(&self, dataset: &D) -> PresetRecord {
        trace!("encoding preset {:?}", self.name);
        PresetRecord {
            name: self.name.clone(),
            description: self.description.clone(),
            die_assignments: self
                .die_assignments
                .iter()
                .map(|a| codec::encode(a, dataset))
                .collect(),
        }
    }

    /// Rebuilds a preset from its persisted form.
    ///
    /// Unresolvable references load as absent rather than failing.
    pub fn from_record<D: DataSet + ?Sized>(record: &PresetRecord, dataset: &D) -> Preset {
        trace!("decoding preset {:?}", record.name);
        Preset {
            name: record.name.clone(),
            description: record.description.clone(),
            die_assignments: record
                .die_assignments
                .iter()
                .map(|r| codec::decode(r, dataset))
                .collect(),
        }
    }
}
