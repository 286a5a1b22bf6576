use indexmap::IndexMap;
use log::{debug, warn};

use crate::handle::{BehaviorHandle, DeviceId, DieHandle, HandleAllocator};
use crate::preset::Preset;

/// A physical die known to the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die {
    pub name: String,
    pub device_id: DeviceId,
    /// Behavior the hardware last reported as running. Not persisted.
    pub current_behavior: Option<BehaviorHandle>,
}

impl Die {
    pub fn new(name: impl Into<String>, device_id: DeviceId) -> Self {
        Die {
            name: name.into(),
            device_id,
            current_behavior: None,
        }
    }
}

/// A named behavior program that can be assigned to a die.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    pub name: String,
    pub description: String,
}

impl Behavior {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Behavior {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Error type for dataset mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataSetError {
    #[error("no {0} handles left in this dataset")]
    HandlesExhausted(&'static str),
}

/// Lookup service that presets and the assignment codec resolve against.
///
/// The dataset is the sole owner of dice and behaviors. Behaviors form an
/// ordered collection; the position of a behavior in it is what gets
/// persisted, so the order must not change between encoding and decoding
/// one document.
pub trait DataSet {
    /// Finds a die by its hardware identifier.
    fn find_die(&self, device_id: DeviceId) -> Option<DieHandle>;

    /// Returns the die behind a handle, or `None` if it is dangling.
    fn die(&self, handle: DieHandle) -> Option<&Die>;

    /// Returns the behavior behind a handle, or `None` if it is dangling.
    fn behavior(&self, handle: BehaviorHandle) -> Option<&Behavior>;

    /// Position of a behavior within the ordered behavior collection.
    fn behavior_index(&self, handle: BehaviorHandle) -> Option<usize>;

    /// Behavior at a position within the ordered behavior collection.
    fn behavior_at(&self, index: usize) -> Option<BehaviorHandle>;

    fn behavior_count(&self) -> usize;

    /// Deep-copies a behavior into a new entity with its own identity.
    fn duplicate_behavior(&mut self, handle: BehaviorHandle) -> Option<BehaviorHandle>;
}

/// In-memory dataset owning dice, behaviors and the presets that use them.
///
/// Removing a die or behavior pushes the invalidation into every preset.
#[derive(Debug, Default, Clone)]
pub struct AppDataSet {
    dice: IndexMap<DieHandle, Die>,
    behaviors: IndexMap<BehaviorHandle, Behavior>,
    presets: Vec<Preset>,
    die_handles: HandleAllocator,
    behavior_handles: HandleAllocator,
}

impl AppDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_die(&mut self, die: Die) -> Result<DieHandle, DataSetError> {
        let raw = self
            .die_handles
            .next_raw()
            .ok_or(DataSetError::HandlesExhausted("die"))?;
        let handle = DieHandle::from_raw(raw);
        self.dice.insert(handle, die);
        Ok(handle)
    }

    /// Removes a die and clears it from every preset that references it.
    pub fn remove_die(&mut self, handle: DieHandle) -> Option<Die> {
        let die = self.dice.shift_remove(&handle)?;
        let cleared: usize = self.presets.iter_mut().map(|p| p.delete_die(handle)).sum();
        debug!("removed {handle} ({:#x}), cleared {cleared} assignment(s)", die.device_id);
        Some(die)
    }

    /// Records the behavior a die reports as currently running.
    ///
    /// Returns false if the die is not part of this dataset.
    pub fn set_current_behavior(
        &mut self,
        die: DieHandle,
        behavior: Option<BehaviorHandle>,
    ) -> bool {
        match self.dice.get_mut(&die) {
            Some(d) => {
                d.current_behavior = behavior;
                true
            }
            None => false,
        }
    }

    pub fn dice(&self) -> impl Iterator<Item = (DieHandle, &Die)> {
        self.dice.iter().map(|(h, d)| (*h, d))
    }

    pub fn add_behavior(&mut self, behavior: Behavior) -> Result<BehaviorHandle, DataSetError> {
        let raw = self
            .behavior_handles
            .next_raw()
            .ok_or(DataSetError::HandlesExhausted("behavior"))?;
        let handle = BehaviorHandle::from_raw(raw);
        self.behaviors.insert(handle, behavior);
        Ok(handle)
    }

    /// Removes a behavior and clears it from every preset that references it.
    ///
    /// Later behaviors shift down one position.
    pub fn remove_behavior(&mut self, handle: BehaviorHandle) -> Option<Behavior> {
        let behavior = self.behaviors.shift_remove(&handle)?;
        let cleared: usize = self
            .presets
            .iter_mut()
            .map(|p| p.delete_behavior(handle))
            .sum();
        debug!("removed {handle} ({:?}), cleared {cleared} assignment(s)", behavior.name);
        Some(behavior)
    }

    pub fn behaviors(&self) -> impl Iterator<Item = (BehaviorHandle, &Behavior)> {
        self.behaviors.iter().map(|(h, b)| (*h, b))
    }

    pub fn add_preset(&mut self, preset: Preset) -> usize {
        self.presets.push(preset);
        self.presets.len() - 1
    }

    /// Duplicates the preset at `index` and appends the copy.
    ///
    /// Returns the index of the new preset.
    pub fn duplicate_preset(&mut self, index: usize) -> Option<usize> {
        let source = self.presets.get(index)?.clone();
        let copy = source.duplicate(self);
        Some(self.add_preset(copy))
    }

    pub fn remove_preset(&mut self, index: usize) -> Option<Preset> {
        (index < self.presets.len()).then(|| self.presets.remove(index))
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn preset_mut(&mut self, index: usize) -> Option<&mut Preset> {
        self.presets.get_mut(index)
    }

    pub fn presets_depending_on_die(&self, die: DieHandle) -> impl Iterator<Item = &Preset> {
        self.presets.iter().filter(move |p| p.depends_on_die(die))
    }

    pub fn presets_depending_on_behavior(
        &self,
        behavior: BehaviorHandle,
    ) -> impl Iterator<Item = &Preset> {
        self.presets
            .iter()
            .filter(move |p| p.depends_on_behavior(behavior))
    }

    /// Presets whose every assignment matches what the hardware reports.
    pub fn active_presets(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter().filter(|p| p.is_active(self))
    }
}

impl DataSet for AppDataSet {
    fn find_die(&self, device_id: DeviceId) -> Option<DieHandle> {
        self.dice
            .iter()
            .find(|(_, d)| d.device_id == device_id)
            .map(|(h, _)| *h)
    }

    fn die(&self, handle: DieHandle) -> Option<&Die> {
        self.dice.get(&handle)
    }

    fn behavior(&self, handle: BehaviorHandle) -> Option<&Behavior> {
        self.behaviors.get(&handle)
    }

    fn behavior_index(&self, handle: BehaviorHandle) -> Option<usize> {
        self.behaviors.get_index_of(&handle)
    }

    fn behavior_at(&self, index: usize) -> Option<BehaviorHandle> {
        self.behaviors.get_index(index).map(|(h, _)| *h)
    }

    fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    fn duplicate_behavior(&mut self, handle: BehaviorHandle) -> Option<BehaviorHandle> {
        let copy = self.behaviors.get(&handle)?.clone();
        match self.add_behavior(copy) {
            Ok(new_handle) => {
                debug!("duplicated {handle} as {new_handle}");
                Some(new_handle)
            }
            Err(e) => {
                warn!("cannot duplicate {handle}: {e}");
                None
            }
        }
    }
}
