use crate::handle::{BehaviorHandle, DieHandle};

/// A single die-to-behavior binding inside a preset.
///
/// Both references are non-owning and may independently be absent. An
/// assignment with neither bound is valid but inert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub die: Option<DieHandle>,
    pub behavior: Option<BehaviorHandle>,
    /// Slot hint used while auto-assigning newly connected dice.
    pub default_assignment_index: i32,
}

impl Assignment {
    pub fn new(die: Option<DieHandle>, behavior: Option<BehaviorHandle>) -> Self {
        Assignment {
            die,
            behavior,
            default_assignment_index: 0,
        }
    }

    /// Returns true if neither a die nor a behavior is bound.
    pub fn is_inert(&self) -> bool {
        self.die.is_none() && self.behavior.is_none()
    }
}
