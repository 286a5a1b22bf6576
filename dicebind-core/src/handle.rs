use std::fmt;

/// Stable hardware identifier reported by a physical die.
pub type DeviceId = u64;

/// Device id written for an assignment with no die bound.
///
/// A die that genuinely reports id `0` cannot be told apart from "no die".
pub const NO_DEVICE: DeviceId = 0;

/// Behavior index written for an assignment with no resolvable behavior.
pub const NO_BEHAVIOR: i32 = -1;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Mints a handle. Datasets must never hand out the same raw
            /// value for two different entities.
            pub fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            /// Returns the raw slot number. Only meaningful within one dataset.
            pub fn raw(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Non-owning reference to a die held by a dataset.
    ///
    /// Handles are never reused, so a handle outliving its die simply
    /// stops resolving.
    DieHandle,
    "die"
);

handle!(
    /// Non-owning reference to a behavior held by a dataset.
    BehaviorHandle,
    "behavior"
);

/// Hands out fresh handles. Slots are never recycled.
///
/// Once `u32::MAX - 1` slots have been handed out the allocator is
/// exhausted and refuses further requests; it never wraps around.
#[derive(Debug, Default, Clone)]
pub(crate) struct HandleAllocator {
    next: u32,
}

impl HandleAllocator {
    #[cfg(test)]
    pub(crate) fn starting_at(next: u32) -> Self {
        HandleAllocator { next }
    }

    pub(crate) fn next_raw(&mut self) -> Option<u32> {
        let raw = self.next;
        self.next = self.next.checked_add(1)?;
        Some(raw)
    }
}
