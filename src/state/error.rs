//! Slot faults raised by the state runtime.

use super::runtime::InstanceId;

/// A broken slot contract.
///
/// State must be declared in the same order, with the same types, on every
/// render of a view instance. Any deviation is reported here instead of
/// silently handing one slot's value to another declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// The slot already holds a value of a different type.
    #[error(
        "slot {slot} of {instance:?} holds `{expected}` but was declared as `{found}`; \
         state must be declared in the same order on every render"
    )]
    Misaligned {
        instance: InstanceId,
        slot: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A re-render declared more slots than the first render did.
    #[error(
        "{instance:?} declared slot {slot} but its first render sealed {sealed} slot(s); \
         state cannot be declared conditionally or in a loop"
    )]
    ExtraSlot {
        instance: InstanceId,
        slot: usize,
        sealed: usize,
    },

    /// A re-render declared fewer slots than the first render did.
    #[error("{instance:?} declared {declared} slot(s) but its first render sealed {sealed}")]
    MissingSlots {
        instance: InstanceId,
        declared: usize,
        sealed: usize,
    },

    /// The slot was read while one of its own updates was being applied.
    #[error("slot {slot} of {instance:?} was accessed while an update to it was being applied")]
    Reentrant { instance: InstanceId, slot: usize },

    /// The owning view instance has been unmounted.
    #[error("{instance:?} is no longer mounted")]
    Unmounted { instance: InstanceId },
}

impl SlotError {
    /// The instance the fault belongs to.
    pub fn instance(&self) -> InstanceId {
        match self {
            Self::Misaligned { instance, .. }
            | Self::ExtraSlot { instance, .. }
            | Self::MissingSlots { instance, .. }
            | Self::Reentrant { instance, .. }
            | Self::Unmounted { instance } => *instance,
        }
    }
}
