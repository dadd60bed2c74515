use crate::state::{InstanceId, SlotError};

/// Errors raised while mounting, flushing or dispatching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("{0:?} is not mounted on this host")]
    UnknownInstance(InstanceId),

    #[error("state kept changing after {passes} flush passes; a view replaces state on every render")]
    UpdateLoop { passes: usize },
}
