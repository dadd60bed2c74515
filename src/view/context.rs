//! Render context handed to a view while it builds its tree.

use crate::state::runtime::{self, InstanceId};
use crate::state::{SlotError, StateCell};

/// Context for one render of one view instance.
///
/// State declared through the context binds to slots in declaration order:
/// the first `create_state` call is slot 0, the second slot 1, and so on,
/// on every render. Declaring state conditionally or in a loop breaks that
/// alignment and is reported as a [`SlotError`].
#[derive(Debug)]
pub struct ViewContext {
    instance: InstanceId,
    render: u64,
}

impl ViewContext {
    pub(crate) fn new(instance: InstanceId, render: u64) -> Self {
        Self { instance, render }
    }

    /// The instance being rendered.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// 1 on first mount, incremented on every re-render.
    pub fn render_count(&self) -> u64 {
        self.render
    }

    pub fn is_first_render(&self) -> bool {
        self.render == 1
    }

    /// Declare the next state slot. `initial` is only used on first mount;
    /// later renders return the existing cell and drop it.
    pub fn create_state<T: 'static>(&self, initial: T) -> Result<StateCell<T>, SlotError> {
        self.create_state_with(move || initial)
    }

    /// Like [`create_state`](Self::create_state), but the initial value is
    /// only computed on first mount.
    pub fn create_state_with<T: 'static>(
        &self,
        init: impl FnOnce() -> T,
    ) -> Result<StateCell<T>, SlotError> {
        let slot = runtime::claim_slot(self.instance, init)?;
        Ok(StateCell::new(self.instance, slot))
    }
}
