//! `StateCell<T>`: a typed handle to one slot of a view instance.

use std::fmt;
use std::marker::PhantomData;

use tracing::warn;

use super::error::SlotError;
use super::runtime::{self, InstanceId};
use super::update::Update;

/// Handle to a declared state slot. `Copy`: only stores the instance id and
/// slot index, so event handlers can capture it freely.
///
/// Reads see the last *applied* value. Replacements are queued and applied
/// by the rendering host at the end of the current turn.
pub struct StateCell<T: 'static> {
    instance: InstanceId,
    slot: usize,
    _marker: PhantomData<T>,
}

// Manual impls so we don't require T: Copy/Clone for the handle itself.
impl<T: 'static> Copy for StateCell<T> {}
impl<T: 'static> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("instance", &self.instance)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<T: 'static> StateCell<T> {
    pub(crate) fn new(instance: InstanceId, slot: usize) -> Self {
        Self {
            instance,
            slot,
            _marker: PhantomData,
        }
    }

    /// The instance that owns this cell.
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Declaration-order index of this cell within its instance.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Clone out the current value.
    ///
    /// # Panics
    ///
    /// Panics if the owning instance is unmounted or the slot is misaligned.
    pub fn read(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Clone out the current value, reporting slot faults instead of panicking.
    pub fn try_read(&self) -> Result<T, SlotError>
    where
        T: Clone,
    {
        runtime::with_slot(self.instance, self.slot, T::clone)
    }

    /// Read by reference without cloning. `f` must not replace any cell.
    ///
    /// # Panics
    ///
    /// Panics if the owning instance is unmounted or the slot is misaligned.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match runtime::with_slot(self.instance, self.slot, f) {
            Ok(r) => r,
            Err(err) => panic!("state cell read failed: {err}"),
        }
    }

    /// How many replacements have been applied to this cell.
    ///
    /// # Panics
    ///
    /// Panics if the owning instance is unmounted.
    pub fn generation(&self) -> u64 {
        match runtime::slot_generation(self.instance, self.slot) {
            Ok(g) => g,
            Err(err) => panic!("state cell read failed: {err}"),
        }
    }

    /// Whether a replacement was applied after `generation` was observed.
    ///
    /// Useful for spotting a value captured by a closure that has gone stale.
    pub fn changed_since(&self, generation: u64) -> bool {
        self.generation() > generation
    }

    /// Queue a replacement: either a new value or a function of the previous one.
    ///
    /// ```ignore
    /// count.replace(5);
    /// count.replace(Update::apply(|c| c + 1));
    /// ```
    ///
    /// Replacing a cell of an unmounted instance is logged and ignored.
    pub fn replace(&self, next: impl Into<Update<T>>) {
        if let Err(err) = self.try_replace(next) {
            warn!(%err, "ignoring state replacement");
        }
    }

    /// Queue a replacement, failing if the owning instance is gone.
    pub fn try_replace(&self, next: impl Into<Update<T>>) -> Result<(), SlotError> {
        runtime::enqueue(self.instance, self.slot, next.into())
    }

    /// Queue a value-form replacement.
    pub fn set(&self, value: T) {
        self.replace(Update::value(value));
    }

    /// Queue a function-form replacement computed from the value current when
    /// the update is applied.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.replace(Update::apply(f));
    }
}
