//! Per-instance slot tables.
//!
//! A [`SlotTable`] holds the values of every state cell a view instance has
//! declared, indexed by declaration order. Each entry records the type it was
//! created with; that tag is what turns an out-of-order declaration into a
//! [`SlotError::Misaligned`] instead of a silent mix-up.

use std::any::{Any, TypeId};

use super::error::SlotError;
use super::runtime::InstanceId;

/// Placeholder left in a slot while one of its updates is running.
struct Applying;

/// One declared state slot.
pub(crate) struct SlotEntry {
    value: Box<dyn Any>,
    type_id: TypeId,
    type_name: &'static str,
    generation: u64,
}

impl SlotEntry {
    fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            generation: 0,
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Outcome of claiming the next slot during a render.
pub(crate) enum Claim {
    /// The slot exists and has the right type.
    Existing(usize),
    /// The slot must be created; call [`SlotTable::push`] with its initial value.
    Vacant(usize),
}

/// Ordered slots of a single view instance.
pub(crate) struct SlotTable {
    instance: InstanceId,
    entries: Vec<SlotEntry>,
    /// Next slot index handed out by the render in progress.
    cursor: usize,
    /// Set once the first render completes; the slot count is fixed from then on.
    sealed: bool,
}

impl SlotTable {
    pub(crate) fn new(instance: InstanceId) -> Self {
        Self {
            instance,
            entries: Vec::new(),
            cursor: 0,
            sealed: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Reset the declaration cursor at the start of a render.
    pub(crate) fn begin_render(&mut self) {
        self.cursor = 0;
    }

    /// Claim the next slot for a declaration of type `T`.
    pub(crate) fn claim<T: 'static>(&mut self) -> Result<Claim, SlotError> {
        let slot = self.cursor;
        match self.entries.get(slot) {
            Some(entry) if entry.type_id != TypeId::of::<T>() => Err(SlotError::Misaligned {
                instance: self.instance,
                slot,
                expected: entry.type_name,
                found: std::any::type_name::<T>(),
            }),
            Some(_) => {
                self.cursor += 1;
                Ok(Claim::Existing(slot))
            }
            None if self.sealed => Err(SlotError::ExtraSlot {
                instance: self.instance,
                slot,
                sealed: self.entries.len(),
            }),
            None => Ok(Claim::Vacant(slot)),
        }
    }

    /// Create the slot returned by a [`Claim::Vacant`].
    pub(crate) fn push<T: 'static>(&mut self, value: T) -> usize {
        let slot = self.entries.len();
        debug_assert_eq!(slot, self.cursor, "slot pushed out of order");
        self.entries.push(SlotEntry::new(value));
        self.cursor += 1;
        slot
    }

    /// Close the render in progress, sealing the slot count after the first one.
    pub(crate) fn finish_render(&mut self) -> Result<(), SlotError> {
        if self.sealed && self.cursor != self.entries.len() {
            return Err(SlotError::MissingSlots {
                instance: self.instance,
                declared: self.cursor,
                sealed: self.entries.len(),
            });
        }
        self.sealed = true;
        Ok(())
    }

    pub(crate) fn entry(&self, slot: usize) -> Option<&SlotEntry> {
        self.entries.get(slot)
    }

    /// Borrow the value of `slot` as a `T`.
    pub(crate) fn get<T: 'static>(&self, slot: usize) -> Result<&T, SlotError> {
        let entry = self.entries.get(slot).ok_or(SlotError::ExtraSlot {
            instance: self.instance,
            slot,
            sealed: self.entries.len(),
        })?;
        if entry.value.is::<Applying>() {
            return Err(SlotError::Reentrant {
                instance: self.instance,
                slot,
            });
        }
        entry
            .value
            .downcast_ref::<T>()
            .ok_or(SlotError::Misaligned {
                instance: self.instance,
                slot,
                expected: entry.type_name,
                found: std::any::type_name::<T>(),
            })
    }

    /// Move the value out of `slot` so an update can run without the runtime
    /// borrowed. Must be followed by [`restore`](Self::restore).
    pub(crate) fn take(&mut self, slot: usize) -> Option<Box<dyn Any>> {
        let entry = self.entries.get_mut(slot)?;
        if entry.value.is::<Applying>() {
            return None;
        }
        Some(std::mem::replace(&mut entry.value, Box::new(Applying)))
    }

    /// Put a value back after an update. `applied` bumps the generation.
    pub(crate) fn restore(&mut self, slot: usize, value: Box<dyn Any>, applied: bool) {
        if let Some(entry) = self.entries.get_mut(slot) {
            entry.value = value;
            if applied {
                entry.generation += 1;
            }
        }
    }
}
