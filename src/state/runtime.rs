//! Thread-local state runtime.
//!
//! Owns every live instance's [`SlotTable`], the FIFO queue of pending
//! updates, and each instance's render-request notifier. Single-threaded and
//! synchronous: nothing here spawns or blocks.
//!
//! The `RefCell` is never held across user code. Initialisers, updates and
//! read callbacks run either before the runtime is borrowed or with the
//! affected value moved out of its slot.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;

use slotmap::{new_key_type, SlotMap};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::error::SlotError;
use super::slots::{Claim, SlotTable};
use super::update::Update;

new_key_type! {
    /// Identifies one live mounting of a view.
    pub struct InstanceId;
}

/// Message sent to the rendering host whenever a cell of `instance` is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRequest {
    pub instance: InstanceId,
}

/// Type-erased update: computes the next value from the slot's current one,
/// or returns `None` if the slot holds another type.
type ApplyFn = Box<dyn FnOnce(&dyn Any) -> Option<Box<dyn Any>>>;

struct PendingUpdate {
    instance: InstanceId,
    slot: usize,
    found: &'static str,
    apply: ApplyFn,
}

struct Instance {
    slots: SlotTable,
    notifier: UnboundedSender<RenderRequest>,
}

struct Runtime {
    instances: SlotMap<InstanceId, Instance>,
    queue: VecDeque<PendingUpdate>,
    /// When > 0 we are inside a `batch()` call and the host must not flush.
    batch_depth: usize,
}

impl Runtime {
    fn new() -> Self {
        Self {
            instances: SlotMap::with_key(),
            queue: VecDeque::new(),
            batch_depth: 0,
        }
    }

    fn instance(&self, id: InstanceId) -> Result<&Instance, SlotError> {
        self.instances
            .get(id)
            .ok_or(SlotError::Unmounted { instance: id })
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Instance, SlotError> {
        self.instances
            .get_mut(id)
            .ok_or(SlotError::Unmounted { instance: id })
    }
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// Allocate an empty slot table for a new instance.
pub(crate) fn register_instance(notifier: UnboundedSender<RenderRequest>) -> InstanceId {
    RUNTIME.with(|rt| {
        rt.borrow_mut().instances.insert_with_key(|id| Instance {
            slots: SlotTable::new(id),
            notifier,
        })
    })
}

/// Drop an instance and all of its slots. Returns `false` if it was already gone.
pub(crate) fn remove_instance(id: InstanceId) -> bool {
    // Dropping the slot values may run user `Drop` impls; do it unborrowed.
    let removed = RUNTIME.with(|rt| rt.borrow_mut().instances.remove(id));
    removed.is_some()
}

/// Whether `id` is a live instance.
pub fn is_live(id: InstanceId) -> bool {
    RUNTIME.with(|rt| rt.borrow().instances.contains_key(id))
}

/// Number of declared slots of `id`.
pub fn slot_count(id: InstanceId) -> Result<usize, SlotError> {
    RUNTIME.with(|rt| Ok(rt.borrow().instance(id)?.slots.len()))
}

// ---------------------------------------------------------------------------
// Render bracketing
// ---------------------------------------------------------------------------

pub(crate) fn begin_render(id: InstanceId) -> Result<(), SlotError> {
    RUNTIME.with(|rt| {
        rt.borrow_mut().instance_mut(id)?.slots.begin_render();
        Ok(())
    })
}

pub(crate) fn finish_render(id: InstanceId) -> Result<(), SlotError> {
    RUNTIME.with(|rt| rt.borrow_mut().instance_mut(id)?.slots.finish_render())
}

/// Claim the next slot of `id` for a `T`, creating it with `init` on first mount.
pub(crate) fn claim_slot<T: 'static>(
    id: InstanceId,
    init: impl FnOnce() -> T,
) -> Result<usize, SlotError> {
    let claim = RUNTIME.with(|rt| rt.borrow_mut().instance_mut(id)?.slots.claim::<T>())?;
    match claim {
        Claim::Existing(slot) => Ok(slot),
        Claim::Vacant(slot) => {
            let value = init();
            let pushed = RUNTIME.with(|rt| {
                Ok::<_, SlotError>(rt.borrow_mut().instance_mut(id)?.slots.push(value))
            })?;
            debug!(instance = ?id, slot, "created state slot");
            debug_assert_eq!(slot, pushed);
            Ok(pushed)
        }
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Run `f` against the current value of a slot.
///
/// `f` runs while the runtime is borrowed; it may read other cells but must
/// not replace any.
pub(crate) fn with_slot<T: 'static, R>(
    id: InstanceId,
    slot: usize,
    f: impl FnOnce(&T) -> R,
) -> Result<R, SlotError> {
    RUNTIME.with(|rt| {
        let rt = rt.borrow();
        let value = rt.instance(id)?.slots.get::<T>(slot)?;
        Ok(f(value))
    })
}

pub(crate) fn slot_generation(id: InstanceId, slot: usize) -> Result<u64, SlotError> {
    RUNTIME.with(|rt| {
        let rt = rt.borrow();
        let instance = rt.instance(id)?;
        instance
            .slots
            .entry(slot)
            .map(|e| e.generation())
            .ok_or(SlotError::ExtraSlot {
                instance: id,
                slot,
                sealed: instance.slots.len(),
            })
    })
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// Queue an update for a slot and ask the host to re-render its owner.
pub(crate) fn enqueue<T: 'static>(
    id: InstanceId,
    slot: usize,
    update: Update<T>,
) -> Result<(), SlotError> {
    let apply: ApplyFn = Box::new(
        move |current: &dyn Any| -> Option<Box<dyn Any>> {
            let previous = current.downcast_ref::<T>()?;
            Some(Box::new(update.resolve_from(previous)))
        },
    );

    let notifier = RUNTIME.with(|rt| {
        let mut rt = rt.borrow_mut();
        let notifier = rt.instance(id)?.notifier.clone();
        rt.queue.push_back(PendingUpdate {
            instance: id,
            slot,
            found: std::any::type_name::<T>(),
            apply,
        });
        Ok::<_, SlotError>(notifier)
    })?;

    if notifier.send(RenderRequest { instance: id }).is_err() {
        debug!(instance = ?id, "render host is gone; request dropped");
    }
    Ok(())
}

/// Apply every queued update in FIFO order.
///
/// Returns the number of updates applied. Updates whose instance was
/// unmounted after they were queued are discarded.
pub(crate) fn apply_pending() -> Result<usize, SlotError> {
    let mut applied = 0;
    loop {
        let next = RUNTIME.with(|rt| rt.borrow_mut().queue.pop_front());
        let Some(update) = next else {
            break;
        };

        let taken = RUNTIME.with(|rt| {
            rt.borrow_mut()
                .instances
                .get_mut(update.instance)
                .map(|inst| inst.slots.take(update.slot))
        });
        let current = match taken {
            None => {
                warn!(instance = ?update.instance, slot = update.slot, "discarding update for unmounted instance");
                continue;
            }
            Some(None) => {
                return Err(SlotError::Reentrant {
                    instance: update.instance,
                    slot: update.slot,
                })
            }
            Some(Some(value)) => value,
        };

        let mut held = TakenSlot {
            instance: update.instance,
            slot: update.slot,
            value: Some(current),
            applied: false,
        };
        // User code runs here with the runtime unborrowed.
        let next = held.value.as_deref().and_then(|current| (update.apply)(current));
        if let Some(next) = next {
            held.value = Some(next);
            held.applied = true;
        }
        let ok = held.applied;
        drop(held);

        if !ok {
            let expected = RUNTIME.with(|rt| {
                let rt = rt.borrow();
                let inst = rt.instances.get(update.instance)?;
                inst.slots.entry(update.slot).map(|e| e.type_name())
            });
            return Err(SlotError::Misaligned {
                instance: update.instance,
                slot: update.slot,
                expected: expected.unwrap_or("<unknown>"),
                found: update.found,
            });
        }
        applied += 1;
    }
    Ok(applied)
}

/// A slot value moved out for an update. Dropping it puts the value back,
/// so an update that panics leaves the previous value in place.
struct TakenSlot {
    instance: InstanceId,
    slot: usize,
    value: Option<Box<dyn Any>>,
    applied: bool,
}

impl Drop for TakenSlot {
    fn drop(&mut self) {
        let Some(value) = self.value.take() else {
            return;
        };
        let (instance, slot, applied) = (self.instance, self.slot, self.applied);
        let orphan = RUNTIME
            .try_with(|rt| {
                let Ok(mut rt) = rt.try_borrow_mut() else {
                    return Some(value);
                };
                match rt.instances.get_mut(instance) {
                    Some(inst) => {
                        inst.slots.restore(slot, value, applied);
                        None
                    }
                    None => Some(value),
                }
            })
            .ok()
            .flatten();
        // Dropped unborrowed; it may run user `Drop` impls.
        drop(orphan);
    }
}

/// Number of updates waiting to be applied.
pub fn pending_count() -> usize {
    RUNTIME.with(|rt| rt.borrow().queue.len())
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Run `f` as one synchronous turn.
///
/// Replacements made inside are only queued; the host applies them together
/// on its next flush, so the owning instance renders once for the whole turn.
/// Batches nest; only leaving the outermost one allows a flush.
///
/// ```ignore
/// batch(|| {
///     count.update(|c| c + 1);
///     count.update(|c| c + 1);
/// });
/// host.flush()?; // one render, count == 2
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            RUNTIME.with(|rt| rt.borrow_mut().batch_depth -= 1);
        }
    }

    RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
    let _guard = Guard;
    f()
}

/// Whether a [`batch`] is currently open on this thread.
pub fn in_batch() -> bool {
    RUNTIME.with(|rt| rt.borrow().batch_depth > 0)
}

// ---------------------------------------------------------------------------
// Test helper: reset the thread-local runtime between tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) fn reset_runtime() {
    let old = RUNTIME.with(|rt| std::mem::replace(&mut *rt.borrow_mut(), Runtime::new()));
    drop(old);
}
