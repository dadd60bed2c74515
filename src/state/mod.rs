//! Per-instance state: slot-indexed cells, queued replacements, batching.
//!
//! - [`StateCell`]: typed handle to one declared slot.
//! - [`Update`]: value-form or function-form replacement.
//! - [`batch`]: group replacements into one turn.
//! - [`SlotError`]: slot misalignment and lifetime faults.

pub mod cell;
pub mod error;
pub mod runtime;
pub(crate) mod slots;
pub mod update;

pub use cell::StateCell;
pub use error::SlotError;
pub use runtime::{batch, in_batch, pending_count, InstanceId, RenderRequest};
pub use update::Update;
