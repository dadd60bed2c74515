//! Event queue: pending UI events waiting to be dispatched to the host.
//!
//! Input handling only decides *which* element an event is for and pushes an
//! [`Envelope`]. The application loop drains the queue and hands each
//! envelope to the host as its own synchronous turn.

use std::collections::VecDeque;

use super::ui::UiEvent;
use crate::state::InstanceId;

/// A UI event addressed to one element of one mounted view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The view instance whose tree holds the target.
    pub instance: InstanceId,
    /// Key of the target element.
    pub target: String,
    pub event: UiEvent,
}

impl Envelope {
    pub fn new(instance: InstanceId, target: impl Into<String>, event: UiEvent) -> Self {
        Self {
            instance,
            target: target.into(),
            event,
        }
    }
}

/// FIFO queue of envelopes.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: VecDeque<Envelope>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn push(&mut self, envelope: Envelope) {
        self.queue.push_back(envelope);
    }

    /// Drain all pending envelopes in arrival order.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
