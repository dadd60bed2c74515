//! The two forms a replacement can take.

use std::fmt;

/// A queued replacement for a [`StateCell`](super::StateCell).
///
/// `Value` overwrites the cell outright. `Apply` computes the next value from
/// whatever the cell holds when the host applies the batch, so it observes
/// every earlier update of the same batch.
pub enum Update<T> {
    /// Replace with this exact value.
    Value(T),
    /// Replace with `f(previous)`.
    Apply(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Value-form update.
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Function-form update.
    pub fn apply(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Apply(Box::new(f))
    }

    /// Whether this is a function-form update.
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Apply(_))
    }

    /// Produce the next value. The previous value is consumed either way;
    /// a value-form update never merges with it.
    pub fn resolve(self, previous: T) -> T {
        self.resolve_from(&previous)
    }

    /// Produce the next value without taking ownership of the previous one.
    pub(crate) fn resolve_from(self, previous: &T) -> T {
        match self {
            Self::Value(next) => next,
            Self::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Apply(_) => f.write_str("Apply(<fn>)"),
        }
    }
}
