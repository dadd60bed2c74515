//! Events delivered to handlers attached in a view's UI description.

use super::input::KeyEvent;

/// Which handler slot of an element an event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Edit,
    Key,
    Submit,
}

/// An interaction with one element of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Pointer press or keyboard activation of a button.
    Click,
    /// The full new text of an input field.
    Input(String),
    /// A keystroke-sized change to an input field's text, applied to
    /// whatever the field holds when the handler's update runs.
    Edit(TextEdit),
    /// A raw key press on the focused element.
    Key(KeyEvent),
    /// Form submission (Enter inside an input).
    Submit,
}

impl UiEvent {
    /// Create an input event carrying the field's new text.
    pub fn input(text: impl Into<String>) -> Self {
        Self::Input(text.into())
    }

    /// The handler kind this event is routed to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click => EventKind::Click,
            Self::Input(_) => EventKind::Input,
            Self::Edit(_) => EventKind::Edit,
            Self::Key(_) => EventKind::Key,
            Self::Submit => EventKind::Submit,
        }
    }

    /// The edit carried by an [`Edit`](Self::Edit) event.
    pub fn edit(&self) -> Option<&TextEdit> {
        match self {
            Self::Edit(edit) => Some(edit),
            _ => None,
        }
    }

    /// The text carried by an [`Input`](Self::Input) event.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Input(text) => Some(text),
            _ => None,
        }
    }
}

/// A relative change to a text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    /// Append text at the end.
    Insert(String),
    /// Remove the last character, if any.
    Backspace,
}

impl TextEdit {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::Insert(text.into())
    }

    /// The text after applying this edit to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Insert(more) => format!("{text}{more}"),
            Self::Backspace => {
                let mut next = text.to_owned();
                next.pop();
                next
            }
        }
    }
}
