//! Event system: terminal input, key bindings, UI events, dispatch queue.

pub mod binding;
pub mod dispatch;
pub mod input;
pub mod ui;

pub use binding::{BindingAction, KeyBindingRegistry};
pub use dispatch::{Envelope, EventQueue};
pub use input::{InputEvent, Key, KeyEvent, Modifiers};
pub use ui::{EventKind, TextEdit, UiEvent};
