//! Key binding registry and resolution.
//!
//! [`KeyBindingRegistry`] maps key+modifier combinations to app-level
//! [`BindingAction`]s. Keys without a binding fall through to the focused
//! element (typing into an input, for example).

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};

/// Action to take when a key binding is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingAction {
    /// Quit the application.
    Quit,
    /// Move focus to the next focusable element.
    FocusNext,
    /// Move focus to the previous focusable element.
    FocusPrevious,
    /// Click the focused button, or submit the focused input.
    Activate,
}

/// Registry of key bindings, mapping (Key, Modifiers) -> BindingAction.
#[derive(Debug)]
pub struct KeyBindingRegistry {
    bindings: HashMap<(Key, Modifiers), BindingAction>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Create a registry with the standard bindings.
    ///
    /// - `Ctrl+C`, `Esc` -> Quit
    /// - `Tab` -> FocusNext
    /// - `BackTab` (Shift+Tab) -> FocusPrevious
    /// - `Enter` -> Activate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Char('c'), Modifiers::CTRL, BindingAction::Quit);
        registry.bind(Key::Escape, Modifiers::NONE, BindingAction::Quit);
        registry.bind(Key::Tab, Modifiers::NONE, BindingAction::FocusNext);
        registry.bind(Key::BackTab, Modifiers::NONE, BindingAction::FocusPrevious);
        registry.bind(Key::Enter, Modifiers::NONE, BindingAction::Activate);
        registry
    }

    /// Register a key binding, replacing any existing one for the same keys.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: BindingAction) {
        self.bindings.insert((key, modifiers), action);
    }

    /// Remove a key binding, returning the removed action.
    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<BindingAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// Look up the action for an exact key + modifiers match.
    pub fn resolve(&self, event: &KeyEvent) -> Option<BindingAction> {
        self.bindings.get(&(event.code, event.modifiers)).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyBindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_registry_is_empty() {
        let reg = KeyBindingRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn defaults() {
        let reg = KeyBindingRegistry::with_defaults();
        assert_eq!(reg.len(), 5);
        let resolve = |code, mods| reg.resolve(&KeyEvent::new(code, mods));
        assert_eq!(resolve(Key::Char('c'), Modifiers::CTRL), Some(BindingAction::Quit));
        assert_eq!(resolve(Key::Escape, Modifiers::NONE), Some(BindingAction::Quit));
        assert_eq!(resolve(Key::Tab, Modifiers::NONE), Some(BindingAction::FocusNext));
        assert_eq!(
            resolve(Key::BackTab, Modifiers::NONE),
            Some(BindingAction::FocusPrevious)
        );
        assert_eq!(resolve(Key::Enter, Modifiers::NONE), Some(BindingAction::Activate));
    }

    #[test]
    fn plain_chars_are_unbound() {
        let reg = KeyBindingRegistry::with_defaults();
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Char('c'))), None);
        assert_eq!(reg.resolve(&KeyEvent::plain(Key::Char(' '))), None);
    }

    #[test]
    fn modifiers_must_match_exactly() {
        let mut reg = KeyBindingRegistry::new();
        reg.bind(Key::Char('q'), Modifiers::CTRL, BindingAction::Quit);
        assert!(reg.resolve(&KeyEvent::plain(Key::Char('q'))).is_none());
        assert!(reg
            .resolve(&KeyEvent::new(Key::Char('q'), Modifiers::CTRL))
            .is_some());
    }

    #[test]
    fn bind_replaces_and_unbind_removes() {
        let mut reg = KeyBindingRegistry::new();
        reg.bind(Key::Enter, Modifiers::NONE, BindingAction::Quit);
        reg.bind(Key::Enter, Modifiers::NONE, BindingAction::Activate);
        assert_eq!(reg.len(), 1);
        assert_eq!(
            reg.unbind(Key::Enter, Modifiers::NONE),
            Some(BindingAction::Activate)
        );
        assert!(reg.is_empty());
        assert_eq!(reg.unbind(Key::Enter, Modifiers::NONE), None);
    }
}
