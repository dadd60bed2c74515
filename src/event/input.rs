//! Terminal input types, decoupled from crossterm.
//!
//! Crossterm events are converted with [`InputEvent::from_crossterm`] so the
//! rest of the crate never matches on crossterm types.

use std::ops::BitOr;

use crossterm::event::{
    Event as CtEvent, KeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers,
};

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key press with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// The character this press would type, if any.
    ///
    /// Shift is allowed (it only changes the case); Ctrl and Alt are not.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            Key::Char(c)
                if !self.modifiers.contains(Modifiers::CTRL)
                    && !self.modifiers.contains(Modifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }
}

/// Top-level terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Paste(String),
}

impl InputEvent {
    /// Convert a crossterm event, dropping kinds the app does not react to
    /// (mouse, focus changes, key releases and repeats).
    pub fn from_crossterm(event: CtEvent) -> Option<Self> {
        match event {
            CtEvent::Key(ke) if ke.kind == KeyEventKind::Press => {
                convert_key(ke).map(InputEvent::Key)
            }
            CtEvent::Resize(width, height) => Some(InputEvent::Resize { width, height }),
            CtEvent::Paste(text) => Some(InputEvent::Paste(text)),
            _ => None,
        }
    }
}

fn convert_modifiers(m: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

/// Convert a crossterm key event. Keys the app has no use for map to `None`.
fn convert_key(ct: CtKeyEvent) -> Option<KeyEvent> {
    let code = match ct.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    // BackTab already encodes the shift.
    let mut modifiers = convert_modifiers(ct.modifiers);
    if code == Key::BackTab {
        modifiers = Modifiers(modifiers.0 & !Modifiers::SHIFT.0);
    }
    Some(KeyEvent { code, modifiers })
}
