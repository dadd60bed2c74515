//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` wraps an [`App`](crate::app::App) in headless mode and provides
//! methods to simulate user input (key presses, typing, clicks), deliver the
//! resulting events, and read the rendered text back.

use crate::app::{App, AppConfig, AppError};
use crate::event::input::{InputEvent, Key, KeyEvent, Modifiers};
use crate::event::ui::UiEvent;
use crate::view::View;

/// A headless app driver for testing.
///
/// ```ignore
/// use cellview::demos::Counter;
/// use cellview::testing::Pilot;
/// use cellview::event::Key;
///
/// let mut pilot = Pilot::new(Counter::default())?;
/// pilot.press_key(Key::Tab);
/// pilot.press_key(Key::Enter);
/// pilot.process()?;
/// assert_eq!(pilot.text_of("value"), Some("Count: 1".into()));
/// ```
pub struct Pilot {
    app: App,
}

impl Pilot {
    /// Mount `view` on a headless app with the default config.
    pub fn new(view: impl View + 'static) -> Result<Self, AppError> {
        Self::with_config(view, AppConfig::default())
    }

    pub fn with_config(view: impl View + 'static, config: AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            app: App::new_headless(view, config)?,
        })
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Simulate a key press with no modifiers. Call [`process`](Self::process)
    /// to deliver the resulting event.
    pub fn press_key(&mut self, key: Key) {
        self.press_key_with(key, Modifiers::NONE);
    }

    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) {
        self.app
            .handle_input(InputEvent::Key(KeyEvent::new(key, modifiers)));
    }

    /// Press one key per character of `text`, then deliver them all.
    pub fn type_text(&mut self, text: &str) -> Result<(), AppError> {
        for ch in text.chars() {
            self.press_key(Key::Char(ch));
        }
        self.process()?;
        Ok(())
    }

    /// Click the element keyed `target` and deliver the click.
    ///
    /// Returns whether the element had a click handler.
    pub fn click(&mut self, target: &str) -> Result<bool, AppError> {
        self.app.post(target, UiEvent::Click);
        Ok(self.process()? > 0)
    }

    /// Focus the element keyed `key`. Returns `false` if it is not focusable.
    pub fn focus(&mut self, key: &str) -> bool {
        self.app.focus(key)
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Deliver every queued event. Returns how many found a handler.
    pub fn process(&mut self) -> Result<usize, AppError> {
        self.app.handle_events()
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Whether the app is still running (has not quit).
    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }

    /// The current frame as plain text, with the focus marker.
    pub fn text(&self) -> String {
        self.app.text()
    }

    /// Text content of the element keyed `key`.
    pub fn text_of(&self, key: &str) -> Option<String> {
        self.app.tree()?.find(key).map(|el| el.text_content())
    }

    /// An attribute of the element keyed `key`.
    pub fn attr_of(&self, key: &str, name: &str) -> Option<String> {
        self.app.tree()?.find(key)?.attr(name).map(str::to_owned)
    }

    /// How many times the root view has rendered.
    pub fn render_count(&self) -> u64 {
        self.app
            .host()
            .render_count(self.app.root())
            .unwrap_or(0)
    }

    pub fn focused(&self) -> Option<&str> {
        self.app.focused()
    }
}
