//! App struct: lifecycle, event loop, focus and key handling.
//!
//! [`App`] mounts one root view on a [`Host`] and turns terminal input into
//! UI events for the focused element. The `new_headless` constructor allows
//! testing without a real terminal.

use std::io;
use std::time::Duration;

use crossterm::event;
use tracing::{debug, info};

use crate::event::binding::{BindingAction, KeyBindingRegistry};
use crate::event::dispatch::{Envelope, EventQueue};
use crate::event::input::{InputEvent, Key, KeyEvent};
use crate::event::ui::{TextEdit, UiEvent};
use crate::focus::FocusChain;
use crate::host::{Host, HostConfig, HostError};
use crate::render::driver::Driver;
use crate::render::text::{render_lines, render_to_string, Line, RenderOptions};
use crate::state::InstanceId;
use crate::view::{Element, Node, View};

const STATUS_HELP: &str = "Tab/Shift+Tab focus · Enter activate · Esc quit";

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shown in the status line.
    pub title: Option<String>,
    /// How long the loop waits for input before redrawing.
    pub tick_rate: Duration,
    /// Configuration of the underlying render host.
    pub host: HostConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            tick_rate: Duration::from_millis(250),
            host: HostConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the input poll interval (builder).
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Set the host configuration (builder).
    pub fn with_host(mut self, host: HostConfig) -> Self {
        self.host = host;
        self
    }
}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Host(#[from] HostError),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
///
/// Owns the host with its single root instance, the focus chain, key
/// bindings, the pending event queue and the (optional) terminal driver.
pub struct App {
    host: Host,
    root: InstanceId,
    focus: FocusChain,
    bindings: KeyBindingRegistry,
    queue: EventQueue,
    driver: Option<Driver>,
    config: AppConfig,
    running: bool,
}

impl App {
    /// Create an app drawing to the real terminal.
    pub fn new(view: impl View + 'static, config: AppConfig) -> Result<Self, AppError> {
        let driver = Driver::new()?;
        Self::build(view, config, Some(driver))
    }

    /// Create an app without a terminal driver, for tests.
    pub fn new_headless(view: impl View + 'static, config: AppConfig) -> Result<Self, AppError> {
        Self::build(view, config, None)
    }

    fn build(
        view: impl View + 'static,
        config: AppConfig,
        driver: Option<Driver>,
    ) -> Result<Self, AppError> {
        let mut host = Host::with_config(config.host.clone());
        let root = host.mount(view)?;
        let mut app = Self {
            host,
            root,
            focus: FocusChain::new(),
            bindings: KeyBindingRegistry::with_defaults(),
            queue: EventQueue::new(),
            driver,
            config,
            running: true,
        };
        app.refresh_focus();
        Ok(app)
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Translate terminal input into UI events for the focused element.
    ///
    /// Key bindings win. Otherwise a focused input takes printable
    /// characters, pastes and Backspace as [`TextEdit`]s, and a focused
    /// button takes Space as a click. Events are only queued; call
    /// [`handle_events`](Self::handle_events) to deliver them.
    pub fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Key(key) => {
                if let Some(action) = self.bindings.resolve(&key) {
                    self.run_action(action);
                    return;
                }
                let envelope = self
                    .focused_element()
                    .and_then(|el| key_to_event(el, key))
                    .and_then(|event| self.to_focused(event));
                if let Some(envelope) = envelope {
                    self.queue.push(envelope);
                }
            }
            InputEvent::Paste(text) => {
                let envelope = self
                    .focused_element()
                    .filter(|el| el.tag() == "input")
                    .map(|_| UiEvent::Edit(TextEdit::Insert(text)))
                    .and_then(|event| self.to_focused(event));
                if let Some(envelope) = envelope {
                    self.queue.push(envelope);
                }
            }
            // The next frame picks up the new size.
            InputEvent::Resize { .. } => {}
        }
    }

    fn run_action(&mut self, action: BindingAction) {
        match action {
            BindingAction::Quit => self.request_quit(),
            BindingAction::FocusNext => {
                self.focus.focus_next();
            }
            BindingAction::FocusPrevious => {
                self.focus.focus_previous();
            }
            BindingAction::Activate => {
                let event = self.focused_element().map(|el| match el.tag() {
                    "input" => UiEvent::Submit,
                    _ => UiEvent::Click,
                });
                if let Some(envelope) = event.and_then(|event| self.to_focused(event)) {
                    self.queue.push(envelope);
                }
            }
        }
    }

    fn to_focused(&self, event: UiEvent) -> Option<Envelope> {
        self.focus
            .current()
            .map(|key| Envelope::new(self.root, key, event))
    }

    /// Deliver every queued event, each as its own turn, then rebuild focus
    /// from the new tree. Returns how many events found a handler.
    pub fn handle_events(&mut self) -> Result<usize, AppError> {
        let mut handled = 0;
        for envelope in self.queue.drain() {
            if self
                .host
                .dispatch(envelope.instance, &envelope.target, envelope.event)?
            {
                handled += 1;
            }
        }
        self.refresh_focus();
        Ok(handled)
    }

    fn refresh_focus(&mut self) {
        if let Some(tree) = self.host.tree(self.root) {
            self.focus.rebuild(tree);
        }
        if self.focus.current().is_none() {
            self.focus.focus_next();
        }
    }

    // ── Output ───────────────────────────────────────────────────────

    /// Lay out the current tree with the focus marker.
    pub fn frame(&self, max_width: Option<usize>) -> Vec<Line> {
        let Some(tree) = self.host.tree(self.root) else {
            return Vec::new();
        };
        render_lines(tree, &self.render_options(max_width))
    }

    /// The current frame as plain text.
    pub fn text(&self) -> String {
        self.host
            .tree(self.root)
            .map(|tree| render_to_string(tree, &self.render_options(None)))
            .unwrap_or_default()
    }

    fn render_options(&self, max_width: Option<usize>) -> RenderOptions {
        let opts = RenderOptions::new().with_focus(self.focus.current());
        match max_width {
            Some(width) => opts.with_max_width(width),
            None => opts,
        }
    }

    fn status_line(&self) -> String {
        match &self.config.title {
            Some(title) => format!("{title} · {STATUS_HELP}"),
            None => STATUS_HELP.to_owned(),
        }
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Run until quit. Restores the terminal even when the loop fails.
    ///
    /// Headless apps return immediately.
    pub fn run(&mut self) -> Result<(), AppError> {
        let Some(driver) = self.driver.as_mut() else {
            return Ok(());
        };
        driver.enter()?;
        info!(title = ?self.config.title, "app started");

        let result = self.event_loop();

        if let Some(driver) = self.driver.as_mut() {
            driver.leave()?;
        }
        info!("app stopped");
        result
    }

    fn event_loop(&mut self) -> Result<(), AppError> {
        while self.running {
            self.draw()?;
            if event::poll(self.config.tick_rate)? {
                if let Some(input) = InputEvent::from_crossterm(event::read()?) {
                    debug!(?input, "input");
                    self.handle_input(input);
                }
            }
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<(), AppError> {
        let (width, _) = Driver::terminal_size()?;
        let lines = self.frame(Some(usize::from(width)));
        let status = self.status_line();
        if let Some(driver) = self.driver.as_mut() {
            driver.draw(&lines, &status)?;
        }
        Ok(())
    }

    // ── State ────────────────────────────────────────────────────────

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn root(&self) -> InstanceId {
        self.root
    }

    pub fn tree(&self) -> Option<&Node> {
        self.host.tree(self.root)
    }

    /// Key of the focused element.
    pub fn focused(&self) -> Option<&str> {
        self.focus.current()
    }

    /// Focus the element keyed `key`. Returns `false` if it is not focusable.
    pub fn focus(&mut self, key: &str) -> bool {
        self.focus.focus(key)
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindingRegistry {
        &mut self.bindings
    }

    /// Queue an event for an element directly, bypassing focus.
    pub fn post(&mut self, target: &str, event: UiEvent) {
        self.queue.push(Envelope::new(self.root, target, event));
    }

    pub fn pending_events(&self) -> usize {
        self.queue.pending_count()
    }

    fn focused_element(&self) -> Option<&Element> {
        let key = self.focus.current()?;
        self.host.tree(self.root)?.find(key)
    }
}

/// The UI event a key press produces on `el`, if any.
fn key_to_event(el: &Element, key: KeyEvent) -> Option<UiEvent> {
    match el.tag() {
        // Edits are relative: several can queue before the next render.
        "input" => match key.printable() {
            Some(ch) => Some(UiEvent::Edit(TextEdit::Insert(ch.to_string()))),
            None if key.code == Key::Backspace => Some(UiEvent::Edit(TextEdit::Backspace)),
            None => Some(UiEvent::Key(key)),
        },
        "button" if key.printable() == Some(' ') => Some(UiEvent::Click),
        _ => Some(UiEvent::Key(key)),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
