//! Greeter demo: a text input bound to one string cell.

use crate::event::EventKind;
use crate::state::SlotError;
use crate::view::{Element, Node, View, ViewContext};

pub const NAME: &str = "name";
pub const GREETING: &str = "greeting";
pub const CLEAR: &str = "clear";

const PROMPT: &str = "Please enter your name.";

/// Greets whatever name is typed into its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeter {
    pub greeting: String,
    pub initial_name: String,
}

impl Default for Greeter {
    fn default() -> Self {
        Self {
            greeting: "Hello".into(),
            initial_name: String::new(),
        }
    }
}

impl Greeter {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            ..Self::default()
        }
    }

    /// Start with a name already entered (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.initial_name = name.into();
        self
    }

    fn message(&self, name: &str) -> String {
        match name.trim() {
            "" => PROMPT.to_owned(),
            name => format!("{}, {name}!", self.greeting),
        }
    }
}

impl View for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    fn render(&self, cx: &ViewContext) -> Result<Node, SlotError> {
        let initial = self.initial_name.clone();
        let name = cx.create_state_with(move || initial)?;
        let current = name.read();

        let input = Element::new("input")
            .with_key(NAME)
            .with_attr("value", current.as_str())
            .with_attr("placeholder", "Enter your name")
            .on_input(move |text| name.set(text.to_owned()))
            .on_edit(move |edit| {
                let edit = edit.clone();
                name.update(move |n| edit.apply(n))
            })
            .on(EventKind::Submit, move |_| {
                name.update(|n| n.trim().to_owned())
            });

        Ok(Element::new("div")
            .with_class("greeter")
            .child(Element::new("h1").child("Greeter"))
            .child(Element::new("p").child("Name:").child(input))
            .child(
                Element::new("p")
                    .with_key(GREETING)
                    .child(self.message(&current)),
            )
            .child(
                Element::new("button")
                    .with_key(CLEAR)
                    .child("Clear")
                    .disabled(current.is_empty())
                    .on_click(move || name.set(String::new())),
            )
            .into())
    }
}
