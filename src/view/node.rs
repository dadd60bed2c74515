//! UI description tree produced by a view render.
//!
//! A [`Node`] is either text or an [`Element`]. Elements carry a tag, an
//! optional key (the address event targets use), classes, string attributes,
//! children, and event handlers keyed by [`EventKind`].

use std::fmt;
use std::rc::Rc;

use crate::event::ui::{EventKind, TextEdit, UiEvent};

/// Event handler attached to an element.
pub type Handler = Rc<dyn Fn(&UiEvent)>;

/// A node of a rendered tree.
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// A text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Borrow as an element, if this is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Find the first element with the given key, depth-first.
    pub fn find(&self, key: &str) -> Option<&Element> {
        self.elements().into_iter().find(|el| el.key() == Some(key))
    }

    /// All elements in depth-first pre-order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Node::Element(el) = node {
                out.push(el);
                // Reverse so the first child is visited first.
                stack.extend(el.children.iter().rev());
            }
        }
        out
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(el) => el.fmt(f),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
        }
    }
}

/// An element of the UI description.
#[derive(Clone)]
pub struct Element {
    tag: String,
    key: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
    disabled: bool,
    handlers: Vec<(EventKind, Handler)>,
}

impl Element {
    /// Create an element with the given tag and no content.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            disabled: false,
            handlers: Vec::new(),
        }
    }

    // ── Builders ─────────────────────────────────────────────────────

    /// Set the key events are addressed to (builder).
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add a class (builder). Duplicates are ignored.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute (builder). A later value for the same name wins.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Append a child (builder).
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children (builder).
    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Mark the element disabled (builder). Disabled elements take no focus
    /// and ignore events.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Attach a handler for `kind` (builder). A later handler for the same
    /// kind replaces the earlier one.
    pub fn on(mut self, kind: EventKind, handler: impl Fn(&UiEvent) + 'static) -> Self {
        self.handlers.retain(|(k, _)| *k != kind);
        self.handlers.push((kind, Rc::new(handler)));
        self
    }

    /// Attach a click handler (builder).
    pub fn on_click(self, handler: impl Fn() + 'static) -> Self {
        self.on(EventKind::Click, move |_| handler())
    }

    /// Attach an input handler receiving the field's new text (builder).
    pub fn on_input(self, handler: impl Fn(&str) + 'static) -> Self {
        self.on(EventKind::Input, move |ev| {
            if let Some(text) = ev.text() {
                handler(text);
            }
        })
    }

    /// Attach an edit handler (builder). Apply the edit through a
    /// function-form update so queued keystrokes build on each other.
    pub fn on_edit(self, handler: impl Fn(&TextEdit) + 'static) -> Self {
        self.on(EventKind::Edit, move |ev| {
            if let Some(edit) = ev.edit() {
                handler(edit);
            }
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// The handler for `kind`, unless the element is disabled.
    pub fn handler(&self, kind: EventKind) -> Option<Handler> {
        if self.disabled {
            return None;
        }
        self.handlers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, h)| Rc::clone(h))
    }

    /// Kinds of the attached handlers, in attachment order.
    pub fn handler_kinds(&self) -> Vec<EventKind> {
        self.handlers.iter().map(|(k, _)| *k).collect()
    }

    /// Whether keyboard focus can land here: keyed, enabled, and interactive.
    pub fn is_focusable(&self) -> bool {
        self.key.is_some() && !self.disabled && !self.handlers.is_empty()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("classes", &self.classes)
            .field("attrs", &self.attrs)
            .field("disabled", &self.disabled)
            .field("handlers", &self.handler_kinds())
            .field("children", &self.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn sample() -> Node {
        Element::new("div")
            .with_key("root")
            .child(Element::new("h1").child("Title"))
            .child(
                Element::new("div")
                    .child(Element::new("button").with_key("a").child("A").on_click(|| {}))
                    .child(Element::new("button").with_key("b").child("B").on_click(|| {})),
            )
            .child(Element::new("p").with_key("c").child("tail"))
            .into()
    }

    #[test]
    fn new_defaults() {
        let el = Element::new("p");
        assert_eq!(el.tag(), "p");
        assert!(el.key().is_none());
        assert!(el.classes().is_empty());
        assert!(el.child_nodes().is_empty());
        assert!(!el.is_disabled());
        assert!(!el.is_focusable());
    }

    #[test]
    fn class_dedup() {
        let el = Element::new("div").with_class("a").with_class("a").with_class("b");
        assert_eq!(el.classes(), ["a", "b"]);
        assert!(el.has_class("b"));
        assert!(!el.has_class("c"));
    }

    #[test]
    fn attr_last_write_wins() {
        let el = Element::new("input")
            .with_attr("value", "x")
            .with_attr("value", "y");
        assert_eq!(el.attr("value"), Some("y"));
        assert_eq!(el.attr("missing"), None);
    }

    #[test]
    fn elements_depth_first_order() {
        let tree = sample();
        let tags: Vec<_> = tree
            .elements()
            .iter()
            .map(|el| el.key().unwrap_or(el.tag()).to_owned())
            .collect();
        assert_eq!(tags, ["root", "h1", "div", "a", "b", "c"]);
    }

    #[test]
    fn find_by_key() {
        let tree = sample();
        assert_eq!(tree.find("b").unwrap().text_content(), "B");
        assert!(tree.find("zzz").is_none());
    }

    #[test]
    fn text_content_concatenates() {
        assert_eq!(sample().text_content(), "TitleABtail");
        assert_eq!(Node::text("x").text_content(), "x");
    }

    #[test]
    fn handler_lookup_and_replace() {
        let hits = Rc::new(Cell::new(0));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let el = Element::new("button")
            .with_key("k")
            .on_click(move || h1.set(h1.get() + 1))
            .on_click(move || h2.set(h2.get() + 10));
        assert_eq!(el.handler_kinds(), vec![EventKind::Click]);
        (el.handler(EventKind::Click).unwrap())(&UiEvent::Click);
        assert_eq!(hits.get(), 10);
        assert!(el.handler(EventKind::Input).is_none());
    }

    #[test]
    fn on_input_receives_text() {
        let seen = Rc::new(std::cell::RefCell::new(String::new()));
        let seen_c = seen.clone();
        let el = Element::new("input").on_input(move |t| *seen_c.borrow_mut() = t.to_owned());
        (el.handler(EventKind::Input).unwrap())(&UiEvent::input("typed"));
        assert_eq!(*seen.borrow(), "typed");
    }

    #[test]
    fn on_edit_ignores_other_events() {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_c = seen.clone();
        let el = Element::new("input").on_edit(move |e| seen_c.borrow_mut().push(e.clone()));
        let handler = el.handler(EventKind::Edit).unwrap();
        handler(&UiEvent::Edit(TextEdit::insert("a")));
        handler(&UiEvent::Click);
        assert_eq!(*seen.borrow(), vec![TextEdit::insert("a")]);
    }

    #[test]
    fn disabled_hides_handlers_and_focus() {
        let el = Element::new("button")
            .with_key("k")
            .on_click(|| {})
            .disabled(true);
        assert!(el.handler(EventKind::Click).is_none());
        assert!(!el.is_focusable());
    }

    #[test]
    fn focusable_requires_key_and_handler() {
        assert!(!Element::new("button").on_click(|| {}).is_focusable());
        assert!(!Element::new("button").with_key("k").is_focusable());
        assert!(Element::new("button").with_key("k").on_click(|| {}).is_focusable());
    }

    #[test]
    fn debug_lists_handler_kinds() {
        let el = Element::new("button").on_click(|| {});
        let dbg = format!("{el:?}");
        assert!(dbg.contains("Click"));
        assert!(dbg.contains("button"));
    }
}
