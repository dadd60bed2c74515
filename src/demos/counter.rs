//! Counter demo: one integer cell with increment, decrement and reset.

use crate::state::SlotError;
use crate::view::{Element, Node, View, ViewContext};

/// Key of the paragraph showing the count.
pub const VALUE: &str = "value";
pub const INCREMENT: &str = "increment";
pub const DECREMENT: &str = "decrement";
pub const RESET: &str = "reset";

/// A counter starting at `initial` and moving by `step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub initial: i64,
    pub step: i64,
}

impl Default for Counter {
    fn default() -> Self {
        Self {
            initial: 0,
            step: 1,
        }
    }
}

impl Counter {
    pub fn new(initial: i64, step: i64) -> Self {
        Self { initial, step }
    }
}

impl View for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    fn render(&self, cx: &ViewContext) -> Result<Node, SlotError> {
        let count = cx.create_state(self.initial)?;
        let (initial, step) = (self.initial, self.step);

        // Handlers use the function form: several clicks in one turn must
        // each see the previous click's result.
        let buttons = Element::new("div")
            .with_class("buttons")
            .child(
                Element::new("button")
                    .with_key(DECREMENT)
                    .child("-")
                    .on_click(move || count.update(move |c| c.saturating_sub(step))),
            )
            .child(
                Element::new("button")
                    .with_key(INCREMENT)
                    .child("+")
                    .on_click(move || count.update(move |c| c.saturating_add(step))),
            )
            .child(
                Element::new("button")
                    .with_key(RESET)
                    .child("Reset")
                    .on_click(move || count.set(initial)),
            );

        Ok(Element::new("div")
            .with_class("counter")
            .child(Element::new("h1").child("Counter"))
            .child(
                Element::new("p")
                    .with_key(VALUE)
                    .child(format!("Count: {}", count.read())),
            )
            .child(buttons)
            .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::UiEvent;
    use crate::host::Host;
    use crate::render::{render_to_string, RenderOptions};

    fn shown(host: &Host, id: crate::state::InstanceId) -> String {
        host.tree(id).unwrap().find(VALUE).unwrap().text_content()
    }

    #[test]
    fn initial_render() {
        let mut host = Host::new();
        let id = host.mount(Counter::default()).unwrap();
        insta::assert_snapshot!(
            render_to_string(host.tree(id).unwrap(), &RenderOptions::new()),
            @r"
        # Counter
        Count: 0
        [ - ] [ + ] [ Reset ]
        "
        );
    }

    #[test]
    fn increment_decrement_reset() {
        let mut host = Host::new();
        let id = host.mount(Counter::new(10, 5)).unwrap();

        host.dispatch(id, INCREMENT, UiEvent::Click).unwrap();
        host.dispatch(id, INCREMENT, UiEvent::Click).unwrap();
        assert_eq!(shown(&host, id), "Count: 20");

        host.dispatch(id, DECREMENT, UiEvent::Click).unwrap();
        assert_eq!(shown(&host, id), "Count: 15");

        host.dispatch(id, RESET, UiEvent::Click).unwrap();
        assert_eq!(shown(&host, id), "Count: 10");
        assert_eq!(host.render_count(id), Some(5));
    }

    #[test]
    fn negative_counts() {
        let mut host = Host::new();
        let id = host.mount(Counter::default()).unwrap();
        host.dispatch(id, DECREMENT, UiEvent::Click).unwrap();
        assert_eq!(shown(&host, id), "Count: -1");
    }

    #[test]
    fn saturates_at_bounds() {
        let mut host = Host::new();
        let id = host.mount(Counter::new(i64::MAX, 1)).unwrap();
        host.dispatch(id, INCREMENT, UiEvent::Click).unwrap();
        assert_eq!(shown(&host, id), format!("Count: {}", i64::MAX));
    }
}
