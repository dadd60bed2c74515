//! The `View` trait: a pure function from state to a UI description.

use super::context::ViewContext;
use super::node::Node;
use crate::state::SlotError;

/// A view function.
///
/// `render` is re-invoked in full whenever one of the instance's cells is
/// replaced. It declares its state through `cx`, reads it, and returns the
/// tree; handlers attached to the tree call `replace` on captured cells.
///
/// Any `Fn(&ViewContext) -> Result<Node, SlotError>` closure is a view.
pub trait View {
    /// Name used in log output.
    fn name(&self) -> &str {
        "view"
    }

    /// Build the UI description for the current state.
    fn render(&self, cx: &ViewContext) -> Result<Node, SlotError>;
}

impl<F> View for F
where
    F: Fn(&ViewContext) -> Result<Node, SlotError>,
{
    fn render(&self, cx: &ViewContext) -> Result<Node, SlotError> {
        self(cx)
    }
}
