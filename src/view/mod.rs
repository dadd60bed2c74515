//! View functions and the UI description they produce.

pub mod component;
pub mod context;
pub mod node;

pub use component::View;
pub use context::ViewContext;
pub use node::{Element, Handler, Node};
