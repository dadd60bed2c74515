//! Snapshot rendering helpers.
//!
//! Convert trees and views into plain text suitable for `insta` snapshots
//! and string assertions. No focus marker is drawn.

use crate::host::{Host, HostError};
use crate::render::text::{self, RenderOptions};
use crate::view::{Node, View};

/// Render a tree to plain text. Lines are right-trimmed and joined with
/// `'\n'`; there is no trailing newline.
pub fn render_to_string(node: &Node) -> String {
    text::render_to_string(node, &RenderOptions::default())
}

/// Mount `view` on a throwaway host and render its first frame.
pub fn render_view_to_string(view: impl View + 'static) -> Result<String, HostError> {
    let mut host = Host::new();
    let id = host.mount(view)?;
    Ok(host.tree(id).map(render_to_string).unwrap_or_default())
}
