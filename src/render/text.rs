//! Plain-text layout of a rendered tree.
//!
//! Block elements start new lines. Consecutive inline content (text, buttons,
//! inputs, spans) is joined with single spaces on one line. Headings render
//! as `# Title`, buttons as `[ label ]`, inputs as `[value]`.

use crate::view::{Element, Node};

const INLINE_TAGS: &[&str] = &["button", "input", "span", "label", "strong", "em", "code"];

/// Options for [`render_lines`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Key of the focused element, drawn with a focus marker.
    pub focused: Option<String>,
    /// Truncate lines to this many characters.
    pub max_width: Option<usize>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the focused key (builder).
    pub fn with_focus(mut self, key: Option<&str>) -> Self {
        self.focused = key.map(str::to_owned);
        self
    }

    /// Set the maximum line width (builder).
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub heading: bool,
}

impl Line {
    fn plain(text: String) -> Self {
        Self {
            text,
            heading: false,
        }
    }
}

/// Lay out `node` as lines of text.
pub fn render_lines(node: &Node, opts: &RenderOptions) -> Vec<Line> {
    let mut lines = Vec::new();
    match node {
        Node::Element(el) if !is_inline(el) => render_block(el, opts, &mut lines),
        _ => {
            let mut run = Vec::new();
            inline_pieces(node, opts, &mut run);
            push_run(&mut run, &mut lines);
        }
    }

    for line in &mut lines {
        let trimmed = line.text.trim_end().len();
        line.text.truncate(trimmed);
        if let Some(max) = opts.max_width {
            if let Some((idx, _)) = line.text.char_indices().nth(max) {
                line.text.truncate(idx);
            }
        }
    }
    lines
}

/// Lay out `node` and join the lines with `\n`.
pub fn render_to_string(node: &Node, opts: &RenderOptions) -> String {
    render_lines(node, opts)
        .into_iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_inline(el: &Element) -> bool {
    INLINE_TAGS.contains(&el.tag())
}

fn heading_level(tag: &str) -> Option<usize> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        _ => None,
    }
}

fn render_block(el: &Element, opts: &RenderOptions, lines: &mut Vec<Line>) {
    if let Some(level) = heading_level(el.tag()) {
        let title = el.text_content();
        lines.push(Line {
            text: format!("{} {}", "#".repeat(level), title.trim()),
            heading: true,
        });
        return;
    }

    let mut run = Vec::new();
    for child in el.child_nodes() {
        match child {
            Node::Element(child_el) if !is_inline(child_el) => {
                push_run(&mut run, lines);
                render_block(child_el, opts, lines);
            }
            _ => inline_pieces(child, opts, &mut run),
        }
    }
    push_run(&mut run, lines);
}

fn push_run(run: &mut Vec<String>, lines: &mut Vec<Line>) {
    if !run.is_empty() {
        lines.push(Line::plain(run.join(" ")));
        run.clear();
    }
}

fn inline_pieces(node: &Node, opts: &RenderOptions, out: &mut Vec<String>) {
    let el = match node {
        Node::Text(text) => {
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_owned());
            }
            return;
        }
        Node::Element(el) => el,
    };

    let focused = el.key().is_some() && el.key() == opts.focused.as_deref();
    match el.tag() {
        "button" => {
            let label = el.text_content();
            let label = label.trim();
            out.push(if focused {
                format!("[>{label}<]")
            } else {
                format!("[ {label} ]")
            });
        }
        "input" => {
            let value = el.attr("value").unwrap_or("");
            let cursor = if focused { "_" } else { "" };
            let shown = match el.attr("placeholder") {
                Some(placeholder) if value.is_empty() && !focused => format!("({placeholder})"),
                _ => value.to_owned(),
            };
            out.push(format!("[{shown}{cursor}]"));
        }
        _ => {
            let mut inner = Vec::new();
            for child in el.child_nodes() {
                inline_pieces(child, opts, &mut inner);
            }
            if !inner.is_empty() {
                out.push(inner.join(" "));
            }
        }
    }
}
