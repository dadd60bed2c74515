//! Tab-order focus over the keyed, interactive elements of a rendered tree.

use crate::view::Node;

/// Ordered list of focusable element keys for tab navigation.
///
/// Rebuilt from the tree after every render. Focus is tracked by key, so it
/// survives a re-render as long as the focused element is still present and
/// focusable.
#[derive(Debug, Default)]
pub struct FocusChain {
    /// Focusable keys in tab order (depth-first).
    keys: Vec<String>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `tree`, keeping the previous focus when it still exists.
    pub fn rebuild(&mut self, tree: &Node) {
        let old = self.current().map(str::to_owned);

        self.keys = tree
            .elements()
            .into_iter()
            .filter(|el| el.is_focusable())
            .filter_map(|el| el.key().map(str::to_owned))
            .collect();
        self.current = old.and_then(|key| self.position(&key));
    }

    /// Key of the focused element, if any.
    pub fn current(&self) -> Option<&str> {
        self.current
            .and_then(|idx| self.keys.get(idx))
            .map(String::as_str)
    }

    /// Move focus forward, wrapping. `None` if nothing is focusable.
    pub fn focus_next(&mut self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(idx) => (idx + 1) % self.keys.len(),
            None => 0,
        };
        self.current = Some(next);
        self.current()
    }

    /// Move focus backward, wrapping. `None` if nothing is focusable.
    pub fn focus_previous(&mut self) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(0) | None => self.keys.len() - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.current()
    }

    /// Focus the element keyed `key`. Returns `false` if it is not focusable.
    pub fn focus(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.current = Some(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}
