//! Render host configuration.

/// Default bound on flush passes before an update loop is reported.
pub const DEFAULT_MAX_FLUSH_PASSES: usize = 25;

/// Configuration for a [`Host`](super::Host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// How many apply/re-render passes one flush may run. A view that
    /// replaces its own state on every render would otherwise never settle.
    pub max_flush_passes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
        }
    }
}

impl HostConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flush pass bound (builder). Clamped to at least 1.
    pub fn with_max_flush_passes(mut self, passes: usize) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }
}
