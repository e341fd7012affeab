//! Recursion limits shared by the decoder, the encoder and [`to_value`](crate::ser::to_value).
//!
//! Depth counts nested containers: a bare scalar sits at depth 0, `[]` needs a
//! depth of 1, `[[1]]` a depth of 2.

use serde::Deserialize;

/// Default maximum container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits applied to every recursive walk over a value tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of nested arrays/objects.
    pub max_depth: usize,
}

impl Limits {
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Whether a container opened at `depth` (0-based) still fits.
    pub(crate) fn allows(&self, depth: usize) -> bool {
        depth < self.max_depth
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
