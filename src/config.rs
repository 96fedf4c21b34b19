//! Resource limits for a decode call.

/// Bounds applied by [crate::decoder::Decoder] so pathological schemas fail
/// instead of exhausting the stack or memory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecodeConfig {
    /// Maximum struct nesting, counting the root as depth 1.
    pub max_depth: usize,
    /// Maximum element count of any single array.
    pub max_array_len: usize,
    /// Maximum number of struct instances, root included, in one read.
    pub max_nodes: usize,
}

impl DecodeConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 24;
    pub const DEFAULT_MAX_NODES: usize = 1 << 20;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_max_array_len(&mut self, max_array_len: usize) -> &mut Self {
        self.max_array_len = max_array_len;
        self
    }

    pub fn set_max_nodes(&mut self, max_nodes: usize) -> &mut Self {
        self.max_nodes = max_nodes;
        self
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_array_len: Self::DEFAULT_MAX_ARRAY_LEN,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}
