//! Stable per-node identity, used only to key the decoration side-table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

/// Monotonic counter that hands out unique [`NodeId`]s while an AST is
/// being built. A parser (or, in tests, a hand-written builder) owns one
/// of these for the lifetime of a single `Program`.
#[derive(Debug, Default, Clone)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
