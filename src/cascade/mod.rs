//! Partial-sum hand-off between the kernels of one filter.

mod coordinator;
mod link;

pub use coordinator::CascadeCoordinator;
pub use link::{CascadeReceiver, CascadeSender, WindowBroadcast, cascade_link};

use serde::Serialize;

/// Static position of a kernel within its cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeRole {
    /// The whole filter in one kernel
    Standalone,
    /// Seeds zero and forwards its partial sums
    First,
    /// Adds to incoming partial sums and forwards them
    Middle,
    /// Adds to incoming partial sums and writes output
    Last,
}

impl CascadeRole {
    pub fn from_position(position: usize, cascade_len: usize) -> Self {
        match (position, cascade_len) {
            (_, 1) => CascadeRole::Standalone,
            (0, _) => CascadeRole::First,
            (p, len) if p + 1 == len => CascadeRole::Last,
            _ => CascadeRole::Middle,
        }
    }

    pub fn has_upstream(self) -> bool {
        matches!(self, CascadeRole::Middle | CascadeRole::Last)
    }

    pub fn has_downstream(self) -> bool {
        matches!(self, CascadeRole::First | CascadeRole::Middle)
    }

    /// Applies shift and saturation and writes output
    pub fn is_final(self) -> bool {
        matches!(self, CascadeRole::Standalone | CascadeRole::Last)
    }
}
