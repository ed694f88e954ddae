//! Event vocabulary consumed by the widget layer.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.raw())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(NodeId)
    }
}

/// Events delivered by the page shell to the widget layer.
///
/// All targets are node ids inside the live document. Mutation happens
/// synchronously while an event is handled; there is no queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomEvent {
    /// Pointer click; `target` is the innermost element hit.
    Click { target: NodeId },
    /// Pointer moved over `target` (fires per element entered).
    PointerOver { target: NodeId },
    /// Pointer left the subtree rooted at `target` entirely.
    PointerLeave { target: NodeId },
    /// A form input's value or checked state changed.
    Change { target: NodeId },
    /// The partial-update engine swapped in a new subtree rooted at `root`.
    SubtreeReplaced { root: NodeId },
}

impl DomEvent {
    /// The node the event is anchored to.
    pub fn target(&self) -> NodeId {
        match *self {
            DomEvent::Click { target }
            | DomEvent::PointerOver { target }
            | DomEvent::PointerLeave { target }
            | DomEvent::Change { target } => target,
            DomEvent::SubtreeReplaced { root } => root,
        }
    }
}
