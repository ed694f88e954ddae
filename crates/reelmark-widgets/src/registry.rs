//! Binding registry: which container roots already carry a controller.
//!
//! Binding idempotency used to hinge on ad-hoc bound markers scribbled
//! onto the nodes themselves. The registry replaces that with an explicit
//! map from node identity to widget kind, queried before every bind, so
//! the guarantee is auditable independent of document mutation timing.

use std::collections::HashMap;

use reelmark_dom::{Document, NodeId};
use thiserror::Error;

/// Why a container could not be bound. Malformed markup is skipped with a
/// warning, never fatal to the rest of the page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("rating container has no star elements")]
    NoStars,
    #[error("rating container has no backing inputs named {0:?}")]
    NoRatingInputs(String),
    #[error("tag container has no toggle inputs named {0:?}")]
    NoTagInputs(String),
}

/// The widget kinds a container can be bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Rating,
    Tags,
}

/// Tracks which container roots are bound, and as what.
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    bound: HashMap<NodeId, WidgetKind>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `root` already carries a controller.
    pub fn is_bound(&self, root: NodeId) -> bool {
        self.bound.contains_key(&root)
    }

    /// The kind `root` is bound as, if any.
    pub fn kind(&self, root: NodeId) -> Option<WidgetKind> {
        self.bound.get(&root).copied()
    }

    /// Record a fresh binding. Returns false (and changes nothing) if the
    /// root was already bound; callers treat that as "skip".
    pub fn register(&mut self, root: NodeId, kind: WidgetKind) -> bool {
        if self.is_bound(root) {
            return false;
        }
        self.bound.insert(root, kind);
        true
    }

    /// Drop entries whose root left the document. Bindings need no other
    /// teardown; controller state is garbage-collected with the entry.
    pub fn prune(&mut self, doc: &Document) {
        self.bound.retain(|&root, _| doc.is_alive(root));
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelmark_dom::Node;

    #[test]
    fn test_register_is_idempotent() {
        let mut doc = Document::new();
        let root = doc.append(doc.root(), Node::new("div"));

        let mut registry = BindingRegistry::new();
        assert!(registry.register(root, WidgetKind::Rating));
        assert!(!registry.register(root, WidgetKind::Rating));
        assert!(!registry.register(root, WidgetKind::Tags));
        assert_eq!(registry.kind(root), Some(WidgetKind::Rating));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_prune_drops_removed_roots() {
        let mut doc = Document::new();
        let kept = doc.append(doc.root(), Node::new("div"));
        let gone = doc.append(doc.root(), Node::new("div"));

        let mut registry = BindingRegistry::new();
        registry.register(kept, WidgetKind::Rating);
        registry.register(gone, WidgetKind::Tags);

        doc.remove(gone);
        registry.prune(&doc);

        assert!(registry.is_bound(kept));
        assert!(!registry.is_bound(gone));
    }
}
