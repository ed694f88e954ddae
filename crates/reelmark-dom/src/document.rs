//! Arena document holding the element tree.

use std::collections::HashMap;

use crate::node::{Node, NodeId};

/// Tree bookkeeping for one node.
#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The element tree for one page, id-addressed.
///
/// Structure mutation is limited to what the collaborators need: the page
/// shell appends server-rendered subtrees, and the partial-update engine
/// swaps one subtree for another. Widget controllers only touch node
/// attributes, classes and checked flags.
#[derive(Debug, Clone)]
pub struct Document {
    entries: HashMap<NodeId, Entry>,
    root: NodeId,
    next_id: u64,
}

impl Document {
    /// Create a document with an empty `body` root.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut entries = HashMap::new();
        entries.insert(
            root,
            Entry {
                node: Node::new("body"),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            entries,
            root,
            next_id: 1,
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` is still part of the document.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entries.get(&id).map(|e| &e.node)
    }

    /// Mutably borrow a node.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entries.get_mut(&id).map(|e| &mut e.node)
    }

    /// Parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    /// Children of a node, in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entries
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a detached node (no parent). Used by the partial-update
    /// engine to build a replacement subtree before splicing it in.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                node,
                parent: None,
                children: Vec::new(),
            },
        );
        id
    }

    /// Attach a detached node under `parent`.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.entries.contains_key(&parent));
        if let Some(entry) = self.entries.get_mut(&child) {
            debug_assert!(entry.parent.is_none(), "node already attached");
            entry.parent = Some(parent);
        } else {
            return;
        }
        if let Some(entry) = self.entries.get_mut(&parent) {
            entry.children.push(child);
        }
    }

    /// Insert a node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.insert(node);
        self.attach(parent, id);
        id
    }

    /// Whether `id` is `ancestor` or a descendant of it.
    pub fn is_within(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Preorder walk of the subtree rooted at `root`, root included.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !self.entries.contains_key(&id) {
                continue;
            }
            out.push(id);
            // Reverse so children pop in document order.
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// All nodes in the subtree (root included) matching a predicate.
    pub fn query_all(&self, root: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(&pred))
            .collect()
    }

    /// Nearest ancestor-or-self of `start` matching a predicate, like the
    /// DOM `closest()` walk used for click resolution.
    pub fn closest(&self, start: NodeId, pred: impl Fn(&Node) -> bool) -> Option<NodeId> {
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            if self.node(id).is_some_and(&pred) {
                return Some(id);
            }
            cursor = self.parent(id);
        }
        None
    }

    /// Set an input's checked flag.
    ///
    /// Checking a radio input unchecks every other radio carrying the same
    /// `name` attribute, mirroring browser radio-group semantics. This is
    /// what makes client-side validation unnecessary for the widgets: the
    /// markup constrains the state space.
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        let group = match self.node(id) {
            Some(node) if checked && node.is_input_type("radio") => {
                node.attr("name").map(String::from)
            }
            Some(_) => None,
            None => return,
        };

        if let Some(name) = group {
            let peers: Vec<NodeId> = self
                .query_all(self.root, |n| {
                    n.is_input_type("radio") && n.attr("name") == Some(name.as_str())
                })
                .into_iter()
                .filter(|&peer| peer != id)
                .collect();
            for peer in peers {
                if let Some(node) = self.node_mut(peer) {
                    node.set_checked_raw(false);
                }
            }
        }

        if let Some(node) = self.node_mut(id) {
            node.set_checked_raw(checked);
        }
    }

    /// Remove a subtree from the document, returning the removed ids.
    ///
    /// Removing the document root is not allowed and returns an empty list.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root || !self.entries.contains_key(&id) {
            return Vec::new();
        }
        if let Some(parent) = self.parent(id) {
            if let Some(entry) = self.entries.get_mut(&parent) {
                entry.children.retain(|&c| c != id);
            }
        }
        let removed = self.descendants(id);
        for &gone in &removed {
            self.entries.remove(&gone);
        }
        removed
    }

    /// Swap the subtree at `old` for the detached subtree at `new`,
    /// preserving `old`'s position among its siblings. Returns the removed
    /// ids so callers can prune state keyed by node identity.
    ///
    /// This is the partial-update collaborator's operation; the embedder
    /// fires [`DomEvent::SubtreeReplaced`](crate::DomEvent) with `new`
    /// afterwards so the widget layer can rehydrate.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.parent(old) else {
            return Vec::new();
        };
        if self
            .entries
            .get(&new)
            .is_none_or(|entry| entry.parent.is_some())
        {
            return Vec::new();
        }

        let position = self
            .children(parent)
            .iter()
            .position(|&c| c == old)
            .unwrap_or(0);
        let removed = self.remove(old);
        if let Some(entry) = self.entries.get_mut(&new) {
            entry.parent = Some(parent);
        }
        if let Some(entry) = self.entries.get_mut(&parent) {
            entry.children.insert(position, new);
        }
        removed
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
