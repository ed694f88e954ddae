//! Tag selection controller.
//!
//! A multi-select control: independent checkbox toggles, each paired with
//! a label element addressed by the toggle's value. Tag states carry no
//! ordering or exclusivity constraints, so a change touches exactly the
//! one affected label; only the initial bind sweeps the whole container
//! to hydrate pre-checked state. The control has no persistence side
//! effect; form submission consumes the checkbox state directly.

use log::warn;
use reelmark_dom::{Document, DomEvent, NodeId};

use crate::markers::TagMarkers;
use crate::registry::BindError;

/// Controller bound to one tag container subtree.
#[derive(Debug, Clone)]
pub struct TagController {
    root: NodeId,
    markers: TagMarkers,
    /// Checkbox toggles in document order.
    toggles: Vec<NodeId>,
}

impl TagController {
    /// Bind to a container subtree and hydrate every label from the
    /// pre-checked toggle state.
    pub fn bind(doc: &mut Document, root: NodeId, markers: TagMarkers) -> Result<Self, BindError> {
        let toggles = doc.query_all(root, |n| {
            n.is_input_type("checkbox") && n.attr("name") == Some(markers.input_name.as_str())
        });
        if toggles.is_empty() {
            return Err(BindError::NoTagInputs(markers.input_name.clone()));
        }

        let controller = Self {
            root,
            markers,
            toggles,
        };
        for &toggle in &controller.toggles {
            controller.sync_label(doc, toggle);
        }
        Ok(controller)
    }

    /// The bound container root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Tag values currently selected, in document order.
    pub fn selected(&self, doc: &Document) -> Vec<String> {
        self.toggles
            .iter()
            .filter_map(|&id| doc.node(id))
            .filter(|n| n.checked())
            .filter_map(|n| n.attr("value").map(String::from))
            .collect()
    }

    /// Handle an event targeting this controller's subtree.
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) {
        if let DomEvent::Change { target } = *event {
            if self.toggles.contains(&target) {
                self.sync_label(doc, target);
            }
        }
    }

    /// Mirror one toggle's checked state onto its paired label.
    fn sync_label(&self, doc: &mut Document, toggle: NodeId) {
        let Some(node) = doc.node(toggle) else { return };
        let checked = node.checked();
        let Some(value) = node.attr("value").map(String::from) else {
            warn!("tag toggle without a value attribute; no label to mirror");
            return;
        };

        let label = doc
            .query_all(self.root, |n| {
                n.attr(&self.markers.label_attr) == Some(value.as_str())
            })
            .into_iter()
            .next();
        match label {
            Some(label) => {
                if let Some(node) = doc.node_mut(label) {
                    node.toggle_class(&self.markers.active_class, checked);
                }
            }
            None => warn!("no label paired with tag {value:?}; skipping"),
        }
    }
}
