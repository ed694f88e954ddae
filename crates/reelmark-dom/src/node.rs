//! Element node definitions.

use std::collections::BTreeMap;

/// Identity of a node within a [`Document`](crate::Document).
///
/// Ids are never reused, so a stale id held across a subtree replacement
/// simply stops resolving instead of aliasing a new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Raw id value, for diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// A single element: tag name, attributes, class list, and the checked
/// flag carried by form inputs.
///
/// Nodes are pure data. Tree structure (parent/children) lives in the
/// [`Document`](crate::Document) arena, and all interactive state beyond
/// `checked` belongs to the widget controllers.
#[derive(Debug, Clone)]
pub struct Node {
    /// Lowercase tag name ("div", "input", "label", ...).
    pub tag: String,
    /// Attribute map, including `data-*` markers and `name`/`value`/`type`.
    attrs: BTreeMap<String, String>,
    /// CSS classes currently present on the element.
    classes: Vec<String>,
    /// Checked flag; meaningful only for radio/checkbox inputs.
    checked: bool,
}

impl Node {
    /// Create an element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            checked: false,
        }
    }

    /// Set an attribute (builder style).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Add a class (builder style).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Mark the node as checked (builder style, for pre-populated inputs).
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Check for attribute presence (marker attributes may be empty).
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Set an attribute on an existing node.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Check for class presence.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add or remove a class to match `on`, like `classList.toggle(c, on)`.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        let present = self.has_class(class);
        if on && !present {
            self.classes.push(class.to_string());
        } else if !on && present {
            self.classes.retain(|c| c != class);
        }
    }

    /// Checked flag.
    pub fn checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn set_checked_raw(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Whether this is an `input` element with the given `type` attribute.
    pub fn is_input_type(&self, ty: &str) -> bool {
        self.tag == "input" && self.attr("type") == Some(ty)
    }
}
