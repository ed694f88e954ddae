//! Rating widget controller.
//!
//! A single-select ordinal control: N star elements over N mutually
//! exclusive radio inputs. The controller keeps two values apart:
//!
//! - `committed` — derived from whichever radio is checked (0 = unrated),
//!   the value a form submission would carry;
//! - `preview` — transient hover value, rendered instead of `committed`
//!   while the pointer is over a star and discarded on pointer exit.
//!
//! Star classes are always a pure function of `preview.unwrap_or(committed)`.

use log::warn;
use reelmark_dom::{Document, DomEvent, NodeId};

use crate::markers::RatingMarkers;
use crate::persist::RateCommit;
use crate::registry::BindError;

/// Controller bound to one rating container subtree.
#[derive(Debug, Clone)]
pub struct RatingController {
    root: NodeId,
    markers: RatingMarkers,
    /// Star elements in document order.
    stars: Vec<NodeId>,
    /// Backing radio inputs in document order.
    inputs: Vec<NodeId>,
    /// Entity id for the persistence path, from the container attribute.
    movie_id: Option<u64>,
    /// Whether commits should be pushed to the server.
    synced: bool,
    committed: u8,
    preview: Option<u8>,
}

impl RatingController {
    /// Bind to a container subtree and hydrate visual state from the
    /// pre-checked input (the edit-form entry point).
    pub fn bind(
        doc: &mut Document,
        root: NodeId,
        markers: RatingMarkers,
    ) -> Result<Self, BindError> {
        let stars = doc.query_all(root, |n| n.has_attr(&markers.star_attr));
        if stars.is_empty() {
            return Err(BindError::NoStars);
        }
        let inputs = doc.query_all(root, |n| {
            n.is_input_type("radio") && n.attr("name") == Some(markers.input_name.as_str())
        });
        if inputs.is_empty() {
            return Err(BindError::NoRatingInputs(markers.input_name.clone()));
        }

        let container = doc.node(root);
        let movie_id = container
            .and_then(|c| c.attr(&markers.movie_id_attr))
            .and_then(|v| v.parse::<u64>().ok());
        let mut synced = container.is_some_and(|c| c.has_attr(&markers.synced_attr));
        if synced && movie_id.is_none() {
            warn!("rating container marked for sync but movie id is missing; skipping persistence");
            synced = false;
        }

        let mut controller = Self {
            root,
            markers,
            stars,
            inputs,
            movie_id,
            synced,
            committed: 0,
            preview: None,
        };
        controller.committed = controller.read_committed(doc);
        controller.render(doc);
        Ok(controller)
    }

    /// The bound container root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The committed rating (0 = unrated).
    pub fn committed(&self) -> u8 {
        self.committed
    }

    /// The transient hover value, if the pointer is over a star.
    pub fn preview(&self) -> Option<u8> {
        self.preview
    }

    /// Entity id for persistence, if the container carries one.
    pub fn movie_id(&self) -> Option<u64> {
        self.movie_id
    }

    /// Handle an event targeting this controller's subtree. Returns a
    /// commit action when a click on a server-synchronized container
    /// changed the committed value.
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> Option<RateCommit> {
        match *event {
            DomEvent::Click { target } => self.handle_click(doc, target),
            DomEvent::PointerOver { target } => {
                if let Some(v) = self.star_ordinal_at(doc, target) {
                    self.preview = Some(v);
                    self.render(doc);
                }
                None
            }
            DomEvent::PointerLeave { .. } => {
                self.preview = None;
                self.render(doc);
                None
            }
            DomEvent::Change { target } => {
                // Backing-input changes from any source resync the view,
                // but only the click path triggers persistence.
                if self.inputs.contains(&target) {
                    self.committed = self.read_committed(doc);
                    self.render(doc);
                }
                None
            }
            DomEvent::SubtreeReplaced { .. } => None,
        }
    }

    /// Force the committed value, checking the matching input (or
    /// unchecking all for 0). Used when a failed persistence attempt is
    /// rolled back to the last confirmed value.
    pub fn set_committed(&mut self, doc: &mut Document, value: u8) {
        if value == 0 {
            for &input in &self.inputs {
                doc.set_checked(input, false);
            }
        } else if let Some(input) = self.input_for(doc, value) {
            doc.set_checked(input, true);
        } else {
            warn!("no backing input for rating {value}; leaving inputs untouched");
        }
        self.committed = self.read_committed(doc);
        self.render(doc);
    }

    fn handle_click(&mut self, doc: &mut Document, target: NodeId) -> Option<RateCommit> {
        // Clicks land on the star glyph or a wrapper; resolve upward to
        // the nearest element carrying the ordinal marker.
        let value = self.star_ordinal_at(doc, target)?;
        let input = self.input_for(doc, value)?;

        doc.set_checked(input, true);
        self.committed = self.read_committed(doc);
        self.render(doc);

        match (self.synced, self.movie_id) {
            (true, Some(movie_id)) => Some(RateCommit {
                movie_id,
                rating: self.committed,
            }),
            _ => None,
        }
    }

    /// Ordinal of the star at or above `target`, confined to this root.
    fn star_ordinal_at(&self, doc: &Document, target: NodeId) -> Option<u8> {
        let star = doc.closest(target, |n| n.has_attr(&self.markers.star_attr))?;
        if !doc.is_within(self.root, star) {
            return None;
        }
        match doc.node(star)?.attr(&self.markers.star_attr)?.parse::<u8>() {
            Ok(v) if v >= 1 => Some(v),
            _ => {
                warn!("star element with unparsable ordinal; ignoring");
                None
            }
        }
    }

    /// The backing input whose `value` matches the ordinal.
    fn input_for(&self, doc: &Document, value: u8) -> Option<NodeId> {
        let wanted = value.to_string();
        self.inputs
            .iter()
            .copied()
            .find(|&id| doc.node(id).and_then(|n| n.attr("value")) == Some(wanted.as_str()))
    }

    /// Committed value as derived from the checked input; 0 if none.
    fn read_committed(&self, doc: &Document) -> u8 {
        self.inputs
            .iter()
            .filter_map(|&id| doc.node(id))
            .find(|n| n.checked())
            .and_then(|n| n.attr("value"))
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(0)
    }

    /// Re-render star classes from the shown value.
    fn render(&self, doc: &mut Document) {
        let shown = self.preview.unwrap_or(self.committed);
        for &star in &self.stars {
            let ordinal = doc
                .node(star)
                .and_then(|n| n.attr(&self.markers.star_attr))
                .and_then(|v| v.parse::<u8>().ok());
            let Some(ordinal) = ordinal else { continue };
            let active = ordinal >= 1 && ordinal <= shown;
            if let Some(node) = doc.node_mut(star) {
                node.toggle_class(&self.markers.active_class, active);
            }
        }
    }
}
