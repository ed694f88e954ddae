//! Rehydration dispatcher and page-level event routing.
//!
//! [`ReviewUi`] is the single entry point the page shell talks to:
//!
//! - `rehydrate(doc, root)` scans a subtree for unbound widget containers
//!   and binds controllers to them. It is idempotent per container via the
//!   [`BindingRegistry`], so calling it arbitrarily often (initial load,
//!   after every partial update) is a correctness-preserving no-op on
//!   already-bound instances.
//! - `handle_event(doc, event)` routes an event to the controller owning
//!   the target subtree and returns any persistence requests to forward
//!   to a [`RateClient`].
//! - `pump(doc, client)` applies client outcomes back to the widgets.

use log::warn;
use reelmark_dom::{Document, DomEvent, NodeId};

use crate::markers::{RatingMarkers, TagMarkers};
use crate::persist::{
    FailurePolicy, PersistState, RateClient, RateOutcome, RateRequest, RatingSync,
};
use crate::rating::RatingController;
use crate::registry::{BindingRegistry, WidgetKind};
use crate::tags::TagController;

/// Owns every bound widget controller on the page.
#[derive(Debug, Default)]
pub struct ReviewUi {
    rating_markers: RatingMarkers,
    tag_markers: TagMarkers,
    registry: BindingRegistry,
    ratings: Vec<RatingController>,
    tags: Vec<TagController>,
    sync: RatingSync,
}

impl ReviewUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the marker-attribute contract.
    pub fn with_markers(mut self, rating: RatingMarkers, tags: TagMarkers) -> Self {
        self.rating_markers = rating;
        self.tag_markers = tags;
        self
    }

    /// Override the persistence failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.sync = RatingSync::new(policy);
        self
    }

    /// Bind controllers to every unbound widget container under `root`
    /// (the whole document when `None`). Containers with malformed markup
    /// are logged and skipped; they stay unbound and are retried on the
    /// next rehydration. Controllers whose root left the document are
    /// dropped first.
    pub fn rehydrate(&mut self, doc: &mut Document, root: Option<NodeId>) {
        self.registry.prune(doc);
        self.ratings.retain(|c| doc.is_alive(c.root()));
        self.tags.retain(|c| doc.is_alive(c.root()));

        let scope = root.unwrap_or_else(|| doc.root());

        let rating_roots =
            doc.query_all(scope, |n| n.has_attr(&self.rating_markers.container_attr));
        for container in rating_roots {
            if self.registry.is_bound(container) {
                continue;
            }
            match RatingController::bind(doc, container, self.rating_markers.clone()) {
                Ok(controller) => {
                    self.registry.register(container, WidgetKind::Rating);
                    self.ratings.push(controller);
                }
                Err(e) => warn!("skipping rating container: {e}"),
            }
        }

        let tag_roots = doc.query_all(scope, |n| n.has_attr(&self.tag_markers.container_attr));
        for container in tag_roots {
            if self.registry.is_bound(container) {
                continue;
            }
            match TagController::bind(doc, container, self.tag_markers.clone()) {
                Ok(controller) => {
                    self.registry.register(container, WidgetKind::Tags);
                    self.tags.push(controller);
                }
                Err(e) => warn!("skipping tag container: {e}"),
            }
        }
    }

    /// Route an event to the controller owning its target. Returns the
    /// sequenced persistence requests produced by rating commits; the
    /// embedder forwards them to a [`RateClient`] (or drops them when
    /// running without a server).
    pub fn handle_event(&mut self, doc: &mut Document, event: &DomEvent) -> Vec<RateRequest> {
        if let DomEvent::SubtreeReplaced { root } = *event {
            // Only the replaced subtree is rescanned, never the whole
            // document.
            self.rehydrate(doc, Some(root));
            return Vec::new();
        }

        let target = event.target();
        let mut requests = Vec::new();

        for controller in &mut self.ratings {
            if doc.is_within(controller.root(), target) {
                if let Some(commit) = controller.handle_event(doc, event) {
                    requests.push(self.sync.submit(commit));
                }
                return requests;
            }
        }
        for controller in &mut self.tags {
            if doc.is_within(controller.root(), target) {
                controller.handle_event(doc, event);
                return requests;
            }
        }
        requests
    }

    /// Apply persistence outcomes to the sync model, rolling widgets back
    /// to the last confirmed value when the policy asks for it.
    pub fn apply_outcomes(
        &mut self,
        doc: &mut Document,
        outcomes: impl IntoIterator<Item = RateOutcome>,
    ) {
        for outcome in outcomes {
            if let Some(revert) = self.sync.apply(&outcome) {
                match self
                    .ratings
                    .iter_mut()
                    .find(|c| c.movie_id() == Some(revert.movie_id))
                {
                    Some(controller) => controller.set_committed(doc, revert.rating),
                    None => warn!(
                        "revert for movie {} but no bound controller; dropping",
                        revert.movie_id
                    ),
                }
            }
        }
    }

    /// Drain the client and apply its outcomes. Call once per event-loop
    /// turn when persistence is in use.
    pub fn pump(&mut self, doc: &mut Document, client: &mut RateClient) {
        let outcomes = client.poll_events();
        self.apply_outcomes(doc, outcomes);
    }

    /// Persistence state of a movie's rating.
    pub fn persist_state(&self, movie_id: u64) -> PersistState {
        self.sync.state(movie_id)
    }

    /// The binding registry, for diagnostics.
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }
}
