//! Reelmark Widget Layer
//!
//! Interactive widget controllers for the review page's two recurring
//! input controls:
//!
//! - **Rating**: a single-select 1..N star control with hover preview,
//!   backed by radio inputs, optionally persisted to the server per movie.
//! - **Tags**: a multi-select chooser backed by independent checkboxes,
//!   each mirrored by a visual label.
//!
//! Controllers bind to container subtrees of a [`reelmark_dom::Document`]
//! and keep class state a pure function of the committed form value (hover
//! preview excepted, and it always resolves back on pointer exit). The
//! [`ReviewUi`] dispatcher owns binding, rehydration after partial page
//! updates, and event routing.

pub mod dispatch;
pub mod markers;
pub mod persist;
pub mod rating;
pub mod registry;
pub mod tags;

pub use dispatch::ReviewUi;
pub use markers::{RatingMarkers, TagMarkers};
pub use persist::{
    FailurePolicy, PersistState, RateClient, RateCommit, RateOutcome, RateRequest, RatingSync,
    Revert,
};
pub use rating::RatingController;
pub use registry::{BindError, BindingRegistry, WidgetKind};
pub use tags::TagController;
