//! Marker-attribute configuration for the widget controllers.
//!
//! The markup contract is expressed as `data-*` marker attributes. Both
//! controllers are parameterized by these names so every star-rating
//! surface on the site runs through the one controller instead of growing
//! per-page variants with divergent edge-case handling.

/// Marker names for a rating container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingMarkers {
    /// Attribute identifying a rating container element.
    pub container_attr: String,
    /// Attribute on each star element carrying its 1-indexed ordinal.
    pub star_attr: String,
    /// `name` shared by the container's radio inputs.
    pub input_name: String,
    /// Class applied to stars at or below the shown rating.
    pub active_class: String,
    /// Attribute on the container carrying the movie id.
    pub movie_id_attr: String,
    /// Marker attribute opting the container into server persistence.
    pub synced_attr: String,
}

impl Default for RatingMarkers {
    fn default() -> Self {
        Self {
            container_attr: "data-rating-container".into(),
            star_attr: "data-star".into(),
            input_name: "rating".into(),
            active_class: "is-selected".into(),
            movie_id_attr: "data-movie-id".into(),
            synced_attr: "data-sync".into(),
        }
    }
}

/// Marker names for a tag container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMarkers {
    /// Attribute identifying a tag container element.
    pub container_attr: String,
    /// Attribute on each label carrying the paired toggle's value.
    pub label_attr: String,
    /// `name` shared by the container's checkbox inputs.
    pub input_name: String,
    /// Class applied to labels of checked toggles.
    pub active_class: String,
}

impl Default for TagMarkers {
    fn default() -> Self {
        Self {
            container_attr: "data-tags-container".into(),
            label_attr: "data-tag-label".into(),
            input_name: "tags".into(),
            active_class: "is-selected".into(),
        }
    }
}
