//! Reelmark DOM Model
//!
//! A minimal element-tree model of server-rendered markup, plus the event
//! vocabulary the widget layer consumes. The embedding page shell owns the
//! real presentation; this crate only tracks the structure and the bits of
//! state the widget controllers read and write (attributes, class lists,
//! checked flags on form inputs).

pub mod document;
pub mod event;
pub mod node;

pub use document::Document;
pub use event::DomEvent;
pub use node::{Node, NodeId};
