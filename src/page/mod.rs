//! Headless page model
//!
//! An append-only element tree with focus and scroll state, acting as
//! the host document the popup controller operates on. Collaborators
//! build the tree before the controller touches it; the controller only
//! toggles classes, attributes, focus and scroll.

mod document;
mod node;
mod selector;

pub use document::{Document, ScrollBehavior, ScrollEvent};
pub use node::{Element, NodeId};
pub use selector::{Selector, SelectorError};
