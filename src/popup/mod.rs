//! Popup dialog controller
//!
//! Enforces single-active-modal semantics, accessibility attribute
//! correctness, focus trapping and scroll locking over markup supplied
//! by external collaborators. See [`types::markers`] for the structural
//! contract and [`PopupController`] for the lifecycle API.

mod controller;
mod defer;
mod focus;
mod types;

pub use controller::PopupController;
pub use defer::DeferredAction;
pub use types::{markers, PopupConfig, PopupEvent, PopupTarget};
