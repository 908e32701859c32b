//! Core popup types: markers, configuration, events and targets

use crate::page::NodeId;
use std::time::Duration;

/// Class and attribute names making up the structural contract between
/// the controller and collaborator-supplied markup.
pub mod markers {
    /// Class on the backdrop container wrapping exactly one modal.
    pub const OVERLAY_CLASS: &str = "popup-overlay";
    /// Class on the dialog content container.
    pub const MODAL_CLASS: &str = "popup-modal";
    /// Class marking an overlay visually open.
    pub const OPEN_CLASS: &str = "is-open";
    /// Class toggled on the root and body elements while a modal is
    /// open, suppressing background scrolling.
    pub const SCROLL_LOCK_CLASS: &str = "popup-lock";

    /// Trigger attribute; its value is a selector for the modal to open.
    pub const TARGET_ATTR: &str = "data-popup-target";
    /// Close-request attribute on elements inside a modal.
    pub const CLOSE_ATTR: &str = "data-popup-close";
    /// Anchor CTA attribute; its value is a selector for the page
    /// element to scroll to after closing the enclosing modal.
    pub const GOTO_ATTR: &str = "data-popup-goto";

    pub const ARIA_HIDDEN: &str = "aria-hidden";
    pub const ARIA_MODAL: &str = "aria-modal";
    pub const ARIA_LABELLEDBY: &str = "aria-labelledby";
    pub const ROLE_ATTR: &str = "role";
    pub const ROLE_DIALOG: &str = "dialog";
}

/// A modal to act on: either a node reference or a selector string.
#[derive(Debug, Clone)]
pub enum PopupTarget {
    Node(NodeId),
    Selector(String),
}

impl From<NodeId> for PopupTarget {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for PopupTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for PopupTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct PopupConfig {
    /// Delay between initiating an anchor scroll and moving focus to
    /// the anchor, chosen to land after the scroll settles visually.
    pub scroll_settle: Duration,
    /// Whether anchor CTAs request an animated scroll.
    pub smooth_scroll: bool,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_millis(350),
            smooth_scroll: true,
        }
    }
}

impl PopupConfig {
    pub fn with_scroll_settle(mut self, delay: Duration) -> Self {
        self.scroll_settle = delay;
        self
    }

    pub fn with_smooth_scroll(mut self, smooth: bool) -> Self {
        self.smooth_scroll = smooth;
        self
    }
}

/// Notifications emitted on controller state transitions. Delivery is
/// optional; without a sender the controller behaves identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupEvent {
    /// A modal became active.
    Opened(NodeId),
    /// The active modal was closed.
    Closed(NodeId),
    /// An anchor CTA scrolled the viewport to a page element.
    ScrolledToAnchor(NodeId),
}
