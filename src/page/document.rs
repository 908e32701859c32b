//! Headless document model
//!
//! The document is an append-only arena of [`Element`] nodes plus the
//! transient state a popup controller cares about: which element holds
//! focus and where the viewport is scrolled to. It is the stand-in for
//! the host environment — collaborators build the tree up front, the
//! controller only toggles classes, attributes, focus and scroll.

use super::node::{Element, NodeId};
use super::selector::{Selector, SelectorError};
use std::collections::HashMap;
use tracing::warn;

/// How a viewport scroll was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Animated scroll.
    Smooth,
    /// Instant jump.
    Auto,
}

/// Record of the most recent viewport scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollEvent {
    /// The element scrolled into view.
    pub target: NodeId,
    /// Requested behavior.
    pub behavior: ScrollBehavior,
    /// Resulting viewport offset.
    pub top: u16,
}

struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The element tree plus focus and scroll state.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    ids: HashMap<String, NodeId>,
    focused: Option<NodeId>,
    scroll_top: u16,
    last_scroll: Option<ScrollEvent>,
}

impl Document {
    /// Create an empty document with a root (`html`) and `body` element.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            ids: HashMap::new(),
            focused: None,
            scroll_top: 0,
            last_scroll: None,
        };
        doc.root = doc.insert(Element::new("html"), None);
        doc.body = doc.insert(Element::new("body"), Some(doc.root));
        doc
    }

    /// The document root (`html`) element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn insert(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(element_id) = element.id() {
            // First registration wins; the contract requires unique ids.
            if self.ids.contains_key(element_id) {
                warn!(id = element_id, "duplicate element id ignored");
            } else {
                self.ids.insert(element_id.to_string(), id);
            }
        }
        self.nodes.push(Node {
            element,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Append an element as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.insert(element, Some(parent))
    }

    /// Append an element as the last child of `body`.
    pub fn append_to_body(&mut self, element: Element) -> NodeId {
        let body = self.body;
        self.append(body, element)
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `node` belongs to this document.
    pub fn contains_node(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    /// Immutable access to an element.
    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0].element
    }

    /// Mutable access to an element.
    pub fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0].element
    }

    /// Assign an id to an element, registering it for lookup. Used when
    /// a label id is derived for a heading that has none.
    pub fn assign_id(&mut self, node: NodeId, id: impl Into<String>) {
        let id = id.into();
        if self.ids.contains_key(&id) {
            warn!(id = %id, "duplicate element id ignored");
            return;
        }
        self.nodes[node.0].element.set_id(id.clone());
        self.ids.insert(id, node);
    }

    /// Look up an element by its id attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Pre-order (document order) traversal of a subtree, including the
    /// subtree root itself.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.nodes[current.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Document-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut subtree = self.subtree(node);
        subtree.remove(0);
        subtree
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Nearest ancestor of `node` (including `node` itself) matching the
    /// selector.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if selector.matches(&self.nodes[id.0].element) {
                return Some(id);
            }
            current = self.nodes[id.0].parent;
        }
        None
    }

    /// First element in document order matching the selector string.
    ///
    /// Id selectors go through the id map; everything else scans the
    /// tree. Returns `Ok(None)` when nothing matches.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        if let Selector::Id(id) = &selector {
            return Ok(self.get_element_by_id(id));
        }
        Ok(self
            .subtree(self.root)
            .into_iter()
            .find(|&node| selector.matches(&self.nodes[node.0].element)))
    }

    /// First descendant of `scope` (excluding `scope`) matching the
    /// parsed selector, in document order.
    pub fn query_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&node| selector.matches(&self.nodes[node.0].element))
    }

    /// Tab-navigable descendants of `scope` in document order.
    pub fn focusables_within(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| self.nodes[node.0].element.is_tabbable())
            .collect()
    }

    /// The element currently holding focus, if any.
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    /// Move focus to `node` if it can receive focus. Returns whether
    /// focus actually moved.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.contains_node(node) {
            return false;
        }
        if !self.nodes[node.0].element.can_receive_focus() {
            return false;
        }
        self.focused = Some(node);
        true
    }

    /// Drop focus entirely.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Current viewport offset.
    pub fn scroll_top(&self) -> u16 {
        self.scroll_top
    }

    /// Set the viewport offset directly (host scrolling).
    pub fn set_scroll_top(&mut self, top: u16) {
        self.scroll_top = top;
    }

    /// Scroll the viewport so `node` is at the top, using the layout
    /// offset the host assigned to it. Records the scroll for
    /// observation.
    pub fn scroll_to_node(&mut self, node: NodeId, behavior: ScrollBehavior) {
        let top = self.nodes[node.0].element.offset_top().unwrap_or(0);
        self.scroll_top = top;
        self.last_scroll = Some(ScrollEvent {
            target: node,
            behavior,
            top,
        });
    }

    /// The most recent scroll request, if any.
    pub fn last_scroll(&self) -> Option<ScrollEvent> {
        self.last_scroll
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
