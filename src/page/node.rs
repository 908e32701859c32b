//! Element nodes stored in the page arena

use std::collections::HashMap;

/// Handle to an element stored in a [`super::Document`] arena.
///
/// Ids are stable for the lifetime of the document; the arena never
/// shrinks, so a `NodeId` handed out once stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A single element of the page: tag name, optional id, classes and
/// string attributes, plus the handful of flags the focus model needs.
///
/// Elements carry no layout of their own; the host assigns a vertical
/// offset (`offset_top`) when it lays the page out, which is what the
/// viewport scrolls to.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    text: Option<String>,
    tab_index: Option<i16>,
    disabled: bool,
    hidden: bool,
    offset_top: Option<u16>,
}

impl Element {
    /// Create a new element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attributes: HashMap::new(),
            text: None,
            tab_index: None,
            disabled: false,
            hidden: false,
            offset_top: None,
        }
    }

    /// Set the element id (builder form).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class (builder form).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Set an attribute (builder form).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content (builder form).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an explicit tab index (builder form).
    pub fn with_tab_index(mut self, index: i16) -> Self {
        self.tab_index = Some(index);
        self
    }

    /// Mark the element disabled (builder form).
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Mark the element hidden (builder form).
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub(crate) fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Add or remove a class depending on `on`. Idempotent in both
    /// directions.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class.to_string());
        } else {
            self.remove_class(class);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn tab_index(&self) -> Option<i16> {
        self.tab_index
    }

    pub fn set_tab_index(&mut self, index: i16) {
        self.tab_index = Some(index);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Vertical offset assigned by the host's layout pass, if any.
    pub fn offset_top(&self) -> Option<u16> {
        self.offset_top
    }

    pub fn set_offset_top(&mut self, offset: u16) {
        self.offset_top = Some(offset);
    }

    /// Whether the element participates in Tab navigation: anchors with
    /// an href, enabled form controls, or anything with a non-negative
    /// explicit tab index. Hidden and disabled elements never do.
    pub fn is_tabbable(&self) -> bool {
        if self.hidden || self.disabled {
            return false;
        }
        if let Some(index) = self.tab_index {
            return index >= 0;
        }
        match self.tag.as_str() {
            "a" => self.attributes.contains_key("href"),
            "button" | "input" | "textarea" | "select" => true,
            _ => false,
        }
    }

    /// Whether the element can hold focus at all. Unlike
    /// [`is_tabbable`](Self::is_tabbable) this includes elements with a
    /// negative tab index, which are focusable programmatically only.
    pub fn can_receive_focus(&self) -> bool {
        if self.hidden || self.disabled {
            return false;
        }
        if self.tab_index.is_some() {
            return true;
        }
        match self.tag.as_str() {
            "a" => self.attributes.contains_key("href"),
            "button" | "input" | "textarea" | "select" => true,
            _ => false,
        }
    }
}
