//! Popup controller: lifecycle, delegation and focus ownership
//!
//! The controller is responsible for:
//! - Enforcing single-active-modal semantics
//! - Accessibility attribute correctness on open/close
//! - Focus trapping and focus restoration
//! - Scroll locking while a modal is open
//! - Document-wide click delegation for trigger/close/anchor markers
//!
//! It owns no rendering and never creates or destroys nodes; callers
//! supply already-built modal markup conforming to the structural
//! contract in [`super::types::markers`].

use super::defer::{DeferQueue, DeferredAction};
use super::focus;
use super::types::{markers, PopupConfig, PopupEvent, PopupTarget};
use crate::page::{Document, NodeId, ScrollBehavior, Selector};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Listener binding installed on an overlay while its modal is open.
///
/// The original handler-as-property pattern is replaced by this explicit
/// map entry: installation on open and removal on close stay exactly
/// symmetric, keyed by overlay identity.
#[derive(Debug, Clone, Copy)]
struct OverlayBinding {
    modal: NodeId,
}

/// The popup controller. One instance owns one controller state; hosts
/// and tests may run as many independent instances as they like.
pub struct PopupController {
    config: PopupConfig,

    /// The active modal, if any. At most one modal is active.
    active: Option<NodeId>,

    /// Element focused immediately before the active modal opened,
    /// restored on close. Defined iff `active` is defined.
    last_focus: Option<NodeId>,

    /// Overlay -> installed listener binding.
    bindings: HashMap<NodeId, OverlayBinding>,

    /// Deferred close-then-open and anchor-focus work.
    defers: DeferQueue,

    /// Optional notification channel for state transitions.
    event_sender: Option<mpsc::UnboundedSender<PopupEvent>>,
}

impl PopupController {
    /// Create a controller with default configuration.
    pub fn new() -> Self {
        Self::with_config(PopupConfig::default())
    }

    /// Create a controller with explicit configuration.
    pub fn with_config(config: PopupConfig) -> Self {
        Self {
            config,
            active: None,
            last_focus: None,
            bindings: HashMap::new(),
            defers: DeferQueue::new(),
            event_sender: None,
        }
    }

    /// Set the notification channel for popup events.
    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<PopupEvent>) {
        self.event_sender = Some(sender);
    }

    /// The currently active modal, if any.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Whether the given modal is the active one.
    pub fn is_active(&self, modal: NodeId) -> bool {
        self.active == Some(modal)
    }

    /// Open a modal by node reference or selector string.
    ///
    /// No-op if nothing resolves or the modal is already active. If a
    /// different modal is active it is closed first, so that exactly one
    /// overlay bears the open marker afterwards.
    pub fn open(&mut self, doc: &mut Document, target: impl Into<PopupTarget>) {
        let target = target.into();
        let Some(modal) = self.resolve(doc, &target) else {
            debug!(?target, "open: no modal resolved");
            return;
        };
        if self.active == Some(modal) {
            trace!(%modal, "open: already active");
            return;
        }
        let Some(overlay) = doc.closest(modal, &Selector::class(markers::OVERLAY_CLASS)) else {
            debug!(%modal, "open: modal is not wrapped in an overlay");
            return;
        };

        if self.active.is_some() {
            self.close_active(doc);
        }

        self.last_focus = doc.active_element();
        doc.element_mut(overlay).add_class(markers::OPEN_CLASS);
        self.apply_aria(doc, modal, true);
        self.lock_scroll(doc, true);
        self.active = Some(modal);
        focus::initial_focus(doc, modal);
        self.bindings.insert(overlay, OverlayBinding { modal });

        debug!(%modal, "popup opened");
        self.emit(PopupEvent::Opened(modal));
    }

    /// Close a modal by node reference or selector string.
    ///
    /// No-op if nothing resolves or the resolved modal is not the
    /// active one; closing an already-closed modal has no observable
    /// effect.
    pub fn close(&mut self, doc: &mut Document, target: impl Into<PopupTarget>) {
        let target = target.into();
        let Some(modal) = self.resolve(doc, &target) else {
            trace!(?target, "close: no modal resolved");
            return;
        };
        if self.active != Some(modal) {
            trace!(%modal, "close: modal not open");
            return;
        }
        self.close_modal(doc, modal);
    }

    /// Close the active modal, if any.
    pub fn close_active(&mut self, doc: &mut Document) {
        if let Some(modal) = self.active {
            self.close_modal(doc, modal);
        }
    }

    /// Route a pointer-down event. A press inside an open overlay but
    /// outside its modal content closes the modal; presses anywhere else
    /// are not the overlay's events and do nothing.
    pub fn handle_pointer_down(&mut self, doc: &mut Document, target: NodeId) {
        let hit = self.bindings.iter().find_map(|(&overlay, binding)| {
            (doc.contains(overlay, target) && !doc.contains(binding.modal, target))
                .then_some(binding.modal)
        });
        if let Some(modal) = hit {
            trace!(%modal, "pointer down on overlay backdrop");
            self.close_modal(doc, modal);
        }
    }

    /// Route a key event through the active overlay's binding. Returns
    /// whether the key was consumed.
    ///
    /// The binding is scoped to the overlay: keys only count while focus
    /// sits inside it, as a bubbled event would. Escape closes; Tab and
    /// Shift+Tab cycle the focus trap.
    pub fn handle_key(&mut self, doc: &mut Document, key: KeyEvent) -> bool {
        let Some(modal) = self.active else {
            return false;
        };
        let Some(overlay) = self.overlay_of(modal) else {
            return false;
        };
        let Some(focused) = doc.active_element() else {
            return false;
        };
        if !doc.contains(overlay, focused) {
            return false;
        }

        match key.code {
            KeyCode::Esc if key.modifiers.is_empty() => {
                self.close_modal(doc, modal);
                true
            }
            KeyCode::Tab if key.modifiers.is_empty() => {
                focus::trap_tab(doc, modal, false);
                true
            }
            KeyCode::Tab if key.modifiers == KeyModifiers::SHIFT => {
                focus::trap_tab(doc, modal, true);
                true
            }
            KeyCode::BackTab => {
                focus::trap_tab(doc, modal, true);
                true
            }
            _ => false,
        }
    }

    /// Document-wide click delegation. Rules are evaluated in fixed
    /// priority — anchor CTA, then open trigger, then close request —
    /// each finding its marker by nearest-ancestor matching, and at most
    /// one rule fires per click.
    pub fn handle_click(&mut self, doc: &mut Document, target: NodeId) {
        if let Some(goto_el) = doc.closest(target, &Selector::attr(markers::GOTO_ATTR)) {
            self.goto_anchor(doc, target, goto_el);
            return;
        }
        if let Some(trigger) = doc.closest(target, &Selector::attr(markers::TARGET_ATTR)) {
            self.activate_trigger(doc, target, trigger);
            return;
        }
        if doc
            .closest(target, &Selector::attr(markers::CLOSE_ATTR))
            .is_some()
        {
            match doc.closest(target, &Selector::class(markers::MODAL_CLASS)) {
                Some(modal) => self.close(doc, PopupTarget::Node(modal)),
                None => self.close_active(doc),
            }
        }
    }

    /// Pump deferred work. The host calls this once per frame with the
    /// elapsed time since the previous call; next-frame opens and
    /// settled anchor-focus moves fire from here.
    pub fn tick(&mut self, doc: &mut Document, elapsed: Duration) {
        for action in self.defers.tick(elapsed) {
            match action {
                DeferredAction::OpenPopup(selector) => {
                    trace!(selector = %selector, "deferred open");
                    self.open(doc, selector.as_str());
                }
                DeferredAction::FocusAnchor(anchor) => {
                    if doc.contains_node(anchor) && doc.element(anchor).can_receive_focus() {
                        doc.focus(anchor);
                    }
                }
            }
        }
    }

    fn resolve(&self, doc: &Document, target: &PopupTarget) -> Option<NodeId> {
        match target {
            PopupTarget::Node(node) => doc.contains_node(*node).then_some(*node),
            PopupTarget::Selector(selector) => match doc.query_selector(selector) {
                Ok(found) => found,
                Err(err) => {
                    debug!(selector = %selector, error = %err, "ignoring unparseable selector");
                    None
                }
            },
        }
    }

    fn overlay_of(&self, modal: NodeId) -> Option<NodeId> {
        self.bindings
            .iter()
            .find_map(|(&overlay, binding)| (binding.modal == modal).then_some(overlay))
    }

    /// Full close path for the active modal.
    fn close_modal(&mut self, doc: &mut Document, modal: NodeId) {
        let overlay = doc.closest(modal, &Selector::class(markers::OVERLAY_CLASS));
        if let Some(overlay) = overlay {
            doc.element_mut(overlay).remove_class(markers::OPEN_CLASS);
        }
        self.apply_aria(doc, modal, false);
        self.lock_scroll(doc, false);
        if let Some(overlay) = overlay {
            self.bindings.remove(&overlay);
        }

        if let Some(previous) = self.last_focus.take() {
            if doc.contains_node(previous) && doc.element(previous).can_receive_focus() {
                doc.focus(previous);
            }
        }
        self.active = None;

        debug!(%modal, "popup closed");
        self.emit(PopupEvent::Closed(modal));
    }

    /// Anchor CTA: close the enclosing modal (if any), scroll to the
    /// destination and queue the settle-delay focus move.
    fn goto_anchor(&mut self, doc: &mut Document, click_target: NodeId, goto_el: NodeId) {
        let destination = doc
            .element(goto_el)
            .attribute(markers::GOTO_ATTR)
            .map(str::to_string);

        if let Some(modal) = doc.closest(click_target, &Selector::class(markers::MODAL_CLASS)) {
            self.close(doc, PopupTarget::Node(modal));
        }

        let Some(destination) = destination else {
            return;
        };
        let anchor = match doc.query_selector(&destination) {
            Ok(Some(anchor)) => anchor,
            Ok(None) => {
                debug!(selector = %destination, "goto: anchor not found");
                return;
            }
            Err(err) => {
                debug!(selector = %destination, error = %err, "goto: bad anchor selector");
                return;
            }
        };

        let behavior = if self.config.smooth_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        };
        doc.scroll_to_node(anchor, behavior);

        // Make the anchor programmatically focusable without altering
        // its tab order.
        if !doc.element(anchor).can_receive_focus() {
            doc.element_mut(anchor).set_tab_index(-1);
        }
        self.defers
            .push_after(DeferredAction::FocusAnchor(anchor), self.config.scroll_settle);

        debug!(anchor = %anchor, "scrolled to anchor");
        self.emit(PopupEvent::ScrolledToAnchor(anchor));
    }

    /// Open trigger: direct open, or close-then-deferred-open when the
    /// click originated inside the open modal.
    fn activate_trigger(&mut self, doc: &mut Document, click_target: NodeId, trigger: NodeId) {
        let Some(selector) = doc
            .element(trigger)
            .attribute(markers::TARGET_ATTR)
            .map(str::to_string)
        else {
            return;
        };

        let from_open_modal = doc
            .closest(click_target, &Selector::class(markers::MODAL_CLASS))
            .filter(|&modal| self.active == Some(modal));

        match from_open_modal {
            Some(modal) => {
                // Close now, open on the next frame: lets the close's
                // focus handling settle before the new trap installs.
                self.close_modal(doc, modal);
                self.defers.push_next_frame(DeferredAction::OpenPopup(selector));
            }
            None => self.open(doc, PopupTarget::Selector(selector)),
        }
    }

    /// Mirror open state into accessibility attributes and make sure a
    /// label reference exists, deriving one from the first heading
    /// descendant when necessary.
    fn apply_aria(&self, doc: &mut Document, modal: NodeId, open: bool) {
        let element = doc.element_mut(modal);
        element.set_attribute(markers::ARIA_HIDDEN, if open { "false" } else { "true" });
        element.set_attribute(markers::ROLE_ATTR, markers::ROLE_DIALOG);
        element.set_attribute(markers::ARIA_MODAL, "true");

        if doc.element(modal).attribute(markers::ARIA_LABELLEDBY).is_none() {
            self.derive_label(doc, modal);
        }
    }

    fn derive_label(&self, doc: &mut Document, modal: NodeId) {
        let heading = doc
            .descendants(modal)
            .into_iter()
            .find(|&node| matches!(doc.element(node).tag(), "h1" | "h2" | "h3"));
        let Some(heading) = heading else {
            return;
        };

        if doc.element(heading).id().is_none() {
            let base = doc.element(modal).id().unwrap_or("popup").to_string();
            doc.assign_id(heading, format!("{base}-title"));
        }
        if let Some(label_id) = doc.element(heading).id().map(str::to_string) {
            doc.element_mut(modal)
                .set_attribute(markers::ARIA_LABELLEDBY, label_id);
        }
    }

    /// Toggle the scroll-lock marker on the root and body elements.
    /// Idempotent in both directions.
    fn lock_scroll(&self, doc: &mut Document, lock: bool) {
        let root = doc.root();
        let body = doc.body();
        doc.element_mut(root)
            .toggle_class(markers::SCROLL_LOCK_CLASS, lock);
        doc.element_mut(body)
            .toggle_class(markers::SCROLL_LOCK_CLASS, lock);
    }

    fn emit(&self, event: PopupEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }
}

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Element;

    /// A small marketing page with two cross-navigating popups and a
    /// booking anchor, mirroring the markup the controller is built for.
    struct Fixture {
        doc: Document,
        page_trigger: NodeId,
        book_section: NodeId,
        overlay_a: NodeId,
        modal_a: NodeId,
        heading_a: NodeId,
        first_a: NodeId,
        nav_to_b: NodeId,
        goto_book: NodeId,
        close_a: NodeId,
        overlay_b: NodeId,
        modal_b: NodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();

        let hero = doc.append_to_body(Element::new("section").with_id("hero"));
        let page_trigger = doc.append(
            hero,
            Element::new("button")
                .with_id("view-schedule")
                .with_attr(markers::TARGET_ATTR, "#popup-schedule")
                .with_text("View schedule"),
        );
        let book_section = doc.append_to_body(Element::new("section").with_id("book-now"));

        let overlay_a = doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
        let modal_a = doc.append(
            overlay_a,
            Element::new("div")
                .with_class(markers::MODAL_CLASS)
                .with_id("popup-schedule"),
        );
        let heading_a = doc.append(modal_a, Element::new("h3").with_text("Weekly schedule"));
        let first_a = doc.append(
            modal_a,
            Element::new("button").with_id("slot").with_text("Morning flow"),
        );
        let nav_to_b = doc.append(
            modal_a,
            Element::new("button")
                .with_attr(markers::TARGET_ATTR, "#popup-pricing")
                .with_text("See pricing"),
        );
        let goto_book = doc.append(
            modal_a,
            Element::new("a")
                .with_attr("href", "#book-now")
                .with_attr(markers::GOTO_ATTR, "#book-now")
                .with_text("Book a class"),
        );
        let close_a = doc.append(
            modal_a,
            Element::new("button")
                .with_attr(markers::CLOSE_ATTR, "")
                .with_text("Close"),
        );

        let overlay_b = doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
        let modal_b = doc.append(
            overlay_b,
            Element::new("div")
                .with_class(markers::MODAL_CLASS)
                .with_id("popup-pricing"),
        );
        doc.append(modal_b, Element::new("h3").with_text("Pricing"));
        doc.append(
            modal_b,
            Element::new("button")
                .with_attr(markers::CLOSE_ATTR, "")
                .with_text("Close"),
        );

        Fixture {
            doc,
            page_trigger,
            book_section,
            overlay_a,
            modal_a,
            heading_a,
            first_a,
            nav_to_b,
            goto_book,
            close_a,
            overlay_b,
            modal_b,
        }
    }

    fn esc() -> KeyEvent {
        KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)
    }

    fn tab() -> KeyEvent {
        KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)
    }

    fn back_tab() -> KeyEvent {
        KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
    }

    #[test]
    fn test_open_establishes_full_contract_state() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, "#popup-schedule");

        assert_eq!(ctl.active(), Some(fx.modal_a));
        assert!(ctl.is_active(fx.modal_a));
        assert!(fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));

        let modal = fx.doc.element(fx.modal_a);
        assert_eq!(modal.attribute(markers::ARIA_HIDDEN), Some("false"));
        assert_eq!(modal.attribute(markers::ROLE_ATTR), Some("dialog"));
        assert_eq!(modal.attribute(markers::ARIA_MODAL), Some("true"));
        assert_eq!(
            modal.attribute(markers::ARIA_LABELLEDBY),
            Some("popup-schedule-title")
        );
        assert_eq!(
            fx.doc.element(fx.heading_a).id(),
            Some("popup-schedule-title")
        );

        let root = fx.doc.root();
        let body = fx.doc.body();
        assert!(fx.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS));
        assert!(fx.doc.element(body).has_class(markers::SCROLL_LOCK_CLASS));

        assert_eq!(fx.doc.active_element(), Some(fx.first_a));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, "#popup-schedule");
        ctl.open(&mut fx.doc, "#popup-schedule");

        assert_eq!(ctl.active(), Some(fx.modal_a));
        assert_eq!(fx.doc.active_element(), Some(fx.first_a));
        assert_eq!(
            fx.doc
                .element(fx.overlay_a)
                .classes()
                .iter()
                .filter(|c| *c == markers::OPEN_CLASS)
                .count(),
            1
        );

        // last_focus was not clobbered by the suppressed re-open
        ctl.close_active(&mut fx.doc);
        assert_eq!(fx.doc.active_element(), Some(fx.page_trigger));
    }

    #[test]
    fn test_single_active_invariant_across_opens() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, "#popup-schedule");
        ctl.open(&mut fx.doc, "#popup-pricing");

        assert_eq!(ctl.active(), Some(fx.modal_b));
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));
        assert!(fx.doc.element(fx.overlay_b).has_class(markers::OPEN_CLASS));
        assert_eq!(
            fx.doc.element(fx.modal_a).attribute(markers::ARIA_HIDDEN),
            Some("true")
        );
        let root = fx.doc.root();
        assert!(fx.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS));
    }

    #[test]
    fn test_close_restores_focus_and_unlocks_scroll() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.close(&mut fx.doc, fx.modal_a);

        assert_eq!(ctl.active(), None);
        assert_eq!(fx.doc.active_element(), Some(fx.page_trigger));
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));
        assert_eq!(
            fx.doc.element(fx.modal_a).attribute(markers::ARIA_HIDDEN),
            Some("true")
        );
        let root = fx.doc.root();
        let body = fx.doc.body();
        assert!(!fx.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS));
        assert!(!fx.doc.element(body).has_class(markers::SCROLL_LOCK_CLASS));
    }

    #[test]
    fn test_close_of_inactive_modal_is_a_noop() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, "#popup-schedule");
        ctl.close(&mut fx.doc, "#popup-pricing");

        // the active modal and the scroll lock are untouched
        assert_eq!(ctl.active(), Some(fx.modal_a));
        let root = fx.doc.root();
        assert!(fx.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS));

        // and with nothing open at all, close is equally silent
        ctl.close_active(&mut fx.doc);
        ctl.close_active(&mut fx.doc);
        ctl.close(&mut fx.doc, "#popup-pricing");
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn test_tab_trap_wraps_at_both_edges() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, fx.modal_a);
        assert_eq!(fx.doc.active_element(), Some(fx.first_a));

        // Shift+Tab on the first focusable wraps to the last
        assert!(ctl.handle_key(&mut fx.doc, back_tab()));
        assert_eq!(fx.doc.active_element(), Some(fx.close_a));

        // Tab on the last wraps back to the first
        assert!(ctl.handle_key(&mut fx.doc, tab()));
        assert_eq!(fx.doc.active_element(), Some(fx.first_a));

        // inner movement walks document order
        assert!(ctl.handle_key(&mut fx.doc, tab()));
        assert_eq!(fx.doc.active_element(), Some(fx.nav_to_b));
    }

    #[test]
    fn test_escape_matches_close() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, fx.modal_a);
        assert!(ctl.handle_key(&mut fx.doc, esc()));

        assert_eq!(ctl.active(), None);
        assert_eq!(fx.doc.active_element(), Some(fx.page_trigger));
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));
        let root = fx.doc.root();
        assert!(!fx.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS));
    }

    #[test]
    fn test_listeners_are_gone_after_close() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.close_active(&mut fx.doc);

        // a backdrop press and an Escape must both be dead now
        ctl.handle_pointer_down(&mut fx.doc, fx.overlay_a);
        assert_eq!(ctl.active(), None);
        assert!(!ctl.handle_key(&mut fx.doc, esc()));
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));
    }

    #[test]
    fn test_keys_only_count_while_focus_is_inside_overlay() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, fx.modal_a);
        // host moved focus out from under the overlay
        fx.doc.focus(fx.page_trigger);

        assert!(!ctl.handle_key(&mut fx.doc, esc()));
        assert_eq!(ctl.active(), Some(fx.modal_a));
    }

    #[test]
    fn test_backdrop_press_closes_but_outside_press_does_not() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, fx.modal_a);

        // a press elsewhere on the page is not the overlay's event
        ctl.handle_pointer_down(&mut fx.doc, fx.page_trigger);
        assert_eq!(ctl.active(), Some(fx.modal_a));

        // a press inside the modal content does not close either
        ctl.handle_pointer_down(&mut fx.doc, fx.first_a);
        assert_eq!(ctl.active(), Some(fx.modal_a));

        // a press on the backdrop does
        ctl.handle_pointer_down(&mut fx.doc, fx.overlay_a);
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn test_modal_without_focusables_receives_focus_itself() {
        let mut doc = Document::new();
        let overlay = doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
        let modal = doc.append(
            overlay,
            Element::new("div")
                .with_class(markers::MODAL_CLASS)
                .with_id("m1"),
        );
        doc.append(modal, Element::new("p").with_text("Notice"));

        let mut ctl = PopupController::new();
        ctl.open(&mut doc, "#m1");

        assert_eq!(ctl.active(), Some(modal));
        assert_eq!(doc.active_element(), Some(modal));

        // Tab stays put instead of escaping the trap
        assert!(ctl.handle_key(&mut doc, tab()));
        assert_eq!(doc.active_element(), Some(modal));
    }

    #[test]
    fn test_missing_target_is_silent() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, "#missing");
        assert_eq!(ctl.active(), None);

        // a trigger pointing nowhere is equally silent
        let dangling = doc_trigger(&mut fx.doc, "#missing");
        ctl.handle_click(&mut fx.doc, dangling);
        assert_eq!(ctl.active(), None);

        // so is a selector that does not parse
        ctl.open(&mut fx.doc, "div > span");
        assert_eq!(ctl.active(), None);
    }

    fn doc_trigger(doc: &mut Document, selector: &str) -> NodeId {
        doc.append_to_body(
            Element::new("button").with_attr(markers::TARGET_ATTR, selector),
        )
    }

    #[test]
    fn test_click_on_page_trigger_opens_directly() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.handle_click(&mut fx.doc, fx.page_trigger);
        assert_eq!(ctl.active(), Some(fx.modal_a));
        assert_eq!(fx.doc.active_element(), Some(fx.first_a));
    }

    #[test]
    fn test_cross_modal_navigation_defers_one_frame() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.handle_click(&mut fx.doc, fx.nav_to_b);

        // the old modal is closed immediately, the new one is not yet open
        assert_eq!(ctl.active(), None);
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));
        assert!(!fx.doc.element(fx.overlay_b).has_class(markers::OPEN_CLASS));

        ctl.tick(&mut fx.doc, Duration::from_millis(16));
        assert_eq!(ctl.active(), Some(fx.modal_b));
        assert!(fx.doc.element(fx.overlay_b).has_class(markers::OPEN_CLASS));
    }

    #[test]
    fn test_close_marker_closes_enclosing_modal() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.handle_click(&mut fx.doc, fx.close_a);
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn test_goto_anchor_closes_scrolls_then_focuses_after_settle() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.element_mut(fx.book_section).set_offset_top(120);
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.handle_click(&mut fx.doc, fx.goto_book);

        // modal closed immediately
        assert_eq!(ctl.active(), None);
        assert!(!fx.doc.element(fx.overlay_a).has_class(markers::OPEN_CLASS));

        // viewport moved smoothly to the anchor
        let scroll = fx.doc.last_scroll().expect("scroll recorded");
        assert_eq!(scroll.target, fx.book_section);
        assert_eq!(scroll.behavior, ScrollBehavior::Smooth);
        assert_eq!(fx.doc.scroll_top(), 120);

        // the section was made programmatically focusable
        assert_eq!(fx.doc.element(fx.book_section).tab_index(), Some(-1));

        // focus waits for the settle delay
        ctl.tick(&mut fx.doc, Duration::from_millis(200));
        assert_ne!(fx.doc.active_element(), Some(fx.book_section));
        ctl.tick(&mut fx.doc, Duration::from_millis(200));
        assert_eq!(fx.doc.active_element(), Some(fx.book_section));
    }

    #[test]
    fn test_goto_priority_beats_trigger_and_close() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();

        // an element carrying every marker at once: only the anchor rule
        // may fire
        let busy = fx.doc.append_to_body(
            Element::new("a")
                .with_attr(markers::GOTO_ATTR, "#book-now")
                .with_attr(markers::TARGET_ATTR, "#popup-pricing")
                .with_attr(markers::CLOSE_ATTR, ""),
        );
        ctl.handle_click(&mut fx.doc, busy);
        ctl.tick(&mut fx.doc, Duration::from_millis(16));

        assert_eq!(ctl.active(), None);
        assert_eq!(
            fx.doc.last_scroll().map(|s| s.target),
            Some(fx.book_section)
        );
    }

    #[test]
    fn test_existing_heading_id_is_reused_for_label() {
        let mut doc = Document::new();
        let overlay = doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
        let modal = doc.append(
            overlay,
            Element::new("div")
                .with_class(markers::MODAL_CLASS)
                .with_id("m1"),
        );
        doc.append(modal, Element::new("h2").with_id("custom-title"));

        let mut ctl = PopupController::new();
        ctl.open(&mut doc, modal);

        assert_eq!(
            doc.element(modal).attribute(markers::ARIA_LABELLEDBY),
            Some("custom-title")
        );
    }

    #[test]
    fn test_events_are_emitted_on_transitions() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        ctl.set_event_sender(tx);

        ctl.open(&mut fx.doc, fx.modal_a);
        ctl.close_active(&mut fx.doc);

        assert_eq!(rx.try_recv().ok(), Some(PopupEvent::Opened(fx.modal_a)));
        assert_eq!(rx.try_recv().ok(), Some(PopupEvent::Closed(fx.modal_a)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_focus_restore_skips_unfocusable_element() {
        let mut fx = fixture();
        let mut ctl = PopupController::new();
        fx.doc.focus(fx.page_trigger);

        ctl.open(&mut fx.doc, fx.modal_a);
        // the element that had focus became disabled while the modal
        // was open
        fx.doc.element_mut(fx.page_trigger).set_disabled(true);
        ctl.close_active(&mut fx.doc);

        assert_ne!(fx.doc.active_element(), Some(fx.page_trigger));
    }
}
