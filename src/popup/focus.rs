//! Focus trapping inside an open modal
//!
//! The page model has no native tab order, so while a modal is open the
//! trap owns every Tab press: focus moves through the modal's focusable
//! descendants in document order and wraps at both edges. With no
//! focusable descendants the modal itself holds focus and Tab is
//! swallowed.

use crate::page::{Document, NodeId};

/// Give a freshly opened modal its initial focus: the first focusable
/// descendant, or the modal itself when there is none (made
/// programmatically focusable if needed).
pub fn initial_focus(doc: &mut Document, modal: NodeId) {
    if let Some(&first) = doc.focusables_within(modal).first() {
        doc.focus(first);
        return;
    }
    if !doc.element(modal).can_receive_focus() {
        doc.element_mut(modal).set_tab_index(-1);
    }
    doc.focus(modal);
}

/// Handle a Tab press while `modal` is open. Moves focus forward (or
/// backward with Shift) through the modal's focusables, wrapping at the
/// edges. Always swallows the key.
pub fn trap_tab(doc: &mut Document, modal: NodeId, backward: bool) {
    let items = doc.focusables_within(modal);
    if items.is_empty() {
        // Nothing to cycle through; keep focus where it is.
        return;
    }

    let first = items[0];
    let last = items[items.len() - 1];
    let position = doc
        .active_element()
        .and_then(|focused| items.iter().position(|&item| item == focused));

    let next = match position {
        Some(index) => {
            if backward {
                if index == 0 {
                    last
                } else {
                    items[index - 1]
                }
            } else if index == items.len() - 1 {
                first
            } else {
                items[index + 1]
            }
        }
        // Focus sits on the modal itself (or was lost): enter the cycle
        // at the appropriate edge.
        None => {
            if backward {
                last
            } else {
                first
            }
        }
    };

    doc.focus(next);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Element;

    fn modal_with_buttons(count: usize) -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let modal = doc.append_to_body(Element::new("div").with_class("popup-modal"));
        let buttons = (0..count)
            .map(|i| doc.append(modal, Element::new("button").with_id(format!("b{i}"))))
            .collect();
        (doc, modal, buttons)
    }

    #[test]
    fn test_initial_focus_picks_first_focusable() {
        let (mut doc, modal, buttons) = modal_with_buttons(3);
        initial_focus(&mut doc, modal);
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn test_initial_focus_falls_back_to_modal() {
        let (mut doc, modal, _) = modal_with_buttons(0);
        initial_focus(&mut doc, modal);
        assert_eq!(doc.active_element(), Some(modal));
    }

    #[test]
    fn test_tab_wraps_forward_at_last() {
        let (mut doc, modal, buttons) = modal_with_buttons(3);
        doc.focus(buttons[2]);
        trap_tab(&mut doc, modal, false);
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn test_shift_tab_wraps_backward_at_first() {
        let (mut doc, modal, buttons) = modal_with_buttons(3);
        doc.focus(buttons[0]);
        trap_tab(&mut doc, modal, true);
        assert_eq!(doc.active_element(), Some(buttons[2]));
    }

    #[test]
    fn test_tab_moves_between_inner_items() {
        let (mut doc, modal, buttons) = modal_with_buttons(3);
        doc.focus(buttons[0]);
        trap_tab(&mut doc, modal, false);
        assert_eq!(doc.active_element(), Some(buttons[1]));
        trap_tab(&mut doc, modal, true);
        assert_eq!(doc.active_element(), Some(buttons[0]));
    }

    #[test]
    fn test_tab_from_modal_enters_cycle_at_edge() {
        let (mut doc, modal, buttons) = modal_with_buttons(2);
        doc.element_mut(modal).set_tab_index(-1);
        doc.focus(modal);

        trap_tab(&mut doc, modal, false);
        assert_eq!(doc.active_element(), Some(buttons[0]));

        doc.focus(modal);
        trap_tab(&mut doc, modal, true);
        assert_eq!(doc.active_element(), Some(buttons[1]));
    }

    #[test]
    fn test_tab_with_no_focusables_keeps_focus() {
        let (mut doc, modal, _) = modal_with_buttons(0);
        initial_focus(&mut doc, modal);
        trap_tab(&mut doc, modal, false);
        assert_eq!(doc.active_element(), Some(modal));
    }
}
