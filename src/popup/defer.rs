//! Deferred controller work
//!
//! Two kinds of deferral exist: next-frame (the close-then-open dance
//! when navigating between modals) and fixed-delay (moving focus to an
//! anchor after a smooth scroll settles). The host pumps the queue once
//! per frame via the controller's `tick`. Pending entries are never
//! cancelled by later activity.

use crate::page::NodeId;
use std::time::Duration;

/// Work postponed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Open the modal resolved by this selector.
    OpenPopup(String),
    /// Move focus to a page anchor after its scroll settled.
    FocusAnchor(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Deadline {
    /// Fires on the next tick after being queued.
    NextFrame,
    /// Fires once the remaining time reaches zero.
    After(Duration),
}

#[derive(Debug)]
struct Pending {
    action: DeferredAction,
    deadline: Deadline,
}

/// FIFO queue of pending deferred actions.
#[derive(Debug, Default)]
pub struct DeferQueue {
    pending: Vec<Pending>,
}

impl DeferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action for the next frame.
    pub fn push_next_frame(&mut self, action: DeferredAction) {
        self.pending.push(Pending {
            action,
            deadline: Deadline::NextFrame,
        });
    }

    /// Queue an action to fire after a fixed delay.
    pub fn push_after(&mut self, action: DeferredAction, delay: Duration) {
        self.pending.push(Pending {
            action,
            deadline: Deadline::After(delay),
        });
    }

    /// Advance time by `elapsed` and return the actions now due, in the
    /// order they were queued. Actions queued during processing of the
    /// returned batch belong to a later frame.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        let mut remaining = Vec::new();

        for mut entry in self.pending.drain(..) {
            match entry.deadline {
                Deadline::NextFrame => due.push(entry.action),
                Deadline::After(left) => {
                    if left <= elapsed {
                        due.push(entry.action);
                    } else {
                        entry.deadline = Deadline::After(left - elapsed);
                        remaining.push(entry);
                    }
                }
            }
        }

        self.pending = remaining;
        due
    }

    /// Whether anything is still queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_frame_fires_on_first_tick() {
        let mut queue = DeferQueue::new();
        queue.push_next_frame(DeferredAction::OpenPopup("#a".to_string()));

        let due = queue.tick(Duration::from_millis(16));
        assert_eq!(due, vec![DeferredAction::OpenPopup("#a".to_string())]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_delay_accumulates_across_ticks() {
        let mut queue = DeferQueue::new();
        queue.push_after(DeferredAction::FocusAnchor(crate::page::NodeId(7)), Duration::from_millis(100));

        assert!(queue.tick(Duration::from_millis(40)).is_empty());
        assert!(queue.tick(Duration::from_millis(40)).is_empty());
        let due = queue.tick(Duration::from_millis(40));
        assert_eq!(due.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_due_actions_keep_queue_order() {
        let mut queue = DeferQueue::new();
        queue.push_next_frame(DeferredAction::OpenPopup("#a".to_string()));
        queue.push_next_frame(DeferredAction::OpenPopup("#b".to_string()));

        let due = queue.tick(Duration::from_millis(16));
        assert_eq!(
            due,
            vec![
                DeferredAction::OpenPopup("#a".to_string()),
                DeferredAction::OpenPopup("#b".to_string()),
            ]
        );
    }
}
