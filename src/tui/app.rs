use super::demo;
use super::events::Event;
use super::view::{self, HitMap};
use super::Frame;
use crate::config::Settings;
use crate::page::{Document, NodeId, Selector};
use crate::popup::{markers, PopupController, PopupEvent};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::Instant;
use tokio::sync::mpsc;

/// Demo host application state
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Effective settings for this session
    settings: Settings,

    /// The page the controller manages
    doc: Document,

    /// The popup controller under demonstration
    controller: PopupController,

    /// Receiver for controller notifications, shown in the status bar
    popup_events: mpsc::UnboundedReceiver<PopupEvent>,

    /// Last status message
    status: Option<String>,

    /// Hit map from the most recent frame
    hits: HitMap,

    /// Timestamp of the previous tick, for deferred-work pumping
    last_tick: Instant,
}

impl App {
    /// Create the demo application with its sample page.
    pub fn new(settings: Settings) -> Self {
        let doc = demo::sample_page();
        let mut controller = PopupController::with_config(settings.popup_config());
        let (sender, receiver) = mpsc::unbounded_channel();
        controller.set_event_sender(sender);

        Self {
            should_quit: false,
            settings,
            doc,
            controller,
            popup_events: receiver,
            status: None,
            hits: HitMap::default(),
            last_tick: Instant::now(),
        }
    }

    /// Handle an incoming event. Returns whether the app should quit.
    pub fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            Event::Resize(_, _) => {}
            Event::Tick => self.tick(),
        }
        Ok(self.should_quit)
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        // The controller gets first refusal: Escape and the Tab trap
        // while a popup is open.
        if self.controller.handle_key(&mut self.doc, key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.cycle_page_focus(false),
            KeyCode::BackTab => self.cycle_page_focus(true),
            KeyCode::Enter => {
                if let Some(focused) = self.doc.active_element() {
                    self.controller.handle_click(&mut self.doc, focused);
                }
            }
            KeyCode::Up => self.scroll_page(-1),
            KeyCode::Down => self.scroll_page(1),
            KeyCode::PageUp => self.scroll_page(-10),
            KeyCode::PageDown => self.scroll_page(10),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if !self.settings.mouse_enabled {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(node) = self.hits.hit(mouse.column, mouse.row) {
                    self.controller.handle_pointer_down(&mut self.doc, node);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(node) = self.hits.hit(mouse.column, mouse.row) {
                    if self.doc.element(node).can_receive_focus() {
                        self.doc.focus(node);
                    }
                    self.controller.handle_click(&mut self.doc, node);
                }
            }
            MouseEventKind::ScrollUp => self.scroll_page(-1),
            MouseEventKind::ScrollDown => self.scroll_page(1),
            _ => {}
        }
    }

    /// Move page focus among focusables outside popup markup. Inside an
    /// open popup Tab never reaches this; the controller's trap owns it.
    fn cycle_page_focus(&mut self, backward: bool) {
        let body = self.doc.body();
        let overlay = Selector::class(markers::OVERLAY_CLASS);
        let focusables: Vec<NodeId> = self
            .doc
            .focusables_within(body)
            .into_iter()
            .filter(|&node| self.doc.closest(node, &overlay).is_none())
            .collect();
        if focusables.is_empty() {
            return;
        }

        let position = self
            .doc
            .active_element()
            .and_then(|focused| focusables.iter().position(|&node| node == focused));
        let next = match position {
            Some(index) => {
                if backward {
                    (index + focusables.len() - 1) % focusables.len()
                } else {
                    (index + 1) % focusables.len()
                }
            }
            None => {
                if backward {
                    focusables.len() - 1
                } else {
                    0
                }
            }
        };
        self.doc.focus(focusables[next]);
    }

    fn scroll_page(&mut self, delta: i32) {
        let root = self.doc.root();
        if self.doc.element(root).has_class(markers::SCROLL_LOCK_CLASS) {
            // background scrolling is suppressed while a popup is open
            return;
        }
        let current = self.doc.scroll_top() as i32;
        self.doc.set_scroll_top((current + delta).max(0) as u16);
    }

    /// Pump deferred controller work and drain notifications.
    fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        self.controller.tick(&mut self.doc, elapsed);

        while let Ok(event) = self.popup_events.try_recv() {
            self.status = Some(self.describe(event));
        }
    }

    fn describe(&self, event: PopupEvent) -> String {
        let name = |node: NodeId| {
            self.doc
                .element(node)
                .id()
                .map(str::to_string)
                .unwrap_or_else(|| node.to_string())
        };
        match event {
            PopupEvent::Opened(modal) => format!("Opened {}", name(modal)),
            PopupEvent::Closed(modal) => format!("Closed {}", name(modal)),
            PopupEvent::ScrolledToAnchor(anchor) => format!("Scrolled to {}", name(anchor)),
        }
    }

    /// Render the current frame.
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        self.hits = view::render(frame, &mut self.doc, &self.controller, self.status.as_deref());
    }
}
