use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

/// Event handler bridging crossterm input and the app loop
pub struct EventHandler {
    /// Event receiver channel for internal events
    receiver: mpsc::UnboundedReceiver<Event>,

    /// Event sender channel
    sender: mpsc::UnboundedSender<Event>,

    /// Tick interval for periodic events
    tick_interval: Duration,
}

impl EventHandler {
    /// Create a new event handler with the given frame interval.
    pub fn new(tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            receiver,
            sender,
            tick_interval,
        }
    }

    /// Get the next event. Input is polled for at most one tick
    /// interval; an idle poll yields a tick so deferred work keeps
    /// getting pumped.
    pub async fn next(&mut self) -> Option<Event> {
        if let Ok(event) = self.receiver.try_recv() {
            return Some(event);
        }

        let tick = self.tick_interval;
        let input = tokio::task::spawn_blocking(move || {
            if crossterm::event::poll(tick).unwrap_or(false) {
                crossterm::event::read().ok()
            } else {
                None
            }
        })
        .await
        .ok()
        .flatten();

        match input {
            Some(event) => Some(Self::convert(event)),
            None => Some(Event::Tick),
        }
    }

    /// Convert crossterm events to application events
    fn convert(event: CrosstermEvent) -> Event {
        match event {
            CrosstermEvent::Key(key_event) => Event::Key(key_event),
            CrosstermEvent::Mouse(mouse_event) => Event::Mouse(mouse_event),
            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
            _ => Event::Tick,
        }
    }

    /// Get a clone of the sender
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}
