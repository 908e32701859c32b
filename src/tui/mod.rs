//! Terminal demo host
//!
//! Wires the popup controller to a real event loop: crossterm input,
//! ratatui rendering and a periodic tick that pumps the controller's
//! deferred work. The host plays the collaborator roles the controller
//! expects — it supplies the page, forwards clicks and keys, and obeys
//! the scroll lock.

mod app;
mod demo;
mod events;
mod view;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::config::Settings;
use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal(mouse: bool) -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main demo entry point
pub async fn run(settings: Settings) -> Result<()> {
    let mut terminal = init_terminal(settings.mouse_enabled)?;
    let mut app = App::new(settings.clone());
    let mut event_handler = EventHandler::new(settings.tick_rate());

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Some(event) = event_handler.next().await {
            if app.handle_event(event)? {
                break; // Exit requested
            }
        }
    }
    Ok(())
}
