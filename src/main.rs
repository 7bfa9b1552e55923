//! TWKT - Terminal Workout Tracker
//!
//! A terminal-based workout journal with an interactive map, built in Rust.
//! Click a location on the map, fill in the form, and the workout shows up
//! as a map marker and a list entry; the log persists across restarts.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

mod domain;
mod application;
mod infrastructure;
mod presentation;

use application::{App, AppMode};
use infrastructure::{FileStore, GeolocationProvider, IpGeolocator};
use presentation::{render_ui, InputHandler};


/// Entry point for the TWKT terminal workout tracker.
///
/// Restores the persisted workout log, asks the geolocation provider
/// once for an initial map center, sets up the terminal interface, and
/// runs the main event loop until the user quits.
///
/// # Errors
///
/// Returns an error if terminal setup fails or if there are issues
/// with the terminal interface during runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("twkt");
    let mut app = App::new(Box::new(FileStore::new(data_dir)));

    // One-shot position lookup; on failure the map starts at the
    // default center and the feature is simply not retried.
    match IpGeolocator::new().current_position() {
        Ok(coords) => app.map_center = coords,
        Err(_) => {
            app.status_message =
                Some("The position could not be captured - showing the default area.".to_string());
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Handles terminal rendering and keyboard/mouse input processing.
/// Continues running until the user presses 'q' in browsing mode.
/// Poll timeouts drive the status-message timer; everything else runs
/// to completion inside a single event.
///
/// # Errors
///
/// Returns an IO error if terminal operations fail.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Browsing) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                },
                Event::Mouse(mouse) => InputHandler::handle_mouse_event(app, mouse),
                _ => {}
            }
        } else {
            app.tick();
        }
    }
}
