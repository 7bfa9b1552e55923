//! Presentation layer handling terminal UI and user input.
//!
//! This module manages the terminal user interface using ratatui,
//! handles keyboard and mouse input, and renders the map, the entry
//! form and the workout list.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
