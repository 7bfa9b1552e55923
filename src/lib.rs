//! TWKT - Terminal Workout Tracker Library
//!
//! A terminal-based workout journal with an interactive map, built in Rust.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
