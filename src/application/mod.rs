//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer,
//! managing the session state machine, form input, and the map viewport.

pub mod state;

pub use state::*;
