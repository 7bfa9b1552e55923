//! Infrastructure layer providing external service integrations.
//!
//! This module contains implementations for external concerns like
//! durable key-value persistence and geolocation lookup.

pub mod persistence;
pub mod geolocation;

pub use persistence::*;
pub use geolocation::*;
