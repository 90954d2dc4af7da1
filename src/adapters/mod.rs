//! Adapter implementations of the port traits.
//!
//! - `live` talks to the real operating system.
//! - `recording` wraps another adapter and captures every call to a cassette.
//! - `replaying` serves calls from a cassette without touching the OS.

pub mod live;
pub mod recording;
pub mod replaying;
