//! Live adapters for real operating-system interactions.

pub mod file;
pub mod os;

pub use file::LiveFile;
pub use os::LiveOs;
