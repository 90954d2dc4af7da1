//! Port traits defining the operating-system boundary.
//!
//! `Os` covers process-wide system access (environment, paths, process info)
//! and `File` covers a single open handle. Implementations live in
//! `src/adapters/`.

pub mod file;
pub mod os;

pub use file::{File, FileInfo};
pub use os::{OpenFlags, Os};
