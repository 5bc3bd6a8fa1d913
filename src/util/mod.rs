//! Shared utilities (table directory I/O, directory tree projection).

#[cfg(feature = "cli")]
pub mod fs;
#[cfg(feature = "cli")]
pub mod tree;
