//! Report sinks for mining results.
//!
//! - [`terminal`] — colored summary plus tabular change listing; respects
//!   `--verbose` / `--quiet`.
//! - [`csv`] — row-oriented output file, one row per change event.

pub mod csv;
pub mod terminal;
