//! Configuration for the envkey client
//!
//! Settings come from the process environment (or any snapshot of it) and are
//! immutable once built.

pub mod config;

pub use config::*;
