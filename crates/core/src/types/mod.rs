//! Core domain types for envkey.
//!
//! - **`commands`**: argument lists for the resolver process
//! - **`credential`**: the `ENVKEY` identity string
//! - **`environment`**: environment variable maps

pub mod commands;
pub mod credential;
pub mod environment;

pub use commands::*;
pub use credential::*;
pub use environment::*;
