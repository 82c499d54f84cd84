//! Core domain types, errors, and constants for envkey.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate in
//!   the workspace, one variant per failure mode a caller can act on.
//! - **`types`**: newtype wrappers such as `EnvironmentVariables` and
//!   `Credential` that keep invariants at the type level.
//! - **`constants`**: environment variable names, resolver flags and defaults.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
