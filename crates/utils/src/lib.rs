//! Shared utilities for envkey
//!
//! Process-environment access guarded by a global lock, a bridge for running
//! async code from synchronous callers, and tracing setup.

pub mod async_runtime;
pub mod sync;
pub mod tracing;

pub use async_runtime::*;
pub use sync::*;
