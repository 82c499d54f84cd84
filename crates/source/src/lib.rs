//! Resolver plumbing for envkey
//!
//! Everything needed to go from "which binary, which credential" to a decoded
//! map of secrets: platform detection, the override file, credential priority,
//! the subprocess seam and the fetch client itself. Nothing here touches the
//! live process environment; callers hand in snapshots.

pub mod child_env;
pub mod command_executor;
pub mod credential;
pub mod fetch;
pub mod override_file;
pub mod platform;

pub use child_env::ChildEnvironment;
pub use command_executor::{
    CommandExecutor, CommandExecutorFactory, ExecutionOptions, SystemCommandExecutor,
};
#[cfg(any(test, feature = "testing"))]
pub use command_executor::{TestCommandExecutor, TestInvocation, TestResponse};
pub use credential::{resolve, CredentialSource, ResolvedCredential};
pub use fetch::{decode_response, FetchOptions, ResolvedSecrets, SecretFetchClient};
pub use override_file::OverrideFile;
pub use platform::{locate, Arch, OsFamily, Platform};
