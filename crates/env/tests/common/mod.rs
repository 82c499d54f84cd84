//! Shared fixtures: a fake `envkey-source` and process env isolation
#![allow(dead_code)]

use envkey_config::ClientConfig;
use envkey_source::Platform;
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const VALID_ENVKEY: &str = "ekAc8p6PiPp1Di7nQu5vGomx-qXknocWWVYqyVMaxaBco12";
pub const INVALID_ENVKEY: &str = "ekunDrefdPeELwPpupdzJpsz-2Hs3HCiscoY1TfGinvalid";
pub const VERSION: &str = "9.9.9-test";

/// Answers like the real resolver for the fixture credentials. Uses shell
/// builtins only since the child environment may lack `PATH`.
pub const RESOLVER_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$*" > "${0%/*}/args.txt"
case "$ENVKEY" in
  ekAc8p6PiPp1Di7nQu5vGomx-qXknocWWVYqyVMaxaBco12)
    printf '%s' '{"TEST":"it","TEST_2":"works!","UNSET":null}'
    ;;
  *)
    printf '%s' "error: ENVKEY invalid"
    ;;
esac
"#;

/// A resolver install laid out the way the locator expects
pub struct FakeResolver {
    dir: TempDir,
    binary: PathBuf,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::with_script(RESOLVER_SCRIPT)
    }

    pub fn with_script(script: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let binary = Platform::detect()
            .unwrap()
            .locate(dir.path(), VERSION)
            .unwrap();

        fs::create_dir_all(binary.parent().unwrap()).unwrap();
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        Self { dir, binary }
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::builder()
            .resolver_dir(self.base_dir())
            .resolver_version(VERSION)
            .build()
            .unwrap()
    }

    /// Arguments of the most recent invocation
    pub fn last_args(&self) -> String {
        fs::read_to_string(self.binary.parent().unwrap().join("args.txt"))
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

/// Restores touched process variables on drop
pub struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    pub fn new(keys: &[&str]) -> Self {
        let original = keys
            .iter()
            .map(|key| (key.to_string(), std::env::var(key).ok()))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }
        Self { original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.original {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}
