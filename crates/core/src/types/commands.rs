//! Argument list handed to the resolver process

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered command-line arguments for a child process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArguments(Vec<String>);

impl CommandArguments {
    /// Create new empty arguments
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create from a vector of strings
    #[must_use]
    pub fn from_vec(args: Vec<String>) -> Self {
        Self(args)
    }

    /// Add an argument
    pub fn push(&mut self, arg: impl Into<String>) {
        self.0.push(arg.into());
    }

    /// Add a flag followed by its value
    pub fn push_flag(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        self.0.push(flag.into());
        self.0.push(value.into());
    }

    /// Whether the exact argument is present
    #[must_use]
    pub fn contains(&self, arg: &str) -> bool {
        self.0.iter().any(|a| a == arg)
    }

    /// Value following `flag`, if both are present
    #[must_use]
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.0
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.0.get(i + 1))
            .map(String::as_str)
    }

    /// Get the number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no arguments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to inner Vec
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Get a slice of the arguments
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CommandArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl From<Vec<String>> for CommandArguments {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl IntoIterator for CommandArguments {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_lookup() {
        let mut args = CommandArguments::new();
        args.push("--json");
        args.push_flag("--client-name", "envkey-rs");

        assert!(args.contains("--json"));
        assert!(!args.contains("--cache"));
        assert_eq!(args.value_of("--client-name"), Some("envkey-rs"));
        assert_eq!(args.value_of("--dotenv-file"), None);
        assert_eq!(args.to_string(), "--json --client-name envkey-rs");
    }
}
