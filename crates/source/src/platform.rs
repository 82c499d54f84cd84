//! Locating the `envkey-source` build for the running platform
//!
//! Resolver builds ship one per OS/architecture pair under a base directory:
//!
//! ```text
//! <base>/envkey-source_<version>_<os>_<arch>/envkey-source[.exe]
//! ```
//!
//! Everything here is pure path computation. Whether the file actually exists
//! is discovered when the fetch client tries to launch it.

use envkey_core::constants::RESOLVER_NAME;
use envkey_core::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// OS component of a resolver build name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Darwin,
    Linux,
    FreeBsd,
    Windows,
}

impl OsFamily {
    /// Map a `std::env::consts::OS` value. Unknown systems fall back to linux.
    #[must_use]
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" | "darwin" => OsFamily::Darwin,
            "freebsd" | "openbsd" | "netbsd" | "dragonfly" => OsFamily::FreeBsd,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Linux,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OsFamily::Darwin => "darwin",
            OsFamily::Linux => "linux",
            OsFamily::FreeBsd => "freebsd",
            OsFamily::Windows => "windows",
        }
    }

    #[must_use]
    pub fn exe_suffix(self) -> &'static str {
        match self {
            OsFamily::Windows => ".exe",
            _ => "",
        }
    }
}

/// Architecture component of a resolver build name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Map a `std::env::consts::ARCH` value.
    ///
    /// Resolver builds only exist for 64-bit targets. Unlisted 64-bit
    /// architectures use the amd64 build.
    pub fn from_arch(arch: &str, pointer_width: u32) -> Option<Self> {
        match arch {
            "x86_64" | "amd64" | "powerpc64" | "s390x" => Some(Arch::Amd64),
            "aarch64" | "arm64" => Some(Arch::Arm64),
            _ if pointer_width == 64 => Some(Arch::Amd64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
        }
    }
}

/// A supported OS/architecture pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: OsFamily,
    pub arch: Arch,
}

impl Platform {
    /// The platform this process is running on
    pub fn detect() -> Result<Self> {
        Self::from_parts(
            std::env::consts::OS,
            std::env::consts::ARCH,
            usize::BITS,
        )
    }

    /// Build from raw OS/arch strings, failing on 32-bit targets
    pub fn from_parts(os: &str, arch: &str, pointer_width: u32) -> Result<Self> {
        let arch_part = Arch::from_arch(arch, pointer_width).ok_or_else(|| {
            Error::unsupported_platform(
                os,
                arch,
                format!("{pointer_width}-bit architectures have no {RESOLVER_NAME} build"),
            )
        })?;

        Ok(Self {
            os: OsFamily::from_os(os),
            arch: arch_part,
        })
    }

    /// `envkey-source_<version>_<os>_<arch>`
    #[must_use]
    pub fn dir_name(&self, version: &str) -> String {
        format!(
            "{RESOLVER_NAME}_{version}_{}_{}",
            self.os.as_str(),
            self.arch.as_str()
        )
    }

    #[must_use]
    pub fn executable_name(&self) -> String {
        format!("{RESOLVER_NAME}{}", self.os.exe_suffix())
    }

    /// Path of the resolver executable for `version` under `base_dir`
    pub fn locate(&self, base_dir: &Path, version: &str) -> Result<PathBuf> {
        let version = version.trim();
        if version.is_empty() {
            return Err(Error::configuration("resolver version must not be empty"));
        }

        Ok(base_dir
            .join(self.dir_name(version))
            .join(self.executable_name()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os.as_str(), self.arch.as_str())
    }
}

/// Locate the resolver for the running platform
pub fn locate(base_dir: &Path, version: &str) -> Result<PathBuf> {
    let platform = Platform::detect()?;
    let path = platform.locate(base_dir, version)?;
    tracing::debug!(%platform, path = %path.display(), "located resolver");
    Ok(path)
}
