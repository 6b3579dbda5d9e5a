//! Build target resolution
//!
//! Targets use Go-style platform names (`linux/amd64`, `darwin/arm64`,
//! `windows/amd64`), the same `os/arch` form accepted by `--platform`.

use anyhow::Result;
use std::fmt;

use crate::constants::env;
use crate::error::PipelineError;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub os: String,
    pub arch: String,
}

impl BuildTarget {
    /// Names are lowercased; GOOS/GOARCH and the triple table only know lowercase
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into().to_ascii_lowercase(),
            arch: arch.into().to_ascii_lowercase(),
        }
    }

    /// The platform this binary is running on
    pub fn host() -> Self {
        Self::new(
            host_os_name(std::env::consts::OS),
            host_arch_name(std::env::consts::ARCH),
        )
    }

    /// Resolve the target from environment overrides, falling back to the host.
    ///
    /// `lookup` is the environment; unset and empty values both count as absent.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = Self::host();
        let pick = |key: &str, fallback: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(|value| value.trim().to_string())
                .unwrap_or(fallback)
        };
        Self::new(pick(env::TARGET_OS, host.os), pick(env::TARGET_ARCH, host.arch))
    }

    /// Resolve against the process environment
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Parse an `os/arch` platform string
    pub fn parse_platform(platform: &str) -> Result<Self> {
        let parts: Vec<&str> = platform.split('/').collect();
        match parts.as_slice() {
            [os, arch] if !os.is_empty() && !arch.is_empty() => Ok(Self::new(*os, *arch)),
            _ => Err(PipelineError::config(format!(
                "invalid platform {:?}, expected OS/ARCH (e.g. linux/amd64)",
                platform
            ))
            .into()),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// File name of a service binary on this target
    pub fn executable_name(&self, name: &str) -> String {
        if self.is_windows() {
            format!("{}.exe", name)
        } else {
            name.to_string()
        }
    }

    /// Rust target triple used by the cargo toolchain
    pub fn rust_triple(&self) -> Result<String> {
        let triple = match (self.os.as_str(), self.arch.as_str()) {
            ("linux", "amd64") => "x86_64-unknown-linux-musl",
            ("linux", "arm64") => "aarch64-unknown-linux-musl",
            ("linux", "arm") => "armv7-unknown-linux-musleabihf",
            ("linux", "386") => "i686-unknown-linux-musl",
            ("linux", "ppc64le") => "powerpc64le-unknown-linux-musl",
            ("linux", "s390x") => "s390x-unknown-linux-musl",
            ("linux", "riscv64") => "riscv64gc-unknown-linux-musl",
            ("darwin", "amd64") => "x86_64-apple-darwin",
            ("darwin", "arm64") => "aarch64-apple-darwin",
            ("windows", "amd64") => "x86_64-pc-windows-msvc",
            ("windows", "arm64") => "aarch64-pc-windows-msvc",
            ("windows", "386") => "i686-pc-windows-msvc",
            _ => anyhow::bail!("Unsupported platform for cargo: {}", self),
        };
        Ok(triple.to_string())
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn host_os_name(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch_name(arch: &str) -> &str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
