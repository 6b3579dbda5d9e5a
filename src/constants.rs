/// Environment variables consulted when resolving the build target
pub mod env {
    /// Overrides the target operating system (e.g. linux, darwin, windows)
    pub const TARGET_OS: &str = "SVCBUILD_TARGET_OS";

    /// Overrides the target architecture (e.g. amd64, arm64)
    pub const TARGET_ARCH: &str = "SVCBUILD_TARGET_ARCH";
}

/// Artifact directory layout
pub mod artifact {
    /// Default artifact directory, relative to the project root
    pub const DEFAULT_DIR: &str = "dist";

    /// Generated POSIX shell demo script
    pub const DEMO_SH: &str = "demo.sh";

    /// Generated Windows batch demo script
    pub const DEMO_BAT: &str = "demo.bat";
}

/// Project configuration file names
pub mod config {
    /// Project-local configuration file
    pub const PROJECT_FILE: &str = "svcbuild.toml";

    /// Directory under the user config dir
    pub const USER_DIR: &str = "svcbuild";

    /// File inside the user config directory
    pub const USER_FILE: &str = "config.toml";
}

/// Platform identifiers, `os/arch`
pub mod platform {
    /// Linux x86-64, the usual CI and server target
    pub const LINUX_AMD64: &str = "linux/amd64";

    /// Linux 64-bit ARM
    pub const LINUX_ARM64: &str = "linux/arm64";

    /// macOS on Apple silicon
    pub const DARWIN_ARM64: &str = "darwin/arm64";

    /// Windows x86-64; binaries get an `.exe` suffix
    pub const WINDOWS_AMD64: &str = "windows/amd64";
}
