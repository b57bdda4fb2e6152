//! Settings context - the target platform a recipe is resolved for.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Target operating system.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Os {
    Linux,
    FreeBSD,
    Macos,
    Windows,
    Android,
    Ios,
    /// Any other spelling, kept verbatim
    Other(String),
}

impl Os {
    /// The host operating system.
    pub fn host() -> Self {
        Os::from(std::env::consts::OS)
    }

    /// Canonical spelling (e.g., "Linux", "Windows").
    pub fn as_str(&self) -> &str {
        match self {
            Os::Linux => "Linux",
            Os::FreeBSD => "FreeBSD",
            Os::Macos => "Macos",
            Os::Windows => "Windows",
            Os::Android => "Android",
            Os::Ios => "iOS",
            Os::Other(s) => s,
        }
    }
}

impl From<&str> for Os {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Os::Linux,
            "freebsd" => Os::FreeBSD,
            "macos" | "darwin" | "osx" => Os::Macos,
            "windows" | "win32" => Os::Windows,
            "android" => Os::Android,
            "ios" => Os::Ios,
            _ => Os::Other(s.to_string()),
        }
    }
}

impl From<String> for Os {
    fn from(s: String) -> Self {
        Os::from(s.as_str())
    }
}

impl From<Os> for String {
    fn from(os: Os) -> Self {
        os.as_str().to_string()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build type.
///
/// `Debug` and `Release` are recognized; any other spelling (e.g.
/// `RelWithDebInfo`) is carried through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildType {
    Debug,
    Release,
    Other(String),
}

impl BuildType {
    /// The spelling handed to the build tool.
    pub fn as_str(&self) -> &str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::Other(s) => s,
        }
    }
}

impl From<&str> for BuildType {
    fn from(s: &str) -> Self {
        match s {
            "Debug" | "debug" => BuildType::Debug,
            "Release" | "release" => BuildType::Release,
            _ => BuildType::Other(s.to_string()),
        }
    }
}

impl From<String> for BuildType {
    fn from(s: String) -> Self {
        BuildType::from(s.as_str())
    }
}

impl From<BuildType> for String {
    fn from(bt: BuildType) -> Self {
        bt.as_str().to_string()
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The settings a pipeline run is resolved against.
///
/// Treated as immutable input once handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Target operating system
    pub os: Os,

    /// Compiler identity (e.g., "gcc", "clang", "msvc")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    /// Compiler version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_version: Option<String>,

    /// Build type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,

    /// CPU architecture (e.g., "x86_64", "armv8")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    /// Requested C++ standard, unparsed (e.g., "17", "gnu20")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<String>,
}

impl Settings {
    /// Settings for the given OS with everything else unspecified.
    pub fn new(os: Os) -> Self {
        Settings {
            os,
            compiler: None,
            compiler_version: None,
            build_type: None,
            arch: None,
            cppstd: None,
        }
    }

    /// Settings describing the host machine.
    pub fn host() -> Self {
        let mut settings = Settings::new(Os::host());
        settings.arch = Some(normalize_arch(std::env::consts::ARCH).to_string());
        settings
    }

    /// Set the build type.
    pub fn with_build_type(mut self, build_type: impl Into<BuildType>) -> Self {
        self.build_type = Some(build_type.into());
        self
    }

    /// Set the requested C++ standard.
    pub fn with_cppstd(mut self, cppstd: impl Into<String>) -> Self {
        self.cppstd = Some(cppstd.into());
        self
    }

    /// Set the architecture.
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Apply a single `key=value` setting.
    ///
    /// Accepts both the dotted compiler sub-settings (`compiler.cppstd`,
    /// `compiler.version`) and the flat `cppstd` shorthand.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key.trim() {
            "os" => self.os = Os::from(value),
            "compiler" => self.compiler = Some(value.to_string()),
            "compiler.version" => self.compiler_version = Some(value.to_string()),
            "compiler.cppstd" | "cppstd" => self.cppstd = Some(value.to_string()),
            "build_type" => self.build_type = Some(BuildType::from(value)),
            "arch" => self.arch = Some(value.to_string()),
            // Runtime/libcxx sub-settings do not affect resolution
            "compiler.libcxx" | "compiler.runtime" | "compiler.runtime_type" => {
                tracing::debug!("ignoring setting `{}`", key);
            }
            other => bail!(
                "unknown setting `{}`\n\
                 valid settings: os, compiler, compiler.version, compiler.cppstd, build_type, arch",
                other
            ),
        }
        Ok(())
    }

    /// Whether binaries built for these settings can run on the host.
    pub fn can_run_on_host(&self) -> bool {
        if self.os != Os::host() {
            return false;
        }

        match self.arch.as_deref() {
            None => true,
            Some(arch) => normalize_arch(arch) == normalize_arch(std::env::consts::ARCH),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::host()
    }
}

/// Map architecture aliases onto one spelling.
fn normalize_arch(arch: &str) -> &str {
    match arch {
        "x86_64" | "amd64" | "x64" => "x86_64",
        "aarch64" | "arm64" | "armv8" => "armv8",
        "x86" | "i686" | "i386" => "x86",
        other => other,
    }
}
