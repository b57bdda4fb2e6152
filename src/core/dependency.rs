//! Dependency declarations emitted by a recipe.

use std::fmt;

use semver::Version;
use serde::Serialize;

/// When a dependency is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyScope {
    /// Needed only while building (e.g., a unit-test framework)
    BuildOnly,
    /// Needed by consumers of the package
    Runtime,
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyScope::BuildOnly => write!(f, "build-only"),
            DependencyScope::Runtime => write!(f, "runtime"),
        }
    }
}

/// A single declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyDecl {
    /// Package name (e.g., "gtest")
    pub name: String,

    /// Pinned version
    pub version: Version,

    /// Build-only or runtime
    pub scope: DependencyScope,

    /// Header used to detect an installed copy (relative to `include/`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,
}

impl DependencyDecl {
    /// The `name/version` reference string.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

impl fmt::Display for DependencyDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reference(), self.scope)
    }
}
