//! Consumer-facing package metadata.
//!
//! The legacy top-level aliases have no constructor of their own: they can
//! only be obtained by projecting the component, so the two never disagree.

use std::collections::BTreeMap;
use std::fmt;

use semver::Version;
use serde::Serialize;

use crate::core::configuration::Configuration;
use crate::core::settings::Os;

/// Option that selects a shared build.
pub const SHARED_OPTION: &str = "shared";

/// Library linkage of the packaged artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    Static,
    Shared,
}

impl Linkage {
    /// Derive linkage from the `shared` option. A missing option is static.
    pub fn from_configuration(configuration: &Configuration) -> Self {
        if configuration.flag(SHARED_OPTION) {
            Linkage::Shared
        } else {
            Linkage::Static
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Static => write!(f, "static"),
            Linkage::Shared => write!(f, "shared"),
        }
    }
}

/// The single consumable unit of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component name (e.g., "dotenv_lib")
    pub name: String,

    /// Library names, link order
    pub libs: Vec<String>,

    /// Include directories relative to the package root
    pub include_dirs: Vec<String>,

    /// Required C++ standard as a bare number (e.g., "20")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cppstd: Option<String>,

    /// System libraries for the target OS class
    pub system_libs: BTreeMap<Os, Vec<String>>,

    /// Namespaced CMake target for the component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmake_target_name: Option<String>,
}

impl Component {
    /// System libraries to link on `os`, in order.
    pub fn system_libs_for(&self, os: &Os) -> &[String] {
        self.system_libs.get(os).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// CMake package names used by `find_package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CMakeNames {
    /// `<file_name>Config.cmake`
    pub file_name: String,

    /// Package-level target (e.g., "dotenv::dotenv")
    pub target_name: String,
}

/// Top-level fields older consumers read instead of the component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyAliases {
    libs: Vec<String>,
    include_dirs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cppstd: Option<String>,
    system_libs: BTreeMap<Os, Vec<String>>,
}

impl LegacyAliases {
    /// Project a component onto the legacy top-level fields.
    pub fn project(component: &Component) -> Self {
        LegacyAliases {
            libs: component.libs.clone(),
            include_dirs: component.include_dirs.clone(),
            cppstd: component.cppstd.clone(),
            system_libs: component.system_libs.clone(),
        }
    }

    pub fn libs(&self) -> &[String] {
        &self.libs
    }

    pub fn include_dirs(&self) -> &[String] {
        &self.include_dirs
    }

    pub fn cppstd(&self) -> Option<&str> {
        self.cppstd.as_deref()
    }

    pub fn system_libs(&self) -> &BTreeMap<Os, Vec<String>> {
        &self.system_libs
    }
}

/// Everything a consumer learns about a built package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
    /// Package name
    pub name: String,

    /// Package version
    pub version: Version,

    /// Binary identity of this configuration
    pub package_id: String,

    /// Static or shared
    pub linkage: Linkage,

    /// The published component
    pub component: Component,

    /// CMake package names
    pub cmake: CMakeNames,

    /// Mirror of the component for older consumers
    pub legacy_aliases: LegacyAliases,
}

impl PackageMetadata {
    /// Assemble metadata; the legacy aliases are projected from `component`.
    pub fn new(
        name: String,
        version: Version,
        package_id: String,
        linkage: Linkage,
        component: Component,
        cmake: CMakeNames,
    ) -> Self {
        let legacy_aliases = LegacyAliases::project(&component);
        PackageMetadata {
            name,
            version,
            package_id,
            linkage,
            component,
            cmake,
            legacy_aliases,
        }
    }

    /// Reference string (e.g., "dotenv/2.0.0").
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}
