//! Galley.toml recipe parsing and schema.
//!
//! A recipe declares one native library: its options, the rules that prune
//! them per platform, its dependencies, how its build variables are named,
//! and the component it publishes to consumers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;

use crate::core::option::{OptionDecl, OptionDomain, OptionSchema, OptionValue};
use crate::core::settings::Os;
use crate::core::standard::CppStandard;
use crate::resolver::errors::RecipeError;
use crate::resolver::prune::{PruneCondition, PruneRule};

/// Canonical recipe file name.
pub const RECIPE_NAME: &str = "Galley.toml";

/// A loaded, validated recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Package metadata
    pub package: RecipePackage,

    /// Declared options
    pub schema: OptionSchema,

    /// Pruning rules, in application order
    pub prune_rules: Vec<PruneRule>,

    /// Language floor and dependencies
    pub requirements: Requirements,

    /// Build tool wiring
    pub build: BuildSection,

    /// The component published to consumers
    pub component: ComponentDecl,

    /// CMake package names for consumers
    pub cmake: CMakeNamesDecl,

    /// Smoke-test harness
    pub harness: Option<HarnessConfig>,

    /// Directory containing the recipe (default source directory)
    pub recipe_dir: PathBuf,
}

/// `[package]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipePackage {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Source globs exported alongside the recipe
    #[serde(default)]
    pub exports_sources: Vec<String>,
}

/// `[requirements]` section.
#[derive(Debug, Clone, Default)]
pub struct Requirements {
    /// Minimum C++ standard
    pub min_cppstd: Option<CppStandard>,

    /// Test framework, declared only when tests are enabled
    pub test: Option<PinnedRequirement>,

    /// Always-declared runtime dependencies
    pub requires: Vec<PinnedRequirement>,
}

/// A dependency pinned to one version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinnedRequirement {
    pub name: String,
    pub version: Version,
    /// Header used to detect an installed copy
    #[serde(default)]
    pub probe: Option<String>,
}

/// `[build]` section.
#[derive(Debug, Clone)]
pub struct BuildSection {
    /// Prefix for derived build variable names (e.g., "DOTENV")
    pub variable_prefix: String,

    /// License file, relative to the source directory
    pub license_file: PathBuf,

    /// Whether the package step runs the build tool's install
    pub install: bool,

    /// Boolean option that enables the test step and test dependency
    pub tests_option: String,

    /// File that must exist in the source directory before configuring
    pub cmake_entry: PathBuf,
}

/// `[component]` section.
#[derive(Debug, Clone)]
pub struct ComponentDecl {
    pub name: String,
    pub libs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub cppstd: Option<CppStandard>,
    /// System libraries per target OS
    pub system_libs: BTreeMap<Os, Vec<String>>,
    pub cmake_target_name: Option<String>,
}

/// `[cmake]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CMakeNamesDecl {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
}

/// `[harness]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Header to include
    pub header: String,
    /// Expression evaluated in `main`
    pub test_call: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    package: RecipePackage,
    #[serde(default, rename = "option")]
    options: Vec<RawOption>,
    #[serde(default)]
    prune: Vec<RawPruneRule>,
    #[serde(default)]
    requirements: RawRequirements,
    #[serde(default)]
    build: RawBuild,
    component: RawComponent,
    #[serde(default)]
    cmake: CMakeNamesDecl,
    #[serde(default)]
    harness: Option<HarnessConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOption {
    name: String,
    default: toml::Value,
    #[serde(default)]
    values: Option<Vec<String>>,
    #[serde(default)]
    variable: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPruneRule {
    option: String,
    when: RawCondition,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCondition {
    #[serde(default)]
    os: Option<Vec<String>>,
    #[serde(default)]
    option: Option<String>,
    #[serde(default)]
    equals: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequirements {
    #[serde(default)]
    min_cppstd: Option<String>,
    #[serde(default)]
    test: Option<PinnedRequirement>,
    #[serde(default)]
    requires: Vec<PinnedRequirement>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuild {
    #[serde(default)]
    variable_prefix: Option<String>,
    #[serde(default)]
    license_file: Option<PathBuf>,
    #[serde(default)]
    install: Option<bool>,
    #[serde(default)]
    tests_option: Option<String>,
    #[serde(default)]
    cmake_entry: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComponent {
    name: String,
    libs: Vec<String>,
    #[serde(default = "default_include_dirs")]
    include_dirs: Vec<String>,
    #[serde(default)]
    cppstd: Option<String>,
    #[serde(default)]
    system_libs: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    cmake_target_name: Option<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string()]
}

impl Recipe {
    /// Load a recipe from a file, or from `Galley.toml` inside a directory.
    pub fn load(path: &Path) -> Result<Self> {
        let file = if path.is_dir() {
            path.join(RECIPE_NAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read recipe: {}", file.display()))?;

        let recipe = Self::parse(&content, &file)?;
        Ok(recipe)
    }

    /// Parse a recipe from TOML content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RecipeError> {
        let source_name = path.display().to_string();
        let raw: RawRecipe = toml::from_str(content)
            .map_err(|e| RecipeError::invalid_recipe(&source_name, e.to_string()))?;

        let invalid = |message: String| RecipeError::invalid_recipe(&source_name, message);

        let options = raw
            .options
            .into_iter()
            .map(|o| convert_option(o).map_err(&invalid))
            .collect::<Result<Vec<_>, _>>()?;
        let schema = OptionSchema::new(options).map_err(|e| match e {
            RecipeError::InvalidRecipe { message, .. } => invalid(message),
            other => other,
        })?;

        let prune_rules = raw
            .prune
            .into_iter()
            .map(|r| convert_prune_rule(r, &schema).map_err(&invalid))
            .collect::<Result<Vec<_>, _>>()?;

        let min_cppstd = raw
            .requirements
            .min_cppstd
            .map(|s| s.parse::<CppStandard>())
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        let requirements = Requirements {
            min_cppstd,
            test: raw.requirements.test,
            requires: raw.requirements.requires,
        };

        let build = BuildSection {
            variable_prefix: raw
                .build
                .variable_prefix
                .unwrap_or_else(|| raw.package.name.to_ascii_uppercase().replace('-', "_")),
            license_file: raw
                .build
                .license_file
                .unwrap_or_else(|| PathBuf::from("LICENSE")),
            install: raw.build.install.unwrap_or(true),
            tests_option: raw
                .build
                .tests_option
                .unwrap_or_else(|| "enable_tests".to_string()),
            cmake_entry: raw
                .build
                .cmake_entry
                .unwrap_or_else(|| PathBuf::from("CMakeLists.txt")),
        };

        if requirements.test.is_some() {
            match schema.get(&build.tests_option) {
                Some(decl) if decl.domain == OptionDomain::Boolean => {}
                _ => {
                    return Err(invalid(format!(
                        "a test requirement needs the boolean option `{}`",
                        build.tests_option
                    )))
                }
            }
        }

        let component = convert_component(raw.component).map_err(&invalid)?;

        Ok(Recipe {
            package: raw.package,
            schema,
            prune_rules,
            requirements,
            build,
            component,
            cmake: raw.cmake,
            harness: raw.harness,
            recipe_dir: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        })
    }

    /// Recipe name.
    pub fn name(&self) -> &str {
        &self.package.name
    }

    /// Recipe version.
    pub fn version(&self) -> &Version {
        &self.package.version
    }
}

fn convert_option(raw: RawOption) -> Result<OptionDecl, String> {
    let (domain, default) = match (raw.default, raw.values) {
        (toml::Value::Boolean(b), None) => (OptionDomain::Boolean, OptionValue::Bool(b)),
        (toml::Value::Boolean(_), Some(_)) => {
            return Err(format!(
                "option `{}` is boolean and cannot list `values`",
                raw.name
            ))
        }
        (toml::Value::String(s), Some(values)) => {
            if values.is_empty() {
                return Err(format!("option `{}` has an empty `values` list", raw.name));
            }
            (OptionDomain::OneOf(values), OptionValue::Str(s))
        }
        (toml::Value::String(_), None) => {
            return Err(format!(
                "option `{}` has a string default and needs a `values` list",
                raw.name
            ))
        }
        (other, _) => {
            return Err(format!(
                "option `{}` default must be a boolean or string, got {}",
                raw.name,
                other.type_str()
            ))
        }
    };

    Ok(OptionDecl {
        name: raw.name,
        domain,
        default,
        variable: raw.variable,
        description: raw.description,
    })
}

fn convert_prune_rule(raw: RawPruneRule, schema: &OptionSchema) -> Result<PruneRule, String> {
    if !schema.contains(&raw.option) {
        return Err(format!("prune rule names unknown option `{}`", raw.option));
    }

    let when = match (raw.when.os, raw.when.option, raw.when.equals) {
        (Some(targets), None, None) => {
            PruneCondition::Os(targets.iter().map(|s| Os::from(s.as_str())).collect())
        }
        (None, Some(option), Some(equals)) => {
            let value = match equals {
                toml::Value::Boolean(b) => OptionValue::Bool(b),
                toml::Value::String(s) => OptionValue::Str(s),
                other => {
                    return Err(format!(
                        "prune condition value must be a boolean or string, got {}",
                        other.type_str()
                    ))
                }
            };
            schema
                .check(&option, &value)
                .map_err(|e| format!("prune condition on `{}`: {}", raw.option, e))?;
            PruneCondition::OptionEquals { option, value }
        }
        _ => {
            return Err(format!(
                "prune rule for `{}` needs either `os` or `option` + `equals`",
                raw.option
            ))
        }
    };

    Ok(PruneRule {
        option: raw.option,
        when,
    })
}

fn convert_component(raw: RawComponent) -> Result<ComponentDecl, String> {
    if raw.libs.is_empty() {
        return Err(format!("component `{}` declares no libs", raw.name));
    }

    let cppstd = raw
        .cppstd
        .map(|s| s.parse::<CppStandard>())
        .transpose()
        .map_err(|e| e.to_string())?;

    let system_libs = raw
        .system_libs
        .into_iter()
        .map(|(os, libs)| (Os::from(os.as_str()), libs))
        .collect();

    Ok(ComponentDecl {
        name: raw.name,
        libs: raw.libs,
        include_dirs: raw.include_dirs,
        cppstd,
        system_libs,
        cmake_target_name: raw.cmake_target_name,
    })
}
