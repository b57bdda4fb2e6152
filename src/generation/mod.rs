//! Recipe generations.
//!
//! The same engine serves two front ends that differ only in how overrides
//! are spelled and how the result is rendered. Pruning, validation and
//! publishing are shared; an adapter never computes metadata on its own.

pub mod current;
pub mod legacy;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::core::configuration::Overrides;
use crate::core::dependency::{DependencyDecl, DependencyScope};
use crate::core::metadata::{Component, PackageMetadata};
use crate::core::recipe::Recipe;
use crate::ops::pipeline::Resolution;
use crate::resolver::RecipeError;

pub use current::CurrentGeneration;
pub use legacy::LegacyGeneration;

/// Which recipe generation to speak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Generation {
    Legacy,
    #[default]
    Current,
}

impl Generation {
    /// The adapter for this generation.
    pub fn adapter(self) -> &'static dyn RecipeGeneration {
        match self {
            Generation::Legacy => &LegacyGeneration,
            Generation::Current => &CurrentGeneration,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Generation::Legacy => "legacy",
            Generation::Current => "current",
        }
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "v1" | "1" => Ok(Generation::Legacy),
            "current" | "v2" | "2" => Ok(Generation::Current),
            _ => Err(format!(
                "unknown generation `{}` (expected `legacy` or `current`)",
                s
            )),
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generation-specific front end.
pub trait RecipeGeneration: Send + Sync {
    /// Which generation this is.
    fn generation(&self) -> Generation;

    /// Strip the package scope from the name half of a `-o` argument.
    ///
    /// Returns `None` when the override targets a different package.
    fn unscope<'a>(&self, package: &str, name: &'a str) -> Option<&'a str>;

    /// Render a resolution and its metadata in this generation's shape.
    fn render(&self, resolution: &Resolution, metadata: &PackageMetadata) -> Value;

    /// Parse raw `-o` arguments against the recipe's schema.
    fn parse_overrides(&self, recipe: &Recipe, raw: &[String]) -> Result<Overrides, RecipeError> {
        let mut overrides = Overrides::new();

        for arg in raw {
            let (scoped, value) =
                arg.split_once('=')
                    .ok_or_else(|| RecipeError::SchemaViolation {
                        option: arg.to_string(),
                        value: String::new(),
                        reason: "expected `name=value`".to_string(),
                    })?;

            let Some(name) = self.unscope(recipe.name(), scoped.trim()) else {
                tracing::warn!("ignoring override `{}` for another package", arg);
                continue;
            };

            let name = name.trim();
            let value = recipe.schema.parse_value(name, value)?;
            overrides.set(name, value);
        }

        Ok(overrides)
    }
}

/// References of the dependencies in `scope`, in declaration order.
pub(crate) fn references(deps: &[DependencyDecl], scope: DependencyScope) -> Vec<String> {
    deps.iter()
        .filter(|d| d.scope == scope)
        .map(DependencyDecl::reference)
        .collect()
}

/// Build variables as rendered strings.
pub(crate) fn variables(resolution: &Resolution) -> Map<String, Value> {
    resolution
        .variables
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.render())))
        .collect()
}

/// The cpp_info fields both generations share for one component.
pub(crate) fn component_info(component: &Component) -> Map<String, Value> {
    let mut info = Map::new();
    info.insert("libs".into(), Value::from(component.libs.clone()));
    info.insert("includedirs".into(), Value::from(component.include_dirs.clone()));
    if let Some(cppstd) = &component.cppstd {
        info.insert("cppstd".into(), Value::from(cppstd.clone()));
    }
    let system_libs: Vec<String> = component.system_libs.values().flatten().cloned().collect();
    info.insert("system_libs".into(), Value::from(system_libs));
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::Configuration;
    use crate::core::option::{OptionDecl, OptionDomain, OptionSchema, OptionValue};
    use crate::core::settings::{Os, Settings};
    use crate::ops::pipeline::resolve;
    use crate::ops::publish::publish;
    use crate::test_support::dotenv_recipe;

    fn render(generation: Generation, os: Os, overrides: Overrides) -> Value {
        let recipe = dotenv_recipe();
        let settings = Settings::new(os).with_build_type("Release");
        let resolution = resolve(&recipe, &settings, &overrides).unwrap();
        let metadata = publish(&resolution.configuration, &settings, &recipe);
        generation.adapter().render(&resolution, &metadata)
    }

    #[test]
    fn test_generation_from_str() {
        assert_eq!("legacy".parse::<Generation>().unwrap(), Generation::Legacy);
        assert_eq!("V2".parse::<Generation>().unwrap(), Generation::Current);
        assert!("conan3".parse::<Generation>().is_err());
        assert_eq!(Generation::default(), Generation::Current);
    }

    #[test]
    fn test_generations_publish_equal_metadata() {
        for os in [Os::Linux, Os::FreeBSD, Os::Macos, Os::Windows] {
            for shared in [false, true] {
                let overrides = Overrides::new().with("shared", shared);
                let legacy = render(Generation::Legacy, os.clone(), overrides.clone());
                let current = render(Generation::Current, os.clone(), overrides);

                let legacy_component = &legacy["cpp_info"]["components"]["dotenv_lib"];
                let current_component = &current["cpp_info"]["components"]["dotenv_lib"];
                for key in ["libs", "includedirs", "cppstd", "system_libs"] {
                    assert_eq!(legacy_component[key], current_component[key], "{} on {}", key, os);
                }
                assert_eq!(legacy["package_id"], current["package_id"]);
                assert_eq!(legacy["options"], current["options"]);
            }
        }
    }

    #[test]
    fn test_parse_overrides_rejects_bad_values() {
        let recipe = dotenv_recipe();
        for generation in [Generation::Legacy, Generation::Current] {
            let adapter = generation.adapter();

            let err = adapter
                .parse_overrides(&recipe, &["shared=maybe".to_string()])
                .unwrap_err();
            assert!(matches!(err, RecipeError::SchemaViolation { .. }));

            let err = adapter
                .parse_overrides(&recipe, &["shared".to_string()])
                .unwrap_err();
            assert!(matches!(err, RecipeError::SchemaViolation { .. }));

            let err = adapter
                .parse_overrides(&recipe, &["with_yaml=True".to_string()])
                .unwrap_err();
            assert!(matches!(err, RecipeError::SchemaViolation { .. }));
        }
    }

    #[test]
    fn test_parse_overrides_value_with_colon() {
        let mut recipe = dotenv_recipe();
        let mut options: Vec<OptionDecl> = recipe.schema.iter().cloned().collect();
        options.push(OptionDecl {
            name: "sanitizer".to_string(),
            domain: OptionDomain::OneOf(vec!["none".into(), "address:undefined".into()]),
            default: OptionValue::Str("none".into()),
            variable: None,
            description: None,
        });
        recipe.schema = OptionSchema::new(options).unwrap();
        let expected = OptionValue::Str("address:undefined".into());

        for (generation, scoped) in [
            (Generation::Legacy, "dotenv:sanitizer=address:undefined"),
            (Generation::Current, "dotenv/*:sanitizer=address:undefined"),
        ] {
            let adapter = generation.adapter();
            let raw = ["sanitizer=address:undefined".to_string(), scoped.to_string()];
            for arg in raw {
                let overrides = adapter.parse_overrides(&recipe, &[arg.clone()]).unwrap();
                assert_eq!(overrides.get("sanitizer"), Some(&expected), "{arg}");
            }

            // A value outside the domain still fails instead of vanishing
            let err = adapter
                .parse_overrides(&recipe, &["sanitizer=thread:undefined".to_string()])
                .unwrap_err();
            assert!(matches!(err, RecipeError::SchemaViolation { .. }));
        }
    }

    #[test]
    fn test_parse_overrides_accepts_python_booleans() {
        let recipe = dotenv_recipe();
        let overrides = Generation::Legacy
            .adapter()
            .parse_overrides(&recipe, &["shared=True".to_string(), "fPIC=False".to_string()])
            .unwrap();

        assert_eq!(overrides.get("shared"), Some(&OptionValue::Bool(true)));
        assert_eq!(overrides.get("fPIC"), Some(&OptionValue::Bool(false)));

        // Pruning runs later, so the override itself survives
        let config = Configuration::from_schema(&recipe.schema, &overrides).unwrap();
        assert!(config.contains("fPIC"));
    }
}
