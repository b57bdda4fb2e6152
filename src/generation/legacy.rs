//! The legacy generation.
//!
//! Overrides may be scoped as `pkg:name=value`. Metadata is rendered with
//! top-level `cpp_info` aliases next to the component, `names` for the
//! find-package generators, `build_requires` and CMake `definitions`.

use serde_json::{json, Value};

use crate::core::dependency::DependencyScope;
use crate::core::metadata::PackageMetadata;
use crate::generation::{component_info, references, variables, Generation, RecipeGeneration};
use crate::ops::pipeline::Resolution;

/// Legacy recipe front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyGeneration;

impl RecipeGeneration for LegacyGeneration {
    fn generation(&self) -> Generation {
        Generation::Legacy
    }

    fn unscope<'a>(&self, package: &str, name: &'a str) -> Option<&'a str> {
        match name.split_once(':') {
            Some((scope, rest)) if scope == package => Some(rest),
            Some(_) => None,
            None => Some(name),
        }
    }

    fn render(&self, resolution: &Resolution, metadata: &PackageMetadata) -> Value {
        let aliases = &metadata.legacy_aliases;
        let system_libs: Vec<&String> = aliases.system_libs().values().flatten().collect();
        let component = &metadata.component;

        json!({
            "generation": Generation::Legacy.as_str(),
            "reference": metadata.reference(),
            "package_id": metadata.package_id,
            "settings": resolution.settings,
            "options": resolution.configuration,
            "build_requires": references(&resolution.dependencies, DependencyScope::BuildOnly),
            "requires": references(&resolution.dependencies, DependencyScope::Runtime),
            "definitions": variables(resolution),
            "steps": resolution.plan.steps,
            "cpp_info": {
                "libs": aliases.libs(),
                "includedirs": aliases.include_dirs(),
                "cppstd": aliases.cppstd(),
                "system_libs": system_libs,
                "names": {
                    "cmake_find_package": metadata.cmake.file_name,
                    "cmake_find_package_multi": metadata.cmake.file_name,
                },
                "components": {
                    component.name.clone(): component_info(component),
                },
            },
        })
    }
}
