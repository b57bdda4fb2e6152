//! The current generation.
//!
//! Overrides may be scoped as `pkg/*:name=value`. Metadata lives on the
//! component only, with CMake names carried as properties; the test
//! framework is a `test_requires` and build variables belong to the
//! toolchain.

use serde_json::{json, Value};

use crate::core::dependency::DependencyScope;
use crate::core::metadata::PackageMetadata;
use crate::generation::{component_info, references, variables, Generation, RecipeGeneration};
use crate::ops::pipeline::Resolution;

/// Current recipe front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentGeneration;

impl RecipeGeneration for CurrentGeneration {
    fn generation(&self) -> Generation {
        Generation::Current
    }

    fn unscope<'a>(&self, package: &str, name: &'a str) -> Option<&'a str> {
        let Some((scope, rest)) = name.split_once(':') else {
            return Some(name);
        };

        let name = scope.split_once('/').map_or(scope, |(name, _)| name);
        (name == package || name == "*").then_some(rest)
    }

    fn render(&self, resolution: &Resolution, metadata: &PackageMetadata) -> Value {
        let component = &metadata.component;
        let mut info = component_info(component);
        if let Some(target) = &component.cmake_target_name {
            info.insert("properties".into(), json!({ "cmake_target_name": target }));
        }

        json!({
            "generation": Generation::Current.as_str(),
            "reference": metadata.reference(),
            "package_id": metadata.package_id,
            "settings": resolution.settings,
            "options": resolution.configuration,
            "test_requires": references(&resolution.dependencies, DependencyScope::BuildOnly),
            "requires": references(&resolution.dependencies, DependencyScope::Runtime),
            "toolchain": {
                "variables": variables(resolution),
            },
            "steps": resolution.plan.steps,
            "cpp_info": {
                "properties": {
                    "cmake_file_name": metadata.cmake.file_name,
                    "cmake_target_name": metadata.cmake.target_name,
                },
                "components": {
                    component.name.clone(): info,
                },
            },
        })
    }
}
