//! Metadata publishing.

use std::collections::BTreeMap;

use crate::core::configuration::Configuration;
use crate::core::metadata::{CMakeNames, Component, Linkage, PackageMetadata};
use crate::core::recipe::Recipe;
use crate::core::settings::Settings;
use crate::util::hash::package_id;

/// Build the consumer-facing metadata for a resolved configuration.
///
/// A pure function of its inputs: sequences keep recipe order, and system
/// libraries are reduced to the target OS class.
pub fn publish(
    configuration: &Configuration,
    settings: &Settings,
    recipe: &Recipe,
) -> PackageMetadata {
    let decl = &recipe.component;
    let package = recipe.name();

    let system_libs: BTreeMap<_, _> = decl
        .system_libs
        .get(&settings.os)
        .filter(|libs| !libs.is_empty())
        .map(|libs| BTreeMap::from([(settings.os.clone(), libs.clone())]))
        .unwrap_or_default();

    let component = Component {
        name: decl.name.clone(),
        libs: decl.libs.clone(),
        include_dirs: decl.include_dirs.clone(),
        cppstd: decl.cppstd.map(|std| std.as_number().to_string()),
        system_libs,
        cmake_target_name: Some(
            decl.cmake_target_name
                .clone()
                .unwrap_or_else(|| format!("{}::{}", package, decl.name)),
        ),
    };

    let cmake = CMakeNames {
        file_name: recipe
            .cmake
            .file_name
            .clone()
            .unwrap_or_else(|| package.to_string()),
        target_name: recipe
            .cmake
            .target_name
            .clone()
            .unwrap_or_else(|| format!("{}::{}", package, package)),
    };

    let version = recipe.version().to_string();
    PackageMetadata::new(
        package.to_string(),
        recipe.version().clone(),
        package_id(package, &version, configuration, settings),
        Linkage::from_configuration(configuration),
        component,
        cmake,
    )
}
