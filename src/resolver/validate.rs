//! Hard constraints checked after pruning.
//!
//! Validation never touches the build tool. A failure here aborts the run
//! before any dependency is declared or any variable translated.

use crate::core::configuration::Configuration;
use crate::core::option::OptionSchema;
use crate::core::settings::Settings;
use crate::core::standard::CppStandard;
use crate::resolver::errors::RecipeError;

/// Check a pruned configuration against the schema and the standard floor.
pub fn validate(
    package: &str,
    configuration: &Configuration,
    settings: &Settings,
    schema: &OptionSchema,
    min_cppstd: Option<CppStandard>,
) -> Result<(), RecipeError> {
    for (name, value) in configuration.iter() {
        schema.check(name, value)?;
    }

    if let Some(required) = min_cppstd {
        check_min_cppstd(package, settings.cppstd.as_deref(), required)?;
    }

    Ok(())
}

/// Fail if `requested` is below `required`.
///
/// An unset standard is left to the caller and passes.
pub fn check_min_cppstd(
    package: &str,
    requested: Option<&str>,
    required: CppStandard,
) -> Result<(), RecipeError> {
    let Some(raw) = requested else {
        tracing::debug!("no C++ standard requested, skipping {} check", required);
        return Ok(());
    };

    let unsupported = || RecipeError::UnsupportedStandard {
        package: package.to_string(),
        required,
        found: raw.to_string(),
    };

    let found: CppStandard = raw.parse().map_err(|_| unsupported())?;
    if found < required {
        return Err(unsupported());
    }

    Ok(())
}
