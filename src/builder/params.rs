//! Build variable translation.
//!
//! Maps a pruned configuration onto the flat CMake cache variables the
//! native build expects.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::configuration::Configuration;
use crate::core::option::{OptionSchema, OptionValue};
use crate::core::settings::Settings;

/// Variable carrying the build type.
pub const BUILD_TYPE_VARIABLE: &str = "CMAKE_BUILD_TYPE";

/// A CMake variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    /// Rendered as `ON` / `OFF`
    Bool(bool),
    /// Rendered verbatim
    Str(String),
}

impl VarValue {
    /// CMake's spelling.
    pub fn render(&self) -> String {
        match self {
            VarValue::Bool(true) => "ON".to_string(),
            VarValue::Bool(false) => "OFF".to_string(),
            VarValue::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&OptionValue> for VarValue {
    fn from(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(b) => VarValue::Bool(*b),
            OptionValue::Str(s) => VarValue::Str(s.clone()),
        }
    }
}

/// Ordered set of build variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildVariables {
    vars: BTreeMap<String, VarValue>,
}

impl BuildVariables {
    /// Create an empty set.
    pub fn new() -> Self {
        BuildVariables::default()
    }

    /// Set a variable.
    pub fn insert(&mut self, name: impl Into<String>, value: VarValue) {
        self.vars.insert(name.into(), value);
    }

    /// Get a variable.
    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.vars.get(name)
    }

    /// Check if a variable is set.
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Render as `-DKEY=VALUE` arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(k, v)| format!("-D{}={}", k, v.render()))
            .collect()
    }
}

/// Variable name for an option: the explicit one if declared, otherwise
/// `<PREFIX>_<NAME>`.
pub fn variable_name(schema: &OptionSchema, prefix: &str, option: &str) -> String {
    if let Some(explicit) = schema.get(option).and_then(|d| d.variable.as_ref()) {
        return explicit.clone();
    }

    let upper = option.to_ascii_uppercase();
    if prefix.is_empty() {
        upper
    } else {
        format!("{}_{}", prefix, upper)
    }
}

/// Translate a pruned configuration into build variables.
///
/// Emits exactly one variable per option present in `configuration`, plus
/// `CMAKE_BUILD_TYPE` when the settings carry a build type.
pub fn translate(
    configuration: &Configuration,
    settings: &Settings,
    schema: &OptionSchema,
    prefix: &str,
) -> BuildVariables {
    let mut vars = BuildVariables::new();

    for (name, value) in configuration.iter() {
        vars.insert(variable_name(schema, prefix, name), VarValue::from(value));
    }

    if let Some(build_type) = &settings.build_type {
        vars.insert(BUILD_TYPE_VARIABLE, VarValue::Str(build_type.as_str().to_string()));
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::Overrides;
    use crate::core::settings::Os;
    use crate::resolver::prune::prune;
    use crate::test_support::dotenv_recipe;

    fn translate_for(overrides: Overrides, settings: &Settings) -> BuildVariables {
        let recipe = dotenv_recipe();
        let config = Configuration::from_schema(&recipe.schema, &overrides).unwrap();
        let pruned = prune(&config, settings, &recipe.prune_rules);
        translate(&pruned, settings, &recipe.schema, &recipe.build.variable_prefix)
    }

    #[test]
    fn test_default_linux_variables() {
        let settings = Settings::new(Os::Linux).with_build_type("Release");
        let vars = translate_for(Overrides::new(), &settings);

        assert_eq!(vars.get("BUILD_SHARED_LIBS"), Some(&VarValue::Bool(false)));
        assert_eq!(
            vars.get("CMAKE_POSITION_INDEPENDENT_CODE"),
            Some(&VarValue::Bool(true))
        );
        assert_eq!(vars.get("DOTENV_ENABLE_TESTS"), Some(&VarValue::Bool(false)));
        assert_eq!(vars.get("DOTENV_ENABLE_SANITIZERS"), Some(&VarValue::Bool(false)));
        assert_eq!(vars.get("CMAKE_BUILD_TYPE").map(|v| v.render()), Some("Release".to_string()));
        assert_eq!(vars.len(), 6);
    }

    #[test]
    fn test_pruned_option_has_no_variable() {
        let vars = translate_for(Overrides::new(), &Settings::new(Os::Windows));
        assert!(!vars.contains("CMAKE_POSITION_INDEPENDENT_CODE"));
        assert!(!vars.contains("DOTENV_FPIC"));
        assert!(!vars.contains("CMAKE_BUILD_TYPE"));
    }

    #[test]
    fn test_build_type_passthrough() {
        let vars = translate_for(
            Overrides::new(),
            &Settings::new(Os::Linux).with_build_type("RelWithDebInfo"),
        );
        assert_eq!(
            vars.get("CMAKE_BUILD_TYPE"),
            Some(&VarValue::Str("RelWithDebInfo".to_string()))
        );
    }

    #[test]
    fn test_native_boolean_encoding() {
        let vars = translate_for(
            Overrides::new().with("enable_tests", true),
            &Settings::new(Os::Linux),
        );
        let args = vars.to_args();
        assert!(args.contains(&"-DDOTENV_ENABLE_TESTS=ON".to_string()));
        assert!(args.contains(&"-DBUILD_SHARED_LIBS=OFF".to_string()));
    }

    #[test]
    fn test_variable_name_without_prefix() {
        let recipe = dotenv_recipe();
        assert_eq!(variable_name(&recipe.schema, "", "enable_tests"), "ENABLE_TESTS");
        assert_eq!(variable_name(&recipe.schema, "X", "shared"), "BUILD_SHARED_LIBS");
    }
}
