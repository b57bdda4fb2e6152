//! Effective option configuration.
//!
//! A [`Configuration`] is an immutable value: every phase that changes it
//! (override application, pruning) returns a new one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::option::{OptionSchema, OptionValue};
use crate::resolver::errors::RecipeError;

/// Caller-supplied option overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Overrides {
    values: BTreeMap<String, OptionValue>,
}

impl Overrides {
    /// Create an empty set of overrides.
    pub fn new() -> Self {
        Overrides::default()
    }

    /// Set an override.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get an override.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Iterate overrides in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if no overrides were given.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check every override against the schema.
    pub fn check(&self, schema: &OptionSchema) -> Result<(), RecipeError> {
        for (name, value) in &self.values {
            schema.check(name, value)?;
        }
        Ok(())
    }
}

/// Mapping from option name to resolved value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, OptionValue>,
}

impl Configuration {
    /// Schema defaults with the overrides applied on top.
    ///
    /// Overrides are checked first; an unknown name or out-of-domain value
    /// is rejected before anything else runs.
    pub fn from_schema(schema: &OptionSchema, overrides: &Overrides) -> Result<Self, RecipeError> {
        overrides.check(schema)?;

        let mut values: BTreeMap<String, OptionValue> = schema
            .iter()
            .map(|decl| (decl.name.clone(), decl.default.clone()))
            .collect();

        for (name, value) in overrides.iter() {
            values.insert(name.to_string(), value.clone());
        }

        Ok(Configuration { values })
    }

    /// Get the value of an option, if present.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Check if an option is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// True only if the option is present and set to boolean `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    /// Iterate options in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no options are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A copy of this configuration without `name`.
    ///
    /// Removing an absent option returns an equal configuration.
    pub fn without(&self, name: &str) -> Configuration {
        let mut values = self.values.clone();
        values.remove(name);
        Configuration { values }
    }
}
