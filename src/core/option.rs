//! Option schema - the declared build choices of a recipe.
//!
//! The schema is immutable once a recipe is loaded. Pruning may remove an
//! option from an effective [`Configuration`](super::configuration::Configuration),
//! but never from the schema itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::errors::RecipeError;

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean option (`shared`, `fPIC`, ...)
    Bool(bool),
    /// One of an enumerated set of strings
    Str(String),
}

impl OptionValue {
    /// Get the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

/// The set of values an option may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionDomain {
    /// `true` or `false`
    Boolean,
    /// Exactly one of the listed strings
    OneOf(Vec<String>),
}

impl OptionDomain {
    /// Check whether a value lies in this domain.
    pub fn contains(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (OptionDomain::Boolean, OptionValue::Bool(_)) => true,
            (OptionDomain::OneOf(values), OptionValue::Str(s)) => values.contains(s),
            _ => false,
        }
    }

    /// Parse a raw command-line or profile value into this domain.
    ///
    /// Booleans accept `true`/`false` in any case plus `1`/`0`, so both the
    /// `True` spelling of older recipe front ends and TOML's `true` work.
    pub fn parse(&self, raw: &str) -> Option<OptionValue> {
        match self {
            OptionDomain::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(OptionValue::Bool(true)),
                "false" | "0" => Some(OptionValue::Bool(false)),
                _ => None,
            },
            OptionDomain::OneOf(values) => {
                let raw = raw.trim();
                values
                    .iter()
                    .find(|v| v.as_str() == raw)
                    .map(|v| OptionValue::Str(v.clone()))
            }
        }
    }
}

impl fmt::Display for OptionDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionDomain::Boolean => write!(f, "[true, false]"),
            OptionDomain::OneOf(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// A declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    /// Option name as written in the recipe (case-sensitive, e.g. `fPIC`)
    pub name: String,

    /// Allowed values
    pub domain: OptionDomain,

    /// Default value (always inside `domain`)
    pub default: OptionValue,

    /// Explicit build variable name, overriding the prefix convention
    pub variable: Option<String>,

    /// One-line description shown by `galley info`
    pub description: Option<String>,
}

impl OptionDecl {
    /// Declare a boolean option.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        OptionDecl {
            name: name.into(),
            domain: OptionDomain::Boolean,
            default: OptionValue::Bool(default),
            variable: None,
            description: None,
        }
    }

    /// Set the explicit build variable name.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }
}

/// The ordered table of declared options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSchema {
    options: Vec<OptionDecl>,
}

impl OptionSchema {
    /// Build a schema, checking that names are unique and defaults lie in
    /// their domains.
    pub fn new(options: Vec<OptionDecl>) -> Result<Self, RecipeError> {
        for (i, decl) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.name == decl.name) {
                return Err(RecipeError::invalid_recipe(
                    "options",
                    format!("option `{}` is declared twice", decl.name),
                ));
            }

            if !decl.domain.contains(&decl.default) {
                return Err(RecipeError::invalid_recipe(
                    "options",
                    format!(
                        "default `{}` of option `{}` is not in {}",
                        decl.default, decl.name, decl.domain
                    ),
                ));
            }
        }

        Ok(OptionSchema { options })
    }

    /// Look up an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Check if an option is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.options.iter()
    }

    /// Declared option names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    /// Check a value against the schema.
    pub fn check(&self, name: &str, value: &OptionValue) -> Result<(), RecipeError> {
        let decl = self.get(name).ok_or_else(|| self.unknown(name, &value.to_string()))?;

        if !decl.domain.contains(value) {
            return Err(RecipeError::SchemaViolation {
                option: name.to_string(),
                value: value.to_string(),
                reason: format!("expected one of {}", decl.domain),
            });
        }

        Ok(())
    }

    /// Parse a raw value for the named option.
    pub fn parse_value(&self, name: &str, raw: &str) -> Result<OptionValue, RecipeError> {
        let decl = self.get(name).ok_or_else(|| self.unknown(name, raw))?;

        decl.domain
            .parse(raw)
            .ok_or_else(|| RecipeError::SchemaViolation {
                option: name.to_string(),
                value: raw.to_string(),
                reason: format!("expected one of {}", decl.domain),
            })
    }

    fn unknown(&self, name: &str, value: &str) -> RecipeError {
        RecipeError::SchemaViolation {
            option: name.to_string(),
            value: value.to_string(),
            reason: format!("unknown option, declared options: {}", self.names().join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> OptionSchema {
        OptionSchema::new(vec![
            OptionDecl::boolean("shared", false),
            OptionDecl::boolean("fPIC", true),
            OptionDecl {
                name: "simd".to_string(),
                domain: OptionDomain::OneOf(vec!["auto".to_string(), "off".to_string()]),
                default: OptionValue::from("auto"),
                variable: None,
                description: None,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_boolean_parsing() {
        let domain = OptionDomain::Boolean;
        assert_eq!(domain.parse("True"), Some(OptionValue::Bool(true)));
        assert_eq!(domain.parse("false"), Some(OptionValue::Bool(false)));
        assert_eq!(domain.parse("0"), Some(OptionValue::Bool(false)));
        assert_eq!(domain.parse("maybe"), None);
    }

    #[test]
    fn test_parse_value_rejects_unknown_option() {
        let err = schema().parse_value("lto", "True").unwrap_err();
        match err {
            RecipeError::SchemaViolation { option, reason, .. } => {
                assert_eq!(option, "lto");
                assert!(reason.contains("shared, fPIC, simd"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_value_rejects_out_of_domain() {
        assert!(schema().parse_value("simd", "avx512").is_err());
        assert_eq!(
            schema().parse_value("simd", "off").unwrap(),
            OptionValue::from("off")
        );
    }

    #[test]
    fn test_check_rejects_type_mismatch() {
        assert!(schema().check("shared", &OptionValue::from("yes")).is_err());
        assert!(schema().check("shared", &OptionValue::Bool(true)).is_ok());
    }

    #[test]
    fn test_schema_rejects_bad_default() {
        let result = OptionSchema::new(vec![OptionDecl {
            name: "simd".to_string(),
            domain: OptionDomain::OneOf(vec!["auto".to_string()]),
            default: OptionValue::Bool(true),
            variable: None,
            description: None,
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = OptionSchema::new(vec![
            OptionDecl::boolean("shared", false),
            OptionDecl::boolean("shared", true),
        ]);
        assert!(result.is_err());
    }
}
