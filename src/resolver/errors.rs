//! Recipe pipeline error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::builder::orchestrator::Step;
use crate::core::standard::CppStandard;
use crate::util::diagnostic::Diagnostic;

/// Error raised by any phase of a recipe pipeline run.
///
/// Every variant aborts the run at the point of detection. No metadata is
/// published for a run that produced one of these.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// An override (or configuration value) does not fit the option schema.
    #[error("invalid value `{value}` for option `{option}`: {reason}")]
    #[diagnostic(code(galley::schema::violation))]
    SchemaViolation {
        option: String,
        value: String,
        reason: String,
    },

    /// The requested language standard is below the recipe's floor.
    #[error("`{package}` requires {required} but the requested standard is {found}")]
    #[diagnostic(
        code(galley::validate::unsupported_standard),
        help(
            "pass -s compiler.cppstd={} or higher, or leave the standard unset",
            .required.as_number()
        )
    )]
    UnsupportedStandard {
        package: String,
        required: CppStandard,
        found: String,
    },

    /// A declared dependency could not be satisfied by the environment.
    #[error("could not satisfy dependency `{reference}`: {message}")]
    #[diagnostic(code(galley::dependency::unresolved))]
    DependencyResolution { reference: String, message: String },

    /// The native build tool reported failure for a step.
    #[error("{step} step failed: {message}")]
    #[diagnostic(code(galley::build::step_failed))]
    StepFailure { step: Step, message: String },

    /// A file the package step must produce or propagate is absent.
    #[error("missing {what}: {}", path.display())]
    #[diagnostic(code(galley::package::missing_artifact))]
    MissingArtifact { what: String, path: PathBuf },

    /// The recipe file itself is malformed.
    #[error("invalid recipe `{source_name}`: {message}")]
    #[diagnostic(code(galley::recipe::invalid))]
    InvalidRecipe { source_name: String, message: String },
}

impl RecipeError {
    /// Create an invalid-recipe error.
    pub fn invalid_recipe(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        RecipeError::InvalidRecipe {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// The pipeline phase this error was detected in.
    pub fn phase(&self) -> &'static str {
        match self {
            RecipeError::SchemaViolation { .. } => "overrides",
            RecipeError::UnsupportedStandard { .. } => "validate",
            RecipeError::DependencyResolution { .. } => "dependencies",
            RecipeError::StepFailure { .. } => "build",
            RecipeError::MissingArtifact { .. } => "package",
            RecipeError::InvalidRecipe { .. } => "recipe",
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string())
            .with_context(format!("phase: {}", self.phase()));

        match self {
            RecipeError::SchemaViolation { option, .. } => diag
                .with_suggestion(format!(
                    "Run `galley info` to list the declared values of `{}`",
                    option
                ))
                .with_suggestion("Remove the override to fall back to the recipe default"),

            RecipeError::UnsupportedStandard {
                required, found, ..
            } => diag
                .with_context(format!("requested: {}", found))
                .with_suggestion(format!(
                    "Pass `-s compiler.cppstd={}` or higher",
                    required.as_number()
                ))
                .with_suggestion("Leave the standard unset to let the compiler default apply"),

            RecipeError::DependencyResolution { reference, .. } => diag
                .with_suggestion(format!(
                    "Install `{}` and add its prefix to [dependencies].prefixes",
                    reference
                ))
                .with_suggestion("Or set CMAKE_PREFIX_PATH to the directory containing it"),

            RecipeError::StepFailure { .. } => {
                diag.with_suggestion("Run with --verbose to see the build tool output")
            }

            RecipeError::MissingArtifact { path, .. } => diag
                .with_location(path.clone())
                .with_suggestion("Check the recipe's [build] and [component] sections"),

            RecipeError::InvalidRecipe { .. } => {
                diag.with_suggestion("Fix the recipe file and try again")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_standard_diagnostic() {
        let err = RecipeError::UnsupportedStandard {
            package: "dotenv".to_string(),
            required: CppStandard::Cpp20,
            found: "17".to_string(),
        };

        assert_eq!(err.phase(), "validate");
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("`dotenv` requires C++20"));
        assert!(output.contains("compiler.cppstd=20"));
        assert!(output.contains("help: consider:"));
    }

    #[test]
    fn test_miette_code() {
        let err = RecipeError::StepFailure {
            step: Step::Build,
            message: "exit code 2".to_string(),
        };

        let code = MietteDiagnostic::code(&err).map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("galley::build::step_failed"));
        assert_eq!(err.to_string(), "build step failed: exit code 2");
    }

    #[test]
    fn test_unsupported_standard_help_is_a_setting_value() {
        let err = RecipeError::UnsupportedStandard {
            package: "dotenv".to_string(),
            required: CppStandard::Cpp20,
            found: "17".to_string(),
        };

        let help = MietteDiagnostic::help(&err).map(|h| h.to_string());
        assert_eq!(
            help.as_deref(),
            Some("pass -s compiler.cppstd=20 or higher, or leave the standard unset")
        );
    }

    #[test]
    fn test_missing_artifact_location() {
        let err = RecipeError::MissingArtifact {
            what: "license file".to_string(),
            path: PathBuf::from("/src/LICENSE"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("--> /src/LICENSE"));
    }
}
