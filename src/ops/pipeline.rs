//! The resolve and create pipelines.
//!
//! Phases run strictly in order: defaults and overrides, pruning,
//! validation, then dependency declaration and variable translation. Only a
//! fully validated resolution reaches the build tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::backend::{BuildBackend, BuildContext};
use crate::builder::orchestrator::{plan_steps, BuildOutcome, Orchestrator, PackageSpec, StepPlan};
use crate::builder::params::{translate, BuildVariables};
use crate::builder::provider::DependencyProvider;
use crate::core::configuration::{Configuration, Overrides};
use crate::core::dependency::DependencyDecl;
use crate::core::metadata::{Linkage, PackageMetadata};
use crate::core::recipe::Recipe;
use crate::core::settings::Settings;
use crate::ops::harness::{run_harness, HarnessOutcome};
use crate::ops::publish::publish;
use crate::resolver::{declare_dependencies, prune, validate, RecipeError};
use crate::util::fs::{ensure_dir, glob_files};
use crate::util::hash::package_id;

/// Everything computed before the build tool is involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Pruned, validated configuration
    pub configuration: Configuration,

    /// Settings the resolution was computed for
    pub settings: Settings,

    /// Declared dependencies
    pub dependencies: Vec<DependencyDecl>,

    /// Build tool variables
    pub variables: BuildVariables,

    /// Steps a create run would execute
    pub plan: StepPlan,

    /// Binary identity
    pub package_id: String,
}

impl Resolution {
    /// Linkage selected by the configuration.
    pub fn linkage(&self) -> Linkage {
        Linkage::from_configuration(&self.configuration)
    }
}

/// Resolve a recipe for the given settings and overrides.
pub fn resolve(
    recipe: &Recipe,
    settings: &Settings,
    overrides: &Overrides,
) -> Result<Resolution, RecipeError> {
    let configuration = Configuration::from_schema(&recipe.schema, overrides)?;
    let configuration = prune(&configuration, settings, &recipe.prune_rules);
    tracing::debug!(
        "configuration after pruning: {}",
        configuration
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    );

    validate(
        recipe.name(),
        &configuration,
        settings,
        &recipe.schema,
        recipe.requirements.min_cppstd,
    )?;

    let dependencies = declare_dependencies(&configuration, recipe);
    let variables = translate(
        &configuration,
        settings,
        &recipe.schema,
        &recipe.build.variable_prefix,
    );
    let plan = plan_steps(&configuration, recipe);
    let version = recipe.version().to_string();
    let package_id = package_id(recipe.name(), &version, &configuration, settings);

    Ok(Resolution {
        configuration,
        settings: settings.clone(),
        dependencies,
        variables,
        plan,
        package_id,
    })
}

/// Options for a create run.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Source tree (default: the recipe directory)
    pub source_dir: Option<PathBuf>,

    /// Build directory
    pub build_dir: PathBuf,

    /// Package directory
    pub package_dir: PathBuf,

    /// Number of parallel jobs
    pub jobs: Option<usize>,

    /// Verbose build tool output
    pub verbose: bool,

    /// Build the consumption harness after packaging
    pub harness: bool,
}

/// Result of a successful create run.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub resolution: Resolution,
    pub build: BuildOutcome,
    pub metadata: PackageMetadata,
    pub harness: Option<HarnessOutcome>,
}

/// Resolve, build, package and publish.
///
/// A [`RecipeError`] raised by any phase is carried unchanged inside the
/// returned error and can be recovered with `downcast_ref`.
pub fn create(
    recipe: &Recipe,
    settings: &Settings,
    overrides: &Overrides,
    backend: &dyn BuildBackend,
    provider: &dyn DependencyProvider,
    options: &CreateOptions,
) -> Result<CreateOutcome> {
    tracing::info!("Resolving {}/{}", recipe.name(), recipe.version());
    let resolution = resolve(recipe, settings, overrides)?;

    let source_dir = options
        .source_dir
        .clone()
        .unwrap_or_else(|| recipe.recipe_dir.clone());

    if !recipe.package.exports_sources.is_empty() {
        let exported = exported_sources(&source_dir, &recipe.package.exports_sources)?;
        tracing::debug!("{} exported source files", exported.len());
    }

    let prefix_paths = provider.satisfy(&resolution.dependencies)?;
    for dep in &resolution.dependencies {
        tracing::info!("Using {}", dep);
    }

    ensure_dir(&options.build_dir)?;
    ensure_dir(&options.package_dir)?;

    let ctx = BuildContext::new(
        source_dir.clone(),
        options.build_dir.clone(),
        options.package_dir.clone(),
    )
    .with_variables(resolution.variables.clone())
    .with_prefix_paths(prefix_paths)
    .with_build_type(settings.build_type.clone())
    .with_jobs(options.jobs)
    .with_verbose(options.verbose);

    let package = PackageSpec::for_recipe(
        recipe,
        &source_dir,
        resolution.linkage(),
        settings.os.clone(),
    );

    let mut orchestrator = Orchestrator::new(backend);
    let build = orchestrator.run(&ctx, &resolution.plan, &package)?;

    let metadata = publish(&resolution.configuration, settings, recipe);
    tracing::info!("Packaged {} ({})", metadata.reference(), metadata.package_id);

    let harness = match (&recipe.harness, options.harness) {
        (Some(config), true) => {
            tracing::info!("Building consumption harness");
            let work_dir = options.build_dir.join("harness");
            ensure_dir(&work_dir)?;
            let outcome = run_harness(
                &metadata,
                config,
                &build.package_dir,
                &work_dir,
                settings,
                settings.can_run_on_host(),
            )
            .context("consumption harness failed")?;
            Some(outcome)
        }
        _ => None,
    };

    Ok(CreateOutcome {
        resolution,
        build,
        metadata,
        harness,
    })
}

/// Files matched by the recipe's export patterns.
///
/// Patterns matching nothing are warned about. A tree matching none of them
/// is not the source the recipe describes.
fn exported_sources(source_dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut exported = Vec::new();
    let mut unmatched = Vec::new();

    for pattern in patterns {
        let files = glob_files(source_dir, std::slice::from_ref(pattern))?;
        if files.is_empty() {
            unmatched.push(pattern.as_str());
        }
        exported.extend(files);
    }

    if !unmatched.is_empty() {
        tracing::warn!("no files match exported sources: {}", unmatched.join(", "));
    }
    if exported.is_empty() {
        return Err(RecipeError::MissingArtifact {
            what: "exported sources".to_string(),
            path: source_dir.to_path_buf(),
        }
        .into());
    }

    Ok(exported)
}
