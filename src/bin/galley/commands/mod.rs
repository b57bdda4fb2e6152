//! Command implementations

pub mod completions;
pub mod create;
pub mod info;
pub mod matrix;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::cli::RecipeInput;
use galley::core::configuration::Overrides;
use galley::core::recipe::{Recipe, RECIPE_NAME};
use galley::core::settings::Settings;
use galley::generation::{Generation, RecipeGeneration};
use galley::util::config::{global_config_path, load_config, project_config_path, Config, Profile};
use galley::util::diagnostic::suggestions;

/// Everything a resolving command needs.
pub struct Inputs {
    pub recipe: Recipe,
    pub settings: Settings,
    pub overrides: Overrides,
    pub config: Config,
    pub generation: Generation,
}

impl Inputs {
    pub fn adapter(&self) -> &'static dyn RecipeGeneration {
        self.generation.adapter()
    }
}

/// Locate and load the recipe.
pub fn load_recipe(path: Option<&Path>) -> Result<Recipe> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };

    if path.is_dir() && !path.join(RECIPE_NAME).exists() {
        bail!(
            "could not find `{}` in {}\n{}",
            RECIPE_NAME,
            path.display(),
            suggestions::NO_RECIPE
        );
    }

    Recipe::load(&path)
}

/// Load the merged global and project configuration.
pub fn load_project_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(load_config(
        global_config_path().as_deref(),
        &project_config_path(&cwd),
    ))
}

/// Resolve the recipe, settings and overrides from all input layers.
///
/// Settings: host, then config defaults, then the profile, then `-s`.
/// Overrides: the profile's `[options]`, then `-o`.
pub fn load_inputs(input: &RecipeInput) -> Result<Inputs> {
    let recipe = load_recipe(input.recipe.as_deref())?;
    let config = load_project_config()?;
    let profile = input
        .profile
        .as_deref()
        .map(Profile::load)
        .transpose()?
        .unwrap_or_default();

    let mut settings = Settings::host();
    for (key, value) in config.settings.iter().chain(profile.settings.iter()) {
        settings
            .set(key, value)
            .with_context(|| format!("invalid setting `{}={}`", key, value))?;
    }
    for raw in &input.settings {
        let (key, value) = split_assignment(raw, "setting")?;
        settings.set(key, value)?;
    }

    let mut raw_options: Vec<String> = profile
        .raw_options()?
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    raw_options.extend(input.options.iter().cloned());

    let overrides = input.generation.adapter().parse_overrides(&recipe, &raw_options)?;

    tracing::debug!("settings: {:?}", settings);

    Ok(Inputs {
        recipe,
        settings,
        overrides,
        config,
        generation: input.generation,
    })
}

/// Split `key=value`.
pub fn split_assignment<'a>(raw: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once('=')
        .with_context(|| format!("invalid {} `{}`, expected KEY=VALUE", what, raw))
}

/// Default output directory under `target/galley`.
pub fn default_dir(kind: &str, package_id: &str) -> PathBuf {
    PathBuf::from("target").join("galley").join(kind).join(package_id)
}
