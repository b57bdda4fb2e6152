//! Satisfying declared dependencies from the environment.

use std::path::{Path, PathBuf};

use crate::core::dependency::DependencyDecl;
use crate::resolver::errors::RecipeError;

/// Finds installed copies of declared dependencies.
pub trait DependencyProvider: Send + Sync {
    /// Locate every dependency, returning the prefixes the build tool
    /// should search. The first unsatisfied dependency is an error.
    fn satisfy(&self, deps: &[DependencyDecl]) -> Result<Vec<PathBuf>, RecipeError>;
}

/// Searches a list of install prefixes for `<prefix>/include/<probe>`.
#[derive(Debug, Clone, Default)]
pub struct PrefixProvider {
    prefixes: Vec<PathBuf>,
}

impl PrefixProvider {
    /// Search the given prefixes, in order.
    pub fn new(prefixes: Vec<PathBuf>) -> Self {
        PrefixProvider { prefixes }
    }

    /// Append the entries of `CMAKE_PREFIX_PATH`.
    pub fn with_env_prefix_path(mut self) -> Self {
        if let Some(paths) = std::env::var_os("CMAKE_PREFIX_PATH") {
            self.prefixes.extend(std::env::split_paths(&paths));
        }
        self
    }

    /// Prefixes searched.
    pub fn prefixes(&self) -> &[PathBuf] {
        &self.prefixes
    }

    fn find(&self, probe: &str) -> Option<&Path> {
        self.prefixes
            .iter()
            .find(|prefix| prefix.join("include").join(probe).is_file())
            .map(PathBuf::as_path)
    }
}

impl DependencyProvider for PrefixProvider {
    fn satisfy(&self, deps: &[DependencyDecl]) -> Result<Vec<PathBuf>, RecipeError> {
        let mut found: Vec<PathBuf> = Vec::new();

        for dep in deps {
            let Some(probe) = &dep.probe else {
                tracing::warn!("no probe for `{}`, leaving it to the build tool", dep.reference());
                continue;
            };

            match self.find(probe) {
                Some(prefix) => {
                    tracing::debug!("found {} in {}", dep.reference(), prefix.display());
                    if !found.iter().any(|p| p == prefix) {
                        found.push(prefix.to_path_buf());
                    }
                }
                None => {
                    let searched = if self.prefixes.is_empty() {
                        "no prefixes configured".to_string()
                    } else {
                        let list: Vec<String> =
                            self.prefixes.iter().map(|p| p.display().to_string()).collect();
                        format!("searched {}", list.join(", "))
                    };
                    return Err(RecipeError::DependencyResolution {
                        reference: dep.reference(),
                        message: format!("`include/{}` not found ({})", probe, searched),
                    });
                }
            }
        }

        Ok(found)
    }
}
