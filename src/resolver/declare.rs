//! Dependency declaration.
//!
//! The test framework is declared only when the tests option is on. Nothing
//! is declared for benchmarks: the benchmark library is fetched by CMake at
//! configure time and stays outside the recipe's control.

use crate::core::configuration::Configuration;
use crate::core::dependency::{DependencyDecl, DependencyScope};
use crate::core::recipe::{PinnedRequirement, Recipe};

/// Compute the dependencies for a pruned, validated configuration.
///
/// Runtime requirements come first, in recipe order, then the test
/// framework.
pub fn declare_dependencies(configuration: &Configuration, recipe: &Recipe) -> Vec<DependencyDecl> {
    let mut deps: Vec<DependencyDecl> = recipe
        .requirements
        .requires
        .iter()
        .map(|req| to_decl(req, DependencyScope::Runtime))
        .collect();

    if let Some(test) = &recipe.requirements.test {
        if configuration.flag(&recipe.build.tests_option) {
            deps.push(to_decl(test, DependencyScope::BuildOnly));
        }
    }

    for dep in &deps {
        tracing::debug!("declared {}", dep);
    }

    deps
}

fn to_decl(req: &PinnedRequirement, scope: DependencyScope) -> DependencyDecl {
    DependencyDecl {
        name: req.name.clone(),
        version: req.version.clone(),
        scope,
        probe: req.probe.clone(),
    }
}
