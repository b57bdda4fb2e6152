//! Option permutation matrix.
//!
//! Resolves every combination of the recipe's boolean options in parallel.
//! Each run is independent and owns its configuration.

use anyhow::{bail, Result};
use rayon::prelude::*;

use crate::core::configuration::Overrides;
use crate::core::option::OptionDomain;
use crate::core::recipe::Recipe;
use crate::core::settings::Settings;
use crate::ops::pipeline::{resolve, Resolution};
use crate::resolver::RecipeError;

/// Most free options a matrix will permute (65536 resolutions).
pub const MAX_FREE_OPTIONS: usize = 16;

/// One permutation and its result.
#[derive(Debug)]
pub struct MatrixEntry {
    /// The overrides this permutation applied
    pub overrides: Overrides,

    /// Resolution, or the error that stopped it
    pub result: Result<Resolution, RecipeError>,
}

/// Boolean options not fixed by `fixed`, in schema order.
pub fn free_boolean_options<'a>(recipe: &'a Recipe, fixed: &Overrides) -> Vec<&'a str> {
    recipe
        .schema
        .iter()
        .filter(|decl| decl.domain == OptionDomain::Boolean)
        .filter(|decl| fixed.get(&decl.name).is_none())
        .map(|decl| decl.name.as_str())
        .collect()
}

/// Resolve all permutations of the free boolean options.
///
/// Entries come back in permutation order: entry `i` sets option `j` to
/// true iff bit `j` of `i` is set.
pub fn resolve_matrix(
    recipe: &Recipe,
    settings: &Settings,
    fixed: &Overrides,
) -> Result<Vec<MatrixEntry>> {
    let free = free_boolean_options(recipe, fixed);
    if free.len() > MAX_FREE_OPTIONS {
        bail!(
            "`{}` has {} free boolean options, more than the {} a matrix can permute; \
             fix some with -o",
            recipe.name(),
            free.len(),
            MAX_FREE_OPTIONS
        );
    }

    let count = 1usize << free.len();
    tracing::info!("resolving {} permutations of {} options", count, free.len());

    let entries = (0..count)
        .into_par_iter()
        .map(|bits| {
            let mut overrides = fixed.clone();
            for (j, name) in free.iter().enumerate() {
                overrides.set(*name, bits & (1 << j) != 0);
            }
            let result = resolve(recipe, settings, &overrides);
            MatrixEntry { overrides, result }
        })
        .collect();
    Ok(entries)
}
