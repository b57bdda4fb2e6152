//! Galley - a package recipe resolver for native libraries
//!
//! This crate provides the core library functionality for Galley: option
//! resolution, build tool orchestration and consumer metadata publishing.

pub mod builder;
pub mod core;
pub mod generation;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for Galley unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a recording build backend and recipe
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Configuration, Overrides, PackageMetadata, Recipe, Settings};
pub use generation::Generation;
pub use resolver::RecipeError;
