//! Core data structures for Galley.
//!
//! This module contains the foundational types used throughout Galley:
//! - Recipes and their option schemas
//! - Settings and resolved configurations
//! - Dependency declarations and published metadata

pub mod configuration;
pub mod dependency;
pub mod metadata;
pub mod option;
pub mod recipe;
pub mod settings;
pub mod standard;

pub use configuration::{Configuration, Overrides};
pub use dependency::{DependencyDecl, DependencyScope};
pub use metadata::{Component, Linkage, PackageMetadata};
pub use option::{OptionDecl, OptionDomain, OptionSchema, OptionValue};
pub use recipe::{Recipe, RECIPE_NAME};
pub use settings::{BuildType, Os, Settings};
pub use standard::CppStandard;
