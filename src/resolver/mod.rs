//! Option resolution.
//!
//! Turns a recipe, caller overrides and target settings into a pruned,
//! validated configuration plus its dependency declarations. Every phase is
//! pure: no phase here touches the filesystem or the build tool.

pub mod declare;
pub mod errors;
pub mod prune;
pub mod validate;

pub use declare::declare_dependencies;
pub use errors::RecipeError;
pub use prune::{prune, PruneCondition, PruneRule};
pub use validate::validate;
