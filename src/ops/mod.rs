//! High-level operations.
//!
//! This module contains the implementation of Galley commands.

pub mod harness;
pub mod matrix;
pub mod pipeline;
pub mod publish;

pub use harness::{run_harness, HarnessOutcome};
pub use matrix::{resolve_matrix, MatrixEntry};
pub use pipeline::{create, resolve, CreateOptions, CreateOutcome, Resolution};
pub use publish::publish;
