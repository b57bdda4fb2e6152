//! Build tool driving.
//!
//! Translates a configuration into build variables and runs the native
//! build tool through the configure, build, test and package steps.

pub mod backend;
pub mod cmake;
pub mod orchestrator;
pub mod params;
pub mod provider;

pub use backend::{BuildBackend, BuildContext, InstallResult, TestReport};
pub use cmake::CMakeBackend;
pub use orchestrator::{Orchestrator, Step, StepPlan, StepState};
pub use params::{translate, BuildVariables, VarValue};
pub use provider::{DependencyProvider, PrefixProvider};
