//! Step orchestration.
//!
//! Runs configure, build, the optional test step and package, in that order.
//! Each step calls the backend exactly once; the first failure is terminal
//! and the state machine stops advancing.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::backend::{BuildBackend, BuildContext, TestReport};
use crate::core::configuration::Configuration;
use crate::core::metadata::Linkage;
use crate::core::recipe::Recipe;
use crate::core::settings::Os;
use crate::resolver::errors::RecipeError;
use crate::util::fs::{copy_into, files_matching};

/// A build step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Configure,
    Build,
    Test,
    Package,
}

impl Step {
    /// State entered when this step succeeds.
    pub fn target_state(self) -> StepState {
        match self {
            Step::Configure => StepState::Configured,
            Step::Build => StepState::Built,
            Step::Test => StepState::Tested,
            Step::Package => StepState::Packaged,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Configure => write!(f, "configure"),
            Step::Build => write!(f, "build"),
            Step::Test => write!(f, "test"),
            Step::Package => write!(f, "package"),
        }
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepState {
    Pending,
    Configured,
    Built,
    Tested,
    Packaged,
    Done,
}

/// The steps a run will execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepPlan {
    /// Steps in execution order; `Test` only when tests are enabled
    pub steps: Vec<Step>,

    /// Whether `package` runs the backend install
    pub install: bool,
}

/// Plan the steps for a configuration.
pub fn plan_steps(configuration: &Configuration, recipe: &Recipe) -> StepPlan {
    let mut steps = vec![Step::Configure, Step::Build];
    if configuration.flag(&recipe.build.tests_option) {
        steps.push(Step::Test);
    }
    steps.push(Step::Package);

    StepPlan {
        steps,
        install: recipe.build.install,
    }
}

/// What the package step must produce.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    /// File that must exist in the source tree before configuring
    pub cmake_entry: PathBuf,

    /// License file in the source tree
    pub license_file: PathBuf,

    /// Library names expected after install
    pub libs: Vec<String>,

    /// Expected linkage
    pub linkage: Linkage,

    /// Target OS, which decides artifact file names
    pub os: Os,
}

impl PackageSpec {
    /// Package expectations for a recipe and its source tree.
    pub fn for_recipe(recipe: &Recipe, source_dir: &Path, linkage: Linkage, os: Os) -> Self {
        PackageSpec {
            cmake_entry: source_dir.join(&recipe.build.cmake_entry),
            license_file: source_dir.join(&recipe.build.license_file),
            libs: recipe.component.libs.clone(),
            linkage,
            os,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// States visited, in order
    pub visited: Vec<StepState>,

    /// Package directory
    pub package_dir: PathBuf,

    /// Propagated license file
    pub license: PathBuf,

    /// Library artifacts found after install; empty when install is skipped
    pub artifacts: Vec<PathBuf>,

    /// Test results, if the test step ran
    pub test_report: Option<TestReport>,
}

/// Drives a [`BuildBackend`] through a [`StepPlan`].
pub struct Orchestrator<'a> {
    backend: &'a dyn BuildBackend,
    state: StepState,
    visited: Vec<StepState>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator in the `Pending` state.
    pub fn new(backend: &'a dyn BuildBackend) -> Self {
        Orchestrator {
            backend,
            state: StepState::Pending,
            visited: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> StepState {
        self.state
    }

    /// States entered so far.
    pub fn visited(&self) -> &[StepState] {
        &self.visited
    }

    fn advance(&mut self, state: StepState) {
        tracing::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
        self.visited.push(state);
    }

    /// Execute the plan.
    pub fn run(
        &mut self,
        ctx: &BuildContext,
        plan: &StepPlan,
        package: &PackageSpec,
    ) -> Result<BuildOutcome, RecipeError> {
        let mut test_report = None;
        let mut license = None;
        let mut artifacts = Vec::new();

        for &step in &plan.steps {
            tracing::info!("{} ({})", step, self.backend.name());

            match step {
                Step::Configure => {
                    if !package.cmake_entry.is_file() {
                        return Err(RecipeError::MissingArtifact {
                            what: "CMake entry point".to_string(),
                            path: package.cmake_entry.clone(),
                        });
                    }
                    self.backend
                        .configure(ctx)
                        .map_err(|e| step_failure(step, e))?;
                }
                Step::Build => {
                    self.backend.build(ctx).map_err(|e| step_failure(step, e))?;
                }
                Step::Test => {
                    let report = self.backend.test(ctx).map_err(|e| step_failure(step, e))?;
                    if !report.success() {
                        return Err(RecipeError::StepFailure {
                            step,
                            message: format!("{} of {} tests failed", report.failed, report.total),
                        });
                    }
                    tracing::info!("{} tests passed", report.passed);
                    test_report = Some(report);
                }
                Step::Package => {
                    if plan.install {
                        let installed = self
                            .backend
                            .install(ctx)
                            .map_err(|e| step_failure(step, e))?;
                        artifacts = find_library_artifacts(&installed.prefix, package)?;
                    } else {
                        tracing::info!("install skipped by recipe");
                    }
                    license = Some(propagate_license(&package.license_file, &ctx.package_dir)?);
                }
            }

            self.advance(step.target_state());
        }

        let license = license.ok_or_else(|| RecipeError::StepFailure {
            step: Step::Package,
            message: "plan has no package step".to_string(),
        })?;

        self.advance(StepState::Done);

        Ok(BuildOutcome {
            visited: self.visited.clone(),
            package_dir: ctx.package_dir.clone(),
            license,
            artifacts,
            test_report,
        })
    }
}

fn step_failure(step: Step, err: anyhow::Error) -> RecipeError {
    RecipeError::StepFailure {
        step,
        message: format!("{:#}", err),
    }
}

/// Copy the license verbatim into `<package_dir>/licenses/`.
fn propagate_license(license_file: &Path, package_dir: &Path) -> Result<PathBuf, RecipeError> {
    if !license_file.is_file() {
        return Err(RecipeError::MissingArtifact {
            what: "license file".to_string(),
            path: license_file.to_path_buf(),
        });
    }

    copy_into(license_file, &package_dir.join("licenses")).map_err(|e| RecipeError::StepFailure {
        step: Step::Package,
        message: format!("{:#}", e),
    })
}

/// Locate every expected library under the install prefix.
fn find_library_artifacts(
    prefix: &Path,
    package: &PackageSpec,
) -> Result<Vec<PathBuf>, RecipeError> {
    let dirs: &[&str] = match (&package.os, package.linkage) {
        (Os::Windows, Linkage::Shared) => &["bin", "lib"],
        _ => &["lib", "lib64"],
    };

    let mut found = Vec::new();
    for lib in &package.libs {
        let matches = dirs
            .iter()
            .flat_map(|dir| {
                files_matching(&prefix.join(dir), |name| {
                    is_library_file(name, lib, &package.os, package.linkage)
                })
            })
            .next();

        match matches {
            Some(path) => found.push(path),
            None => {
                return Err(RecipeError::MissingArtifact {
                    what: format!("{} library `{}`", package.linkage, lib),
                    path: prefix.join(dirs[0]),
                })
            }
        }
    }

    Ok(found)
}

/// Whether `file_name` is the `linkage` build of library `lib` on `os`.
pub fn is_library_file(file_name: &str, lib: &str, os: &Os, linkage: Linkage) -> bool {
    let unix = format!("lib{}", lib);
    match (os, linkage) {
        (Os::Windows, Linkage::Static) => {
            file_name == format!("{}.lib", lib) || file_name == format!("{}.a", unix)
        }
        (Os::Windows, Linkage::Shared) => file_name == format!("{}.dll", lib),
        (Os::Macos | Os::Ios, Linkage::Shared) => {
            file_name.starts_with(&format!("{}.", unix)) && file_name.ends_with(".dylib")
        }
        (_, Linkage::Static) => file_name == format!("{}.a", unix),
        (_, Linkage::Shared) => {
            let so = format!("{}.so", unix);
            file_name == so || file_name.starts_with(&format!("{}.", so))
        }
    }
}
