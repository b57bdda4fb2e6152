//! BuildBackend trait and the context handed to each step.
//!
//! A backend is the native build tool. It is purely operational: every
//! decision about which steps run is made by the orchestrator.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::params::BuildVariables;
use crate::core::settings::BuildType;

/// Everything a backend needs to run one step.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Source tree containing the CMake entry point
    pub source_dir: PathBuf,

    /// Build output directory
    pub build_dir: PathBuf,

    /// Install prefix, the package directory
    pub package_dir: PathBuf,

    /// Translated build variables
    pub variables: BuildVariables,

    /// Prefixes where declared dependencies were found
    pub prefix_paths: Vec<PathBuf>,

    /// Build type for multi-config generators
    pub build_type: Option<BuildType>,

    /// Parallel job count
    pub jobs: Option<usize>,

    /// Stream tool output
    pub verbose: bool,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(source_dir: PathBuf, build_dir: PathBuf, package_dir: PathBuf) -> Self {
        BuildContext {
            source_dir,
            build_dir,
            package_dir,
            variables: BuildVariables::new(),
            prefix_paths: Vec::new(),
            build_type: None,
            jobs: None,
            verbose: false,
        }
    }

    /// Set the build variables.
    pub fn with_variables(mut self, variables: BuildVariables) -> Self {
        self.variables = variables;
        self
    }

    /// Set the dependency prefixes.
    pub fn with_prefix_paths(mut self, prefix_paths: Vec<PathBuf>) -> Self {
        self.prefix_paths = prefix_paths;
        self
    }

    /// Set the build type.
    pub fn with_build_type(mut self, build_type: Option<BuildType>) -> Self {
        self.build_type = build_type;
        self
    }

    /// Set job count.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of the test step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    /// Total number of tests
    pub total: usize,

    /// Number of passed tests
    pub passed: usize,

    /// Number of failed tests
    pub failed: usize,
}

impl TestReport {
    /// Check if all tests passed.
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Result of the install sub-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Directory the artifacts were installed into
    pub prefix: PathBuf,
}

/// Interface to the native build tool.
///
/// Each method is one opaque blocking call. An `Err` means the tool
/// reported failure.
pub trait BuildBackend: Send + Sync {
    /// Backend name for logs (e.g., "cmake").
    fn name(&self) -> &str;

    /// Generate the build system.
    fn configure(&self, ctx: &BuildContext) -> Result<()>;

    /// Compile.
    fn build(&self, ctx: &BuildContext) -> Result<()>;

    /// Run the library's own tests.
    fn test(&self, ctx: &BuildContext) -> Result<TestReport>;

    /// Install into `ctx.package_dir`.
    fn install(&self, ctx: &BuildContext) -> Result<InstallResult>;
}
