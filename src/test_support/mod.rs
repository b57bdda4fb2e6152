//! Test utilities and mocks for Galley unit tests.
//!
//! Provides a recording build backend that never spawns a process, plus the
//! reference recipe and a source tree fixture.
//!
//! # Example
//!
//! ```rust,ignore
//! use galley::test_support::{RecordingBackend, BackendCall};
//!
//! let backend = RecordingBackend::new().failing_at(BackendCall::Build);
//! // run the orchestrator...
//! assert_eq!(backend.calls(), vec![BackendCall::Configure, BackendCall::Build]);
//! ```

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::backend::{BuildBackend, BuildContext, InstallResult, TestReport};

pub use fixtures::*;

/// A call made to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCall {
    Configure,
    Build,
    Test,
    Install,
}

/// Backend that records calls and fakes their effects.
///
/// `install` writes placeholder library files for every platform so the
/// artifact check passes regardless of the target OS.
#[derive(Debug)]
pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    contexts: Mutex<Vec<BuildContext>>,
    fail_at: Option<BackendCall>,
    failed_tests: usize,
    artifacts: Vec<PathBuf>,
}

impl RecordingBackend {
    /// A backend where every step succeeds.
    pub fn new() -> Self {
        RecordingBackend {
            calls: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
            fail_at: None,
            failed_tests: 0,
            artifacts: default_artifacts(),
        }
    }

    /// Fail the given call.
    pub fn failing_at(mut self, call: BackendCall) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Report `n` failed tests from the test step.
    pub fn with_failed_tests(mut self, n: usize) -> Self {
        self.failed_tests = n;
        self
    }

    /// Install nothing.
    pub fn without_artifacts(mut self) -> Self {
        self.artifacts.clear();
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Context passed to the most recent call.
    pub fn last_context(&self) -> Option<BuildContext> {
        self.contexts.lock().unwrap().last().cloned()
    }

    fn record(&self, call: BackendCall, ctx: &BuildContext) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        self.contexts.lock().unwrap().push(ctx.clone());
        if self.fail_at == Some(call) {
            bail!("{:?} failed with exit code 2", call);
        }
        Ok(())
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn configure(&self, ctx: &BuildContext) -> Result<()> {
        self.record(BackendCall::Configure, ctx)
    }

    fn build(&self, ctx: &BuildContext) -> Result<()> {
        self.record(BackendCall::Build, ctx)
    }

    fn test(&self, ctx: &BuildContext) -> Result<TestReport> {
        self.record(BackendCall::Test, ctx)?;
        Ok(TestReport {
            total: 12,
            passed: 12 - self.failed_tests.min(12),
            failed: self.failed_tests,
        })
    }

    fn install(&self, ctx: &BuildContext) -> Result<InstallResult> {
        self.record(BackendCall::Install, ctx)?;
        for artifact in &self.artifacts {
            let path = ctx.package_dir.join(artifact);
            std::fs::create_dir_all(path.parent().unwrap())?;
            std::fs::write(&path, b"")?;
        }
        Ok(InstallResult {
            prefix: ctx.package_dir.clone(),
        })
    }
}

fn default_artifacts() -> Vec<PathBuf> {
    [
        "lib/libdotenv_lib.a",
        "lib/libdotenv_lib.so",
        "lib/libdotenv_lib.dylib",
        "lib/dotenv_lib.lib",
        "bin/dotenv_lib.dll",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_fails_at_step() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(
            tmp.path().to_path_buf(),
            tmp.path().join("build"),
            tmp.path().join("pkg"),
        );
        let backend = RecordingBackend::new().failing_at(BackendCall::Build);

        assert!(backend.configure(&ctx).is_ok());
        assert!(backend.build(&ctx).is_err());
        assert_eq!(backend.call_count(), 2);
    }

    #[test]
    fn test_recording_backend_installs_placeholders() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new(
            tmp.path().to_path_buf(),
            tmp.path().join("build"),
            tmp.path().join("pkg"),
        );

        RecordingBackend::new().install(&ctx).unwrap();
        assert!(tmp.path().join("pkg/lib/libdotenv_lib.a").is_file());
    }
}
