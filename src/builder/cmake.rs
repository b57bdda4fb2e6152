//! CMake backend.
//!
//! Drives `cmake -S/-B`, `cmake --build`, `ctest --test-dir` and
//! `cmake --install --prefix`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::builder::backend::{BuildBackend, BuildContext, InstallResult, TestReport};
use crate::util::diagnostic::suggestions;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_cmake, find_ctest, ProcessBuilder};

/// Generators that hold several configurations in one build directory.
const MULTI_CONFIG_GENERATORS: &[&str] = &["Ninja Multi-Config", "Xcode"];

/// CMake-driven build backend.
#[derive(Debug, Clone)]
pub struct CMakeBackend {
    cmake: PathBuf,
    ctest: PathBuf,
    generator: Option<String>,
}

impl CMakeBackend {
    /// Locate `cmake` and `ctest` in PATH.
    pub fn detect(generator: Option<String>) -> Result<Self> {
        let cmake = find_cmake()
            .with_context(|| format!("cmake not found in PATH\n{}", suggestions::NO_CMAKE))?;
        let ctest = find_ctest().unwrap_or_else(|| PathBuf::from("ctest"));

        Ok(CMakeBackend {
            cmake,
            ctest,
            generator,
        })
    }

    /// Use explicit tool paths.
    pub fn with_tools(cmake: PathBuf, ctest: PathBuf, generator: Option<String>) -> Self {
        CMakeBackend {
            cmake,
            ctest,
            generator,
        }
    }

    fn is_multi_config(&self) -> bool {
        self.generator.as_deref().is_some_and(|gen| {
            gen.starts_with("Visual Studio") || MULTI_CONFIG_GENERATORS.contains(&gen)
        })
    }

    /// `--config <type>` for multi-config generators.
    fn config_args(&self, ctx: &BuildContext, flag: &str) -> Vec<String> {
        match (&ctx.build_type, self.is_multi_config()) {
            (Some(build_type), true) => vec![flag.to_string(), build_type.as_str().to_string()],
            _ => Vec::new(),
        }
    }

    pub(crate) fn configure_args(&self, ctx: &BuildContext) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            ctx.source_dir.display().to_string(),
            "-B".to_string(),
            ctx.build_dir.display().to_string(),
        ];

        if let Some(generator) = &self.generator {
            args.push("-G".to_string());
            args.push(generator.clone());
        }

        args.push(format!("-DCMAKE_INSTALL_PREFIX={}", ctx.package_dir.display()));

        if !ctx.prefix_paths.is_empty() {
            let joined: Vec<String> = ctx
                .prefix_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            args.push(format!("-DCMAKE_PREFIX_PATH={}", joined.join(";")));
        }

        args.extend(ctx.variables.to_args());
        args
    }

    pub(crate) fn build_args(&self, ctx: &BuildContext) -> Vec<String> {
        let mut args = vec!["--build".to_string(), ctx.build_dir.display().to_string()];
        args.extend(self.config_args(ctx, "--config"));

        if let Some(jobs) = ctx.jobs {
            args.push("--parallel".to_string());
            args.push(jobs.to_string());
        }

        if ctx.verbose {
            args.push("--verbose".to_string());
        }

        args
    }

    pub(crate) fn test_args(&self, ctx: &BuildContext) -> Vec<String> {
        let mut args = vec![
            "--test-dir".to_string(),
            ctx.build_dir.display().to_string(),
        ];
        args.extend(self.config_args(ctx, "-C"));
        args.push("--output-on-failure".to_string());

        if let Some(jobs) = ctx.jobs {
            args.push("-j".to_string());
            args.push(jobs.to_string());
        }

        args
    }

    pub(crate) fn install_args(&self, ctx: &BuildContext) -> Vec<String> {
        let mut args = vec!["--install".to_string(), ctx.build_dir.display().to_string()];
        args.extend(self.config_args(ctx, "--config"));
        args.push("--prefix".to_string());
        args.push(ctx.package_dir.display().to_string());
        args
    }

    fn run(&self, program: &Path, args: Vec<String>, ctx: &BuildContext) -> Result<String> {
        let output = ProcessBuilder::new(program)
            .args(args)
            .cwd(&ctx.source_dir)
            .inherit_output(ctx.verbose)
            .exec_and_check()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl BuildBackend for CMakeBackend {
    fn name(&self) -> &str {
        "cmake"
    }

    fn configure(&self, ctx: &BuildContext) -> Result<()> {
        ensure_dir(&ctx.build_dir)?;
        self.run(&self.cmake, self.configure_args(ctx), ctx)?;
        Ok(())
    }

    fn build(&self, ctx: &BuildContext) -> Result<()> {
        self.run(&self.cmake, self.build_args(ctx), ctx)?;
        Ok(())
    }

    fn test(&self, ctx: &BuildContext) -> Result<TestReport> {
        let output = ProcessBuilder::new(&self.ctest)
            .args(self.test_args(ctx))
            .cwd(&ctx.build_dir)
            .exec()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if ctx.verbose {
            print!("{}", stdout);
        }

        let mut report = parse_ctest_summary(&stdout).unwrap_or_default();
        if !output.status.success() && report.failed == 0 {
            if report.total == 0 {
                let stderr = String::from_utf8_lossy(&output.stderr);
                bail!("ctest failed before running tests\n{}", stderr.trim());
            }
            report.failed = 1;
        }

        Ok(report)
    }

    fn install(&self, ctx: &BuildContext) -> Result<InstallResult> {
        self.run(&self.cmake, self.install_args(ctx), ctx)?;
        Ok(InstallResult {
            prefix: ctx.package_dir.clone(),
        })
    }
}

/// Parse ctest's `N% tests passed, F tests failed out of T` line.
fn parse_ctest_summary(stdout: &str) -> Option<TestReport> {
    let line = stdout
        .lines()
        .find(|l| l.contains("tests passed") && l.contains("out of"))?;

    let numbers: Vec<usize> = line
        .split_whitespace()
        .filter_map(|w| w.parse().ok())
        .collect();

    // [failed, total]; the leading percentage carries a `%` and is skipped
    match numbers.as_slice() {
        [failed, total] => Some(TestReport {
            total: *total,
            passed: total.saturating_sub(*failed),
            failed: *failed,
        }),
        _ => None,
    }
}
