//! End-to-end pipeline tests against the reference dotenv recipe.
//!
//! The build tool is replaced by a fake backend that records calls and
//! installs placeholder libraries, so no native toolchain is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use tempfile::TempDir;

use galley::builder::{
    BuildBackend, BuildContext, InstallResult, PrefixProvider, StepState, TestReport,
};
use galley::core::{DependencyScope, Linkage, Os, Overrides, Recipe, Settings};
use galley::generation::Generation;
use galley::ops::{create, publish, resolve, CreateOptions};
use galley::resolver::{prune, RecipeError};

/// Backend double for the native build tool.
#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<&'static str>>,
    fail_build: bool,
}

impl FakeBackend {
    fn failing_build() -> Self {
        FakeBackend {
            fail_build: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

impl BuildBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn configure(&self, _ctx: &BuildContext) -> Result<()> {
        self.calls.lock().unwrap().push("configure");
        Ok(())
    }

    fn build(&self, _ctx: &BuildContext) -> Result<()> {
        self.calls.lock().unwrap().push("build");
        if self.fail_build {
            bail!("ninja: build stopped: subcommand failed");
        }
        Ok(())
    }

    fn test(&self, _ctx: &BuildContext) -> Result<TestReport> {
        self.calls.lock().unwrap().push("test");
        Ok(TestReport {
            total: 3,
            passed: 3,
            failed: 0,
        })
    }

    fn install(&self, ctx: &BuildContext) -> Result<InstallResult> {
        self.calls.lock().unwrap().push("install");
        let lib = ctx.package_dir.join("lib");
        fs::create_dir_all(&lib)?;
        for name in ["libdotenv_lib.a", "libdotenv_lib.so", "dotenv_lib.lib"] {
            fs::write(lib.join(name), b"")?;
        }
        let bin = ctx.package_dir.join("bin");
        fs::create_dir_all(&bin)?;
        fs::write(bin.join("dotenv_lib.dll"), b"")?;
        Ok(InstallResult {
            prefix: ctx.package_dir.clone(),
        })
    }
}

fn recipe() -> Recipe {
    Recipe::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("recipes/dotenv")).unwrap()
}

fn source_tree(base: &Path) -> PathBuf {
    let root = base.join("src");
    fs::create_dir_all(root.join("include")).unwrap();
    fs::write(root.join("CMakeLists.txt"), "project(dotenv CXX)\n").unwrap();
    fs::write(root.join("LICENSE"), "MIT License\n").unwrap();
    fs::write(root.join("include/dotenv.hpp"), "#pragma once\n").unwrap();
    root
}

fn gtest_prefix(base: &Path) -> PathBuf {
    let prefix = base.join("deps");
    fs::create_dir_all(prefix.join("include/gtest")).unwrap();
    fs::write(prefix.join("include/gtest/gtest.h"), "").unwrap();
    prefix
}

fn options(base: &Path) -> CreateOptions {
    CreateOptions {
        source_dir: Some(source_tree(base)),
        build_dir: base.join("build"),
        package_dir: base.join("package"),
        ..Default::default()
    }
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_linux_release_with_tests() {
    let tmp = TempDir::new().unwrap();
    let recipe = recipe();
    let settings = Settings::new(Os::Linux).with_build_type("Release");
    let overrides = Overrides::new()
        .with("shared", false)
        .with("enable_tests", true);
    let backend = FakeBackend::default();
    let provider = PrefixProvider::new(vec![gtest_prefix(tmp.path())]);

    let outcome = create(
        &recipe,
        &settings,
        &overrides,
        &backend,
        &provider,
        &options(tmp.path()),
    )
    .unwrap();

    assert!(outcome.resolution.configuration.flag("fPIC"));
    assert_eq!(outcome.resolution.dependencies.len(), 1);
    assert_eq!(outcome.resolution.dependencies[0].reference(), "gtest/1.11.0");
    assert_eq!(outcome.resolution.dependencies[0].scope, DependencyScope::BuildOnly);
    assert_eq!(
        outcome.build.visited,
        vec![
            StepState::Configured,
            StepState::Built,
            StepState::Tested,
            StepState::Packaged,
            StepState::Done
        ]
    );
    assert_eq!(backend.calls(), vec!["configure", "build", "test", "install"]);
    assert_eq!(
        fs::read_to_string(tmp.path().join("package/licenses/LICENSE")).unwrap(),
        "MIT License\n"
    );
    assert_eq!(outcome.metadata.linkage, Linkage::Static);
}

#[test]
fn test_windows_defaults_drop_fpic() {
    let recipe = recipe();
    let resolution = resolve(&recipe, &Settings::new(Os::Windows), &Overrides::new()).unwrap();

    assert!(!resolution.configuration.contains("fPIC"));
    assert!(!resolution
        .variables
        .contains("CMAKE_POSITION_INDEPENDENT_CODE"));
    assert_eq!(resolution.variables.len(), 4);
}

#[test]
fn test_shared_discards_explicit_fpic() {
    let recipe = recipe();
    let overrides = Overrides::new().with("shared", true).with("fPIC", true);

    for os in [Os::Linux, Os::FreeBSD, Os::Macos, Os::Windows] {
        let resolution = resolve(&recipe, &Settings::new(os), &overrides).unwrap();
        assert!(!resolution.configuration.contains("fPIC"));
        assert!(resolution.configuration.flag("shared"));
    }
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_pruning_is_idempotent() {
    let recipe = recipe();
    for os in [Os::Linux, Os::Windows] {
        for shared in [false, true] {
            let settings = Settings::new(os.clone());
            let once = resolve(&recipe, &settings, &Overrides::new().with("shared", shared))
                .unwrap()
                .configuration;
            let twice = prune(&once, &settings, &recipe.prune_rules);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn test_below_floor_makes_no_backend_calls() {
    let tmp = TempDir::new().unwrap();
    let recipe = recipe();
    let backend = FakeBackend::default();
    let provider = PrefixProvider::new(vec![]);

    for cppstd in ["17", "gnu14", "c++17", "twenty"] {
        let err = create(
            &recipe,
            &Settings::new(Os::Linux).with_cppstd(cppstd),
            &Overrides::new(),
            &backend,
            &provider,
            &options(tmp.path()),
        )
        .unwrap_err();

        assert!(
            matches!(
                err.downcast_ref::<RecipeError>(),
                Some(RecipeError::UnsupportedStandard { .. })
            ),
            "{}",
            cppstd
        );
    }
    assert!(backend.calls().is_empty());
}

#[test]
fn test_tests_disabled_never_tests() {
    let tmp = TempDir::new().unwrap();
    let recipe = recipe();
    let backend = FakeBackend::default();
    let provider = PrefixProvider::new(vec![]);

    let outcome = create(
        &recipe,
        &Settings::new(Os::Linux).with_cppstd("gnu20"),
        &Overrides::new().with("enable_benchmarks", true),
        &backend,
        &provider,
        &options(tmp.path()),
    )
    .unwrap();

    assert!(outcome.resolution.dependencies.is_empty());
    assert!(!outcome.build.visited.contains(&StepState::Tested));
    assert!(!backend.calls().contains(&"test"));
}

#[test]
fn test_build_failure_is_terminal() {
    let tmp = TempDir::new().unwrap();
    let recipe = recipe();
    let backend = FakeBackend::failing_build();
    let provider = PrefixProvider::new(vec![]);

    let err = create(
        &recipe,
        &Settings::new(Os::Linux),
        &Overrides::new(),
        &backend,
        &provider,
        &options(tmp.path()),
    )
    .unwrap_err();

    match err.downcast_ref::<RecipeError>() {
        Some(RecipeError::StepFailure { step, message }) => {
            assert_eq!(step.to_string(), "build");
            assert!(message.contains("subcommand failed"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(backend.calls(), vec!["configure", "build"]);
    assert!(!tmp.path().join("package/licenses").exists());
}

#[test]
fn test_publish_is_pure_and_generation_independent() {
    let recipe = recipe();
    let settings = Settings::new(Os::FreeBSD).with_build_type("Debug");
    let resolution = resolve(&recipe, &settings, &Overrides::new()).unwrap();

    let first = publish(&resolution.configuration, &settings, &recipe);
    let second = publish(&resolution.configuration, &settings, &recipe);
    assert_eq!(first, second);
    assert_eq!(first.package_id, resolution.package_id);

    let legacy = Generation::Legacy.adapter().render(&resolution, &first);
    let current = Generation::Current.adapter().render(&resolution, &first);
    assert_eq!(
        legacy["cpp_info"]["components"]["dotenv_lib"]["system_libs"],
        current["cpp_info"]["components"]["dotenv_lib"]["system_libs"]
    );
    assert_eq!(
        legacy["cpp_info"]["system_libs"],
        serde_json::json!(["pthread"])
    );
}

#[test]
fn test_generation_override_syntax() {
    let recipe = recipe();
    let legacy = Generation::Legacy
        .adapter()
        .parse_overrides(&recipe, &["dotenv:shared=True".to_string()])
        .unwrap();
    let current = Generation::Current
        .adapter()
        .parse_overrides(&recipe, &["dotenv/*:shared=True".to_string()])
        .unwrap();

    assert_eq!(legacy, current);

    let settings = Settings::new(Os::Linux);
    assert_eq!(
        resolve(&recipe, &settings, &legacy).unwrap(),
        resolve(&recipe, &settings, &current).unwrap()
    );
}
