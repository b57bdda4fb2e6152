//! Consumption harness.
//!
//! Compiles a one-line C++ program against an installed package using only
//! the published metadata, then runs it when the target can run on this
//! host. Cross targets are build-verified only.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::metadata::{Linkage, PackageMetadata};
use crate::core::recipe::HarnessConfig;
use crate::core::settings::{Os, Settings};
use crate::core::standard::CppStandard;
use crate::util::fs::write_string;
use crate::util::process::{exit_description, find_cxx_compiler, output_tail, ProcessBuilder};

/// Result of a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessOutcome {
    /// The compiled example
    pub executable: PathBuf,

    /// Whether the example was executed
    pub executed: bool,

    /// Captured stdout, when executed
    pub stdout: Option<String>,
}

/// Generate the example source.
pub fn generate_harness_cxx(config: &HarnessConfig, output_path: &Path) -> Result<()> {
    let content = format!(
        r#"// Generated by galley: package consumption check
#include <{header}>

int main() {{
    {test_call};
    return 0;
}}
"#,
        header = config.header,
        test_call = config.test_call
    );

    write_string(output_path, &content)
}

/// Compiler arguments linking `source` against the package.
pub fn compile_args(
    metadata: &PackageMetadata,
    package_dir: &Path,
    os: &Os,
    source: &Path,
    output: &Path,
) -> Vec<String> {
    let mut args = Vec::new();

    let cppstd = metadata.component.cppstd.as_deref();
    if let Some(standard) = cppstd.and_then(|s| s.parse::<CppStandard>().ok()) {
        args.push(format!("-std={}", standard.as_flag_value()));
    }

    for dir in &metadata.component.include_dirs {
        args.push(format!("-I{}", package_dir.join(dir).display()));
    }

    args.push(source.display().to_string());
    args.push("-o".to_string());
    args.push(output.display().to_string());

    for lib_dir in ["lib", "lib64"] {
        let path = package_dir.join(lib_dir);
        if path.is_dir() {
            args.push(format!("-L{}", path.display()));
            if metadata.linkage == Linkage::Shared && *os != Os::Windows {
                args.push(format!("-Wl,-rpath,{}", path.display()));
            }
        }
    }

    for lib in &metadata.component.libs {
        args.push(format!("-l{}", lib));
    }
    for lib in metadata.component.system_libs_for(os) {
        args.push(format!("-l{}", lib));
    }

    args
}

/// Build the example and run it if `can_run` holds.
pub fn run_harness(
    metadata: &PackageMetadata,
    config: &HarnessConfig,
    package_dir: &Path,
    work_dir: &Path,
    settings: &Settings,
    can_run: bool,
) -> Result<HarnessOutcome> {
    let compiler = find_cxx_compiler()
        .context("no C++ compiler found for the consumption harness (set CXX)")?;
    run_with_compiler(&compiler, metadata, config, package_dir, work_dir, settings, can_run)
}

fn run_with_compiler(
    compiler: &Path,
    metadata: &PackageMetadata,
    config: &HarnessConfig,
    package_dir: &Path,
    work_dir: &Path,
    settings: &Settings,
    can_run: bool,
) -> Result<HarnessOutcome> {
    let source = work_dir.join("example.cpp");
    let executable = work_dir.join(format!("example{}", std::env::consts::EXE_SUFFIX));
    generate_harness_cxx(config, &source)?;

    let args = compile_args(metadata, package_dir, &settings.os, &source, &executable);
    ProcessBuilder::new(compiler)
        .args(&args)
        .cwd(work_dir)
        .exec_and_check()
        .context("failed to compile the consumption harness")?;

    if !can_run {
        tracing::info!("harness built (execution skipped: target cannot run on this host)");
        return Ok(HarnessOutcome {
            executable,
            executed: false,
            stdout: None,
        });
    }

    tracing::info!("running harness");
    let output = ProcessBuilder::new(&executable)
        .cwd(work_dir)
        .exec()
        .context("failed to execute the consumption harness")?;

    if !output.status.success() {
        bail!(
            "harness exited with {}\n{}",
            exit_description(&output),
            output_tail(&String::from_utf8_lossy(&output.stderr))
        );
    }

    Ok(HarnessOutcome {
        executable,
        executed: true,
        stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::{Configuration, Overrides};
    use crate::ops::publish::publish;
    use crate::test_support::dotenv_recipe;

    fn metadata(os: Os, shared: bool) -> PackageMetadata {
        let recipe = dotenv_recipe();
        let config =
            Configuration::from_schema(&recipe.schema, &Overrides::new().with("shared", shared))
                .unwrap();
        publish(&config, &Settings::new(os), &recipe)
    }

    #[test]
    fn test_generate_harness_cxx() {
        let config = dotenv_recipe().harness.unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("example.cpp");
        generate_harness_cxx(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("#include <dotenv.hpp>"));
        assert!(content.contains("dotenv::load();"));
    }

    #[test]
    fn test_compile_args_from_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("lib")).unwrap();

        let args = compile_args(
            &metadata(Os::Linux, false),
            tmp.path(),
            &Os::Linux,
            Path::new("example.cpp"),
            Path::new("example"),
        );

        assert_eq!(args[0], "-std=c++20");
        assert!(args.contains(&format!("-I{}", tmp.path().join("include").display())));
        assert!(args.contains(&"-ldotenv_lib".to_string()));
        assert!(args.contains(&"-lpthread".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-Wl,-rpath")));
        // The library precedes its system dependencies
        let lib = args.iter().position(|a| a == "-ldotenv_lib").unwrap();
        let pthread = args.iter().position(|a| a == "-lpthread").unwrap();
        assert!(lib < pthread);
    }

    #[test]
    fn test_shared_adds_rpath() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("lib")).unwrap();

        let args = compile_args(
            &metadata(Os::Linux, true),
            tmp.path(),
            &Os::Linux,
            Path::new("example.cpp"),
            Path::new("example"),
        );
        assert!(args.iter().any(|a| a.starts_with("-Wl,-rpath,")));
    }

    /// Write an executable shell script standing in for a compiler.
    #[cfg(unix)]
    fn stub_compiler(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("stub-cxx");
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Compiler stub that emits a program printing `loaded` at the `-o` path.
    #[cfg(unix)]
    const EMIT_EXAMPLE: &str = r#"
while [ $# -gt 0 ]; do
    if [ "$1" = "-o" ]; then out="$2"; fi
    shift
done
printf '#!/bin/sh\necho loaded\n' > "$out"
chmod +x "$out"
"#;

    #[cfg(unix)]
    #[test]
    fn test_cross_target_is_built_but_not_run() {
        let tmp = tempfile::tempdir().unwrap();
        let compiler = stub_compiler(tmp.path(), EMIT_EXAMPLE);
        let work = tmp.path().join("harness");
        let settings = Settings::new(Os::Linux).with_arch("riscv64");

        let outcome = run_with_compiler(
            &compiler,
            &metadata(Os::Linux, false),
            &dotenv_recipe().harness.unwrap(),
            tmp.path(),
            &work,
            &settings,
            false,
        )
        .unwrap();

        assert!(!outcome.executed);
        assert!(outcome.stdout.is_none());
        assert!(outcome.executable.is_file());
        assert!(work.join("example.cpp").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_native_target_runs_example() {
        let tmp = tempfile::tempdir().unwrap();
        let compiler = stub_compiler(tmp.path(), EMIT_EXAMPLE);

        let outcome = run_with_compiler(
            &compiler,
            &metadata(Os::Linux, false),
            &dotenv_recipe().harness.unwrap(),
            tmp.path(),
            &tmp.path().join("harness"),
            &Settings::new(Os::Linux),
            true,
        )
        .unwrap();

        assert!(outcome.executed);
        assert_eq!(outcome.stdout.as_deref(), Some("loaded\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let compiler = stub_compiler(tmp.path(), "echo 'dotenv.hpp: not found' >&2\nexit 1\n");

        let err = run_with_compiler(
            &compiler,
            &metadata(Os::Linux, false),
            &dotenv_recipe().harness.unwrap(),
            tmp.path(),
            &tmp.path().join("harness"),
            &Settings::new(Os::Linux),
            false,
        )
        .unwrap_err();

        assert!(format!("{:#}", err).contains("failed to compile the consumption harness"));
    }

    #[test]
    fn test_macos_has_no_pthread() {
        let tmp = tempfile::tempdir().unwrap();
        let args = compile_args(
            &metadata(Os::Macos, false),
            tmp.path(),
            &Os::Macos,
            Path::new("example.cpp"),
            Path::new("example"),
        );
        assert!(!args.contains(&"-lpthread".to_string()));
    }
}
