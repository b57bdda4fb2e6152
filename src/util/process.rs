//! Subprocess execution for the build tool and the harness compiler.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

/// Lines of captured output kept in failure messages.
const OUTPUT_TAIL_LINES: usize = 20;

/// Builder for a single external command.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    inherit_output: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            inherit_output: false,
        }
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Stream output to the terminal instead of capturing it.
    pub fn inherit_output(mut self, inherit: bool) -> Self {
        self.inherit_output = inherit;
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if self.inherit_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        cmd
    }

    /// Execute the command and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        tracing::debug!("running `{}`", self.display_command());

        self.build_command()
            .output()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))
    }

    /// Execute and require a zero exit status.
    ///
    /// The error message carries the tail of the captured stderr.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "`{}` exited with {}\n{}",
                self.display_command(),
                exit_description(&output),
                output_tail(&stderr)
            );
        }
        Ok(output)
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Describe how a process ended.
pub fn exit_description(output: &Output) -> String {
    match output.status.code() {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

/// The last lines of captured output.
pub fn output_tail(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(OUTPUT_TAIL_LINES);
    lines[start..].join("\n")
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

/// Find CTest, preferring the one next to `cmake`.
pub fn find_ctest() -> Option<PathBuf> {
    if let Some(cmake) = find_cmake() {
        let sibling = cmake.with_file_name(format!("ctest{}", std::env::consts::EXE_SUFFIX));
        if sibling.is_file() {
            return Some(sibling);
        }
    }
    find_executable("ctest")
}

/// Find a C++ compiler, honoring `CXX`.
pub fn find_cxx_compiler() -> Option<PathBuf> {
    if let Ok(cxx) = std::env::var("CXX") {
        if let Some(path) = find_executable(&cxx) {
            return Some(path);
        }
        tracing::warn!("CXX={} not found in PATH, searching defaults", cxx);
    }

    ["c++", "g++", "clang++"]
        .iter()
        .find_map(|name| find_executable(name))
}
