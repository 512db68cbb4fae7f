//! Build orchestration types

use std::fmt;
use std::path::PathBuf;

/// Process exit codes of the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InputMissing,
    OutputMissing,
    InputNotAbsolute,
    OutputNotAbsolute,
    SamePath,
    /// Filesystem, spawn or harvest failure inside the orchestrator
    Failure,
    /// Strict mode: the input file did not exist when staging
    SourceMissing,
    /// Strict mode: the toolchain produced no matching artifact
    NoArtifact,
    /// Non-zero exit code of the toolchain, passed through verbatim
    Toolchain(i32),
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InputMissing => 11,
            ExitCode::OutputMissing => 12,
            ExitCode::InputNotAbsolute => 21,
            ExitCode::OutputNotAbsolute => 22,
            ExitCode::SamePath => 30,
            ExitCode::Failure => 1,
            ExitCode::SourceMissing => 40,
            ExitCode::NoArtifact => 41,
            ExitCode::Toolchain(code) => *code,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExitCode::Success => "success",
            ExitCode::InputMissing => "--input is required",
            ExitCode::OutputMissing => "--output is required",
            ExitCode::InputNotAbsolute => "--input must be an absolute path",
            ExitCode::OutputNotAbsolute => "--output must be an absolute path",
            ExitCode::SamePath => "--input and --output must differ",
            ExitCode::Failure => "internal failure",
            ExitCode::SourceMissing => "input file does not exist",
            ExitCode::NoArtifact => "toolchain produced no artifact",
            ExitCode::Toolchain(_) => "toolchain failed",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (exit code {})", self.description(), self.code())
    }
}

/// Validated paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRequest {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Executable plus arguments for the single toolchain invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.executable.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(token: &str) -> String {
    if !token.is_empty() && !token.contains(|c: char| c.is_whitespace() || c == '"') {
        return token.to_string();
    }
    format!("\"{}\"", token.replace('"', "\\\""))
}

/// Result of the toolchain process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildResult {
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl BuildResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// What staging the input did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Staged { path: PathBuf },
    SourceMissing,
}

/// What harvesting did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestOutcome {
    Copied { from: PathBuf, to: PathBuf, bytes: u64 },
    NoArtifact,
}

/// Everything observable about one run after the workspace is gone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub workspace_root: PathBuf,
    pub staged: StageOutcome,
    /// `None` when the run stopped before invoking the toolchain
    pub build: Option<BuildResult>,
    /// `None` when the toolchain was not invoked, or when harvesting after
    /// a failed toolchain run errored
    pub harvest: Option<HarvestOutcome>,
}

impl RunOutcome {
    /// Map the run to the process exit code. The two quiet no-ops only
    /// change the code when `strict` is set.
    pub fn exit_code(&self, strict: bool) -> ExitCode {
        if strict && self.staged == StageOutcome::SourceMissing {
            return ExitCode::SourceMissing;
        }
        match self.build {
            Some(build) if !build.success() => return ExitCode::Toolchain(build.exit_code),
            _ => {}
        }
        if strict && self.harvest == Some(HarvestOutcome::NoArtifact) {
            return ExitCode::NoArtifact;
        }
        ExitCode::Success
    }
}
