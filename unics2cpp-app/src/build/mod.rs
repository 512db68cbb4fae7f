//! Build orchestration
//!
//! Drives the engine toolchain to translate one C# file:
//! - Path validation and exit codes
//! - Ephemeral project workspace
//! - Blocking toolchain invocation
//! - Artifact harvesting

mod error;
mod harvest;
mod orchestrator;
mod runner;
mod toolchain;
mod types;
mod validate;
mod workspace;

pub use error::{BuildError, Result};

pub use harvest::{find_artifact, harvest};

pub use orchestrator::Orchestrator;

pub use runner::{BuildRunner, command_spec};

pub use toolchain::{
    ENTRY_POINT,
    HELPER_BINARY_NAME,
    ToolchainConfig,
    default_config_path,
    default_editor_executable,
};

pub use types::{
    BuildResult,
    CommandSpec,
    ExitCode,
    HarvestOutcome,
    RunOutcome,
    StageOutcome,
    WorkRequest,
};

pub use validate::validate;

pub use workspace::Workspace;
