//! Toolchain location and fixed invocation parameters

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use unics2cpp_core::{BuildTarget, PROJECT_TOKEN, ScriptingImplementation, parse_enum};

use super::error::{BuildError, Result};

/// Prebuilt editor extension that carries the in-editor build step
pub const HELPER_BINARY_NAME: &str = "UniCs2Cpp.Editor.dll";

/// Editor method invoked by `-executeMethod`
pub const ENTRY_POINT: &str = "UniCs2Cpp.Editor.Builder.Build";

const EDITOR_VERSION: &str = "2021.3.45f1";
const CONFIG_FILE_NAME: &str = "toolchain.toml";

/// Everything about the external toolchain that is not derived per run.
///
/// Defaults describe the one supported install; a TOML file can override
/// any field (tests point `executable` at a stub script).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub executable: PathBuf,
    pub batch_flags: Vec<String>,
    pub entry_point: String,
    pub build_target: String,
    pub application_identifier: String,
    pub scripting_backend: String,
    /// Appended after the fixed flags, before `-logFile`
    pub extra_args: Vec<String>,
    pub project_token: String,
    /// File name of the toolchain log inside the workspace
    pub log_file_name: String,
    /// Explicit helper binary; discovered next to the executable when unset
    pub helper_binary: Option<PathBuf>,
    /// Parent of per-run workspaces; system temp dir when unset
    pub workspace_parent: Option<PathBuf>,
    /// Directory for the orchestrator's own log file
    pub log_dir: Option<PathBuf>,
    pub strict: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            executable: default_editor_executable(),
            batch_flags: vec!["-batchmode".to_string(), "-nographics".to_string()],
            entry_point: ENTRY_POINT.to_string(),
            build_target: BuildTarget::Ios.to_string(),
            application_identifier: "com.unics2cpp.generated".to_string(),
            scripting_backend: ScriptingImplementation::Il2Cpp.to_string(),
            extra_args: Vec::new(),
            project_token: PROJECT_TOKEN.to_string(),
            log_file_name: "editor.log".to_string(),
            helper_binary: None,
            workspace_parent: None,
            log_dir: None,
            strict: false,
        }
    }
}

impl ToolchainConfig {
    /// Load configuration from `path`, or from the per-user config file if
    /// it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.is_file()),
        };

        let config = match path {
            Some(path) => {
                let content =
                    fs::read_to_string(&path).map_err(|e| BuildError::io("read", &path, e))?;
                tracing::debug!("Loaded toolchain configuration from {}", path.display());
                Self::from_toml_str(&content).map_err(|source| BuildError::Toml { path, source })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject values the editor side could never resolve.
    pub fn validate(&self) -> Result<()> {
        self.target()?;
        if parse_enum::<ScriptingImplementation>(&self.scripting_backend).is_none() {
            return Err(BuildError::Config(format!(
                "unknown scripting backend {:?}",
                self.scripting_backend
            )));
        }
        if self.project_token.is_empty() {
            return Err(BuildError::Config("project token must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn target(&self) -> Result<BuildTarget> {
        parse_enum::<BuildTarget>(&self.build_target)
            .ok_or_else(|| BuildError::Config(format!("unknown build target {:?}", self.build_target)))
    }

    /// Resolve the helper binary: configured path first, then the bundled
    /// copy shipped next to the executable.
    pub fn helper_binary_path(&self) -> Option<PathBuf> {
        match &self.helper_binary {
            Some(path) => path.is_file().then(|| path.clone()),
            None => bundled_helper_path(),
        }
    }
}

/// Per-user configuration file (`<config dir>/toolchain.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "UniCs2Cpp", "unics2cpp").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Find the helper binary bundled alongside the running executable
fn bundled_helper_path() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))?;

    let candidates = [
        exe_dir.join(HELPER_BINARY_NAME),
        exe_dir.join("resources").join(HELPER_BINARY_NAME),
        exe_dir.join("..").join("share").join("unics2cpp").join(HELPER_BINARY_NAME),
    ];

    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Get the editor executable of the supported install for this platform
pub fn default_editor_executable() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from("C:\\Program Files\\Unity\\Hub\\Editor")
            .join(EDITOR_VERSION)
            .join("Editor")
            .join("Unity.exe")
    }

    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Applications/Unity/Hub/Editor")
            .join(EDITOR_VERSION)
            .join("Unity.app")
            .join("Contents")
            .join("MacOS")
            .join("Unity")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let home = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("/opt"));
        home.join("Unity")
            .join("Hub")
            .join("Editor")
            .join(EDITOR_VERSION)
            .join("Editor")
            .join("Unity")
    }
}
