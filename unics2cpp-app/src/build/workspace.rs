//! Per-run project workspace
//!
//! A workspace is a randomly named temporary directory holding the minimal
//! project the editor accepts:
//!
//! ```text
//! <root>/<token>/Assets/<token>/<token>.asmdef
//! <root>/<token>/Assets/<token>/<token>.cs      (staged input)
//! <root>/<token>/Assets/Scenes/scene.unity
//! <root>/<token>/Assets/Editor/<helper binary>
//! <root>/<token>/output/                        (harvested)
//! ```
//!
//! The tree is removed exactly once, by [`Workspace::destroy`] or on drop.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::TempDir;
use unics2cpp_core::OUTPUT_DIR_NAME;

use super::error::{BuildError, Result};
use super::toolchain::{HELPER_BINARY_NAME, ToolchainConfig};
use super::types::StageOutcome;

const WORKSPACE_PREFIX: &str = "unics2cpp-";
const DEFAULT_SOURCE_EXTENSION: &str = "cs";
const SCENE_FILE_NAME: &str = "scene.unity";
const SCENE_HEADER: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

/// Assembly definition (.asmdef) contents
#[derive(Debug, Serialize)]
struct ModuleDescriptor<'a> {
    name: &'a str,
}

pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    project_dir: PathBuf,
    assets_dir: PathBuf,
    output_dir: PathBuf,
    log_file: PathBuf,
    token: String,
}

impl Workspace {
    /// Allocate a fresh workspace and render the project skeleton into it.
    pub fn create(config: &ToolchainConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let parent = match &config.workspace_parent {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| BuildError::io("create", parent, e))?;
                parent.clone()
            }
            None => std::env::temp_dir(),
        };
        let dir = builder
            .tempdir_in(&parent)
            .map_err(|e| BuildError::io("create workspace in", &parent, e))?;

        let root = dir.path().to_path_buf();
        let token = config.project_token.clone();
        let project_dir = root.join(&token);
        let assets_dir = project_dir.join("Assets");

        let workspace = Self {
            dir: Some(dir),
            output_dir: project_dir.join(OUTPUT_DIR_NAME),
            log_file: root.join(&config.log_file_name),
            root,
            project_dir,
            assets_dir,
            token,
        };

        // dropping on error removes the partial tree
        workspace.render_skeleton(config)?;

        tracing::info!("Created workspace {}", workspace.root.display());
        Ok(workspace)
    }

    fn render_skeleton(&self, config: &ToolchainConfig) -> Result<()> {
        let module_dir = self.module_dir();
        let scenes_dir = self.assets_dir.join("Scenes");
        let editor_dir = self.assets_dir.join("Editor");

        for dir in [&module_dir, &scenes_dir, &editor_dir, &self.output_dir] {
            fs::create_dir_all(dir).map_err(|e| BuildError::io("create", dir, e))?;
        }

        let descriptor = serde_json::to_string_pretty(&ModuleDescriptor { name: &self.token })
            .map_err(|e| BuildError::Config(format!("cannot render module descriptor: {}", e)))?;
        let descriptor_path = module_dir.join(format!("{}.asmdef", self.token));
        fs::write(&descriptor_path, descriptor)
            .map_err(|e| BuildError::io("write", &descriptor_path, e))?;

        let scene_path = scenes_dir.join(SCENE_FILE_NAME);
        fs::write(&scene_path, SCENE_HEADER).map_err(|e| BuildError::io("write", &scene_path, e))?;

        let helper = config
            .helper_binary_path()
            .ok_or(BuildError::HelperMissing { name: HELPER_BINARY_NAME })?;
        let helper_name = helper
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| HELPER_BINARY_NAME.into());
        fs::copy(&helper, editor_dir.join(helper_name))
            .map_err(|e| BuildError::io("copy", &helper, e))?;

        Ok(())
    }

    /// Copy the caller's source file into the project's source slot.
    ///
    /// A source that does not exist is skipped, not an error; the caller
    /// decides what that means.
    pub fn stage_input(&self, source: &Path) -> Result<StageOutcome> {
        if !source.is_file() {
            tracing::warn!("Input {} does not exist, nothing staged", source.display());
            return Ok(StageOutcome::SourceMissing);
        }

        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| DEFAULT_SOURCE_EXTENSION.to_string());
        let slot = self.source_slot(&extension);

        fs::copy(source, &slot).map_err(|e| BuildError::io("copy", source, e))?;
        tracing::info!("Staged {} as {}", source.display(), slot.display());

        Ok(StageOutcome::Staged { path: slot })
    }

    /// Remove the workspace tree now and report failures.
    pub fn destroy(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => {
                dir.close().map_err(|e| BuildError::io("remove", &self.root, e))?;
                tracing::info!("Removed workspace {}", self.root.display());
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn source_slot(&self, extension: &str) -> PathBuf {
        self.module_dir().join(format!("{}.{}", self.token, extension))
    }

    fn module_dir(&self) -> PathBuf {
        self.assets_dir.join(&self.token)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!("Failed to remove workspace {}: {}", self.root.display(), e);
            } else {
                tracing::debug!("Removed workspace {} on drop", self.root.display());
            }
        }
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("token", &self.token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(temp: &TempDir) -> ToolchainConfig {
        let helper = temp.path().join(HELPER_BINARY_NAME);
        fs::write(&helper, b"MZ\x90\x00helper").unwrap();
        ToolchainConfig {
            helper_binary: Some(helper),
            workspace_parent: Some(temp.path().join("workspaces")),
            ..ToolchainConfig::default()
        }
    }

    #[test]
    fn test_create_renders_skeleton() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::create(&test_config(&temp)).unwrap();
        let assets = workspace.assets_dir();

        let descriptor = fs::read_to_string(assets.join("UniCs2Cpp").join("UniCs2Cpp.asmdef")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&descriptor).unwrap();
        assert_eq!(json["name"], "UniCs2Cpp");

        let scene = fs::read_to_string(assets.join("Scenes").join("scene.unity")).unwrap();
        assert!(scene.starts_with("%YAML 1.1"));

        assert_eq!(
            fs::read(assets.join("Editor").join(HELPER_BINARY_NAME)).unwrap(),
            b"MZ\x90\x00helper"
        );
        assert!(workspace.output_dir().is_dir());
        assert!(workspace.root().file_name().unwrap().to_string_lossy().starts_with("unics2cpp-"));
    }

    #[test]
    fn test_workspaces_do_not_collide() {
        let temp = TempDir::new().unwrap();
        let config = test_config(&temp);
        let a = Workspace::create(&config).unwrap();
        let b = Workspace::create(&config).unwrap();
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn test_stage_input_normalizes_extension() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::create(&test_config(&temp)).unwrap();
        let source = temp.path().join("Hello.CS");
        fs::write(&source, "class Hello {}").unwrap();

        let outcome = workspace.stage_input(&source).unwrap();
        let slot = workspace.source_slot("cs");
        assert_eq!(outcome, StageOutcome::Staged { path: slot.clone() });
        assert_eq!(fs::read_to_string(slot).unwrap(), "class Hello {}");
    }

    #[test]
    fn test_stage_missing_input_is_skipped() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::create(&test_config(&temp)).unwrap();

        let outcome = workspace.stage_input(&temp.path().join("absent.cs")).unwrap();
        assert_eq!(outcome, StageOutcome::SourceMissing);
        assert!(!workspace.source_slot("cs").exists());
    }

    #[test]
    fn test_destroy_and_drop_remove_tree() {
        let temp = TempDir::new().unwrap();
        let config = test_config(&temp);

        let workspace = Workspace::create(&config).unwrap();
        let root = workspace.root().to_path_buf();
        workspace.destroy().unwrap();
        assert!(!root.exists());

        let workspace = Workspace::create(&config).unwrap();
        let root = workspace.root().to_path_buf();
        drop(workspace);
        assert!(!root.exists());
    }

    #[test]
    fn test_missing_helper_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let config = ToolchainConfig {
            helper_binary: Some(temp.path().join("missing.dll")),
            workspace_parent: Some(temp.path().join("workspaces")),
            ..ToolchainConfig::default()
        };

        let err = Workspace::create(&config).unwrap_err();
        assert!(matches!(err, BuildError::HelperMissing { .. }));
        assert_eq!(fs::read_dir(temp.path().join("workspaces")).unwrap().count(), 0);
    }
}
