//! In-editor build step
//!
//! Runs inside the toolchain invocation: applies the command line to the
//! player settings, builds the player for the selected target and copies the
//! generated C++ sources into the project's public output folder, where the
//! orchestrator harvests them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::ArgumentTokens;
use crate::error::{EditorError, EditorResult};
use crate::mapper::{AppliedSetting, ConfigurationMapper, resolve_enum};
use crate::settings::{BuildTarget, BuildTargetGroup, PlayerSettings, SettingEnum};
use crate::{OUTPUT_DIR_NAME, PROJECT_TOKEN};

/// Extensions treated as generated sources when exporting.
pub const GENERATED_SOURCE_EXTENSIONS: &[&str] = &["cpp", "c", "h"];

/// Folder (relative to the project) the player build is written to.
const PLAYER_BUILD_DIR: &str = "Build";

/// Scene as listed in the editor build settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEntry {
    pub path: PathBuf,
    pub enabled: bool,
}

/// Arguments for a single player build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerBuildRequest {
    /// Enabled scenes in their configured order
    pub scenes: Vec<PathBuf>,
    /// Output location; the file name is the fixed output base name
    pub location: PathBuf,
    pub target: BuildTarget,
}

/// The editor's build entry points.
pub trait BuildPipeline {
    /// Scenes from the build settings, enabled or not, in configured order.
    fn scenes(&self) -> Vec<SceneEntry>;

    fn build_player(&mut self, request: &PlayerBuildRequest) -> Result<(), String>;
}

/// What one in-editor build did
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub applied: Vec<AppliedSetting>,
    pub target: BuildTarget,
    pub scenes: Vec<PathBuf>,
    pub exported: Vec<PathBuf>,
}

/// Build step bound to one project directory.
#[derive(Debug, Clone)]
pub struct EditorBuild {
    project_dir: PathBuf,
    mapper: ConfigurationMapper,
}

impl EditorBuild {
    pub fn new(project_dir: impl Into<PathBuf>, target_group: BuildTargetGroup) -> Self {
        Self {
            project_dir: project_dir.into(),
            mapper: ConfigurationMapper::new(target_group),
        }
    }

    /// Where IL2CPP leaves its generated C++ for `target`.
    pub fn intermediate_dir(&self, target: BuildTarget) -> PathBuf {
        self.project_dir
            .join("Library")
            .join("Il2cppBuildCache")
            .join(target.to_string())
            .join("il2cppOutput")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.project_dir.join(OUTPUT_DIR_NAME)
    }

    /// Apply settings, build, export.
    ///
    /// A missing build target is fatal; every other unresolved setting is
    /// skipped by the mapper.
    pub fn run(
        &self,
        args: &[String],
        settings: &mut dyn PlayerSettings,
        pipeline: &mut dyn BuildPipeline,
    ) -> EditorResult<BuildReport> {
        let applied = self.mapper.apply(args, settings);

        let target = resolve_enum::<BuildTarget>(&ArgumentTokens::new(args), BuildTarget::TYPE_NAME)
            .ok_or(EditorError::MissingSelector {
                selector: BuildTarget::TYPE_NAME,
            })?;

        let scenes: Vec<PathBuf> = pipeline
            .scenes()
            .into_iter()
            .filter(|scene| scene.enabled)
            .map(|scene| scene.path)
            .collect();

        let request = PlayerBuildRequest {
            scenes: scenes.clone(),
            location: self.project_dir.join(PLAYER_BUILD_DIR).join(PROJECT_TOKEN),
            target,
        };

        tracing::info!(
            "Building player for {} with {} scene(s) into {}",
            target,
            request.scenes.len(),
            request.location.display()
        );
        pipeline.build_player(&request).map_err(EditorError::Pipeline)?;

        let exported = export_generated_sources(&self.intermediate_dir(target), &self.output_dir())?;

        Ok(BuildReport {
            applied,
            target,
            scenes,
            exported,
        })
    }
}

/// Copy every generated source file directly under `from` into `to`,
/// replacing files of the same name. A missing `from` exports nothing.
pub fn export_generated_sources(from: &Path, to: &Path) -> EditorResult<Vec<PathBuf>> {
    if !from.is_dir() {
        tracing::warn!("No generated sources at {}", from.display());
        return Ok(Vec::new());
    }

    fs::create_dir_all(to).map_err(|e| EditorError::io("create", to, e))?;

    let mut exported = Vec::new();
    for entry in fs::read_dir(from).map_err(|e| EditorError::io("read", from, e))? {
        let entry = entry.map_err(|e| EditorError::io("read", from, e))?;
        let path = entry.path();
        if !path.is_file() || !is_generated_source(&path) {
            continue;
        }

        let target = to.join(entry.file_name());
        fs::copy(&path, &target).map_err(|e| EditorError::io("copy", &path, e))?;
        exported.push(target);
    }

    tracing::info!("Exported {} generated file(s) to {}", exported.len(), to.display());
    Ok(exported)
}

fn is_generated_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            GENERATED_SOURCE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
