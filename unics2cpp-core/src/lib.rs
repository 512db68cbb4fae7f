//! Toolchain-side building blocks for UniCs2Cpp.
//!
//! - Argument token scanning over the editor command line
//! - The allow-listed settings surface and its enums
//! - The configuration mapper (static allow-list dispatch)
//! - The in-editor build step that exports generated sources

pub mod args;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod settings;

/// Identifier used for the module descriptor, the staged source file and
/// as the substring filter when harvesting generated output.
pub const PROJECT_TOKEN: &str = "UniCs2Cpp";

/// Project-relative folder the editor side exports generated sources into.
pub const OUTPUT_DIR_NAME: &str = "output";

pub use args::ArgumentTokens;
pub use error::{EditorError, EditorResult};
pub use mapper::{ALLOW_LIST, AllowListEntry, AppliedSetting, ConfigurationMapper, MemberKind};
pub use pipeline::{BuildPipeline, BuildReport, EditorBuild, PlayerBuildRequest, SceneEntry};
pub use settings::{
    ApiCompatibilityLevel, BuildTarget, BuildTargetGroup, Il2CppCompilerConfiguration,
    ManagedStrippingLevel, PlayerSettings, RecordedSettings, ScriptingImplementation,
    SettingEnum, parse_enum,
};
