//! The externally-owned player settings surface
//!
//! The editor exposes many more members than these. Only what the allow-list
//! in [`crate::mapper`] names is ever written.

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display, EnumString, IntoStaticStr, VariantNames};

/// Enum-typed setting values that can also be selected by their type name
/// (`--BuildTarget iOS`) when the member-specific key is absent.
pub trait SettingEnum: FromStr + fmt::Display + Copy + strum::VariantNames {
    const TYPE_NAME: &'static str;
}

/// Case-insensitive parse of an enum token. Failure is `None`; callers
/// decide whether that is fatal or a skip.
pub fn parse_enum<T: SettingEnum>(token: &str) -> Option<T> {
    token.trim().parse().ok()
}

/// Target platform selector for the player build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum BuildTarget {
    #[strum(serialize = "StandaloneOSX")]
    StandaloneOsx,
    #[strum(serialize = "StandaloneWindows64")]
    StandaloneWindows64,
    #[strum(serialize = "StandaloneLinux64")]
    StandaloneLinux64,
    #[strum(serialize = "iOS")]
    Ios,
    #[strum(serialize = "Android")]
    Android,
    #[strum(serialize = "WebGL")]
    WebGl,
}

impl BuildTarget {
    pub fn group(&self) -> BuildTargetGroup {
        match self {
            BuildTarget::StandaloneOsx
            | BuildTarget::StandaloneWindows64
            | BuildTarget::StandaloneLinux64 => BuildTargetGroup::Standalone,
            BuildTarget::Ios => BuildTargetGroup::Ios,
            BuildTarget::Android => BuildTargetGroup::Android,
            BuildTarget::WebGl => BuildTargetGroup::WebGl,
        }
    }
}

impl SettingEnum for BuildTarget {
    const TYPE_NAME: &'static str = "BuildTarget";
}

/// Platform category passed as the first argument of per-platform setters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum BuildTargetGroup {
    #[strum(serialize = "Standalone")]
    Standalone,
    #[strum(serialize = "iOS")]
    Ios,
    #[strum(serialize = "Android")]
    Android,
    #[strum(serialize = "WebGL")]
    WebGl,
}

impl SettingEnum for BuildTargetGroup {
    const TYPE_NAME: &'static str = "BuildTargetGroup";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum ScriptingImplementation {
    #[strum(serialize = "Mono2x")]
    Mono2x,
    #[strum(serialize = "IL2CPP")]
    Il2Cpp,
    #[strum(serialize = "WinRTDotNET")]
    WinRtDotNet,
}

impl SettingEnum for ScriptingImplementation {
    const TYPE_NAME: &'static str = "ScriptingImplementation";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum Il2CppCompilerConfiguration {
    Debug,
    Release,
    Master,
}

impl SettingEnum for Il2CppCompilerConfiguration {
    const TYPE_NAME: &'static str = "Il2CppCompilerConfiguration";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum ManagedStrippingLevel {
    Disabled,
    Minimal,
    Low,
    Medium,
    High,
}

impl SettingEnum for ManagedStrippingLevel {
    const TYPE_NAME: &'static str = "ManagedStrippingLevel";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, VariantNames)]
#[strum(ascii_case_insensitive)]
pub enum ApiCompatibilityLevel {
    #[strum(serialize = "NET_2_0")]
    Net20,
    #[strum(serialize = "NET_2_0_Subset")]
    Net20Subset,
    #[strum(serialize = "NET_4_6")]
    Net46,
    #[strum(serialize = "NET_Standard_2_0")]
    NetStandard20,
    #[strum(serialize = "NET_Standard")]
    NetStandard,
    #[strum(serialize = "NET_Unity_4_8")]
    NetUnity48,
}

impl SettingEnum for ApiCompatibilityLevel {
    const TYPE_NAME: &'static str = "ApiCompatibilityLevel";
}

/// Settable members of the editor's player settings.
///
/// Properties take the value alone; setters take the platform group first.
pub trait PlayerSettings {
    fn set_strip_engine_code(&mut self, value: bool);
    fn set_strip_unused_mesh_components(&mut self, value: bool);
    fn set_product_name(&mut self, value: String);
    fn set_company_name(&mut self, value: String);
    fn set_bundle_version(&mut self, value: String);

    fn set_scripting_backend(&mut self, group: BuildTargetGroup, value: ScriptingImplementation);
    fn set_application_identifier(&mut self, group: BuildTargetGroup, value: String);
    fn set_il2cpp_compiler_configuration(
        &mut self,
        group: BuildTargetGroup,
        value: Il2CppCompilerConfiguration,
    );
    fn set_managed_stripping_level(&mut self, group: BuildTargetGroup, value: ManagedStrippingLevel);
    fn set_api_compatibility_level(&mut self, group: BuildTargetGroup, value: ApiCompatibilityLevel);
    fn set_incremental_il2cpp_build(&mut self, group: BuildTargetGroup, value: bool);
}

/// In-memory settings surface.
///
/// Used for previewing a command line before the toolchain runs and as the
/// observable surface in tests. `None` means the member was never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedSettings {
    pub strip_engine_code: Option<bool>,
    pub strip_unused_mesh_components: Option<bool>,
    pub product_name: Option<String>,
    pub company_name: Option<String>,
    pub bundle_version: Option<String>,
    pub scripting_backend: Option<(BuildTargetGroup, ScriptingImplementation)>,
    pub application_identifier: Option<(BuildTargetGroup, String)>,
    pub il2cpp_compiler_configuration: Option<(BuildTargetGroup, Il2CppCompilerConfiguration)>,
    pub managed_stripping_level: Option<(BuildTargetGroup, ManagedStrippingLevel)>,
    pub api_compatibility_level: Option<(BuildTargetGroup, ApiCompatibilityLevel)>,
    pub incremental_il2cpp_build: Option<(BuildTargetGroup, bool)>,
}

impl PlayerSettings for RecordedSettings {
    fn set_strip_engine_code(&mut self, value: bool) {
        self.strip_engine_code = Some(value);
    }

    fn set_strip_unused_mesh_components(&mut self, value: bool) {
        self.strip_unused_mesh_components = Some(value);
    }

    fn set_product_name(&mut self, value: String) {
        self.product_name = Some(value);
    }

    fn set_company_name(&mut self, value: String) {
        self.company_name = Some(value);
    }

    fn set_bundle_version(&mut self, value: String) {
        self.bundle_version = Some(value);
    }

    fn set_scripting_backend(&mut self, group: BuildTargetGroup, value: ScriptingImplementation) {
        self.scripting_backend = Some((group, value));
    }

    fn set_application_identifier(&mut self, group: BuildTargetGroup, value: String) {
        self.application_identifier = Some((group, value));
    }

    fn set_il2cpp_compiler_configuration(
        &mut self,
        group: BuildTargetGroup,
        value: Il2CppCompilerConfiguration,
    ) {
        self.il2cpp_compiler_configuration = Some((group, value));
    }

    fn set_managed_stripping_level(&mut self, group: BuildTargetGroup, value: ManagedStrippingLevel) {
        self.managed_stripping_level = Some((group, value));
    }

    fn set_api_compatibility_level(&mut self, group: BuildTargetGroup, value: ApiCompatibilityLevel) {
        self.api_compatibility_level = Some((group, value));
    }

    fn set_incremental_il2cpp_build(&mut self, group: BuildTargetGroup, value: bool) {
        self.incremental_il2cpp_build = Some((group, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enum_ignores_case() {
        assert_eq!(parse_enum::<ScriptingImplementation>("IL2CPP"), Some(ScriptingImplementation::Il2Cpp));
        assert_eq!(parse_enum::<ScriptingImplementation>("il2cpp"), Some(ScriptingImplementation::Il2Cpp));
        assert_eq!(parse_enum::<BuildTarget>("ios"), Some(BuildTarget::Ios));
        assert_eq!(parse_enum::<ApiCompatibilityLevel>("net_standard_2_0"), Some(ApiCompatibilityLevel::NetStandard20));
    }

    #[test]
    fn test_parse_enum_failure_is_none() {
        assert_eq!(parse_enum::<ScriptingImplementation>("bogus"), None);
        assert_eq!(parse_enum::<BuildTarget>(""), None);
    }

    #[test]
    fn test_display_uses_editor_names() {
        assert_eq!(ScriptingImplementation::Il2Cpp.to_string(), "IL2CPP");
        assert_eq!(BuildTarget::Ios.to_string(), "iOS");
        assert_eq!(BuildTarget::StandaloneOsx.group(), BuildTargetGroup::Standalone);
    }
}
