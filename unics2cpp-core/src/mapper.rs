//! Name-driven mapping from the editor command line onto player settings
//!
//! Each allow-listed member is declared once in [`ALLOW_LIST`] together with
//! the typed applier that resolves its value and calls the surface. Members
//! not in the table are never touched, whatever the command line contains.

use crate::args::ArgumentTokens;
use crate::settings::{
    ApiCompatibilityLevel, BuildTargetGroup, Il2CppCompilerConfiguration, ManagedStrippingLevel,
    PlayerSettings, ScriptingImplementation, SettingEnum, parse_enum,
};

/// Length of the verb prefix (`Set`) stripped from setter names to form
/// their command line key.
const SETTER_VERB_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Static settable property, keyed by its own name
    Property,
    /// Two-argument setter `(group, value)`, keyed by its name minus the verb
    Setter,
}

type Applier =
    fn(&ArgumentTokens<'_>, &str, BuildTargetGroup, &mut dyn PlayerSettings) -> Option<String>;

pub struct AllowListEntry {
    pub name: &'static str,
    pub kind: MemberKind,
    apply: Applier,
}

impl AllowListEntry {
    /// Command line key this member is read from.
    pub fn key(&self) -> &'static str {
        match self.kind {
            MemberKind::Property => self.name,
            MemberKind::Setter => self.name.get(SETTER_VERB_LEN..).unwrap_or(self.name),
        }
    }
}

impl std::fmt::Debug for AllowListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowListEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

pub static ALLOW_LIST: &[AllowListEntry] = &[
    // =================================================================
    // Properties
    // =================================================================
    AllowListEntry {
        name: "stripEngineCode",
        kind: MemberKind::Property,
        apply: |args, key, _, settings| {
            let value = presence(args, key)?;
            settings.set_strip_engine_code(value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "stripUnusedMeshComponents",
        kind: MemberKind::Property,
        apply: |args, key, _, settings| {
            let value = presence(args, key)?;
            settings.set_strip_unused_mesh_components(value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "productName",
        kind: MemberKind::Property,
        apply: |args, key, _, settings| {
            let value = coerce(args, key, parse_string)?;
            settings.set_product_name(value.clone());
            Some(value)
        },
    },
    AllowListEntry {
        name: "companyName",
        kind: MemberKind::Property,
        apply: |args, key, _, settings| {
            let value = coerce(args, key, parse_string)?;
            settings.set_company_name(value.clone());
            Some(value)
        },
    },
    AllowListEntry {
        name: "bundleVersion",
        kind: MemberKind::Property,
        apply: |args, key, _, settings| {
            let value = coerce(args, key, parse_string)?;
            settings.set_bundle_version(value.clone());
            Some(value)
        },
    },
    // =================================================================
    // Setters (group, value)
    // =================================================================
    AllowListEntry {
        name: "SetScriptingBackend",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = resolve_enum::<ScriptingImplementation>(args, key)?;
            settings.set_scripting_backend(group, value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "SetApplicationIdentifier",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = coerce(args, key, parse_string)?;
            settings.set_application_identifier(group, value.clone());
            Some(value)
        },
    },
    AllowListEntry {
        name: "SetIl2CppCompilerConfiguration",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = resolve_enum::<Il2CppCompilerConfiguration>(args, key)?;
            settings.set_il2cpp_compiler_configuration(group, value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "SetManagedStrippingLevel",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = resolve_enum::<ManagedStrippingLevel>(args, key)?;
            settings.set_managed_stripping_level(group, value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "SetApiCompatibilityLevel",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = resolve_enum::<ApiCompatibilityLevel>(args, key)?;
            settings.set_api_compatibility_level(group, value);
            Some(value.to_string())
        },
    },
    AllowListEntry {
        name: "SetIncrementalIl2CppBuild",
        kind: MemberKind::Setter,
        apply: |args, key, group, settings| {
            let value = coerce(args, key, parse_bool)?;
            settings.set_incremental_il2cpp_build(group, value);
            Some(value.to_string())
        },
    },
];

/// A member the mapper wrote, with the value rendered for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSetting {
    pub member: &'static str,
    pub kind: MemberKind,
    pub value: String,
}

/// Applies [`ALLOW_LIST`] against a settings surface for one target group.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationMapper {
    target_group: BuildTargetGroup,
}

impl ConfigurationMapper {
    pub fn new(target_group: BuildTargetGroup) -> Self {
        Self { target_group }
    }

    /// Resolve every allow-listed member from `args` and write the ones
    /// that resolved. Unresolved members are skipped silently.
    pub fn apply(&self, args: &[String], settings: &mut dyn PlayerSettings) -> Vec<AppliedSetting> {
        let tokens = ArgumentTokens::new(args);
        let mut applied = Vec::new();

        for entry in ALLOW_LIST {
            match (entry.apply)(&tokens, entry.key(), self.target_group, settings) {
                Some(value) => {
                    tracing::info!("Applied {} = {}", entry.name, value);
                    applied.push(AppliedSetting {
                        member: entry.name,
                        kind: entry.kind,
                        value,
                    });
                }
                None => tracing::debug!("Skipped {} (no value for --{})", entry.name, entry.key()),
            }
        }

        applied
    }
}

/// Resolve an enum value for `key`.
///
/// A raw token after `--<key>` is parsed case-insensitively and a failed
/// parse yields `None`. Only when no raw token exists is `--<TypeName>`
/// consulted instead.
pub fn resolve_enum<T: SettingEnum>(args: &ArgumentTokens<'_>, key: &str) -> Option<T> {
    match args.value_of(key) {
        Some(raw) => {
            let parsed = parse_enum::<T>(raw);
            if parsed.is_none() {
                tracing::warn!(
                    "Ignoring --{} {:?}: expected one of {}",
                    key,
                    raw,
                    T::VARIANTS.join(", ")
                );
            }
            parsed
        }
        None => args.value_of(T::TYPE_NAME).and_then(parse_enum::<T>),
    }
}

fn presence(args: &ArgumentTokens<'_>, key: &str) -> Option<bool> {
    args.has_flag(key).then_some(true)
}

fn coerce<T>(args: &ArgumentTokens<'_>, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = args.value_of(key).filter(|raw| !raw.is_empty())?;
    let value = parse(raw);
    if value.is_none() {
        tracing::warn!("Ignoring --{} {:?}: value has the wrong type", key, raw);
    }
    value
}

fn parse_string(raw: &str) -> Option<String> {
    Some(raw.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RecordedSettings;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn apply(tokens: &[&str]) -> (RecordedSettings, Vec<AppliedSetting>) {
        let mut settings = RecordedSettings::default();
        let applied = ConfigurationMapper::new(BuildTargetGroup::Ios).apply(&argv(tokens), &mut settings);
        (settings, applied)
    }

    #[test]
    fn test_setter_keys_drop_verb() {
        let keys: Vec<_> = ALLOW_LIST
            .iter()
            .filter(|e| e.kind == MemberKind::Setter)
            .map(|e| e.key())
            .collect();
        assert!(keys.contains(&"ScriptingBackend"));
        assert!(keys.contains(&"ApplicationIdentifier"));
        assert!(ALLOW_LIST.iter().any(|e| e.key() == "stripEngineCode"));
    }

    #[test]
    fn test_bool_property_is_presence_flag() {
        let (settings, applied) = apply(&["--stripEngineCode"]);
        assert_eq!(settings.strip_engine_code, Some(true));
        assert_eq!(applied.len(), 1);

        let (settings, applied) = apply(&["-batchmode"]);
        assert_eq!(settings.strip_engine_code, None);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_string_property_requires_non_empty_value() {
        let (settings, _) = apply(&["--productName", "Demo", "--companyName", ""]);
        assert_eq!(settings.product_name.as_deref(), Some("Demo"));
        assert_eq!(settings.company_name, None);
    }

    #[test]
    fn test_enum_setter_parses_value() {
        let (settings, applied) = apply(&["--ScriptingBackend", "IL2CPP"]);
        assert_eq!(
            settings.scripting_backend,
            Some((BuildTargetGroup::Ios, ScriptingImplementation::Il2Cpp))
        );
        assert_eq!(applied[0].member, "SetScriptingBackend");
        assert_eq!(applied[0].value, "IL2CPP");
    }

    #[test]
    fn test_enum_setter_skips_unparseable_value() {
        let (settings, applied) = apply(&["--ScriptingBackend", "bogus"]);
        assert_eq!(settings.scripting_backend, None);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_enum_setter_falls_back_to_type_name() {
        let (settings, _) = apply(&["--ManagedStrippingLevel", "high"]);
        assert_eq!(
            settings.managed_stripping_level,
            Some((BuildTargetGroup::Ios, ManagedStrippingLevel::High))
        );

        // a raw token that fails to parse does not fall back
        let (settings, _) = apply(&[
            "--ScriptingBackend",
            "bogus",
            "--ScriptingImplementation",
            "IL2CPP",
        ]);
        assert_eq!(settings.scripting_backend, None);
    }

    #[test]
    fn test_bool_setter_coerces_token() {
        let (settings, _) = apply(&["--IncrementalIl2CppBuild", "False"]);
        assert_eq!(settings.incremental_il2cpp_build, Some((BuildTargetGroup::Ios, false)));

        let (settings, _) = apply(&["--IncrementalIl2CppBuild", "maybe"]);
        assert_eq!(settings.incremental_il2cpp_build, None);
    }

    #[test]
    fn test_members_outside_allow_list_are_ignored() {
        let (settings, applied) = apply(&["--runInBackground", "--SetScriptingBackend", "IL2CPP"]);
        assert_eq!(settings, RecordedSettings::default());
        assert!(applied.is_empty());
    }
}
