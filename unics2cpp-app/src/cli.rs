use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::build::{Result, ToolchainConfig};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "unics2cpp",
    version,
    about = "Translate a C# source file to C++ with the engine's IL2CPP toolchain"
)]
pub struct Cli {
    /// Absolute path of the C# file to translate
    #[arg(long, value_name = "PATH")]
    pub input: Option<String>,

    /// Absolute path the generated C++ file is written to
    #[arg(long, value_name = "PATH")]
    pub output: Option<String>,

    /// Toolchain configuration file (TOML)
    #[arg(long, value_name = "FILE", env = "UNICS2CPP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Editor executable, overriding the configured one
    #[arg(long, value_name = "PATH", env = "UNICS2CPP_EDITOR")]
    pub editor: Option<PathBuf>,

    /// Fail when the input is missing or no artifact is produced
    #[arg(long)]
    pub strict: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Configuration file (or defaults) with command line overrides applied.
    pub fn toolchain_config(&self) -> Result<ToolchainConfig> {
        let mut config = ToolchainConfig::load(self.config.as_deref())?;
        if let Some(editor) = &self.editor {
            config.executable = editor.clone();
        }
        if self.strict {
            config.strict = true;
        }
        Ok(config)
    }
}
