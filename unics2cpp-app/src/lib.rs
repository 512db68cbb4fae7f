pub mod build;
pub mod cli;
pub mod logging;

use anyhow::Context;

use crate::build::{ExitCode, Orchestrator, ToolchainConfig, validate};
use crate::cli::Cli;

/// Full program: configuration, logging, then [`execute`].
pub fn launch(cli: Cli) -> anyhow::Result<i32> {
    let config = cli
        .toolchain_config()
        .context("failed to load toolchain configuration")?;
    let _guard = logging::init(cli.verbose, config.log_dir.as_deref())?;

    Ok(execute(&cli, config))
}

/// Validate the paths and run once. Returns the process exit code.
///
/// Validation failures return before any directory is created.
pub fn execute(cli: &Cli, config: ToolchainConfig) -> i32 {
    let request = match validate(cli.input.as_deref(), cli.output.as_deref()) {
        Ok(request) => request,
        Err(code) => {
            tracing::error!("{}", code);
            return code.code();
        }
    };

    let code: ExitCode = Orchestrator::new(config).execute(&request);
    code.code()
}
