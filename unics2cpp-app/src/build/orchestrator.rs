//! One run: workspace -> stage -> toolchain -> harvest, with cleanup on
//! every path.

use unics2cpp_core::{ArgumentTokens, BuildTarget, ConfigurationMapper, RecordedSettings, SettingEnum};
use unics2cpp_core::mapper::resolve_enum;

use super::error::Result;
use super::harvest::harvest;
use super::runner::{BuildRunner, command_spec};
use super::toolchain::ToolchainConfig;
use super::types::{CommandSpec, ExitCode, RunOutcome, StageOutcome, WorkRequest};
use super::workspace::Workspace;

pub struct Orchestrator {
    config: ToolchainConfig,
    runner: BuildRunner,
}

impl Orchestrator {
    pub fn new(config: ToolchainConfig) -> Self {
        Self {
            config,
            runner: BuildRunner::new(),
        }
    }

    /// Execute one run. The workspace is gone when this returns, whether
    /// it returns `Ok` or `Err`.
    pub fn run(&self, request: &WorkRequest) -> Result<RunOutcome> {
        let workspace = Workspace::create(&self.config)?;
        let outcome = self.run_in(&workspace, request);

        // a run error takes precedence over a cleanup error
        match (outcome, workspace.destroy()) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
        }
    }

    fn run_in(&self, workspace: &Workspace, request: &WorkRequest) -> Result<RunOutcome> {
        let staged = workspace.stage_input(&request.input)?;
        if self.config.strict && staged == StageOutcome::SourceMissing {
            return Ok(RunOutcome {
                workspace_root: workspace.root().to_path_buf(),
                staged,
                build: None,
                harvest: None,
            });
        }

        let spec = command_spec(&self.config, workspace);
        self.preview(&spec);

        let build = self.runner.run(&spec)?;
        let harvest = match harvest(workspace.output_dir(), workspace.token(), &request.output) {
            Ok(outcome) => Some(outcome),
            // a failed toolchain keeps its own exit code
            Err(e) if !build.success() => {
                tracing::warn!("Harvest after failed toolchain run: {:#}", anyhow::Error::from(e));
                None
            }
            Err(e) => return Err(e),
        };

        Ok(RunOutcome {
            workspace_root: workspace.root().to_path_buf(),
            staged,
            build: Some(build),
            harvest,
        })
    }

    /// Log what the editor side will make of the command line.
    fn preview(&self, spec: &CommandSpec) {
        let target = resolve_enum::<BuildTarget>(&ArgumentTokens::new(&spec.args), BuildTarget::TYPE_NAME);
        let Some(target) = target else {
            tracing::warn!("No build target on the command line; the editor build will abort");
            return;
        };

        let mut settings = RecordedSettings::default();
        let applied = ConfigurationMapper::new(target.group()).apply(&spec.args, &mut settings);
        tracing::info!(
            "Editor will build {} with {} setting(s): {}",
            target,
            applied.len(),
            applied
                .iter()
                .map(|a| format!("{}={}", a.member, a.value))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    /// Run and map the result to the process exit code.
    pub fn execute(&self, request: &WorkRequest) -> ExitCode {
        match self.run(request) {
            Ok(outcome) => {
                let code = outcome.exit_code(self.config.strict);
                if code != ExitCode::Success {
                    tracing::error!("{}", code);
                }
                code
            }
            Err(e) => {
                tracing::error!("{:#}", anyhow::Error::from(e));
                ExitCode::Failure
            }
        }
    }
}
