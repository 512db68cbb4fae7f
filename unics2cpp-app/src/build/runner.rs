//! Toolchain invocation

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{RecvTimeoutError, Sender, unbounded};

use super::error::{BuildError, Result};
use super::toolchain::ToolchainConfig;
use super::types::{BuildResult, CommandSpec};
use super::workspace::Workspace;

/// Build the single command line for this run.
///
/// Everything except the project path and the log path comes from the
/// configuration.
pub fn command_spec(config: &ToolchainConfig, workspace: &Workspace) -> CommandSpec {
    let mut args = config.batch_flags.clone();
    args.extend([
        "-quit".to_string(),
        "-projectPath".to_string(),
        workspace.project_dir().to_string_lossy().to_string(),
        "-executeMethod".to_string(),
        config.entry_point.clone(),
        "--BuildTarget".to_string(),
        config.build_target.clone(),
        "--ApplicationIdentifier".to_string(),
        config.application_identifier.clone(),
        "--ScriptingBackend".to_string(),
        config.scripting_backend.clone(),
    ]);
    args.extend(config.extra_args.iter().cloned());
    args.push("-logFile".to_string());
    args.push(workspace.log_file().to_string_lossy().to_string());

    CommandSpec {
        executable: config.executable.clone(),
        args,
        current_dir: workspace.root().to_path_buf(),
    }
}

/// How often the child is polled while no output arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Output still collected after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Runs the toolchain to completion.
///
/// There is no timeout and no cancellation: a hung toolchain blocks the
/// caller until it is terminated externally.
#[derive(Debug, Default)]
pub struct BuildRunner;

impl BuildRunner {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `spec`, forward its output to the log and wait for it to exit.
    pub fn run(&self, spec: &CommandSpec) -> Result<BuildResult> {
        let start_time = Instant::now();
        tracing::info!("Running {}", spec);

        let mut child = Command::new(&spec.executable)
            .args(&spec.args)
            .current_dir(&spec.current_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BuildError::Spawn {
                executable: spec.executable.clone(),
                source,
            })?;

        let (sender, receiver) = unbounded();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, Stream::Stdout, sender.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, Stream::Stderr, sender.clone());
        }
        drop(sender);

        // The process exit ends the run, not the end of its output: helpers
        // started by the toolchain may inherit the pipes and outlive it.
        let status = loop {
            match receiver.recv_timeout(POLL_INTERVAL) {
                Ok((stream, line)) => log_line(stream, &line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    break child
                        .wait()
                        .map_err(|e| BuildError::io("wait for", &spec.executable, e))?;
                }
            }
            if let Some(status) = child
                .try_wait()
                .map_err(|e| BuildError::io("wait for", &spec.executable, e))?
            {
                break status;
            }
        };
        let deadline = Instant::now() + DRAIN_GRACE;
        while let Ok((stream, line)) = receiver.recv_deadline(deadline) {
            log_line(stream, &line);
        }
        let duration = start_time.elapsed();

        let result = BuildResult {
            exit_code: status.code().unwrap_or(-1),
            duration_ms: duration.as_millis() as u64,
        };

        if result.success() {
            tracing::info!("Toolchain completed in {:.1}s", duration.as_secs_f32());
        } else {
            tracing::error!(
                "Toolchain failed with exit code {} after {:.1}s",
                result.exit_code,
                duration.as_secs_f32()
            );
        }

        Ok(result)
    }
}

fn log_line(stream: Stream, line: &str) {
    match stream {
        Stream::Stdout => tracing::debug!(target: "toolchain", "{}", line),
        Stream::Stderr => tracing::debug!(target: "toolchain", "stderr: {}", line),
    }
}

/// Detached reader; it ends at EOF or once the receiver is gone.
fn forward_lines<R: Read + Send + 'static>(source: R, stream: Stream, sender: Sender<(Stream, String)>) {
    thread::spawn(move || {
        let reader = BufReader::new(source);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if sender.send((stream, line)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    use crate::build::toolchain::HELPER_BINARY_NAME;

    fn workspace(temp: &TempDir) -> (ToolchainConfig, Workspace) {
        let helper = temp.path().join(HELPER_BINARY_NAME);
        fs::write(&helper, b"MZ").unwrap();
        let config = ToolchainConfig {
            executable: PathBuf::from("/opt/editor/Unity"),
            helper_binary: Some(helper),
            workspace_parent: Some(temp.path().to_path_buf()),
            extra_args: vec!["--stripEngineCode".to_string()],
            ..ToolchainConfig::default()
        };
        let workspace = Workspace::create(&config).unwrap();
        (config, workspace)
    }

    #[test]
    fn test_command_spec_template() {
        let temp = TempDir::new().unwrap();
        let (config, workspace) = workspace(&temp);
        let spec = command_spec(&config, &workspace);

        assert_eq!(spec.executable, PathBuf::from("/opt/editor/Unity"));
        assert_eq!(&spec.args[..3], &["-batchmode", "-nographics", "-quit"]);

        let value_after = |flag: &str| {
            let index = spec.args.iter().position(|a| a == flag).unwrap();
            spec.args[index + 1].clone()
        };
        assert_eq!(value_after("-projectPath"), workspace.project_dir().to_string_lossy());
        assert_eq!(value_after("-executeMethod"), "UniCs2Cpp.Editor.Builder.Build");
        assert_eq!(value_after("--BuildTarget"), "iOS");
        assert_eq!(value_after("--ScriptingBackend"), "IL2CPP");
        assert_eq!(value_after("-logFile"), workspace.log_file().to_string_lossy());
        assert!(spec.args.contains(&"--stripEngineCode".to_string()));
        assert_eq!(spec.args.last().unwrap(), &workspace.log_file().to_string_lossy().to_string());
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let spec = CommandSpec {
            executable: temp.path().join("no-such-editor"),
            args: Vec::new(),
            current_dir: temp.path().to_path_buf(),
        };

        let err = BuildRunner::new().run(&spec).unwrap_err();
        assert!(matches!(err, BuildError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_is_verbatim() {
        let temp = TempDir::new().unwrap();
        let spec = CommandSpec {
            executable: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "echo building; echo oops >&2; exit 7".to_string()],
            current_dir: temp.path().to_path_buf(),
        };

        let result = BuildRunner::new().run(&spec).unwrap();
        assert_eq!(result.exit_code, 7);
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_returns_when_toolchain_exits_despite_open_pipes() {
        let temp = TempDir::new().unwrap();
        // the background sleep inherits stdout and stderr and keeps them open
        let spec = CommandSpec {
            executable: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "sleep 5 & echo started; exit 3".to_string()],
            current_dir: temp.path().to_path_buf(),
        };

        let start = Instant::now();
        let result = BuildRunner::new().run(&spec).unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(start.elapsed() < Duration::from_secs(3), "returned after {:?}", start.elapsed());
    }
}
