//! process::runner
//!
//! Subprocess spawning, output capture, and two-stage pipes.

use std::future::Future;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

/// Errors from running external commands.
///
/// `Failed` is the structured "ran but refused" case: callers that know the
/// protocol (e.g. the lock registry) inspect `stderr` to refine it.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The executable could not be launched (not found, permission denied).
    #[error("failed to launch '{command}': {message}")]
    Spawn {
        /// The command line that was attempted
        command: String,
        /// The OS error kind
        kind: std::io::ErrorKind,
        /// The OS error message
        message: String,
    },

    /// The process ran and exited unsuccessfully.
    #[error("'{}' exited with {}: {}", .command, exit_label(.exit_code), .stderr.trim())]
    Failed {
        /// The command line that failed
        command: String,
        /// Exit code, or `None` if terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// The process did not finish before the runner's deadline.
    #[error("'{command}' timed out after {after:?}")]
    TimedOut {
        /// The command line that timed out
        command: String,
        /// The deadline that was exceeded
        after: Duration,
    },

    /// Reading from or waiting on the process failed.
    #[error("i/o error while running '{command}': {message}")]
    Io {
        /// The command line being run
        command: String,
        /// Description of the failure
        message: String,
    },
}

impl CommandError {
    /// The exit code, if the process ran and exited with one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Captured standard error text, if the process ran.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Whether the executable could not be found at all.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommandError::Spawn {
                kind: std::io::ErrorKind::NotFound,
                ..
            }
        )
    }

    fn spawn(spec: &CommandSpec, err: std::io::Error) -> Self {
        CommandError::Spawn {
            command: spec.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    fn io(spec: &CommandSpec, err: impl std::fmt::Display) -> Self {
        CommandError::Io {
            command: spec.to_string(),
            message: err.to_string(),
        }
    }

    fn failed(spec: &CommandSpec, status: ExitStatus, stderr: &[u8]) -> Self {
        CommandError::Failed {
            command: spec.to_string(),
            exit_code: status.code(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "a signal".to_string(),
    }
}

/// A command line to run: program, arguments, and extra environment.
///
/// # Example
///
/// ```
/// use lockwork::process::CommandSpec;
///
/// let spec = CommandSpec::new("git").args(["lfs", "locks"]).arg("--json");
/// assert_eq!(spec.to_string(), "git lfs locks --json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd).kill_on_drop(true);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Everything the process wrote to standard output.
    pub stdout: Vec<u8>,
    /// Everything the process wrote to standard error.
    ///
    /// Some tools write progress or warnings here even on success.
    pub stderr: String,
}

impl CommandOutput {
    /// Standard output decoded as UTF-8, replacing invalid sequences.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs external commands.
///
/// The runner holds no per-call state and is cheap to clone. A deadline,
/// if set, applies to each `run`/`pipe` call as a whole; exceeding it drops
/// the in-flight future, which kills the children.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    timeout: Option<Duration>,
}

impl CommandRunner {
    /// Create a runner without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a deadline for every command run through this runner.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run a command in `cwd` and capture its output.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Spawn`] if the program cannot be launched
    /// - [`CommandError::Failed`] if it exits non-zero
    /// - [`CommandError::TimedOut`] if the deadline passes first
    pub async fn run(&self, spec: &CommandSpec, cwd: &Path) -> Result<CommandOutput, CommandError> {
        debug!(command = %spec, cwd = %cwd.display(), "running command");

        let work = async {
            let output = spec
                .command(cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .await
                .map_err(|e| CommandError::spawn(spec, e))?;

            if !output.status.success() {
                return Err(CommandError::failed(spec, output.status, &output.stderr));
            }

            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if !stderr.trim().is_empty() {
                debug!(command = %spec, stderr = %stderr.trim(), "command wrote to stderr");
            }

            Ok(CommandOutput {
                stdout: output.stdout,
                stderr,
            })
        };

        self.with_deadline(spec, work).await
    }

    /// Run `first | second` in `cwd` and return the second's stdout.
    ///
    /// Both processes run concurrently. The first's stdout is forwarded to
    /// the second's stdin through a bounded buffer as it arrives, and the
    /// second's stdin is closed once the first has exited.
    ///
    /// If the second process stops reading early and still succeeds, the
    /// first is killed and its status ignored, like a shell pipeline.
    ///
    /// # Errors
    ///
    /// Any failure of either leg fails the whole pipe; partial output of
    /// the second process is discarded.
    pub async fn pipe(
        &self,
        first: &CommandSpec,
        second: &CommandSpec,
        cwd: &Path,
    ) -> Result<Vec<u8>, CommandError> {
        debug!(first = %first, second = %second, cwd = %cwd.display(), "running pipe");

        let work = async {
            let mut upstream = first
                .command(cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| CommandError::spawn(first, e))?;

            // On failure here `upstream` is dropped and killed.
            let mut downstream = second
                .command(cwd)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| CommandError::spawn(second, e))?;

            let mut up_stdout = upstream
                .stdout
                .take()
                .ok_or_else(|| CommandError::io(first, "stdout was not captured"))?;
            let up_stderr = upstream
                .stderr
                .take()
                .ok_or_else(|| CommandError::io(first, "stderr was not captured"))?;
            let mut down_stdin = downstream
                .stdin
                .take()
                .ok_or_else(|| CommandError::io(second, "stdin was not captured"))?;
            let down_stdout = downstream
                .stdout
                .take()
                .ok_or_else(|| CommandError::io(second, "stdout was not captured"))?;
            let down_stderr = downstream
                .stderr
                .take()
                .ok_or_else(|| CommandError::io(second, "stderr was not captured"))?;

            let forward = async move {
                let forwarded = tokio::io::copy(&mut up_stdout, &mut down_stdin).await;
                let killed = match &forwarded {
                    Ok(_) => false,
                    Err(e) => {
                        debug!(first = %first, error = %e, "downstream stopped reading");
                        let _ = upstream.start_kill();
                        true
                    }
                };
                let status = upstream.wait().await;
                drop(down_stdin);
                (forwarded, status, killed)
            };

            let ((forwarded, up_status, killed), down_out, up_err, down_err) = tokio::join!(
                forward,
                drain(down_stdout),
                drain(up_stderr),
                drain(down_stderr),
            );

            let down_status = downstream
                .wait()
                .await
                .map_err(|e| CommandError::io(second, e))?;
            let up_err = up_err.map_err(|e| CommandError::io(first, e))?;
            let down_err = down_err.map_err(|e| CommandError::io(second, e))?;

            if !killed {
                let up_status = up_status.map_err(|e| CommandError::io(first, e))?;
                if !up_status.success() {
                    return Err(CommandError::failed(first, up_status, &up_err));
                }
            }

            if !down_status.success() {
                return Err(CommandError::failed(second, down_status, &down_err));
            }

            if !killed {
                forwarded.map_err(|e| CommandError::io(first, e))?;
            }

            down_out.map_err(|e| CommandError::io(second, e))
        };

        self.with_deadline(first, work).await
    }

    async fn with_deadline<T>(
        &self,
        spec: &CommandSpec,
        work: impl Future<Output = Result<T, CommandError>>,
    ) -> Result<T, CommandError> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, work)
                .await
                .map_err(|_| CommandError::TimedOut {
                    command: spec.to_string(),
                    after,
                })?,
            None => work.await,
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}
