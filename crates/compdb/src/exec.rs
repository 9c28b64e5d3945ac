//! Process-execution collaborator. Generators never spawn processes
//! directly; they describe a command and hand it to a [`CommandRunner`],
//! which keeps the state machine testable with a fake runner and threads
//! cancellation through to the child process.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::{CompdbError, Result};

/// One external command invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Single-line rendering for logs and error messages.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the command to completion, or returns
    /// [`CompdbError::Cancelled`] once `cancel` fires. Implementations
    /// must make a cancelled child terminate rather than leak.
    async fn run(&self, request: CommandRequest, cancel: &CancellationToken)
        -> Result<CommandOutput>;
}

/// Runs commands on the local machine through tokio. The child is spawned
/// with `kill_on_drop`, so abandoning the wait on cancellation also kills
/// the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCommandRunner;

#[async_trait]
impl CommandRunner for LocalCommandRunner {
    async fn run(
        &self,
        request: CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput> {
        tracing::debug!(command = %request.display_line(), "spawning");
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &request.env {
            command.env(key, value);
        }

        let child = command.spawn()?;
        tokio::select! {
            _ = cancel.cancelled() => Err(CompdbError::Cancelled),
            output = child.wait_with_output() => {
                let output = output?;
                Ok(CommandOutput {
                    status: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_joins_program_and_args() {
        let request = CommandRequest::new("gn")
            .arg("gen")
            .arg("out/Default")
            .arg("--export-compile-commands");
        assert_eq!(
            request.display_line(),
            "gn gen out/Default --export-compile-commands"
        );
    }

    #[tokio::test]
    async fn cancelled_token_aborts_the_run() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = LocalCommandRunner
            .run(CommandRequest::new("sleep").arg("30"), &cancel)
            .await;
        assert!(matches!(result, Err(CompdbError::Cancelled)));
    }

    #[tokio::test]
    async fn captures_exit_status() {
        let cancel = CancellationToken::new();
        let output = LocalCommandRunner
            .run(CommandRequest::new("sh").arg("-c").arg("exit 3"), &cancel)
            .await
            .unwrap();
        assert_eq!(output.status, 3);
        assert!(!output.success());
    }
}
