//! Running the `git` binary against the working tree.
//!
//! Every content operation in the store goes through [`GitCommand::run`],
//! which blocks until git exits and turns launch failures, non-zero exits and
//! anything written to stderr into [`StorageError::Execution`].
//!
//! Pathspecs are always literal: a document path containing `*`, `?` or `[`
//! names exactly one file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};

/// Config overrides applied to every invocation so output stays parseable.
const CONFIG_OVERRIDES: &[&str] = &[
    "core.quotepath=off",
    "core.safecrlf=false",
    "color.ui=never",
    "commit.gpgsign=false",
    "grep.lineNumber=false",
    "grep.column=false",
    "log.showSignature=false",
];

/// Captured result of one git invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// exited with status zero and wrote nothing to stderr
    pub fn is_clean(&self) -> bool {
        self.status.success() && self.stderr.is_empty()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim_end().to_string()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Convert into stdout, or an execution error carrying the diagnostics.
    pub fn into_result(self, command: &str) -> StorageResult<Vec<u8>> {
        if self.is_clean() {
            return Ok(self.stdout);
        }

        let mut message = self.stderr_text();
        if message.is_empty() {
            message = match self.status.code() {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
        }

        Err(StorageError::Execution {
            command: command.to_string(),
            message,
            stdout: self.stdout,
        })
    }
}

/// Invokes git subcommands against a fixed working tree.
#[derive(Debug, Clone)]
pub struct GitCommand {
    program: PathBuf,
    work_tree: PathBuf,
}

impl GitCommand {
    /// create a runner for the `git` on PATH
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        Self::with_program("git", work_tree)
    }

    /// create a runner for a specific git executable
    pub fn with_program(program: impl Into<PathBuf>, work_tree: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_tree: work_tree.into(),
        }
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Run `git <command> <args...>`, failing on any error condition.
    pub fn run<I, S>(&self, command: &str, args: I) -> StorageResult<Vec<u8>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.output(command, args)?.into_result(command)
    }

    /// Run `git <command> <args...>` and hand back the raw output, so callers
    /// can classify exit codes and diagnostics themselves.
    ///
    /// Only a failure to launch the process is an error here.
    pub fn output<I, S>(&self, command: &str, args: I) -> StorageResult<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        debug!(
            command,
            args = ?args.iter().map(|a| a.as_ref().to_string_lossy()).collect::<Vec<_>>(),
            "git"
        );

        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(&self.work_tree);
        for setting in CONFIG_OVERRIDES {
            cmd.arg("-c").arg(setting);
        }
        let output = cmd
            .arg(command)
            .args(&args)
            .env("LC_ALL", "C")
            .env("LANGUAGE", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_LITERAL_PATHSPECS", "1")
            .output()
            .map_err(|e| StorageError::Execution {
                command: command.to_string(),
                message: format!("failed to launch {}: {}", self.program.display(), e),
                stdout: Vec::new(),
            })?;

        Ok(CommandOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
