//! Whitelisted command execution for live-probe checks
//!
//! Check plugins that reach a device directly (reachability probes) run
//! external programs through [`SystemCommandExecutor`]. Only whitelisted
//! program names run; each run gets a cleared environment, a fixed `PATH`,
//! no stdin, and a wall-clock budget after which the child is killed.

use framease_parser::logging::{codes, Code};
use framease_parser::{log_debug, log_error};
use std::collections::BTreeSet;
use std::io;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

const PROBE_PATH: &str = "/usr/bin:/bin:/usr/sbin:/sbin";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SystemCommandExecutor {
    default_timeout: Duration,
    whitelist: BTreeSet<String>,
}

impl SystemCommandExecutor {
    /// Executor with an empty whitelist; nothing runs until programs are allowed
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            whitelist: BTreeSet::new(),
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn allow_command(&mut self, program: impl Into<String>) {
        self.whitelist.insert(program.into());
    }

    pub fn allow_commands(&mut self, programs: &[&str]) {
        self.whitelist
            .extend(programs.iter().map(|program| program.to_string()));
    }

    pub fn is_allowed(&self, program: &str) -> bool {
        self.whitelist.contains(program)
    }

    /// Run `program` and capture its output.
    ///
    /// A non-zero exit is not an error; callers inspect
    /// [`CommandOutput::exit_code`]. Exceeding the budget kills the child
    /// and yields [`CommandError::Timeout`].
    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        if !self.is_allowed(program) {
            let err = CommandError::SecurityViolation {
                reason: format!("Command '{}' not in whitelist", program),
            };
            log_error!(err.error_code(), &err.to_string(), "program" => program);
            return Err(err);
        }

        let budget = timeout.unwrap_or(self.default_timeout);
        log_debug!("Executing command",
            "program" => program,
            "args" => args.join(" "),
            "timeout_ms" => budget.as_millis());

        let started = Instant::now();
        let mut child = spawn(program, args)?;
        match child
            .wait_timeout(budget)
            .map_err(|e| execution_failed(program, &e))?
        {
            Some(status) => {
                let output = child
                    .wait_with_output()
                    .map_err(|e| execution_failed(program, &e))?;
                Ok(CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code: status.code().unwrap_or(-1),
                    duration: started.elapsed(),
                })
            }
            None => {
                // Reap the killed child so it does not linger as a zombie
                let _ = child.kill();
                let _ = child.wait();
                let err = CommandError::Timeout {
                    timeout_ms: budget.as_millis() as u64,
                };
                log_error!(err.error_code(), "Command timed out", "program" => program);
                Err(err)
            }
        }
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn(program: &str, args: &[&str]) -> Result<Child, CommandError> {
    Command::new(program)
        .args(args)
        .env_clear()
        .env("PATH", PROBE_PATH)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                program: program.to_string(),
            },
            io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                program: program.to_string(),
            },
            _ => execution_failed(program, &e),
        })
}

fn execution_failed(program: &str, e: &io::Error) -> CommandError {
    CommandError::ExecutionFailed {
        program: program.to_string(),
        reason: e.to_string(),
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },

    #[error("Security violation: {reason}")]
    SecurityViolation { reason: String },
}

impl CommandError {
    pub fn error_code(&self) -> Code {
        codes::plugin::COMMAND_FAILED
    }
}
