//! Command construction and execution
//!
//! A `CommandBuilder` accumulates the tokens of one external invocation.
//! How the finished command runs is decided by two explicit modes passed
//! to [`CommandBuilder::run`]:
//!
//! - [`ExecMode`] selects real execution versus dry-run rendering, and is
//!   threaded in as a parameter so callers (and tests) can flip it per
//!   call instead of mutating process-wide state.
//! - [`RunMode`] separates "spawn and capture stdout" from "replace the
//!   current process image" — the latter hands the terminal to the child
//!   and never returns on success.

use std::process::{Command, Stdio};

use crate::error::{DockhandError, Result};

/// Whether commands really execute or are rendered for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Run the external command.
    Execute,
    /// Render `$(token token ...)` instead of running anything.
    DryRun,
}

/// How a really-executed command interacts with the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Spawn a child, capture its stdout, wait for it to finish.
    Capture,
    /// Replace the current process image; does not return on success.
    Foreground,
}

/// An ordered sequence of command-line tokens under construction.
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    tokens: Vec<String>,
}

impl CommandBuilder {
    /// Start a command with the given program name.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            tokens: vec![program.into()],
        }
    }

    /// Append a single token.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.tokens.push(arg.into());
        self
    }

    /// Append a sequence of tokens, preserving order. Nested sequences
    /// flatten by composing calls; non-string arguments are a compile
    /// error rather than a runtime fault.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for arg in args {
            self.tokens.push(arg.into());
        }
        self
    }

    /// The tokens assembled so far.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Render the command as `$(token token ...)`. Pure: repeated calls
    /// on the same builder yield identical strings.
    pub fn render(&self) -> String {
        format!("$({})", self.tokens.join(" "))
    }

    /// Run the assembled command.
    ///
    /// In [`ExecMode::DryRun`] this returns the rendered command line
    /// with no side effects, regardless of `mode`. Otherwise
    /// [`RunMode::Capture`] spawns the command, captures stdout as text
    /// (one trailing newline trimmed) and returns it, while
    /// [`RunMode::Foreground`] replaces the current process and only
    /// returns if the replacement itself failed.
    ///
    /// A capture interrupted by SIGINT reports "Interrupted." and
    /// returns empty output; the calling process ignores SIGINT for the
    /// duration of the wait, so a terminal interrupt lands on the child
    /// alone. Any other nonzero exit is an error carrying the external
    /// exit code.
    pub fn run(&self, exec: ExecMode, mode: RunMode) -> Result<String> {
        if exec == ExecMode::DryRun {
            return Ok(self.render());
        }
        let (program, args) = self
            .tokens
            .split_first()
            .ok_or_else(|| DockhandError::InvalidInput("Cannot run an empty command".into()))?;
        match mode {
            RunMode::Foreground => {
                use std::os::unix::process::CommandExt;
                let err = Command::new(program).args(args).exec();
                Err(DockhandError::IoError(err))
            }
            RunMode::Capture => {
                let child = Command::new(program)
                    .args(args)
                    .stdout(Stdio::piped())
                    .stderr(Stdio::inherit())
                    .spawn()?;
                // A terminal Ctrl-C signals the whole foreground group,
                // this process included. Ignore SIGINT while waiting;
                // the child was spawned first, so it keeps its default
                // disposition and the interrupt surfaces as its exit
                // status below.
                let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_IGN) };
                let output = child.wait_with_output();
                unsafe { libc::signal(libc::SIGINT, previous) };
                let output = output?;
                if output.status.success() {
                    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    return Ok(text);
                }
                if interrupted(&output.status) {
                    eprintln!("Interrupted.");
                    return Ok(String::new());
                }
                match output.status.code() {
                    Some(code) => Err(DockhandError::CommandFailed(code)),
                    None => Err(DockhandError::CommandUnclassified),
                }
            }
        }
    }
}

fn interrupted(status: &std::process::ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal() == Some(libc::SIGINT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_flat_and_nested() {
        let mut cmd = CommandBuilder::new("docker");
        cmd.arg("run").args(["--name", "web"]).args(vec![
            "-p".to_string(),
            "80:80".to_string(),
        ]);
        assert_eq!(cmd.tokens(), &["docker", "run", "--name", "web", "-p", "80:80"]);
    }

    #[test]
    fn test_render_wraps_tokens() {
        let mut cmd = CommandBuilder::new("docker");
        cmd.args(["ps", "--all"]);
        assert_eq!(cmd.render(), "$(docker ps --all)");
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut cmd = CommandBuilder::new("docker-machine");
        cmd.args(["ip", "default"]);
        assert_eq!(cmd.render(), cmd.render());
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let mut cmd = CommandBuilder::new("definitely-not-a-real-binary");
        cmd.arg("boom");
        let out = cmd.run(ExecMode::DryRun, RunMode::Capture).unwrap();
        assert_eq!(out, "$(definitely-not-a-real-binary boom)");
        // Foreground requests render the same way in dry-run mode.
        let out = cmd.run(ExecMode::DryRun, RunMode::Foreground).unwrap();
        assert_eq!(out, "$(definitely-not-a-real-binary boom)");
    }

    #[test]
    fn test_execute_captures_and_trims_stdout() {
        let mut cmd = CommandBuilder::new("echo");
        cmd.arg("hello");
        let out = cmd.run(ExecMode::Execute, RunMode::Capture).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_mode_toggles_within_one_process() {
        let mut cmd = CommandBuilder::new("echo");
        cmd.arg("hi");
        let rendered = cmd.run(ExecMode::DryRun, RunMode::Capture).unwrap();
        assert_eq!(rendered, "$(echo hi)");
        let real = cmd.run(ExecMode::Execute, RunMode::Capture).unwrap();
        assert_eq!(real, "hi");
    }

    #[test]
    fn test_sigint_terminated_child_is_a_nonfatal_interrupt() {
        let mut cmd = CommandBuilder::new("sh");
        cmd.args(["-c", "kill -INT $$"]);
        let out = cmd.run(ExecMode::Execute, RunMode::Capture).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_nonzero_exit_carries_code() {
        let cmd = CommandBuilder::new("false");
        match cmd.run(ExecMode::Execute, RunMode::Capture) {
            Err(DockhandError::CommandFailed(code)) => assert_eq!(code, 1),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}
