//! State shared by every stage of the read-eval loop.

use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use crate::history::History;
use crate::registry::Aliases;
use std::fmt::Display;
use std::io::Write;

/// The single mutable context of a shell run.
///
/// Created once at startup and handed by `&mut` to the expander, the dispatcher and
/// every builtin.
#[derive(Debug)]
pub struct Session {
    /// Name the shell was invoked as; first field of every diagnostic.
    pub program: String,
    pub env: Environment,
    pub aliases: Aliases,
    pub history: History,
    /// Status of the most recently executed segment, `$?`.
    pub last_status: ExitCode,
    /// Number of failed command resolutions so far.
    pub error_count: u32,
    /// Number of input lines read so far; labels diagnostics.
    pub line_number: u32,
    /// Set by `exit`; the loop stops before reading another line.
    pub exit_request: Option<ExitCode>,
    /// Whether input comes from a terminal.
    pub interactive: bool,
}

impl Session {
    pub fn new(program: impl Into<String>, env: Environment, history_max: usize) -> Self {
        Self {
            program: program.into(),
            env,
            aliases: Aliases::new(),
            history: History::new(history_max),
            last_status: 0,
            error_count: 0,
            line_number: 0,
            exit_request: None,
            interactive: false,
        }
    }

    /// Write `<program>: <line>: <command>: <reason>` to `stderr`.
    pub fn report(&self, stderr: &mut dyn Write, command: &str, reason: impl Display) {
        let written = writeln!(
            stderr,
            "{}: {}: {}: {}",
            self.program, self.line_number, command, reason
        );
        if let Err(e) = written {
            tracing::warn!("failed to write diagnostic: {}", e);
        }
    }

    /// Report a failed segment and record its status.
    pub fn fail(&mut self, stderr: &mut dyn Write, error: &ShellError) {
        if error.is_resolution_failure() {
            self.error_count += 1;
        }
        match error.command() {
            Some(command) => self.report(stderr, command, error),
            None => {
                if let Err(e) = writeln!(stderr, "{}: {}: {}", self.program, self.line_number, error) {
                    tracing::warn!("failed to write diagnostic: {}", e);
                }
            }
        }
        if let Some(status) = error.status() {
            self.last_status = status;
        }
    }

    /// Drop every registry. Called once when the session ends.
    pub fn teardown(&mut self) {
        self.env.clear();
        self.aliases.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut s = Session::new("hsh", Environment::detached("."), 10);
        s.line_number = 3;
        s
    }

    #[test]
    fn test_report_format() {
        let s = session();
        let mut err = Vec::new();
        s.report(&mut err, "cd", "can't cd to /nope");
        assert_eq!(String::from_utf8(err).unwrap(), "hsh: 3: cd: can't cd to /nope\n");
    }

    #[test]
    fn test_fail_not_found_counts_error() {
        let mut s = session();
        let mut err = Vec::new();
        s.fail(&mut err, &ShellError::CommandNotFound("qwerty".into()));
        assert_eq!(s.last_status, 127);
        assert_eq!(s.error_count, 1);
        assert_eq!(String::from_utf8(err).unwrap(), "hsh: 3: qwerty: not found\n");
    }

    #[test]
    fn test_teardown_empties_registries() {
        let mut s = session();
        s.env.set_var("A", "1");
        s.aliases.set("ll", "ls -l");
        s.history.push("ll");
        assert!(!s.aliases.is_empty());

        s.teardown();
        assert!(s.aliases.is_empty());
        assert!(s.history.is_empty());
        assert_eq!(s.history.max(), 10);
        assert_eq!(s.env.iter().count(), 0);
    }

    #[test]
    fn test_fail_usage_keeps_status() {
        let mut s = session();
        s.last_status = 5;
        let mut err = Vec::new();
        s.fail(&mut err, &ShellError::usage("exit", "Illegal number: abc"));
        assert_eq!(s.last_status, 5);
        assert_eq!(s.error_count, 0);
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "hsh: 3: exit: Illegal number: abc\n"
        );
    }
}
