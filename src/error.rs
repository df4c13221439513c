//! Error types for per-command failures.

use crate::command::ExitCode;
use crate::lexer::LexingError;
use thiserror::Error;

/// Status reported when a command cannot be found.
pub const STATUS_NOT_FOUND: ExitCode = 127;
/// Status reported when a command was found but cannot be executed.
pub const STATUS_CANNOT_EXECUTE: ExitCode = 126;
/// Status reported for a line that does not lex.
pub const STATUS_SYNTAX: ExitCode = 2;

/// A failure of one segment. Never terminates the session by itself.
///
/// The `Display` text is the `<reason>` part of a diagnostic line.
#[derive(Error, Debug)]
pub enum ShellError {
    /// No builtin, path, or `PATH` entry matched.
    #[error("not found")]
    CommandNotFound(String),

    /// Found, but not an executable file.
    #[error("Permission denied")]
    PermissionDenied(String),

    /// Malformed builtin arguments.
    #[error("{message}")]
    BuiltinUsage { builtin: String, message: String },

    /// The child process could not be created.
    #[error("{source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The line could not be split into words.
    #[error("Syntax error: {0}")]
    Syntax(#[from] LexingError),
}

impl ShellError {
    pub fn usage(builtin: impl Into<String>, message: impl Into<String>) -> Self {
        ShellError::BuiltinUsage {
            builtin: builtin.into(),
            message: message.into(),
        }
    }

    /// The command the diagnostic is about, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            ShellError::CommandNotFound(cmd) | ShellError::PermissionDenied(cmd) => {
                Some(cmd.as_str())
            }
            ShellError::BuiltinUsage { builtin, .. } => Some(builtin.as_str()),
            ShellError::SpawnFailure { command, .. } => Some(command.as_str()),
            ShellError::Syntax(_) => None,
        }
    }

    /// Status to record for this failure; `None` leaves the previous status in place.
    pub fn status(&self) -> Option<ExitCode> {
        match self {
            ShellError::CommandNotFound(_) => Some(STATUS_NOT_FOUND),
            ShellError::PermissionDenied(_) | ShellError::SpawnFailure { .. } => {
                Some(STATUS_CANNOT_EXECUTE)
            }
            ShellError::BuiltinUsage { .. } => None,
            ShellError::Syntax(_) => Some(STATUS_SYNTAX),
        }
    }

    /// Whether this is a failure to resolve a command name.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            ShellError::CommandNotFound(_) | ShellError::PermissionDenied(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status_and_reason() {
        let err = ShellError::CommandNotFound("xyz".into());
        assert_eq!(err.status(), Some(127));
        assert_eq!(err.to_string(), "not found");
        assert_eq!(err.command(), Some("xyz"));
        assert!(err.is_resolution_failure());
    }

    #[test]
    fn test_usage_leaves_status() {
        let err = ShellError::usage("exit", "Illegal number: abc");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Illegal number: abc");
        assert!(!err.is_resolution_failure());
    }

    #[test]
    fn test_syntax_from_lexing_error() {
        let err: ShellError = LexingError::UnfinishedQuote.into();
        assert_eq!(err.status(), Some(2));
        assert_eq!(err.command(), None);
        assert!(err.to_string().contains("Unterminated"));
    }
}
