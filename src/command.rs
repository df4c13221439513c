use crate::builtin::Builtin;
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::find_command_path;
use std::path::PathBuf;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What the leading word of a segment resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Runs in-process.
    Builtin(Builtin),
    /// Executable file to spawn.
    External(PathBuf),
}

/// A fully resolved segment: what to run and with which argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub target: Target,
    /// Expanded words; `argv[0]` is the command name as typed.
    pub argv: Vec<String>,
}

impl Command {
    /// Resolve `argv[0]` to a builtin, a path, or a `PATH` entry, in that order.
    pub fn resolve(argv: Vec<String>, env: &Environment) -> Result<Self, ShellError> {
        let name = argv.first().map(String::as_str).unwrap_or_default();
        let target = match Builtin::lookup(name) {
            Some(builtin) => Target::Builtin(builtin),
            None => {
                let search_paths = env.get_var("PATH").unwrap_or_default();
                Target::External(find_command_path(search_paths, name, &env.current_dir)?)
            }
        };
        tracing::debug!("{} resolved to {:?}", name, target);
        Ok(Self { target, argv })
    }

    /// Arguments after the command name.
    pub fn args(&self) -> Vec<&str> {
        self.argv.iter().skip(1).map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_builtin_wins_over_path() {
        let mut env = Environment::detached("/");
        env.set_var("PATH", "/bin:/usr/bin");
        let cmd = Command::resolve(argv(&["cd", "/tmp"]), &env).unwrap();
        assert_eq!(cmd.target, Target::Builtin(Builtin::Cd));
        assert_eq!(cmd.args(), vec!["/tmp"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_external_through_path() {
        let mut env = Environment::detached("/");
        env.set_var("PATH", "/bin");
        let cmd = Command::resolve(argv(&["sh", "-c", "true"]), &env).unwrap();
        assert_eq!(cmd.target, Target::External(Path::new("/bin/sh").to_path_buf()));
        assert_eq!(cmd.argv[0], "sh");
    }

    #[test]
    fn test_missing_path_variable() {
        let env = Environment::detached("/");
        let err = Command::resolve(argv(&["sh"]), &env).unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound(name) if name == "sh"));
    }
}
