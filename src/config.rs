//! Session configuration.
//!
//! Values are resolved with the following priority (highest to lowest):
//! 1. Shell variables (`PS1`, `HISTFILE`, `HISTSIZE`)
//! 2. Default values

use crate::env::Environment;
use crate::history::DEFAULT_HISTORY_MAX;
use std::path::PathBuf;

/// Prompt printed before each interactive read when `PS1` is unset.
pub const DEFAULT_PROMPT: &str = "$ ";

/// File name of the history file inside `$HOME`.
pub const HISTORY_FILE_NAME: &str = ".shell_history";

/// Settings the session loop reads once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interactive prompt.
    pub prompt: String,
    /// Where history is loaded from and saved to. `None` disables persistence.
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries.
    pub history_max: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_file: None,
            history_max: DEFAULT_HISTORY_MAX,
        }
    }
}

impl Config {
    /// Resolve the configuration from the session's variables.
    pub fn from_env(env: &Environment) -> Self {
        let defaults = Self::default();

        let prompt = env
            .get_var("PS1")
            .map(str::to_string)
            .unwrap_or(defaults.prompt);

        let history_file = match env.get_var("HISTFILE") {
            Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => env
                .get_var("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(HISTORY_FILE_NAME)),
        };

        let history_max = match env.get_var("HISTSIZE").map(str::parse::<usize>) {
            Some(Ok(n)) => n,
            Some(Err(e)) => {
                tracing::debug!("ignoring HISTSIZE: {}", e);
                defaults.history_max
            }
            None => defaults.history_max,
        };

        Self {
            prompt,
            history_file,
            history_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_without_variables() {
        let env = Environment::detached(".");
        assert_eq!(Config::from_env(&env), Config::default());
    }

    #[test]
    fn test_history_file_under_home() {
        let mut env = Environment::detached(".");
        env.set_var("HOME", "/home/someone");
        let config = Config::from_env(&env);
        assert_eq!(
            config.history_file.as_deref(),
            Some(Path::new("/home/someone/.shell_history"))
        );
    }

    #[test]
    fn test_overrides() {
        let mut env = Environment::detached(".");
        env.set_var("HOME", "/home/someone");
        env.set_var("HISTFILE", "/tmp/h");
        env.set_var("HISTSIZE", "10");
        env.set_var("PS1", "> ");
        let config = Config::from_env(&env);
        assert_eq!(config.history_file.as_deref(), Some(Path::new("/tmp/h")));
        assert_eq!(config.history_max, 10);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn test_bad_histsize_falls_back() {
        let mut env = Environment::detached(".");
        env.set_var("HISTSIZE", "lots");
        assert_eq!(Config::from_env(&env).history_max, DEFAULT_HISTORY_MAX);
    }
}
