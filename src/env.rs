use crate::registry::Registry;
use std::env as stdenv;
use std::io;
use std::path::{Path, PathBuf};

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: the ordered list of variables that executed commands will see.
/// - `current_dir`: the working directory for command execution.
///
/// An environment created by [`Environment::inherit`] also mirrors every change into the
/// real process environment, so the shell's own view and `std::env` never disagree.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Ordered `NAME=value` entries (e.g., PATH, HOME).
    pub vars: Registry<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    sync_process: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// Variables are copied from `std::env::vars_os()` in the order the OS reports them;
    /// entries that are not valid UTF-8 are skipped. `current_dir` is initialized from
    /// `std::env::current_dir()`.
    pub fn inherit() -> Self {
        let mut vars = Registry::new();
        for (k, v) in stdenv::vars_os() {
            if let (Ok(k), Ok(v)) = (k.into_string(), v.into_string()) {
                vars.set(k, v);
            }
        }
        Self {
            vars,
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            sync_process: true,
        }
    }

    /// An empty environment that never touches the process environment.
    pub fn detached(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: Registry::new(),
            current_dir: current_dir.into(),
            sync_process: false,
        }
    }

    /// Get the value of a variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override a variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        let (key, val) = (key.into(), val.into());
        if self.sync_process && is_portable(&key) && !val.contains('\0') {
            // SAFETY: the shell runs its session on a single thread and does not spawn
            // threads that read the environment.
            unsafe { stdenv::set_var(&key, &val) };
        }
        self.vars.set(key, val);
    }

    /// Remove a variable. Returns `false` if it was not set.
    pub fn unset_var(&mut self, key: &str) -> bool {
        if self.sync_process && is_portable(key) {
            // SAFETY: see `set_var`.
            unsafe { stdenv::remove_var(key) };
        }
        self.vars.remove(key)
    }

    /// Make `dir` the working directory, keeping `PWD` and `OLDPWD` current.
    pub fn change_dir(&mut self, dir: &Path) -> io::Result<()> {
        if self.sync_process {
            stdenv::set_current_dir(dir)?;
        }
        let old = std::mem::replace(&mut self.current_dir, dir.to_path_buf());
        self.set_var("OLDPWD", old.to_string_lossy());
        self.set_var("PWD", dir.to_string_lossy());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|node| (node.key.as_str(), node.value.as_str()))
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

/// Whether `std::env::set_var` accepts `key` without panicking.
fn is_portable(key: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0'])
}
