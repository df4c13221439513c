use crate::command::ExitCode;
use crate::env::Environment;
use crate::error::ShellError;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Spawn `program` with `argv`, wait for it, and return its status.
///
/// `argv[0]` is passed to the child as typed by the user. The child sees exactly the
/// session's variables and starts in the session's current directory.
pub fn run_external(
    program: &Path,
    argv: &[String],
    env: &Environment,
) -> Result<ExitCode, ShellError> {
    let name = argv.first().map(String::as_str).unwrap_or_default();
    let mut cmd = std::process::Command::new(program);
    cmd.args(argv.get(1..).unwrap_or_default())
        .env_clear()
        .envs(env.iter())
        .current_dir(&env.current_dir);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.arg0(name);
    }

    tracing::debug!("spawning {} as {:?}", program.display(), argv);
    let mut child = cmd.spawn().map_err(|e| spawn_error(name, e))?;
    let exit_status = child.wait().map_err(|e| ShellError::SpawnFailure {
        command: name.to_string(),
        source: e,
    })?;
    tracing::debug!("{} exited with {}", name, exit_status);
    match exit_status.code() {
        Some(x) => Ok(x),
        None => Ok(terminated_by_signal(exit_status)),
    }
}

fn spawn_error(name: &str, e: io::Error) -> ShellError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => ShellError::PermissionDenied(name.to_string()),
        io::ErrorKind::NotFound => ShellError::CommandNotFound(name.to_string()),
        _ => ShellError::SpawnFailure {
            command: name.to_string(),
            source: e,
        },
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Missing,
    NotExecutable,
    Executable,
}

/// Resolve a command name the way a typical shell would.
///
/// Behavior:
/// - Name containing `/` (absolute or relative): the file itself, relative to `cwd`.
///   Missing is [`ShellError::CommandNotFound`]; a directory or a file without execute
///   permission is [`ShellError::PermissionDenied`].
/// - Bare name: each directory of `search_paths` (PATH) in order, an empty entry meaning
///   `cwd`; the first executable regular file wins. When only non-executable matches
///   exist the result is `PermissionDenied`, otherwise `CommandNotFound`.
/// - Empty name or empty PATH: `CommandNotFound`.
pub fn find_command_path(search_paths: &str, name: &str, cwd: &Path) -> Result<PathBuf, ShellError> {
    if name.is_empty() {
        return Err(ShellError::CommandNotFound(name.to_string()));
    }

    if name.contains('/') {
        let path = cwd.join(name);
        return match probe(&path) {
            Probe::Executable => Ok(path),
            Probe::NotExecutable => Err(ShellError::PermissionDenied(name.to_string())),
            Probe::Missing => Err(ShellError::CommandNotFound(name.to_string())),
        };
    }

    find_in_path(search_paths, name, cwd)
}

fn find_in_path(search_paths: &str, name: &str, cwd: &Path) -> Result<PathBuf, ShellError> {
    if search_paths.is_empty() {
        return Err(ShellError::CommandNotFound(name.to_string()));
    }
    let mut denied = false;
    for dir in std::env::split_paths(OsStr::new(search_paths)) {
        let path = cwd.join(dir).join(name);
        match probe(&path) {
            Probe::Executable => return Ok(path),
            Probe::NotExecutable => denied = true,
            Probe::Missing => {}
        }
    }
    if denied {
        Err(ShellError::PermissionDenied(name.to_string()))
    } else {
        Err(ShellError::CommandNotFound(name.to_string()))
    }
}

fn probe(path: &Path) -> Probe {
    match fs::metadata(path) {
        Err(_) => Probe::Missing,
        Ok(meta) if meta.is_file() && is_executable(&meta) => Probe::Executable,
        Ok(_) => Probe::NotExecutable,
    }
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[cfg(unix)]
    fn make_file(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        File::create(path).expect("touch");
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
    }

    #[test]
    #[cfg(unix)]
    fn absolute_existing_true() {
        let res = find_command_path("/bin", "/bin/sh", Path::new("/"));
        assert_eq!(res.expect("Expected to find /bin/sh"), Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn absolute_nonexisting() {
        let res = find_command_path("/bin", "/bin/nonexisting", Path::new("/"));
        assert!(matches!(res, Err(ShellError::CommandNotFound(_))));
    }

    #[test]
    #[cfg(unix)]
    fn directory_is_permission_denied() {
        let res = find_command_path("/bin", "/tmp", Path::new("/"));
        assert!(matches!(res, Err(ShellError::PermissionDenied(_))));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_found_in_path() {
        let found = find_command_path("/nonexistent-dir:/bin", "sh", Path::new("/"))
            .expect("Expected to find 'sh' in /bin via PATH search");
        assert_eq!(found, Path::new("/bin/sh"));
    }

    #[test]
    #[cfg(unix)]
    fn single_component_not_found_in_path() {
        let res = find_command_path("/bin", "nonexisting", Path::new("/"));
        assert!(matches!(res, Err(ShellError::CommandNotFound(_))));
    }

    #[test]
    fn empty_path_variable_finds_nothing() {
        let res = find_command_path("", "sh", Path::new("/"));
        assert!(matches!(res, Err(ShellError::CommandNotFound(_))));
    }

    #[test]
    fn empty_name_is_not_found() {
        let res = find_command_path("/bin", "", Path::new("/"));
        assert!(matches!(res, Err(ShellError::CommandNotFound(_))));
    }

    #[test]
    #[cfg(unix)]
    fn first_executable_match_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        make_file(&a.join("tool"), 0o644);
        make_file(&b.join("tool"), 0o755);

        let search = format!("{}:{}", a.display(), b.display());
        let found = find_command_path(&search, "tool", tmp.path()).unwrap();
        assert_eq!(found, b.join("tool"));
    }

    #[test]
    #[cfg(unix)]
    fn only_non_executable_match_is_denied() {
        let tmp = tempfile::tempdir().unwrap();
        make_file(&tmp.path().join("tool"), 0o644);
        let search = tmp.path().display().to_string();
        let res = find_command_path(&search, "tool", Path::new("/"));
        assert!(matches!(res, Err(ShellError::PermissionDenied(_))));
    }

    #[test]
    #[cfg(unix)]
    fn relative_with_slash_uses_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("bin")).unwrap();
        make_file(&tmp.path().join("bin").join("run"), 0o755);

        let found = find_command_path("/does/not/matter", "./bin/run", tmp.path()).unwrap();
        assert!(found.ends_with("bin/run"));
        assert!(found.starts_with(tmp.path()));
    }

    #[test]
    #[cfg(unix)]
    fn empty_path_entry_means_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        make_file(&tmp.path().join("local"), 0o755);
        let found = find_command_path("/nonexistent-dir:", "local", tmp.path()).unwrap();
        assert_eq!(found, tmp.path().join("local"));
    }

    #[test]
    #[cfg(unix)]
    fn run_reports_exit_code() {
        let env = Environment::inherit();
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()];
        assert_eq!(run_external(Path::new("/bin/sh"), &argv, &env).unwrap(), 3);
    }

    #[test]
    #[cfg(unix)]
    fn run_reports_signal_as_128_plus() {
        let env = Environment::inherit();
        let argv = vec!["sh".to_string(), "-c".to_string(), "kill -TERM $$".to_string()];
        assert_eq!(run_external(Path::new("/bin/sh"), &argv, &env).unwrap(), 128 + 15);
    }

    #[test]
    #[cfg(unix)]
    fn run_passes_session_variables_only() {
        let mut env = Environment::detached("/");
        env.set_var("ONLY_THIS", "yes");
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "test \"$ONLY_THIS\" = yes && test -z \"$HOME\"".to_string(),
        ];
        assert_eq!(run_external(Path::new("/bin/sh"), &argv, &env).unwrap(), 0);
    }
}
