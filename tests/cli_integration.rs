#![cfg(unix)]

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn shell(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_shell"));
    cmd.env("HOME", home)
        .env("HISTFILE", home.join("history"))
        .env_remove("SHELL_LOG")
        .current_dir(home);
    cmd
}

fn run_piped(input: &str) -> (Output, TempDir) {
    let home = tempfile::tempdir().unwrap();
    let mut child = shell(home.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    (child.wait_with_output().unwrap(), home)
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_semicolon_runs_both() {
    let (out, _home) = run_piped("false ; echo A\n");
    assert_eq!(stdout(&out), "A\n");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_and_or_chaining() {
    let (out, _home) = run_piped("false && echo A\n");
    assert_eq!(stdout(&out), "");
    assert_eq!(out.status.code(), Some(1));

    let (out, _home) = run_piped("false || echo A\ntrue || echo B\n");
    assert_eq!(stdout(&out), "A\n");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_exit_status() {
    let (out, _home) = run_piped("exit 42\necho unreachable\n");
    assert_eq!(stdout(&out), "");
    assert_eq!(out.status.code(), Some(42));
}

#[test]
fn test_exit_illegal_number_keeps_going() {
    let (out, _home) = run_piped("exit abc\necho still here\n");
    assert!(stderr(&out).contains(": 1: exit: Illegal number: abc"));
    assert_eq!(stdout(&out), "still here\n");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_not_found() {
    let (out, _home) = run_piped("notacommandxyz\n");
    assert!(stderr(&out).ends_with(": 1: notacommandxyz: not found\n"));
    assert_eq!(out.status.code(), Some(127));
}

#[test]
fn test_status_variable() {
    let (out, _home) = run_piped("sh -c 'exit 2'\necho $?\necho $?\n");
    assert_eq!(stdout(&out), "2\n0\n");
}

#[test]
fn test_alias_expansion() {
    let (out, _home) = run_piped("alias greet='echo hello'\ngreet world\n");
    assert_eq!(stdout(&out), "hello world\n");
}

#[test]
fn test_setenv_visible_to_children() {
    let (out, _home) = run_piped("setenv GREETING hi\nsh -c 'echo $GREETING'\n");
    assert_eq!(stdout(&out), "hi\n");
}

#[test]
fn test_history_is_saved() {
    let (out, home) = run_piped("echo one\n\necho two\n");
    assert_eq!(out.status.code(), Some(0));
    let saved = std::fs::read_to_string(home.path().join("history")).unwrap();
    assert_eq!(saved, "echo one\necho two\n");
}

#[test]
fn test_script_file() {
    let home = tempfile::tempdir().unwrap();
    let script = home.path().join("script.sh");
    std::fs::write(&script, "echo from script\nexit 3\n").unwrap();
    let out = shell(home.path()).arg(&script).output().unwrap();
    assert_eq!(stdout(&out), "from script\n");
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn test_missing_script() {
    let home = tempfile::tempdir().unwrap();
    let out = shell(home.path()).arg("no_such_script").output().unwrap();
    assert!(stderr(&out).ends_with(": 0: Can't Open no_such_script\n"));
    assert_eq!(out.status.code(), Some(127));
}
