use crate::command::ExitCode;
use crate::error::ShellError;
use crate::session::Session;
use anyhow::{Context, Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::fs;
use std::io::Write;

/// Status of a builtin that failed at run time (as opposed to a usage error).
pub const STATUS_BUILTIN_FAILURE: ExitCode = 2;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process with the session as their only state.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// One line shown by `help`.
    fn summary() -> &'static str;

    /// Executes the command.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    /// Returning a [`ShellError`] (boxed in the `anyhow::Error`) reports it as such; any
    /// other error is reported as a diagnostic with [`STATUS_BUILTIN_FAILURE`].
    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode>;
}

/// Identity of every builtin, matched exhaustively at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
    Help,
    Env,
    History,
    Setenv,
    Unsetenv,
    Alias,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Exit,
        Builtin::Cd,
        Builtin::Help,
        Builtin::Env,
        Builtin::History,
        Builtin::Setenv,
        Builtin::Unsetenv,
        Builtin::Alias,
    ];

    /// The builtin called `name`, if there is one.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => Exit::name(),
            Builtin::Cd => Cd::name(),
            Builtin::Help => Help::name(),
            Builtin::Env => Env::name(),
            Builtin::History => History::name(),
            Builtin::Setenv => Setenv::name(),
            Builtin::Unsetenv => Unsetenv::name(),
            Builtin::Alias => Alias::name(),
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Builtin::Exit => Exit::summary(),
            Builtin::Cd => Cd::summary(),
            Builtin::Help => Help::summary(),
            Builtin::Env => Env::summary(),
            Builtin::History => History::summary(),
            Builtin::Setenv => Setenv::summary(),
            Builtin::Unsetenv => Unsetenv::summary(),
            Builtin::Alias => Alias::summary(),
        }
    }

    /// The argh-generated usage text.
    pub fn usage(self) -> String {
        match self {
            Builtin::Exit => usage_of::<Exit>(),
            Builtin::Cd => usage_of::<Cd>(),
            Builtin::Help => usage_of::<Help>(),
            Builtin::Env => usage_of::<Env>(),
            Builtin::History => usage_of::<History>(),
            Builtin::Setenv => usage_of::<Setenv>(),
            Builtin::Unsetenv => usage_of::<Unsetenv>(),
            Builtin::Alias => usage_of::<Alias>(),
        }
    }

    /// Parse `args` (without the command name) and run the builtin.
    pub fn run(
        self,
        args: &[&str],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode, ShellError> {
        match self {
            Builtin::Exit => invoke::<Exit>(args, stdout, stderr, session),
            Builtin::Cd => invoke::<Cd>(args, stdout, stderr, session),
            Builtin::Help => invoke::<Help>(args, stdout, stderr, session),
            Builtin::Env => invoke::<Env>(args, stdout, stderr, session),
            Builtin::History => invoke::<History>(args, stdout, stderr, session),
            Builtin::Setenv => invoke::<Setenv>(args, stdout, stderr, session),
            Builtin::Unsetenv => invoke::<Unsetenv>(args, stdout, stderr, session),
            Builtin::Alias => invoke::<Alias>(args, stdout, stderr, session),
        }
    }
}

/// argh reads every word starting with `-` as a flag, but builtin operands may look like
/// one (`cd -`, `exit -1`). Options end before the first operand unless the user asked
/// for `--help`. A bare `help` is always an operand (`cd help` enters `./help`).
fn operands<'a>(args: &[&'a str]) -> Vec<&'a str> {
    if args.first() == Some(&"--help") {
        return args.to_vec();
    }
    std::iter::once("--").chain(args.iter().copied()).collect()
}

/// argh lists `help` next to `--help`; builtins only accept the flag.
fn help_text(output: String) -> String {
    output.replace("--help, help", "--help")
}

fn usage_of<T: BuiltinCommand>() -> String {
    match T::from_args(&[T::name()], &["--help"]) {
        Err(EarlyExit { output, .. }) => help_text(output),
        Ok(_) => String::new(),
    }
}

fn invoke<T: BuiltinCommand>(
    args: &[&str],
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
    session: &mut Session,
) -> Result<ExitCode, ShellError> {
    let cmd = match T::from_args(&[T::name()], &operands(args)) {
        Ok(cmd) => cmd,
        Err(EarlyExit {
            output,
            status: Ok(()),
        }) => {
            if let Err(e) = stdout.write_all(help_text(output).as_bytes()) {
                session.report(stderr, T::name(), e);
            }
            return Ok(0);
        }
        Err(EarlyExit {
            output,
            status: Err(()),
        }) => return Err(ShellError::usage(T::name(), output.trim_end())),
    };

    match cmd.execute(stdout, stderr, session) {
        Ok(x) => Ok(x),
        Err(e) => match e.downcast::<ShellError>() {
            Ok(shell_error) => Err(shell_error),
            Err(e) => {
                session.report(stderr, T::name(), format_args!("{:#}", e));
                Ok(STATUS_BUILTIN_FAILURE)
            }
        },
    }
}

#[derive(FromArgs)]
/// Exit the shell with status N, or with the status of the last command.
pub struct Exit {
    #[argh(positional)]
    /// exit status, a non-negative decimal number.
    pub code: Option<String>,
}

/// Parse an `exit` operand: decimal digits only, within `i32`, reduced modulo 256.
fn parse_exit_code(arg: &str) -> Option<ExitCode> {
    let digits = arg.strip_prefix('+').unwrap_or(arg);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i32 = digits.parse().ok()?;
    Some(n % 256)
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn summary() -> &'static str {
        "exit [n]: leave the shell"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        let code = match &self.code {
            None => session.last_status,
            Some(arg) => parse_exit_code(arg)
                .ok_or_else(|| ShellError::usage("exit", format!("Illegal number: {}", arg)))?,
        };
        session.exit_request = Some(code);
        Ok(code)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// With no operand or `~`, go to $HOME; with `-`, go back to $OLDPWD and print it.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn summary() -> &'static str {
        "cd [dir|-|~]: change the working directory"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        let env = &mut session.env;
        let home = env.get_var("HOME").map(str::to_string);
        let mut announce = false;
        let target = match self.target.as_deref() {
            None | Some("~") => match home {
                Some(home) => home,
                None => return Ok(0),
            },
            Some("-") => match env.get_var("OLDPWD") {
                Some(old) => {
                    announce = true;
                    old.to_string()
                }
                None => {
                    writeln!(stdout, "{}", env.current_dir.display())?;
                    return Ok(0);
                }
            },
            Some(t) => match (t.strip_prefix("~/"), home) {
                (Some(rest), Some(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
                _ => t.to_string(),
            },
        };

        let new_dir = env.current_dir.join(&target);
        let canonical = fs::canonicalize(&new_dir)
            .ok()
            .filter(|dir| dir.is_dir())
            .ok_or_else(|| anyhow!("can't cd to {}", target))?;
        env.change_dir(&canonical)
            .with_context(|| format!("can't cd to {}", target))?;

        if announce {
            writeln!(stdout, "{}", canonical.display())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the builtins, or show the usage of one of them.
pub struct Help {
    #[argh(positional)]
    /// builtin to describe.
    pub topic: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn summary() -> &'static str {
        "help [builtin]: describe the builtins"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _session: &mut Session,
    ) -> Result<ExitCode> {
        match self.topic.as_deref() {
            None => {
                writeln!(stdout, "Builtin commands:")?;
                for builtin in Builtin::ALL {
                    writeln!(stdout, "  {}", builtin.summary())?;
                }
            }
            Some(topic) => match Builtin::lookup(topic) {
                Some(builtin) => stdout.write_all(builtin.usage().as_bytes())?,
                None => {
                    return Err(
                        ShellError::usage("help", format!("no help topics match '{}'", topic)).into(),
                    );
                }
            },
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the environment, one NAME=value per line.
pub struct Env {}

impl BuiltinCommand for Env {
    fn name() -> &'static str {
        "env"
    }

    fn summary() -> &'static str {
        "env: print the environment"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        for (name, value) in session.env.iter() {
            writeln!(stdout, "{}={}", name, value)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the command history with sequence numbers.
pub struct History {}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn summary() -> &'static str {
        "history: list previous commands"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        for (num, line) in session.history.iter() {
            writeln!(stdout, "{:>5}  {}", num, line)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Set an environment variable, replacing any previous value.
pub struct Setenv {
    #[argh(positional)]
    /// variable name.
    pub name: String,
    #[argh(positional)]
    /// new value.
    pub value: String,
}

impl BuiltinCommand for Setenv {
    fn name() -> &'static str {
        "setenv"
    }

    fn summary() -> &'static str {
        "setenv NAME VALUE: set an environment variable"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        if self.name.is_empty() || self.name.contains(['=', '\0']) {
            return Err(
                ShellError::usage("setenv", format!("invalid variable name '{}'", self.name)).into(),
            );
        }
        session.env.set_var(self.name, self.value);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Remove environment variables.
pub struct Unsetenv {
    #[argh(positional)]
    /// names of the variables to remove.
    pub names: Vec<String>,
}

impl BuiltinCommand for Unsetenv {
    fn name() -> &'static str {
        "unsetenv"
    }

    fn summary() -> &'static str {
        "unsetenv NAME...: remove environment variables"
    }

    fn execute(
        self,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        if self.names.is_empty() {
            return Err(ShellError::usage("unsetenv", "Too few arguments").into());
        }
        for name in &self.names {
            session.env.unset_var(name);
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Define or print aliases.
/// `name=value` defines an alias; following words without `=` extend its value.
/// A bare `name` prints that alias; no operands prints them all.
pub struct Alias {
    #[argh(positional)]
    /// definitions (name=value) or names to print.
    pub args: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn summary() -> &'static str {
        "alias [name[=value] ...]: define or print aliases"
    }

    fn execute(
        self,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> Result<ExitCode> {
        if self.args.is_empty() {
            for (name, value) in session.aliases.iter() {
                writeln!(stdout, "{}='{}'", name, value)?;
            }
            return Ok(0);
        }

        let mut status = 0;
        let mut defining: Option<String> = None;
        for arg in self.args {
            if let Some((name, value)) = arg.split_once('=') {
                if name.is_empty() {
                    return Err(
                        ShellError::usage("alias", format!("'{}': invalid alias name", arg)).into(),
                    );
                }
                session.aliases.set(name, value);
                defining = Some(name.to_string());
            } else if let Some(name) = &defining {
                let value = match session.aliases.get(name) {
                    Some(prev) if !prev.is_empty() => format!("{} {}", prev, arg),
                    _ => arg,
                };
                session.aliases.set(name.clone(), value);
            } else {
                match session.aliases.get(&arg) {
                    Some(value) => writeln!(stdout, "{}='{}'", arg, value)?,
                    None => {
                        session.report(stderr, "alias", format_args!("{} not found", arg));
                        status = 1;
                    }
                }
            }
        }
        Ok(status)
    }
}
