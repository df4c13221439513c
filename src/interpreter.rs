use crate::command::{Command, ExitCode, Target};
use crate::config::Config;
use crate::error::ShellError;
use crate::expand;
use crate::external;
use crate::io_adapters::{LineSource, ReadOutcome};
use crate::parser;
use crate::session::Session;
use crate::signals;
use std::io::Write;

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter owns the [`Session`] and drives the read-eval loop: each line is split
/// into chained segments, each segment is expanded, resolved and run, and its status
/// decides whether the next segment runs.
///
/// Example
/// ```
/// use shell::env::Environment;
/// use shell::{Config, Interpreter, Session};
///
/// let session = Session::new("shell", Environment::inherit(), 100);
/// let mut sh = Interpreter::new(session, Config::default());
/// sh.run_line("setenv GREETING hello && exit 3");
/// assert_eq!(sh.session().env.get_var("GREETING"), Some("hello"));
/// assert_eq!(sh.session().exit_request, Some(3));
/// ```
pub struct Interpreter {
    session: Session,
    config: Config,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter writing to the process' standard streams.
    pub fn new(session: Session, config: Config) -> Self {
        Self::with_output(
            session,
            config,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Create an interpreter whose builtins and diagnostics write to the given streams.
    ///
    /// External commands always inherit the process' standard streams.
    pub fn with_output(
        session: Session,
        config: Config,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        Self {
            session,
            config,
            stdout,
            stderr,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load the persisted history, if any. Failures are logged, never fatal.
    pub fn load_history(&mut self) {
        if let Some(path) = &self.config.history_file {
            match self.session.history.load(path) {
                Ok(()) => tracing::debug!(
                    "loaded {} history entries (max {}) from {}",
                    self.session.history.len(),
                    self.session.history.max(),
                    path.display()
                ),
                Err(e) => {
                    tracing::warn!("could not read history from {}: {}", path.display(), e)
                }
            }
        }
    }

    /// Read and run lines from `source` until end of input or `exit`.
    ///
    /// A read failure ends the loop like end of input does.
    pub fn repl(&mut self, source: &mut dyn LineSource) {
        while self.session.exit_request.is_none() {
            match source.read_line(&self.config.prompt) {
                Ok(ReadOutcome::Line(line)) => {
                    self.run_line(&line);
                }
                Ok(ReadOutcome::Interrupted) => continue,
                Ok(ReadOutcome::Eof) => {
                    if self.session.interactive {
                        let _ = writeln!(self.stdout);
                    }
                    break;
                }
                Err(err) => {
                    tracing::warn!("read failed: {:#}", err);
                    break;
                }
            }
        }
    }

    /// Record `line` in history and run it. Returns the resulting status.
    pub fn run_line(&mut self, line: &str) -> ExitCode {
        self.session.line_number += 1;
        if !line.trim().is_empty() {
            self.session.history.push(line);
        }
        self.execute(line)
    }

    /// Run every segment of `line`, honouring `;`, `&&` and `||`.
    pub fn execute(&mut self, line: &str) -> ExitCode {
        let segments = match parser::parse_line(line) {
            Ok(segments) => segments,
            Err(e) => {
                self.session.fail(&mut *self.stderr, &e.into());
                return self.session.last_status;
            }
        };

        for segment in segments {
            if self.session.exit_request.is_some() {
                break;
            }
            if !segment.op.should_run(self.session.last_status) {
                tracing::trace!("skipping {:?} after status {}", segment.words, self.session.last_status);
                continue;
            }
            self.run_segment(segment.words);
            if self.session.interactive && signals::take_interrupt() {
                let _ = writeln!(self.stdout);
                break;
            }
        }
        self.session.last_status
    }

    fn run_segment(&mut self, words: Vec<String>) {
        let argv = expand::expand(words, &self.session);
        if argv.is_empty() {
            self.session.last_status = 0;
            return;
        }

        let result =
            Command::resolve(argv, &self.session.env).and_then(|command| self.dispatch(command));
        match result {
            Ok(code) => self.session.last_status = code,
            Err(e) => self.session.fail(&mut *self.stderr, &e),
        }
        if let Err(e) = self.stdout.flush() {
            tracing::warn!("failed to flush stdout: {}", e);
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<ExitCode, ShellError> {
        match &command.target {
            Target::Builtin(builtin) => builtin.run(
                &command.args(),
                &mut *self.stdout,
                &mut *self.stderr,
                &mut self.session,
            ),
            Target::External(path) => {
                // Builtin output must reach the terminal before the child's.
                let _ = self.stdout.flush();
                external::run_external(path, &command.argv, &self.session.env)
            }
        }
    }

    /// The process exit code for a session that ends now.
    pub fn exit_code(&self) -> ExitCode {
        match self.session.exit_request {
            Some(code) => code,
            None if self.session.interactive && self.session.error_count == 0 => 0,
            None => self.session.last_status,
        }
    }

    /// End the session: persist history, drop the registries, and return the exit code.
    pub fn finish(mut self) -> ExitCode {
        let code = self.exit_code();
        if let Some(path) = &self.config.history_file {
            if let Err(e) = self.session.history.save(path) {
                tracing::warn!("could not write history to {}: {}", path.display(), e);
            }
        }
        let _ = self.stdout.flush();
        self.session.teardown();
        code
    }
}
