use argh::FromArgs;
use shell::env::Environment;
use shell::error::{STATUS_CANNOT_EXECUTE, STATUS_NOT_FOUND, STATUS_SYNTAX};
use shell::io_adapters::{EditorSource, LineSource, ReaderSource};
use shell::{Config, ExitCode, Interpreter, Session, logging, signals};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Read commands from a terminal, a pipe, or a script file, and run them.
struct Args {
    #[argh(positional)]
    /// script to run instead of reading standard input.
    script: Option<PathBuf>,
}

fn open_script(program: &str, path: &Path) -> Result<File, ExitCode> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => STATUS_CANNOT_EXECUTE,
        io::ErrorKind::NotFound => {
            eprintln!("{}: 0: Can't Open {}", program, path.display());
            STATUS_NOT_FOUND
        }
        _ => {
            eprintln!("{}: 0: {}: {}", program, path.display(), e);
            STATUS_SYNTAX
        }
    })
}

fn main() {
    let _ = logging::try_init();
    let args: Args = argh::from_env();
    let program = std::env::args().next().unwrap_or_else(|| "shell".to_string());

    let script = match args.script.as_deref().map(|path| open_script(&program, path)) {
        Some(Ok(file)) => Some(file),
        Some(Err(code)) => std::process::exit(code),
        None => None,
    };

    let env = Environment::inherit();
    let config = Config::from_env(&env);
    let mut session = Session::new(program, env, config.history_max);
    session.interactive = script.is_none() && io::stdin().is_terminal();
    tracing::debug!(?config, interactive = session.interactive, "starting session");

    let mut sh = Interpreter::new(session, config);
    sh.load_history();

    let mut source: Box<dyn LineSource> = match script {
        Some(file) => Box::new(ReaderSource::new(BufReader::new(file))),
        None if sh.session().interactive => match EditorSource::new(&sh.session().history) {
            Ok(editor) => Box::new(editor),
            Err(e) => {
                tracing::warn!("line editing unavailable: {:#}", e);
                Box::new(ReaderSource::prompting(io::stdin().lock(), Box::new(io::stdout())))
            }
        },
        None => Box::new(ReaderSource::new(io::stdin().lock())),
    };

    // After the editor exists: building it replaces the SIGINT disposition.
    if sh.session().interactive {
        if let Err(e) = signals::install() {
            tracing::warn!("could not install SIGINT handler: {}", e);
        }
    }

    sh.repl(source.as_mut());
    drop(source);
    std::process::exit(sh.finish());
}
