//! A small interactive command interpreter.
//!
//! This crate reads command lines from a terminal, a script file or a pipe, splits them
//! into segments chained with `;`, `&&` and `||`, expands aliases and `$` variables, and
//! runs each segment either as a builtin implemented in Rust or as an external program
//! found through `PATH`.
//!
//! The main entry point is [`Interpreter`], which owns a [`Session`] and drives the
//! read-eval loop. The public modules expose the pieces it is made of: the [`lexer`] and
//! [`parser`] that turn a line into segments, the [`registry`] backing variables, aliases
//! and history, and the [`builtin`] commands.

pub mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod expand;
mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod logging;
pub mod parser;
pub mod registry;
pub mod session;
pub mod signals;

pub use builtin::Builtin;
pub use command::ExitCode;
pub use config::Config;
pub use error::ShellError;
/// Just a convenient re-export of the read-eval loop.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
pub use session::Session;
