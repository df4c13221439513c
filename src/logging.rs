//! Logging initialization.

use std::io::IsTerminal;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable holding the `EnvFilter` directives, e.g. `SHELL_LOG=shell=debug`.
pub const LOG_ENV: &str = "SHELL_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn fmt_layer<S, W>(writer: W, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .compact()
        .with_ansi(ansi)
        .with_writer(writer)
}

/// Try to initialize the logging system.
///
/// Events go to stderr so they never mix with command output, styled only when stderr is
/// a terminal. Returns `Err` if a subscriber has already been installed.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt_layer(std::io::stderr, std::io::stderr().is_terminal()))
        .try_init()
}
