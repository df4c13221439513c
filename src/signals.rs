//! Interrupt handling for interactive sessions.
//!
//! The shell keeps running when Ctrl-C is pressed while a child is in the foreground: the
//! handler only records the interrupt. Children get the default disposition back on
//! `exec`, so they still die from the same signal.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Serializes tests that deliver or consume interrupts.
#[cfg(test)]
pub(crate) static TEST_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(unix)]
extern "C" fn on_sigint(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler.
///
/// Line editors may take over SIGINT while they own the terminal, so this is called
/// again whenever control comes back from one.
#[cfg(unix)]
pub fn install() -> std::io::Result<()> {
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only touches an atomic, which is async-signal-safe.
    let previous = unsafe { libc::signal(libc::SIGINT, handler) };
    if previous == libc::SIG_ERR {
        return Err(std::io::Error::last_os_error());
    }
    tracing::debug!("SIGINT handler installed");
    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> std::io::Result<()> {
    Ok(())
}

/// Returns whether an interrupt arrived since the last call, and clears the flag.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::SeqCst)
}
