//! Shutdown signal handling for the daemon.
//!
//! A background thread listens for SIGINT, SIGTERM and SIGHUP and clears the
//! shared `running` flag that [`crate::core::Core::run`] polls.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};

/// Signal handling state shared with the main loop.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Register the shutdown signals and spawn the listener thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::spawn(move || {
        for sig in signals.forever() {
            let user_message = shutdown_message(sig, debug_enabled);

            log_pipe!();
            log_info!("{}", user_message);

            running_clone.store(false, Ordering::SeqCst);
            // Keep draining signals until the process exits
        }
    });

    Ok(SignalState { running })
}

fn shutdown_message(sig: i32, debug_enabled: bool) -> &'static str {
    match sig {
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), disabling lights and shutting down...",
        SIGINT => "Received interrupt signal, disabling lights and shutting down...",
        SIGTERM => "Received termination request, disabling lights and shutting down...",
        SIGHUP => "Received hangup signal, disabling lights and shutting down...",
        _ => "Received shutdown signal, disabling lights and shutting down...",
    }
}
