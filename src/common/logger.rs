//! Structured logging with box-drawing output.
//!
//! Every line rightlight prints goes through the macros defined here so that
//! daemon output, simulation traces and CLI listings share one visual style:
//!
//! ```text
//! ┏ rightlight v0.3.0 ━━╸
//! ┃
//! ┣ Turning on light.gameroom (Normal)
//! ┃   span 3 → 4, ratio 0.412, 1062s remaining
//! ┣[WARNING] Solar times unavailable, reusing yesterday's anchors
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (prepends an empty `┃`).
//! - `log_decorated!` continues a block with `┣ message`.
//! - `log_indented!` prints nested detail as `┃   message`.
//! - `log_pipe!` inserts vertical spacing before a level-prefixed message.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!` carry a
//!   `[LEVEL]` tag and are used when a message has semantic weight of its own.
//! - `log_version!` and `log_end!` bracket the whole run.
//!
//! Logging can be switched off at runtime (tests do this), and simulation runs get a
//! `[HH:MM:SS]` prefix taken from the simulated clock. `Log::start_file_logging`
//! reroutes everything to a file through a writer thread.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Present only while --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Line shape for one log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Block,
    Decorated,
    Indented,
    Pipe,
    Header,
    End,
    Level(Level),
    ExitError,
}

/// Semantic level tag for `[LEVEL]` prefixed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Warning,
    Error,
    Critical,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "\x1b[32mINFO\x1b[0m",
            Level::Debug => "\x1b[32mDEBUG\x1b[0m",
            Level::Warning => "\x1b[33mWARNING\x1b[0m",
            Level::Error => "\x1b[31mERROR\x1b[0m",
            Level::Critical => "\x1b[31mCRITICAL\x1b[0m",
        }
    }
}

/// Main logging interface.
pub struct Log;

impl Log {
    /// Enable or disable all output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable `log_debug!` output (the `--debug` flag).
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output to `file_path` until the returned guard is dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown while the process runs on simulated time.
    pub fn get_timestamp_prefix() -> String {
        // Checked without initializing the global source
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Format and write one message. Used by the macros; rarely called directly.
    pub fn emit(layout: Layout, message: &str) {
        if !Self::is_enabled() {
            return;
        }
        if layout == Layout::Level(Level::Debug) && !Self::is_debug() {
            return;
        }

        let prefix = Self::get_timestamp_prefix();
        let formatted = match layout {
            Layout::Block => format!("{prefix}┃\n{prefix}┣ {message}\n"),
            Layout::Decorated => format!("{prefix}┣ {message}\n"),
            Layout::Indented => format!("{prefix}┃   {message}\n"),
            Layout::Pipe => format!("{prefix}┃\n"),
            Layout::Header => format!("{prefix}┏ {message} ━━╸\n"),
            Layout::End => format!("{prefix}╹\n"),
            Layout::Level(level) => format!("{prefix}┣[{}] {message}\n", level.tag()),
            Layout::ExitError => {
                format!("{prefix}┃\n{prefix}┗[{}] {message}\n", Level::Error.tag())
            }
        };
        write_output(&formatted);
    }
}

/// Guard for file logging that flushes and joins the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove ANSI color sequences (`ESC [ ... m`) for file output.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write an already formatted line to stdout or the log file.
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($layout:expr, $fmt:literal $($arg:tt)*) => {
        $crate::common::logger::Log::emit($layout, &format!($fmt $($arg)*))
    };
    ($layout:expr, $expr:expr) => {
        $crate::common::logger::Log::emit($layout, &format!("{}", $expr))
    };
}

/// Start a new block of related output.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => {
        $crate::__log_emit!($crate::common::logger::Layout::Block, $($arg)+)
    };
}

/// Continue the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => {
        $crate::__log_emit!($crate::common::logger::Layout::Decorated, $($arg)+)
    };
}

/// Nested detail line.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => {
        $crate::__log_emit!($crate::common::logger::Layout::Indented, $($arg)+)
    };
}

/// Empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::common::logger::Log::emit($crate::common::logger::Layout::Pipe, "")
    };
}

/// Application header, printed once per run.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::common::logger::Log::emit(
            $crate::common::logger::Layout::Header,
            &format!("rightlight v{}", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::common::logger::Log::emit($crate::common::logger::Layout::End, "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => {
        $crate::__log_emit!(
            $crate::common::logger::Layout::Level($crate::common::logger::Level::Info),
            $($arg)+
        )
    };
}

/// Only printed when debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => {
        $crate::__log_emit!(
            $crate::common::logger::Layout::Level($crate::common::logger::Level::Debug),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => {
        $crate::__log_emit!(
            $crate::common::logger::Layout::Level($crate::common::logger::Level::Warning),
            $($arg)+
        )
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => {
        $crate::__log_emit!(
            $crate::common::logger::Layout::Level($crate::common::logger::Level::Error),
            $($arg)+
        )
    };
}

/// Error that terminates the current flow (`┗[ERROR]`).
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => {
        $crate::__log_emit!($crate::common::logger::Layout::ExitError, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => {
        $crate::__log_emit!(
            $crate::common::logger::Layout::Level($crate::common::logger::Level::Critical),
            $($arg)+
        )
    };
}
