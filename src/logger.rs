//! Terminal output for lumawall.
//!
//! Every session is drawn as one tree on stdout: `log_version` opens it,
//! `log_block_start` and `log_decorated` add branches, `log_indented` adds
//! detail under the current branch and `log_end` closes it:
//!
//! ```text
//! ┏ lumawall v0.1.0 ━━╸
//! ┃
//! ┣ Wallpaper changed to noon.png (brightness 0.92, daylight 0.97)
//! ┃
//! ┣ Next wallpaper change at 2024-06-15 19:00:00
//! ┃   [████░░░░] 5h 12m left
//! ╹
//! ```
//!
//! Leveled messages (`log_warning`, `log_error`, ...) are written as
//! `[LEVEL] text` inside the same tree. Two process-wide switches control
//! output: `set_enabled(false)` silences everything (tests, scripted use)
//! and `set_debug(true)` lets `[LOG]` lines through.

use std::sync::atomic::{AtomicBool, Ordering};

static OUTPUT_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_OUTPUT: AtomicBool = AtomicBool::new(false);

/// Severity of a leveled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Diagnostic detail, printed only with `--debug`.
    Log,
    Warn,
    Err,
    Crit,
    Info,
}

impl LogLevel {
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Log => "[LOG]",
            LogLevel::Warn => "[WARN]",
            LogLevel::Err => "[ERR]",
            LogLevel::Crit => "[CRIT]",
            LogLevel::Info => "[INFO]",
        }
    }

    fn is_visible(self) -> bool {
        self != LogLevel::Log || Log::is_debug()
    }
}

/// Print `lines` unless output is switched off.
fn emit(lines: &[&str]) {
    if !Log::is_enabled() {
        return;
    }
    for line in lines {
        println!("{}", line);
    }
}

pub struct Log;

impl Log {
    pub fn set_enabled(enabled: bool) {
        OUTPUT_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        OUTPUT_ENABLED.load(Ordering::SeqCst)
    }

    /// Switch `[LOG]` lines on or off (`--debug`).
    pub fn set_debug(enabled: bool) {
        DEBUG_OUTPUT.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_OUTPUT.load(Ordering::SeqCst)
    }

    /// Write `message` with the prefix for `level`.
    pub fn log(level: LogLevel, message: &str) {
        if level.is_visible() {
            emit(&[&format!("{} {}", level.prefix(), message)]);
        }
    }

    pub fn log_error(message: &str) {
        Self::log(LogLevel::Err, message);
    }

    pub fn log_warning(message: &str) {
        Self::log(LogLevel::Warn, message);
    }

    pub fn log_info(message: &str) {
        Self::log(LogLevel::Info, message);
    }

    pub fn log_debug(message: &str) {
        Self::log(LogLevel::Log, message);
    }

    pub fn log_critical(message: &str) {
        Self::log(LogLevel::Crit, message);
    }

    /// A branch on the current block.
    pub fn log_decorated(message: &str) {
        emit(&[&format!("┣ {}", message)]);
    }

    /// Detail under the current branch.
    pub fn log_indented(message: &str) {
        emit(&[&format!("┃   {}", message)]);
    }

    pub fn log_pipe() {
        emit(&["┃"]);
    }

    /// A new block, separated from the previous one by an empty pipe.
    pub fn log_block_start(message: &str) {
        emit(&["┃", &format!("┣ {}", message)]);
    }

    /// Session header with the crate version.
    pub fn log_version() {
        emit(&[
            &format!("┏ lumawall v{} ━━╸", env!("CARGO_PKG_VERSION")),
            "┃",
        ]);
    }

    pub fn log_end() {
        emit(&["╹"]);
    }
}
