//! Logging and verbosity control.
//!
//! A single global logger with three verbosity levels:
//! - Quiet: only the written file path
//! - Normal: progress messages without prefixes (default)
//! - Verbose: timestamped colored logs, including projection and operation details
//!
//! Until [`Logger::init`] runs, the free functions do nothing. Library code can
//! log unconditionally and unit tests stay silent.

use std::sync::OnceLock;
use std::time::Instant;

/// Verbosity level for controlling output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Thread-safe logger for controlling application output.
#[derive(Debug)]
pub struct Logger {
    level: VerbosityLevel,
    colors_enabled: bool,
}

impl Logger {
    /// Initialize the global logger. Later calls are ignored.
    pub fn init(level: VerbosityLevel, no_color: bool) {
        let colors_enabled = !no_color
            && std::env::var("NO_COLOR").is_err()
            && atty::is(atty::Stream::Stdout);

        START_TIME.set(Instant::now()).ok();
        LOGGER.set(Logger { level, colors_enabled }).ok();
    }

    /// The global logger, if initialized.
    pub fn instance() -> Option<&'static Logger> {
        LOGGER.get()
    }

    fn elapsed(&self) -> f64 {
        START_TIME
            .get()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn is_verbose(&self) -> bool {
        self.level == VerbosityLevel::Verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.level == VerbosityLevel::Quiet
    }

    pub fn level(&self) -> VerbosityLevel {
        self.level
    }

    fn format_with_level(&self, level: &str, msg: &str) -> String {
        let elapsed = self.elapsed();
        if self.colors_enabled {
            let level_color = match level {
                "ERROR" => "\x1b[31m",
                "WARN" => "\x1b[33m",
                "INFO" => "\x1b[34m",
                "DEBUG" => "\x1b[90m",
                _ => "",
            };
            format!(
                "\x1b[90m[{:.2}s]\x1b[0m {}[{}]\x1b[0m {}",
                elapsed, level_color, level, msg
            )
        } else {
            format!("[{:.2}s] [{}] {}", elapsed, level, msg)
        }
    }

    /// Log an error message (always displayed, on stderr).
    pub fn error(&self, msg: &str) {
        if self.is_verbose() {
            eprintln!("{}", self.format_with_level("ERROR", msg));
        } else {
            eprintln!("Error: {}", msg);
        }
    }

    /// Log a warning message (normal and verbose modes).
    pub fn warn(&self, msg: &str) {
        match self.level {
            VerbosityLevel::Quiet => {}
            VerbosityLevel::Normal => eprintln!("Warning: {}", msg),
            VerbosityLevel::Verbose => eprintln!("{}", self.format_with_level("WARN", msg)),
        }
    }

    /// Output a written file path (quiet: just the path).
    pub fn output(&self, path: &str) {
        match self.level {
            VerbosityLevel::Quiet => println!("{}", path),
            VerbosityLevel::Normal => println!("Saved: {}", path),
            VerbosityLevel::Verbose => {
                println!("{}", self.format_with_level("INFO", &format!("Saved: {}", path)))
            }
        }
    }

    /// Log an info message (normal mode and above).
    pub fn info(&self, msg: &str) {
        match self.level {
            VerbosityLevel::Quiet => {}
            VerbosityLevel::Normal => println!("{}", msg),
            VerbosityLevel::Verbose => println!("{}", self.format_with_level("INFO", msg)),
        }
    }

    /// Log a debug message (verbose mode only).
    pub fn debug(&self, msg: &str) {
        if self.is_verbose() {
            println!("{}", self.format_with_level("DEBUG", msg));
        }
    }
}

pub fn error(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.error(msg);
    }
}

pub fn warn(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.warn(msg);
    }
}

pub fn output(path: &str) {
    if let Some(logger) = Logger::instance() {
        logger.output(path);
    }
}

pub fn info(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.info(msg);
    }
}

pub fn debug(msg: &str) {
    if let Some(logger) = Logger::instance() {
        logger.debug(msg);
    }
}

/// Returns true if quiet mode is enabled. False before initialization.
pub fn is_quiet() -> bool {
    Logger::instance().is_some_and(Logger::is_quiet)
}
