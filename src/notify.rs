//! Transient user notifications.
//!
//! Failures and completed mutations are reported as one-line notices rather
//! than aborting the screen. The console sink prints to stderr; the memory
//! sink collects notices for inspection.

use std::sync::Arc;
use std::time::Instant;

use owo_colors::OwoColorize;
use parking_lot::Mutex;

use crate::error::AdminError;

/// A notification message
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
    pub timestamp: Instant,
}

/// Severity level for notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl Notice {
    pub fn new(message: String, level: NoticeLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Success)
    }

    /// Error notice for a failed operation.
    pub fn from_error(context: &str, error: &AdminError) -> Self {
        Self::error(format!("{context}: {error}"))
    }

    /// Message with a coloured level prefix.
    pub fn render(&self) -> String {
        match self.level {
            NoticeLevel::Info => format!("{} {}", "info:".cyan(), self.message),
            NoticeLevel::Warning => format!("{} {}", "warning:".yellow(), self.message),
            NoticeLevel::Error => format!("{} {}", "error:".red().bold(), self.message),
            NoticeLevel::Success => format!("{} {}", "ok:".green(), self.message),
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr and mirrors them into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    /// Log-only notifier for one-shot commands, which print their own
    /// result and exit with the error.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, "{}", notice.message);
        if self.quiet {
            return;
        }
        eprintln!("{}", notice.render());
    }
}

/// Collects notices in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.lock().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
