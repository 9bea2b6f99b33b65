//! User-facing notifications.

use std::fmt;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A short human-readable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// Sink for notices. Hosts (terminal, editor) provide their own.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices to the terminal: info to stdout, the rest to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// The line printed for `notice`.
    pub fn render(notice: &Notice) -> String {
        match notice.severity {
            Severity::Info => format!("✓ {}", notice.text),
            Severity::Warning => format!("Warning: {}", notice.text),
            Severity::Error => format!("Error: {}", notice.text),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        let line = Self::render(notice);
        match notice.severity {
            Severity::Info => println!("{line}"),
            Severity::Warning | Severity::Error => eprintln!("{line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_render() {
        assert_eq!(ConsoleNotifier::render(&Notice::info("Committed")), "✓ Committed");
        assert_eq!(
            ConsoleNotifier::render(&Notice::warning("Nothing to commit")),
            "Warning: Nothing to commit"
        );
        assert_eq!(ConsoleNotifier::render(&Notice::error("boom")), "Error: boom");
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
