//! Notice board subject
//!
//! The concrete subject the demo registers observers against: it holds the latest
//! message/severity pair and is handed to observers by reference on every notification.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Severity of a posted notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A message with its severity and the time it was posted
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>, raised_at: DateTime<Utc>) -> Self {
        Self {
            severity,
            message: message.into(),
            raised_at,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.raised_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.severity,
            self.message
        )
    }
}

/// Subject state shared between the demo runner and the registry
#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: RefCell<Option<Notice>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current notice, stamped with the current time
    pub fn post(&self, severity: Severity, message: impl Into<String>) {
        self.post_notice(Notice::new(severity, message, Utc::now()));
    }

    pub fn post_notice(&self, notice: Notice) {
        *self.current.borrow_mut() = Some(notice);
    }

    /// Latest notice, if any was posted
    pub fn current(&self) -> Option<Notice> {
        self.current.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_notice_display() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let notice = Notice::new(Severity::Warning, "low disk", at);
        assert_eq!(notice.to_string(), "[2024-05-01T12:30:00Z] WARNING: low disk");
    }

    #[test]
    fn test_board_keeps_latest_notice() {
        let board = NoticeBoard::new();
        assert!(board.current().is_none());

        board.post(Severity::Error, "first");
        board.post(Severity::Info, "second");

        let current = board.current().unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Info);
    }
}
