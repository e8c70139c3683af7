//! Bounded, pausable message log kept by the client.
//!
//! Holds the most recent N entries, newest first. Appending past the
//! bound evicts the oldest entry; a paused log drops appends silently
//! without touching existing entries.

use std::collections::VecDeque;

use crate::domain::Timestamp;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line in the client's message log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub category: String,
    pub message: String,
    pub timestamp: Timestamp,
}

impl LogEntry {
    fn render(&self) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            self.timestamp, self.level, self.category, self.message
        )
    }
}

/// Bounded log buffer, newest entries first.
#[derive(Debug)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    bound: usize,
    paused: bool,
    total_appended: u64,
}

impl MessageLog {
    /// Create an empty log holding at most `bound` entries.
    pub fn new(bound: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(bound.min(256)),
            bound,
            paused: false,
            total_appended: 0,
        }
    }

    /// Append an entry unless paused. Evicts the oldest entry when the
    /// bound is reached.
    pub fn append(&mut self, level: LogLevel, category: impl Into<String>, message: impl Into<String>) {
        if self.paused {
            return;
        }

        self.entries.push_front(LogEntry {
            level,
            category: category.into(),
            message: message.into(),
            timestamp: Timestamp::now(),
        });
        self.total_appended += 1;

        while self.entries.len() > self.bound {
            self.entries.pop_back();
        }
    }

    /// Drop all entries and reset the total counter. Works while paused.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_appended = 0;
    }

    /// Pause or resume appends. Setting the current value again is a
    /// no-op.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries accepted since creation or the last clear, including
    /// evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Entries in display order, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Newline-joined rendering in display order.
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn append_keeps_newest_first() {
        let mut log = MessageLog::new(10);
        log.append(LogLevel::Info, "connection", "first");
        log.append(LogLevel::Success, "connection", "second");

        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["second", "first"]);
    }

    #[test]
    fn bound_evicts_oldest() {
        let mut log = MessageLog::new(3);
        for n in 0..5 {
            log.append(LogLevel::Info, "test", format!("entry-{n}"));
        }

        assert_eq!(log.len(), 3);
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["entry-4", "entry-3", "entry-2"]);
        assert_eq!(log.total_appended(), 5);
    }

    #[test]
    fn paused_drops_appends_silently() {
        let mut log = MessageLog::new(10);
        log.append(LogLevel::Info, "test", "kept");

        log.set_paused(true);
        log.append(LogLevel::Info, "test", "dropped");
        assert_eq!(log.len(), 1);
        assert_eq!(log.total_appended(), 1);

        // Pausing twice changes nothing
        log.set_paused(true);
        assert!(log.is_paused());

        log.set_paused(false);
        log.append(LogLevel::Info, "test", "kept-again");
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn clear_resets_entries_and_counter() {
        let mut log = MessageLog::new(10);
        log.append(LogLevel::Warning, "test", "entry");
        log.clear();

        assert!(log.is_empty());
        assert_eq!(log.total_appended(), 0);

        // Clearing while paused still empties the log
        log.append(LogLevel::Info, "test", "entry");
        log.set_paused(true);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn export_text_renders_display_order() {
        let mut log = MessageLog::new(10);
        log.append(LogLevel::Info, "connection", "opened");
        log.append(LogLevel::Error, "connection", "lost");

        let text = log.export_text();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[ERROR] [connection] lost"));
        assert!(lines[1].contains("[INFO] [connection] opened"));
    }

    #[test]
    fn export_text_of_empty_log_is_empty() {
        let log = MessageLog::new(10);
        assert_eq!(log.export_text(), "");
    }

    proptest! {
        #[test]
        fn never_exceeds_bound(bound in 1usize..200, appends in 0usize..500) {
            let mut log = MessageLog::new(bound);
            for n in 0..appends {
                log.append(LogLevel::Info, "prop", format!("m{n}"));
            }
            prop_assert!(log.len() <= bound);
            prop_assert_eq!(log.len(), appends.min(bound));
        }

        #[test]
        fn retains_the_most_recent_entries(bound in 1usize..50, appends in 1usize..200) {
            let mut log = MessageLog::new(bound);
            for n in 0..appends {
                log.append(LogLevel::Info, "prop", format!("m{n}"));
            }
            // Head of the log is always the last append
            let newest = log.entries().next().unwrap();
            prop_assert_eq!(newest.message.clone(), format!("m{}", appends - 1));
        }
    }
}
