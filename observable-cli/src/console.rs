//! Console observers
//!
//! One handler type per observer: each decides per [`SubjectKind`] whether it cares
//! about the notification and then reads the [`NoticeBoard`] it was handed.

use crate::notice::{NoticeBoard, Severity};
use observable_registry::{Observe, SubjectKind};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Prints ERROR and WARNING notices from `CustomFirst` subjects
pub struct ConsoleObserver {
    name: String,
    /// Write lines to stdout as well as recording them
    echo: bool,
    printed: RefCell<Vec<String>>,
}

impl ConsoleObserver {
    pub fn new(name: impl Into<String>, echo: bool) -> Self {
        Self {
            name: name.into(),
            echo,
            printed: RefCell::new(Vec::new()),
        }
    }

    /// Lines printed so far
    pub fn printed(&self) -> Vec<String> {
        self.printed.borrow().clone()
    }

    fn on_notice(&self, board: &NoticeBoard) {
        let Some(notice) = board.current() else {
            log::debug!("{}: notified without a notice", self.name);
            return;
        };

        match notice.severity {
            Severity::Error | Severity::Warning => {
                let line = notice.to_string();
                if self.echo {
                    println!("{}", line);
                }
                self.printed.borrow_mut().push(line);
            }
            Severity::Info => {}
        }
    }
}

impl Observe<NoticeBoard> for ConsoleObserver {
    fn notify(&self, kind: SubjectKind, board: &NoticeBoard) {
        match kind {
            SubjectKind::CustomFirst => self.on_notice(board),
            SubjectKind::Transaction | SubjectKind::Trigger | SubjectKind::CustomSecond => {
                log::trace!("{}: ignoring {} notification", self.name, kind);
            }
        }
    }
}

/// Counts notices per severity from either custom subject kind
pub struct TallyObserver {
    name: String,
    counts: RefCell<BTreeMap<Severity, usize>>,
}

impl TallyObserver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            counts: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn total(&self) -> usize {
        self.counts.borrow().values().sum()
    }
}

impl Observe<NoticeBoard> for TallyObserver {
    fn notify(&self, kind: SubjectKind, board: &NoticeBoard) {
        if !matches!(kind, SubjectKind::CustomFirst | SubjectKind::CustomSecond) {
            log::trace!("{}: ignoring {} notification", self.name, kind);
            return;
        }
        if let Some(notice) = board.current() {
            *self.counts.borrow_mut().entry(notice.severity).or_insert(0) += 1;
        }
    }
}
