//! Message dispatch: LOBSTER event kind to book mutation.

use serde::Serialize;

use crate::book::Book;
use crate::types::{EventKind, Message};

/// Counters for every message handed to the applier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub submissions: u64,
    pub cancellations: u64,
    pub deletions: u64,
    pub executions: u64,
    pub hidden_executions: u64,
    /// Halt/cross indicators, unknown event codes, malformed directions.
    pub ignored: u64,
}

impl ApplyStats {
    /// Total messages seen, applied or not.
    pub fn messages(&self) -> u64 {
        self.submissions
            + self.cancellations
            + self.deletions
            + self.executions
            + self.hidden_executions
            + self.ignored
    }
}

/// Applies decoded messages to a [`Book`].
///
/// Hidden executions (type 5) and halt indicators (types 6/7) carry no
/// visible book state and are counted but not applied. Messages with an
/// unknown event code or a direction outside {+1, -1} are counted as
/// ignored.
#[derive(Debug, Default)]
pub struct EventApplier {
    stats: ApplyStats,
}

impl EventApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &ApplyStats {
        &self.stats
    }

    pub fn apply(&mut self, book: &mut Book, msg: &Message) {
        let kind = match msg.event_kind() {
            Some(kind) => kind,
            None => {
                self.stats.ignored += 1;
                return;
            }
        };

        match kind {
            EventKind::HiddenExecution => {
                self.stats.hidden_executions += 1;
                return;
            }
            EventKind::Cross | EventKind::Halt => {
                self.stats.ignored += 1;
                return;
            }
            _ => {}
        }

        let side = match msg.side() {
            Some(side) => side,
            None => {
                self.stats.ignored += 1;
                return;
            }
        };

        match kind {
            EventKind::Submission => {
                book.add_order(msg.order_id, msg.price, msg.size, side, msg.timestamp_ns());
                self.stats.submissions += 1;
            }
            EventKind::Cancellation => {
                book.reduce_order(msg.order_id, msg.size, msg.price, side);
                self.stats.cancellations += 1;
            }
            EventKind::Deletion => {
                book.delete_order(msg.order_id, msg.price, msg.size, side);
                self.stats.deletions += 1;
            }
            EventKind::Execution => {
                book.execute_order(msg.order_id, msg.size, msg.price, side);
                self.stats.executions += 1;
            }
            EventKind::HiddenExecution | EventKind::Cross | EventKind::Halt => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::INVALID_PRICE;

    #[test]
    fn submission_then_execution() {
        let mut book = Book::with_capacity(16, 16);
        let mut applier = EventApplier::new();

        applier.apply(&mut book, &Message::new(34200.1, 1, 11, 10, 100, 1));
        applier.apply(&mut book, &Message::new(34200.2, 4, 11, 4, 100, 1));

        assert_eq!(book.volume_at(100), 6);
        assert_eq!(applier.stats().submissions, 1);
        assert_eq!(applier.stats().executions, 1);
        assert_eq!(applier.stats().messages(), 2);
    }

    #[test]
    fn partial_cancel_and_deletion() {
        let mut book = Book::with_capacity(16, 16);
        let mut applier = EventApplier::new();

        applier.apply(&mut book, &Message::new(0.0, 1, 5, 20, 200, -1));
        applier.apply(&mut book, &Message::new(0.1, 2, 5, 8, 200, -1));
        assert_eq!(book.volume_at(200), 12);

        applier.apply(&mut book, &Message::new(0.2, 3, 5, 12, 200, -1));
        assert_eq!(book.volume_at(200), 0);
        assert_eq!(book.best_ask(), INVALID_PRICE);
        assert_eq!(applier.stats().cancellations, 1);
        assert_eq!(applier.stats().deletions, 1);
    }

    #[test]
    fn hidden_execution_leaves_book_untouched() {
        let mut book = Book::with_capacity(16, 16);
        let mut applier = EventApplier::new();

        applier.apply(&mut book, &Message::new(0.0, 1, 5, 20, 200, -1));
        applier.apply(&mut book, &Message::new(0.1, 5, 0, 50, 199, 1));

        assert_eq!(book.volume_at(200), 20);
        assert_eq!(book.order_count(), 1);
        assert_eq!(applier.stats().hidden_executions, 1);
    }

    #[test]
    fn halt_and_garbage_are_ignored() {
        let mut book = Book::with_capacity(16, 16);
        let mut applier = EventApplier::new();

        applier.apply(&mut book, &Message::new(0.0, 6, 0, 0, 0, 0));
        applier.apply(&mut book, &Message::new(0.1, 7, 0, 0, 0, 1));
        applier.apply(&mut book, &Message::new(0.2, 9, 1, 1, 1, 1));
        applier.apply(&mut book, &Message::new(0.3, 1, 1, 1, 1, 3));

        assert_eq!(book.order_count(), 0);
        assert_eq!(applier.stats().ignored, 4);
        assert_eq!(applier.stats().messages(), 4);
    }
}
