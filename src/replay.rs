//! Snapshot reconciliation and the replay driver.
//!
//! LOBSTER ships a message file and a parallel orderbook file whose row k
//! is the top-N book state after message k. The [`Reconciler`] walks the
//! two in lockstep, compares the book's volume against each snapshot level
//! and heals divergence by injecting anonymous volume under reserved
//! synthetic IDs. [`ReplaySession`] wraps the whole protocol: seed from
//! row 0, discard message 0 (the snapshot already incorporates it), then
//! apply/verify one message and one row at a time.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::apply::{ApplyStats, EventApplier};
use crate::book::Book;
use crate::error::{LobError, Result};
use crate::types::{Message, Price, Quantity, Side, SnapshotRow};

/// First synthetic order ID, above any real LOBSTER ID. The counter is
/// pre-incremented, so the first injected order carries `BASE + 1`.
pub const SYNTHETIC_ID_BASE: u64 = 9_000_000_000;

/// Tuning knobs for snapshot verification.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileConfig {
    /// Snapshot levels verified and healed per row.
    pub depth: usize,
    /// Retained mismatch diagnostics; the error counter is unbounded.
    pub max_reports: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            depth: 10,
            max_reports: 10,
        }
    }
}

impl ReconcileConfig {
    /// Verify only the top `depth` levels of each row.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_max_reports(mut self, max_reports: usize) -> Self {
        self.max_reports = max_reports;
        self
    }
}

/// A snapshot level where the book held non-zero but wrong volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// 1-based message sequence the snapshot row corresponds to.
    pub sequence: u64,
    pub side: Side,
    pub price: Price,
    pub expected: Quantity,
    pub observed: Quantity,
}

/// Compares the live book against reference snapshot rows and repairs
/// divergence.
///
/// A level the book is missing entirely is a silent repair: the usual
/// cause is a message stream referencing orders resting from before the
/// replay window. Non-zero-but-wrong volume is a persistent logic error;
/// it is counted, reported (first `max_reports` only) and healed anyway.
#[derive(Debug)]
pub struct Reconciler {
    config: ReconcileConfig,
    next_synthetic_id: u64,
    persistent_logic_errors: u64,
    silent_heals: u64,
    mismatches: Vec<Mismatch>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            next_synthetic_id: SYNTHETIC_ID_BASE,
            persistent_logic_errors: 0,
            silent_heals: 0,
            mismatches: Vec::new(),
        }
    }

    pub fn persistent_logic_errors(&self) -> u64 {
        self.persistent_logic_errors
    }

    pub fn silent_heals(&self) -> u64 {
        self.silent_heals
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Verify one snapshot row against the book, healing every checked
    /// level to the snapshot's volume.
    pub fn reconcile(&mut self, book: &mut Book, row: &SnapshotRow, sequence: u64) {
        for level in row.levels.iter().take(self.config.depth) {
            if level.has_ask() {
                self.check(book, level.ask_price, level.ask_size, Side::Sell, sequence);
            }
            if level.has_bid() {
                self.check(book, level.bid_price, level.bid_size, Side::Buy, sequence);
            }
        }
    }

    fn check(
        &mut self,
        book: &mut Book,
        price: Price,
        expected: Quantity,
        side: Side,
        sequence: u64,
    ) {
        let observed = book.volume_at(price);
        if observed == expected {
            return;
        }

        if observed != 0 {
            self.persistent_logic_errors += 1;
            if self.mismatches.len() < self.config.max_reports {
                self.mismatches.push(Mismatch {
                    sequence,
                    side,
                    price,
                    expected,
                    observed,
                });
            }
            log::warn!(
                "volume mismatch at msg {sequence} ({side:?} {price}): expected {expected}, got {observed}"
            );
        } else {
            self.silent_heals += 1;
            log::debug!(
                "healing missing level at msg {sequence} ({side:?} {price}): injecting {expected}"
            );
        }

        self.heal(book, price, expected, side);
    }

    /// Force the side-specific level volume to `target`.
    ///
    /// Positive deltas are injected as one synthetic order so later
    /// executions have something to consume; negative deltas drain through
    /// the unknown-ID fallback (ID 0 is never a live LOBSTER ID).
    fn heal(&mut self, book: &mut Book, price: Price, target: Quantity, side: Side) {
        let current = book.level_volume(price, side);
        if current == target {
            return;
        }
        if current == 0 {
            self.inject(book, price, target, side);
        } else {
            let delta = target as i64 - current as i64;
            if delta > 0 {
                self.inject(book, price, delta as Quantity, side);
            } else {
                book.execute_order(0, delta.unsigned_abs(), price, side);
            }
        }
    }

    fn inject(&mut self, book: &mut Book, price: Price, size: Quantity, side: Side) {
        self.next_synthetic_id += 1;
        book.add_order(self.next_synthetic_id, price, size, side, 0);
    }
}

/// Outcome of a full replay run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Messages consumed, including the discarded alignment message.
    pub messages: u64,
    pub apply: ApplyStats,
    pub persistent_logic_errors: u64,
    pub silent_heals: u64,
    /// First `max_reports` non-silent mismatches.
    pub mismatches: Vec<Mismatch>,
    pub elapsed_secs: f64,
    pub messages_per_sec: f64,
}

impl ReplayReport {
    /// Write the report as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Drives a complete replay: book, applier and reconciler in lockstep.
#[derive(Debug, Default)]
pub struct ReplaySession {
    book: Book,
    applier: EventApplier,
    reconciler: Reconciler,
}

impl ReplaySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReconcileConfig) -> Self {
        Self {
            book: Book::new(),
            applier: EventApplier::new(),
            reconciler: Reconciler::new(config),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Run the initialization protocol and the replay loop to exhaustion
    /// of the message stream.
    ///
    /// Snapshot row 0 seeds the book as anonymous volume and message 0 is
    /// consumed without being applied: LOBSTER's first message describes
    /// the transition *into* the first snapshot, which therefore already
    /// incorporates it. From then on each message is applied and one row
    /// is reconciled. A snapshot stream shorter than the message stream
    /// simply stops verification early.
    pub fn run<M, S>(&mut self, mut messages: M, mut snapshots: S) -> Result<ReplayReport>
    where
        M: Iterator<Item = Message>,
        S: Iterator<Item = SnapshotRow>,
    {
        let start = Instant::now();

        let seed = snapshots.next().ok_or(LobError::EmptySnapshotStream)?;
        for level in &seed.levels {
            if level.has_ask() {
                self.book
                    .add_anonymous_volume(level.ask_price, level.ask_size, Side::Sell);
            }
            if level.has_bid() {
                self.book
                    .add_anonymous_volume(level.bid_price, level.bid_size, Side::Buy);
            }
        }

        messages.next().ok_or(LobError::EmptyMessageStream)?;
        let mut message_count: u64 = 1;

        for msg in messages {
            message_count += 1;
            self.applier.apply(&mut self.book, &msg);
            if let Some(row) = snapshots.next() {
                self.reconciler
                    .reconcile(&mut self.book, &row, message_count);
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        Ok(ReplayReport {
            messages: message_count,
            apply: *self.applier.stats(),
            persistent_logic_errors: self.reconciler.persistent_logic_errors(),
            silent_heals: self.reconciler.silent_heals(),
            mismatches: self.reconciler.mismatches().to_vec(),
            elapsed_secs: elapsed,
            messages_per_sec: if elapsed > 0.0 {
                message_count as f64 / elapsed
            } else {
                0.0
            },
        })
    }
}
