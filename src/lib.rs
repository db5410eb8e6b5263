//! # lobster-replay
//!
//! In-memory limit order book engine for replaying LOBSTER message
//! streams at backtest throughput.
//!
//! The book keeps price-time priority on both sides: a `BTreeMap` of
//! price levels per side, an intrusive FIFO queue of pooled order records
//! at each level, and an O(1) ID lookup for cancels and executions.
//! LOBSTER messages are post-matched events, so applying one is pure
//! bookkeeping; there is no matching engine here.
//!
//! ## Quick start
//!
//! ```rust
//! use lobster_replay::{Book, Side};
//!
//! let mut book = Book::new();
//! book.add_order(1, 5_853_300, 18, Side::Buy, 34_200_004_241_176);
//! book.add_order(2, 5_854_000, 25, Side::Sell, 34_200_005_000_000);
//!
//! assert_eq!(book.best_bid(), 5_853_300);
//! assert_eq!(book.best_ask(), 5_854_000);
//! assert!(book.obi() < 0.0);
//! ```
//!
//! ## Replaying against reference snapshots
//!
//! ```rust
//! use lobster_replay::{Message, ReplaySession, SnapshotLevel, SnapshotRow};
//!
//! let messages = vec![
//!     Message::new(34200.0, 1, 10, 50, 5_853_300, 1),
//!     Message::new(34200.1, 1, 11, 10, 5_853_300, 1),
//! ];
//! let snapshots = vec![
//!     SnapshotRow::new(vec![SnapshotLevel {
//!         ask_price: 5_854_000, ask_size: 25,
//!         bid_price: 5_853_300, bid_size: 50,
//!     }]),
//!     SnapshotRow::new(vec![SnapshotLevel {
//!         ask_price: 5_854_000, ask_size: 25,
//!         bid_price: 5_853_300, bid_size: 60,
//!     }]),
//! ];
//!
//! let mut session = ReplaySession::new();
//! let report = session.run(messages.into_iter(), snapshots.into_iter()).unwrap();
//! assert_eq!(report.persistent_logic_errors, 0);
//! ```
//!
//! ## Module overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Scalars, `Side`, `EventKind`, decoded message and snapshot records |
//! | [`slab`] | Pooled, index-addressed order storage |
//! | [`level`] | A single price point with its FIFO queue |
//! | [`book`] | The two-sided book: mutations and microstructure queries |
//! | [`apply`] | LOBSTER event dispatch with per-kind counters |
//! | [`replay`] | Snapshot reconciliation, healing and the replay driver |

pub mod apply;
pub mod book;
pub mod error;
pub mod level;
pub mod replay;
pub mod slab;
pub mod types;

pub use apply::{ApplyStats, EventApplier};
pub use book::{Book, BookLevel};
pub use error::{LobError, Result};
pub use level::Level;
pub use replay::{
    Mismatch, ReconcileConfig, Reconciler, ReplayReport, ReplaySession, SYNTHETIC_ID_BASE,
};
pub use slab::{OrderNode, OrderRef, SlabPool, NULL_REF};
pub use types::{
    EventKind, Message, OrderId, Price, Quantity, Side, SnapshotLevel, SnapshotRow,
    INVALID_PRICE, SNAPSHOT_NO_LEVEL,
};
