//! Core scalar types and decoded input records.
//!
//! Prices, sizes and order IDs follow the LOBSTER conventions: prices are
//! scaled integer ticks (dollars * 10^4 for equities), sizes are share
//! counts, and IDs are exchange-assigned 64-bit integers.

use serde::{Deserialize, Serialize};

/// Price in integer ticks. Negative values only appear as sentinels.
pub type Price = i64;

/// Order or level size in shares.
pub type Quantity = u64;

/// Exchange-assigned order identifier.
pub type OrderId = u64;

/// Returned by best-quote queries when the side is empty.
pub const INVALID_PRICE: Price = Price::MIN;

/// Marks an absent level in LOBSTER orderbook (snapshot) files.
pub const SNAPSHOT_NO_LEVEL: Price = -9_999_999_999;

/// Order side, encoded as the LOBSTER direction field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Side {
    Buy = 1,
    Sell = -1,
}

impl Side {
    /// Parse the signed direction field (+1 buy, -1 sell).
    #[inline]
    pub fn from_direction(direction: i8) -> Option<Self> {
        match direction {
            1 => Some(Side::Buy),
            -1 => Some(Side::Sell),
            _ => None,
        }
    }
}

/// LOBSTER event kind (the message file's `type` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventKind {
    /// New limit order submission.
    Submission = 1,
    /// Partial cancellation (size reduction).
    Cancellation = 2,
    /// Full deletion.
    Deletion = 3,
    /// Execution of a visible order.
    Execution = 4,
    /// Execution of a hidden order. Carries no book state.
    HiddenExecution = 5,
    /// Auction cross indicator.
    Cross = 6,
    /// Trading halt indicator.
    Halt = 7,
}

impl EventKind {
    /// Parse the integer event code; unknown codes yield `None`.
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(EventKind::Submission),
            2 => Some(EventKind::Cancellation),
            3 => Some(EventKind::Deletion),
            4 => Some(EventKind::Execution),
            5 => Some(EventKind::HiddenExecution),
            6 => Some(EventKind::Cross),
            7 => Some(EventKind::Halt),
            _ => None,
        }
    }
}

/// One decoded row of a LOBSTER message file.
///
/// The CSV columns are `time, type, order_id, size, price, direction`.
/// Decoding is left to the caller; the engine consumes these records
/// through a plain iterator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Seconds since midnight, fractional part down to nanoseconds.
    pub timestamp: f64,
    /// Raw event code (see [`EventKind`]).
    pub kind: u8,
    pub order_id: OrderId,
    pub size: Quantity,
    pub price: Price,
    /// +1 buy, -1 sell.
    pub direction: i8,
}

impl Message {
    pub fn new(
        timestamp: f64,
        kind: u8,
        order_id: OrderId,
        size: Quantity,
        price: Price,
        direction: i8,
    ) -> Self {
        Self {
            timestamp,
            kind,
            order_id,
            size,
            price,
            direction,
        }
    }

    /// Decoded event kind, if the code is a known LOBSTER type.
    #[inline]
    pub fn event_kind(&self) -> Option<EventKind> {
        EventKind::from_code(self.kind)
    }

    /// Decoded side, if the direction field is well-formed.
    #[inline]
    pub fn side(&self) -> Option<Side> {
        Side::from_direction(self.direction)
    }

    /// Timestamp as integer nanoseconds since midnight, truncated.
    #[inline]
    pub fn timestamp_ns(&self) -> u64 {
        (self.timestamp * 1e9) as u64
    }
}

/// One (ask, bid) pair at a given depth of a snapshot row.
///
/// Prices equal to [`SNAPSHOT_NO_LEVEL`] mark an absent side at this depth
/// and must be skipped by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLevel {
    pub ask_price: Price,
    pub ask_size: Quantity,
    pub bid_price: Price,
    pub bid_size: Quantity,
}

impl SnapshotLevel {
    #[inline]
    pub fn has_ask(&self) -> bool {
        self.ask_price != SNAPSHOT_NO_LEVEL
    }

    #[inline]
    pub fn has_bid(&self) -> bool {
        self.bid_price != SNAPSHOT_NO_LEVEL
    }
}

/// One decoded row of a LOBSTER orderbook (snapshot) file: the top N
/// levels of both sides, best first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub levels: Vec<SnapshotLevel>,
}

impl SnapshotRow {
    pub fn new(levels: Vec<SnapshotLevel>) -> Self {
        Self { levels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_from_direction() {
        assert_eq!(Side::from_direction(1), Some(Side::Buy));
        assert_eq!(Side::from_direction(-1), Some(Side::Sell));
        assert_eq!(Side::from_direction(0), None);
        assert_eq!(Side::from_direction(2), None);
    }

    #[test]
    fn event_kind_from_code() {
        assert_eq!(EventKind::from_code(1), Some(EventKind::Submission));
        assert_eq!(EventKind::from_code(4), Some(EventKind::Execution));
        assert_eq!(EventKind::from_code(7), Some(EventKind::Halt));
        assert_eq!(EventKind::from_code(0), None);
        assert_eq!(EventKind::from_code(8), None);
    }

    #[test]
    fn timestamp_truncates_to_nanoseconds() {
        let msg = Message::new(34200.004241176, 1, 16113575, 18, 5853300, 1);
        assert_eq!(msg.timestamp_ns(), 34_200_004_241_176);
    }

    #[test]
    fn snapshot_level_sentinel() {
        let lvl = SnapshotLevel {
            ask_price: SNAPSHOT_NO_LEVEL,
            ask_size: 0,
            bid_price: 5_853_300,
            bid_size: 18,
        };
        assert!(!lvl.has_ask());
        assert!(lvl.has_bid());
    }
}
