//! The price-time-priority order book.
//!
//! Price levels are kept in one `BTreeMap` per side; best bid is the
//! largest bid key, best ask the smallest ask key. An `AHashMap` gives
//! O(1) ID lookup for cancels, reductions and executions, and all order
//! records come out of a [`SlabPool`].
//!
//! LOBSTER messages are post-matched events, so there is no matching here:
//! every mutation is a bookkeeping step, and messages referencing orders
//! submitted before the replay window fall back to anonymous volume
//! adjustments at the level aggregate.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;

use crate::level::Level;
use crate::slab::{OrderRef, SlabPool, NULL_REF};
use crate::types::{OrderId, Price, Quantity, Side, INVALID_PRICE};

/// One row of a depth query: aggregate state of a single price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookLevel {
    pub price: Price,
    pub volume: Quantity,
    pub orders: u32,
}

#[derive(Debug)]
pub struct Book {
    /// Buy side, best = largest key.
    bids: BTreeMap<Price, Level>,
    /// Sell side, best = smallest key.
    asks: BTreeMap<Price, Level>,
    lookup: AHashMap<OrderId, OrderRef>,
    pool: SlabPool,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            lookup: AHashMap::new(),
            pool: SlabPool::new(),
        }
    }

    /// Book with a custom slab geometry (growth block size and eagerly
    /// pre-allocated record count).
    pub fn with_capacity(block_size: usize, initial_capacity: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            lookup: AHashMap::with_capacity(initial_capacity),
            pool: SlabPool::with_capacity(block_size, initial_capacity),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Highest bid price, or [`INVALID_PRICE`] when the side is empty.
    #[inline]
    pub fn best_bid(&self) -> Price {
        self.bids.keys().next_back().copied().unwrap_or(INVALID_PRICE)
    }

    /// Lowest ask price, or [`INVALID_PRICE`] when the side is empty.
    #[inline]
    pub fn best_ask(&self) -> Price {
        self.asks.keys().next().copied().unwrap_or(INVALID_PRICE)
    }

    /// Aggregate volume resting at `price`, searching bids then asks.
    ///
    /// Sides hold disjoint prices in a well-formed book, so the bid-first
    /// order only matters on crossed input, which LOBSTER snapshots never
    /// produce.
    #[inline]
    pub fn volume_at(&self, price: Price) -> Quantity {
        if let Some(level) = self.bids.get(&price) {
            return level.total_volume;
        }
        if let Some(level) = self.asks.get(&price) {
            return level.total_volume;
        }
        0
    }

    /// Aggregate volume at `price` on one specific side.
    #[inline]
    pub fn level_volume(&self, price: Price, side: Side) -> Quantity {
        let map = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        map.get(&price).map_or(0, |level| level.total_volume)
    }

    /// Number of tracked (named) orders.
    #[inline]
    pub fn order_count(&self) -> usize {
        self.lookup.len()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Order book imbalance at the top of book, in [-1, 1].
    ///
    /// `(bid_size - ask_size) / (bid_size + ask_size)`; 0 when either side
    /// is absent or both top sizes are zero.
    pub fn obi(&self) -> f64 {
        let bid = self.best_bid();
        let ask = self.best_ask();
        if bid == INVALID_PRICE || ask == INVALID_PRICE {
            return 0.0;
        }
        let bid_size = self.volume_at(bid);
        let ask_size = self.volume_at(ask);
        let total = bid_size + ask_size;
        if total == 0 {
            return 0.0;
        }
        (bid_size as f64 - ask_size as f64) / total as f64
    }

    /// Size-weighted top-of-book price.
    ///
    /// `(bid * ask_size + ask * bid_size) / (bid_size + ask_size)`; 0 under
    /// the same degenerate conditions as [`Book::obi`].
    pub fn microprice(&self) -> f64 {
        let bid = self.best_bid();
        let ask = self.best_ask();
        if bid == INVALID_PRICE || ask == INVALID_PRICE {
            return 0.0;
        }
        let bid_size = self.volume_at(bid);
        let ask_size = self.volume_at(ask);
        let total = bid_size + ask_size;
        if total == 0 {
            return 0.0;
        }
        (bid as f64 * ask_size as f64 + ask as f64 * bid_size as f64) / total as f64
    }

    /// Top `levels` rows of one side, best first.
    pub fn depth(&self, side: Side, levels: usize) -> Vec<BookLevel> {
        let row = |(price, level): (&Price, &Level)| BookLevel {
            price: *price,
            volume: level.total_volume,
            orders: level.order_count,
        };
        match side {
            Side::Buy => self.bids.iter().rev().take(levels).map(row).collect(),
            Side::Sell => self.asks.iter().take(levels).map(row).collect(),
        }
    }

    /// The FIFO queue at `(price, side)` as `(id, size)` pairs, head
    /// (oldest) first. Empty when the level does not exist or holds only
    /// anonymous volume.
    pub fn level_orders(&self, price: Price, side: Side) -> Vec<(OrderId, Quantity)> {
        let map = match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        let mut out = Vec::new();
        if let Some(level) = map.get(&price) {
            let mut cursor = level.head;
            while cursor != NULL_REF {
                let node = self.pool.get(cursor);
                out.push((node.id, node.size));
                cursor = node.next;
            }
        }
        out
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Existing level at `(price, side)`, or a freshly inserted empty one.
    ///
    /// A created level starts with zero volume and zero orders; the caller
    /// must populate it, since empty levels are never kept otherwise.
    pub fn get_or_create_level(&mut self, price: Price, side: Side) -> &mut Level {
        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        map.entry(price).or_insert_with(|| Level::new(price))
    }

    /// LOBSTER type 1: rest a new order at the tail of its level's queue.
    /// A duplicate ID is a no-op.
    pub fn add_order(
        &mut self,
        id: OrderId,
        price: Price,
        size: Quantity,
        side: Side,
        timestamp_ns: u64,
    ) {
        if self.lookup.contains_key(&id) {
            return;
        }

        let idx = self.pool.allocate();
        {
            let node = self.pool.get_mut(idx);
            node.id = id;
            node.price = price;
            node.size = size;
            node.side = side;
            node.timestamp = timestamp_ns;
        }

        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = map.entry(price).or_insert_with(|| Level::new(price));
        level.push_back(&mut self.pool, idx);

        self.lookup.insert(id, idx);
    }

    /// Remove a named order entirely. Returns false for an unknown ID.
    pub fn cancel_order(&mut self, id: OrderId) -> bool {
        match self.lookup.get(&id).copied() {
            Some(idx) => {
                self.remove_resting(id, idx);
                true
            }
            None => false,
        }
    }

    /// LOBSTER type 3: full deletion.
    ///
    /// Unknown IDs refer to orders resting before the replay window began;
    /// for those the level aggregate at `(price, side)` is drained instead.
    pub fn delete_order(&mut self, id: OrderId, price: Price, size: Quantity, side: Side) {
        match self.lookup.get(&id).copied() {
            Some(idx) => self.remove_resting(id, idx),
            None => self.reduce_anonymous(price, side, size),
        }
    }

    /// LOBSTER type 2: partial cancellation of `delta` shares.
    ///
    /// A reduction covering the whole order becomes a full removal. The
    /// unknown-ID fallback mirrors [`Book::delete_order`].
    pub fn reduce_order(&mut self, id: OrderId, delta: Quantity, price: Price, side: Side) {
        match self.lookup.get(&id).copied() {
            Some(idx) => {
                let size = self.pool.get(idx).size;
                if delta >= size {
                    self.remove_resting(id, idx);
                } else {
                    // The node's own coordinates are authoritative; the
                    // message echo of price/side is only for the fallback.
                    let (node_price, node_side) = {
                        let node = self.pool.get_mut(idx);
                        node.size -= delta;
                        (node.price, node.side)
                    };
                    let map = match node_side {
                        Side::Buy => &mut self.bids,
                        Side::Sell => &mut self.asks,
                    };
                    if let Some(level) = map.get_mut(&node_price) {
                        level.total_volume = level.total_volume.saturating_sub(delta);
                    }
                }
            }
            None => self.reduce_anonymous(price, side, delta),
        }
    }

    /// LOBSTER type 4: execution against a resting order. The feed emits
    /// the post-trade event against the resting ID, so this is the same
    /// bookkeeping as a partial cancellation.
    #[inline]
    pub fn execute_order(&mut self, id: OrderId, delta: Quantity, price: Price, side: Side) {
        self.reduce_order(id, delta, price, side);
    }

    /// Seed `size` shares of anonymous volume at `(price, side)`.
    ///
    /// Used for snapshot initialization and reconciliation healing; the
    /// level's queue is untouched and `order_count` stays at zero unless
    /// named orders also rest there.
    pub fn add_anonymous_volume(&mut self, price: Price, size: Quantity, side: Side) {
        self.get_or_create_level(price, side).total_volume += size;
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Unlink a tracked order, evict its level if that left nothing behind,
    /// release the record and drop the ID mapping.
    fn remove_resting(&mut self, id: OrderId, idx: OrderRef) {
        let (price, side) = {
            let node = self.pool.get(idx);
            (node.price, node.side)
        };
        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = map.get_mut(&price) {
            level.unlink(&mut self.pool, idx);
            if level.is_evictable() {
                map.remove(&price);
            }
        }
        self.pool.release(idx);
        self.lookup.remove(&id);
    }

    /// Drain anonymous volume at the level aggregate, clamped at zero.
    /// Nothing to drain is a silent no-op.
    fn reduce_anonymous(&mut self, price: Price, side: Side, qty: Quantity) {
        let map = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = map.get_mut(&price) {
            level.total_volume = level.total_volume.saturating_sub(qty);
            if level.is_evictable() {
                map.remove(&price);
            }
        }
    }
}
