//! Pooled storage for order records.
//!
//! Orders live in one contiguous `Vec` and are addressed by `u32` indices
//! instead of pointers; the free list is threaded through the `next` field
//! of unused records. Growth happens a fixed-size block at a time, and the
//! initial capacity is faulted in eagerly at construction so a replay never
//! pays allocation jitter mid-stream.

use crate::types::{OrderId, Price, Quantity, Side};

/// Index of an order record inside the pool.
pub type OrderRef = u32;

/// Sentinel index meaning "no order".
pub const NULL_REF: OrderRef = OrderRef::MAX;

/// Records added per growth step.
pub const DEFAULT_BLOCK_SIZE: usize = 10_000;

/// Records pre-allocated at construction.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1_000_000;

/// A single resting order.
///
/// `prev`/`next` link the order into its level's FIFO queue while resting;
/// `next` doubles as the free-list link once the record is released. The
/// owning level is recovered from `(side, price)`.
#[derive(Debug, Clone, Copy)]
pub struct OrderNode {
    pub id: OrderId,
    pub price: Price,
    pub size: Quantity,
    pub side: Side,
    /// Nanoseconds since midnight.
    pub timestamp: u64,
    pub prev: OrderRef,
    pub next: OrderRef,
}

impl OrderNode {
    const fn vacant() -> Self {
        Self {
            id: 0,
            price: 0,
            size: 0,
            side: Side::Buy,
            timestamp: 0,
            prev: NULL_REF,
            next: NULL_REF,
        }
    }
}

/// Free-list pool of [`OrderNode`] records.
///
/// Every record is either on the free list or linked into exactly one
/// level's queue. `allocate` returns a record with unspecified payload
/// fields; the caller must initialize it fully before linking it anywhere.
#[derive(Debug)]
pub struct SlabPool {
    nodes: Vec<OrderNode>,
    free_head: OrderRef,
    block_size: usize,
    live: usize,
}

impl Default for SlabPool {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_BLOCK_SIZE, DEFAULT_INITIAL_CAPACITY)
    }
}

impl SlabPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with `initial_capacity` records (rounded up to whole blocks)
    /// allocated eagerly.
    pub fn with_capacity(block_size: usize, initial_capacity: usize) -> Self {
        assert!(block_size > 0, "block size must be non-zero");
        let blocks = initial_capacity.div_ceil(block_size);
        let mut pool = Self {
            nodes: Vec::with_capacity(blocks * block_size),
            free_head: NULL_REF,
            block_size,
            live: 0,
        };
        for _ in 0..blocks {
            pool.grow();
        }
        pool
    }

    /// Pop a record off the free list, growing by one block if exhausted.
    ///
    /// The returned record's payload fields are whatever the previous
    /// occupant left behind; only the queue links are reset.
    #[inline]
    pub fn allocate(&mut self) -> OrderRef {
        if self.free_head == NULL_REF {
            self.grow();
        }
        let idx = self.free_head;
        self.free_head = self.nodes[idx as usize].next;
        self.nodes[idx as usize].next = NULL_REF;
        self.nodes[idx as usize].prev = NULL_REF;
        self.live += 1;
        idx
    }

    /// Return a record to the free list. The record must already be
    /// unlinked from its queue; its `next` field becomes the free link.
    #[inline]
    pub fn release(&mut self, idx: OrderRef) {
        debug_assert!((idx as usize) < self.nodes.len(), "index out of bounds");
        debug_assert!(self.live > 0, "release with no live records");
        self.nodes[idx as usize].next = self.free_head;
        self.free_head = idx;
        self.live -= 1;
    }

    #[inline]
    pub fn get(&self, idx: OrderRef) -> &OrderNode {
        &self.nodes[idx as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: OrderRef) -> &mut OrderNode {
        &mut self.nodes[idx as usize]
    }

    /// Number of records currently owned by level queues.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Total records across all blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn grow(&mut self) {
        let base = self.nodes.len();
        assert!(
            base + self.block_size < NULL_REF as usize,
            "slab capacity exceeds index range"
        );
        self.nodes
            .extend(std::iter::repeat(OrderNode::vacant()).take(self.block_size));
        // Thread the new block onto the free list, last record first so
        // allocation order stays ascending within a block.
        for i in (base..base + self.block_size).rev() {
            self.nodes[i].next = self.free_head;
            self.free_head = i as OrderRef;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_preallocation_rounds_up_to_blocks() {
        let pool = SlabPool::with_capacity(10, 25);
        assert_eq!(pool.capacity(), 30);
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn allocate_release_reuses_records() {
        let mut pool = SlabPool::with_capacity(4, 4);
        let a = pool.allocate();
        let b = pool.allocate();
        assert_ne!(a, b);
        assert_eq!(pool.live(), 2);

        pool.release(a);
        assert_eq!(pool.live(), 1);

        // Free list is LIFO: the released record comes back first.
        let c = pool.allocate();
        assert_eq!(c, a);
    }

    #[test]
    fn grows_by_one_block_when_exhausted() {
        let mut pool = SlabPool::with_capacity(2, 2);
        assert_eq!(pool.capacity(), 2);
        let _ = pool.allocate();
        let _ = pool.allocate();
        let _ = pool.allocate();
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.live(), 3);
    }

    #[test]
    fn allocation_resets_links_only() {
        let mut pool = SlabPool::with_capacity(2, 2);
        let a = pool.allocate();
        {
            let node = pool.get_mut(a);
            node.id = 42;
            node.size = 7;
        }
        pool.release(a);
        let b = pool.allocate();
        assert_eq!(b, a);
        let node = pool.get(b);
        assert_eq!(node.prev, NULL_REF);
        assert_eq!(node.next, NULL_REF);
    }

    #[test]
    fn block_allocation_order_is_ascending() {
        let mut pool = SlabPool::with_capacity(4, 4);
        assert_eq!(pool.allocate(), 0);
        assert_eq!(pool.allocate(), 1);
        assert_eq!(pool.allocate(), 2);
        assert_eq!(pool.allocate(), 3);
    }
}
