//! Lossy cache of node pairs already proven structurally equal.
//!
//! Direct-mapped: a pair hashes to exactly one slot, and inserting
//! overwrites whatever was there. There is no probing and no chaining, so
//! memory is fixed at construction and every operation is O(1).
//!
//! Only positive facts are stored. A lookup that misses (never inserted,
//! evicted, or the slot was taken by a colliding pair) just makes the
//! comparator do the real work; it can never turn "equal" into "unequal"
//! or the other way round.

use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::node::sealed::Slot;
use crate::IrNode;

/// Capacity exponent used by [`graph_equal`](crate::graph_equal).
pub const DEFAULT_CACHE_BITS: u32 = 8;

/// Larger requests are clamped to this exponent (1M slots).
pub const MAX_CACHE_BITS: u32 = 20;

/// Counters describing how a cache was used.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub insertions: u64,
    /// Insertions that evicted a different pair.
    pub collisions: u64,
}

/// Fixed-capacity, overwrite-on-collision set of known-equal node pairs.
///
/// Holds strong references to the nodes it stores, so a cached address
/// cannot be freed and reused by an unrelated node while it occupies a
/// slot.
pub struct IrCompareCache {
    bits: u32,
    entries: Vec<Slot>,
    stats: Cell<CacheStats>,
}

impl IrCompareCache {
    /// A cache with `2^bits` slots.
    pub fn new(bits: u32) -> Self {
        let bits = bits.min(MAX_CACHE_BITS);
        let mut entries = Vec::new();
        entries.resize_with(1usize << bits, Slot::default);
        IrCompareCache {
            bits,
            entries,
            stats: Cell::new(CacheStats::default()),
        }
    }

    #[inline]
    pub fn bits(&self) -> u32 {
        self.bits
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| !matches!(slot, Slot::Empty))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    /// Slot index of the unordered pair `{a, b}`.
    ///
    /// Symmetric: the addresses are sorted before hashing.
    fn slot_index(&self, a: usize, b: usize) -> usize {
        if self.bits == 0 {
            return 0;
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut hasher = FxHasher::default();
        lo.hash(&mut hasher);
        hi.hash(&mut hasher);
        // Top bits of the multiplicative hash are the best mixed.
        let index = hasher.finish() >> (64 - self.bits);
        usize::try_from(index).unwrap_or_default()
    }

    /// Remember that `a` and `b` are equal, evicting the slot's occupant.
    pub fn insert<N: IrNode>(&mut self, a: &N, b: &N) {
        let index = self.slot_index(a.node_addr(), b.node_addr());
        let slot = &mut self.entries[index];

        let mut stats = self.stats.get();
        stats.insertions += 1;
        if !matches!(slot, Slot::Empty) && !slot_holds(slot, a, b) {
            stats.collisions += 1;
        }
        self.stats.set(stats);

        *slot = N::into_slot(a.clone(), b.clone());
    }

    /// Whether `{a, b}` is currently cached, in either order.
    pub fn contains<N: IrNode>(&self, a: &N, b: &N) -> bool {
        let index = self.slot_index(a.node_addr(), b.node_addr());
        let hit = slot_holds(&self.entries[index], a, b);

        let mut stats = self.stats.get();
        stats.lookups += 1;
        stats.hits += u64::from(hit);
        self.stats.set(stats);

        hit
    }

    /// Empty every slot, releasing the nodes they held.
    pub fn clear(&mut self) {
        self.entries.fill_with(Slot::default);
    }
}

fn slot_holds<N: IrNode>(slot: &Slot, a: &N, b: &N) -> bool {
    N::slot_pair(slot).is_some_and(|(x, y)| {
        (a.same_node(x) && b.same_node(y)) || (a.same_node(y) && b.same_node(x))
    })
}

impl Default for IrCompareCache {
    fn default() -> Self {
        IrCompareCache::new(DEFAULT_CACHE_BITS)
    }
}

impl fmt::Debug for IrCompareCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrCompareCache")
            .field("bits", &self.bits)
            .field("occupied", &self.len())
            .field("stats", &self.stats.get())
            .finish()
    }
}

impl Drop for IrCompareCache {
    fn drop(&mut self) {
        let stats = self.stats.get();
        if stats.insertions > 0 {
            #[allow(clippy::cast_precision_loss)]
            let evict_pct = 100.0 * stats.collisions as f64 / stats.insertions as f64;
            tracing::debug!(
                bits = self.bits,
                insertions = stats.insertions,
                collisions = stats.collisions,
                lookups = stats.lookups,
                hits = stats.hits,
                evict_pct,
                "compare cache retired"
            );
        }
    }
}
