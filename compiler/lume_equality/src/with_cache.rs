//! Ordered-container keys that carry a shared compare cache.
//!
//! A `BTreeSet` comparator cannot hold state, so the cache travels with
//! the keys instead. Every key placed in one container should point at the
//! same cache; keys pointing at different caches (or none) still order
//! correctly, they just do not benefit from each other's work.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;

use lume_ir::{Expr, Stmt};

use crate::{IrCompareCache, IrComparer, IrNode};

/// A node plus a borrowed compare cache.
///
/// The key borrows the cache, so it cannot outlive it.
#[derive(Clone)]
pub struct WithCompareCache<'c, N> {
    node: N,
    cache: Option<&'c RefCell<IrCompareCache>>,
}

pub type ExprWithCompareCache<'c> = WithCompareCache<'c, Expr>;
pub type StmtWithCompareCache<'c> = WithCompareCache<'c, Stmt>;

impl<'c, N: IrNode> WithCompareCache<'c, N> {
    pub fn new(cache: &'c RefCell<IrCompareCache>, node: N) -> Self {
        WithCompareCache {
            node,
            cache: Some(cache),
        }
    }

    /// A key that always compares without memoization.
    pub fn uncached(node: N) -> Self {
        WithCompareCache { node, cache: None }
    }

    #[inline]
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn into_node(self) -> N {
        self.node
    }
}

impl<N: IrNode> Ord for WithCompareCache<'_, N> {
    /// Uses the left operand's cache. If that cache is already borrowed
    /// (a comparison re-entered through it), this one runs uncached.
    fn cmp(&self, other: &Self) -> Ordering {
        if let Some(mut cache) = self.cache.and_then(|c| c.try_borrow_mut().ok()) {
            IrComparer::with_cache(&mut cache).compare(&self.node, &other.node)
        } else {
            IrComparer::new().compare(&self.node, &other.node)
        }
    }
}

impl<N: IrNode> PartialOrd for WithCompareCache<'_, N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: IrNode> PartialEq for WithCompareCache<'_, N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl<N: IrNode> Eq for WithCompareCache<'_, N> {}

/// Shows the root kind and address only. Printing the whole node would
/// expand shared subgraphs once per path.
impl<N: IrNode> fmt::Debug for WithCompareCache<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithCompareCache")
            .field("kind", &self.node.kind_tag())
            .field("addr", &format_args!("{:#x}", self.node.node_addr()))
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
