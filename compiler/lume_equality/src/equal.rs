//! Equality entry points.

use std::cmp::Ordering;

use crate::{IrCompareCache, IrComparer, IrNode};

/// Structural equality by plain recursion.
///
/// Only for IR without repeated shared subexpressions: each shared node is
/// re-explored once per path that reaches it.
pub fn equal<N: IrNode>(a: &N, b: &N) -> bool {
    IrComparer::new().compare(a, b).is_eq()
}

/// Structural equality that is safe on arbitrarily shared IR.
///
/// Uses a fresh cache of [`DEFAULT_CACHE_BITS`](crate::DEFAULT_CACHE_BITS)
/// for the duration of the call.
pub fn graph_equal<N: IrNode>(a: &N, b: &N) -> bool {
    let mut cache = IrCompareCache::default();
    graph_compare(&mut cache, a, b).is_eq()
}

/// [`graph_equal`] with a caller-owned cache, so facts proven here can
/// speed up later calls.
pub fn graph_equal_with<N: IrNode>(cache: &mut IrCompareCache, a: &N, b: &N) -> bool {
    graph_compare(cache, a, b).is_eq()
}

/// Three-way structural ordering, memoized through `cache`.
///
/// Agrees exactly with [`IrDeepCompare`](crate::IrDeepCompare).
pub fn graph_compare<N: IrNode>(cache: &mut IrCompareCache, a: &N, b: &N) -> Ordering {
    let mut comparer = IrComparer::with_cache(cache);
    let ord = comparer.compare(a, b);
    tracing::trace!(
        ?ord,
        visited = comparer.nodes_visited(),
        "graph compare"
    );
    ord
}
