//! Field-by-field structural comparison of expressions and statements.
//!
//! One pairwise `match` per handle category. Every arm lists scalar fields
//! first and children after, in declaration order, and stops at the first
//! field that is not `Equal`.

use std::cmp::Ordering;
use std::fmt;

use lume_ir::{Expr, ExprKind, Range, Stmt, StmtKind};
use lume_stack::ensure_sufficient_stack;

use crate::{IrCompareCache, IrNode};

/// Binds the payload of `$b`, whose kind tag already matched the other side.
macro_rules! same_kind {
    ($b:expr, $pat:pat) => {
        let $pat = $b else {
            unreachable!("node kinds differ after tag comparison")
        };
    };
}

/// Recursive comparison engine.
///
/// Without a cache it is the plain tree walk. With one it records every
/// pair it proves equal and answers repeated pairs from the cache, which
/// bounds the work on IR with shared subexpressions.
pub struct IrComparer<'c> {
    cache: Option<&'c mut IrCompareCache>,
    visited: u64,
}

impl IrComparer<'static> {
    /// Tree mode: no memoization.
    pub fn new() -> Self {
        IrComparer {
            cache: None,
            visited: 0,
        }
    }
}

impl Default for IrComparer<'static> {
    fn default() -> Self {
        IrComparer::new()
    }
}

impl<'c> IrComparer<'c> {
    /// Graph mode: consult and populate `cache`.
    pub fn with_cache(cache: &'c mut IrCompareCache) -> Self {
        IrComparer {
            cache: Some(cache),
            visited: 0,
        }
    }

    /// Node pairs that were actually descended into, i.e. not settled by
    /// identity, definedness, or a cache hit.
    #[inline]
    pub fn nodes_visited(&self) -> u64 {
        self.visited
    }

    pub fn compare<N: IrNode>(&mut self, a: &N, b: &N) -> Ordering {
        N::compare_in(self, a, b)
    }

    pub fn compare_expr(&mut self, a: &Expr, b: &Expr) -> Ordering {
        if a.same_as(b) {
            return Ordering::Equal;
        }
        let (na, nb) = match (a.node(), b.node()) {
            (Some(na), Some(nb)) => (na, nb),
            (None, _) => return Ordering::Less,
            (_, None) => return Ordering::Greater,
        };
        if self.cache_contains(a, b) {
            return Ordering::Equal;
        }
        self.visited += 1;

        let ord = ensure_sufficient_stack(|| {
            na.kind
                .node_type()
                .cmp(&nb.kind.node_type())
                .then_with(|| na.ty.cmp(&nb.ty))
                .then_with(|| self.compare_expr_kind(&na.kind, &nb.kind))
        });
        if ord == Ordering::Equal {
            self.cache_insert(a, b);
        }
        ord
    }

    pub fn compare_stmt(&mut self, a: &Stmt, b: &Stmt) -> Ordering {
        if a.same_as(b) {
            return Ordering::Equal;
        }
        let (na, nb) = match (a.node(), b.node()) {
            (Some(na), Some(nb)) => (na, nb),
            (None, _) => return Ordering::Less,
            (_, None) => return Ordering::Greater,
        };
        if self.cache_contains(a, b) {
            return Ordering::Equal;
        }
        self.visited += 1;

        let ord = ensure_sufficient_stack(|| {
            na.kind
                .node_type()
                .cmp(&nb.kind.node_type())
                .then_with(|| self.compare_stmt_kind(&na.kind, &nb.kind))
        });
        if ord == Ordering::Equal {
            self.cache_insert(a, b);
        }
        ord
    }

    fn cache_contains<N: IrNode>(&self, a: &N, b: &N) -> bool {
        self.cache.as_deref().is_some_and(|c| c.contains(a, b))
    }

    fn cache_insert<N: IrNode>(&mut self, a: &N, b: &N) {
        if let Some(cache) = self.cache.as_deref_mut() {
            cache.insert(a, b);
        }
    }

    /// Payload comparison for two nodes already known to share a kind tag.
    ///
    /// Matches on `a` alone so that a new kind is a compile error here.
    #[allow(clippy::too_many_lines)]
    fn compare_expr_kind(&mut self, a: &ExprKind, b: &ExprKind) -> Ordering {
        use ExprKind as K;

        match a {
            K::IntImm(x) => {
                same_kind!(b, K::IntImm(y));
                x.cmp(y)
            }
            K::UIntImm(x) => {
                same_kind!(b, K::UIntImm(y));
                x.cmp(y)
            }
            K::FloatImm(x) => {
                same_kind!(b, K::FloatImm(y));
                x.total_cmp(y)
            }
            K::StringImm(x) => {
                same_kind!(b, K::StringImm(y));
                x.cmp(y)
            }
            K::Broadcast {
                lanes: la,
                value: va,
            } => {
                same_kind!(
                    b,
                    K::Broadcast {
                        lanes: lb,
                        value: vb,
                    }
                );
                la.cmp(lb).then_with(|| self.compare_expr(va, vb))
            }
            K::Cast(x) => {
                same_kind!(b, K::Cast(y));
                self.compare_expr(x, y)
            }
            K::Reinterpret(x) => {
                same_kind!(b, K::Reinterpret(y));
                self.compare_expr(x, y)
            }
            K::Not(x) => {
                same_kind!(b, K::Not(y));
                self.compare_expr(x, y)
            }
            K::Variable { name: x, .. } => {
                same_kind!(b, K::Variable { name: y, .. });
                x.cmp(y)
            }
            K::Binary { a: a1, b: b1, .. } => {
                same_kind!(b, K::Binary { a: a2, b: b2, .. });
                self.compare_expr(a1, a2)
                    .then_with(|| self.compare_expr(b1, b2))
            }
            K::Select {
                condition: c1,
                true_value: t1,
                false_value: f1,
            } => {
                same_kind!(
                    b,
                    K::Select {
                        condition: c2,
                        true_value: t2,
                        false_value: f2,
                    }
                );
                self.compare_expr(c1, c2)
                    .then_with(|| self.compare_expr(t1, t2))
                    .then_with(|| self.compare_expr(f1, f2))
            }
            K::Load {
                name: n1,
                alignment: al1,
                index: i1,
                predicate: p1,
                ..
            } => {
                same_kind!(
                    b,
                    K::Load {
                        name: n2,
                        alignment: al2,
                        index: i2,
                        predicate: p2,
                        ..
                    }
                );
                n1.cmp(n2)
                    .then_with(|| al1.cmp(al2))
                    .then_with(|| self.compare_expr(i1, i2))
                    .then_with(|| self.compare_expr(p1, p2))
            }
            K::Ramp {
                lanes: l1,
                base: b1,
                stride: s1,
            } => {
                same_kind!(
                    b,
                    K::Ramp {
                        lanes: l2,
                        base: b2,
                        stride: s2,
                    }
                );
                l1.cmp(l2)
                    .then_with(|| self.compare_expr(b1, b2))
                    .then_with(|| self.compare_expr(s1, s2))
            }
            K::Call {
                name: n1,
                call_type: t1,
                value_index: v1,
                args: a1,
            } => {
                same_kind!(
                    b,
                    K::Call {
                        name: n2,
                        call_type: t2,
                        value_index: v2,
                        args: a2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| t1.cmp(t2))
                    .then_with(|| v1.cmp(v2))
                    .then_with(|| self.compare_exprs(a1, a2))
            }
            K::Let {
                name: n1,
                value: v1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::Let {
                        name: n2,
                        value: v2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| self.compare_expr(v1, v2))
                    .then_with(|| self.compare_expr(b1, b2))
            }
            K::Shuffle {
                indices: i1,
                vectors: v1,
            } => {
                same_kind!(
                    b,
                    K::Shuffle {
                        indices: i2,
                        vectors: v2,
                    }
                );
                compare_slices(i1, i2).then_with(|| self.compare_exprs(v1, v2))
            }
            K::VectorReduce { op: o1, value: v1 } => {
                same_kind!(b, K::VectorReduce { op: o2, value: v2 });
                o1.cmp(o2).then_with(|| self.compare_expr(v1, v2))
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn compare_stmt_kind(&mut self, a: &StmtKind, b: &StmtKind) -> Ordering {
        use StmtKind as K;

        match a {
            K::LetStmt {
                name: n1,
                value: v1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::LetStmt {
                        name: n2,
                        value: v2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| self.compare_expr(v1, v2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::AssertStmt {
                condition: c1,
                message: m1,
            } => {
                same_kind!(
                    b,
                    K::AssertStmt {
                        condition: c2,
                        message: m2,
                    }
                );
                self.compare_expr(c1, c2)
                    .then_with(|| self.compare_expr(m1, m2))
            }
            K::ProducerConsumer {
                name: n1,
                is_producer: p1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::ProducerConsumer {
                        name: n2,
                        is_producer: p2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| p1.cmp(p2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::For {
                name: n1,
                for_type: f1,
                device_api: d1,
                min: m1,
                extent: e1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::For {
                        name: n2,
                        for_type: f2,
                        device_api: d2,
                        min: m2,
                        extent: e2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| f1.cmp(f2))
                    .then_with(|| d1.cmp(d2))
                    .then_with(|| self.compare_expr(m1, m2))
                    .then_with(|| self.compare_expr(e1, e2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::Acquire {
                semaphore: s1,
                count: c1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::Acquire {
                        semaphore: s2,
                        count: c2,
                        body: b2,
                    }
                );
                self.compare_expr(s1, s2)
                    .then_with(|| self.compare_expr(c1, c2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::Store {
                name: n1,
                alignment: al1,
                predicate: p1,
                value: v1,
                index: i1,
                ..
            } => {
                same_kind!(
                    b,
                    K::Store {
                        name: n2,
                        alignment: al2,
                        predicate: p2,
                        value: v2,
                        index: i2,
                        ..
                    }
                );
                n1.cmp(n2)
                    .then_with(|| al1.cmp(al2))
                    .then_with(|| self.compare_expr(p1, p2))
                    .then_with(|| self.compare_expr(v1, v2))
                    .then_with(|| self.compare_expr(i1, i2))
            }
            K::Provide {
                name: n1,
                values: v1,
                args: a1,
                predicate: p1,
            } => {
                same_kind!(
                    b,
                    K::Provide {
                        name: n2,
                        values: v2,
                        args: a2,
                        predicate: p2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| self.compare_exprs(v1, v2))
                    .then_with(|| self.compare_exprs(a1, a2))
                    .then_with(|| self.compare_expr(p1, p2))
            }
            K::Allocate {
                name: n1,
                ty: t1,
                memory_type: m1,
                free_function: f1,
                extents: e1,
                condition: c1,
                new_expr: x1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::Allocate {
                        name: n2,
                        ty: t2,
                        memory_type: m2,
                        free_function: f2,
                        extents: e2,
                        condition: c2,
                        new_expr: x2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| t1.cmp(t2))
                    .then_with(|| m1.cmp(m2))
                    .then_with(|| f1.cmp(f2))
                    .then_with(|| self.compare_exprs(e1, e2))
                    .then_with(|| self.compare_expr(c1, c2))
                    .then_with(|| self.compare_expr(x1, x2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::Free { name: n1 } => {
                same_kind!(b, K::Free { name: n2 });
                n1.cmp(n2)
            }
            K::Realize {
                name: n1,
                types: t1,
                memory_type: m1,
                bounds: r1,
                condition: c1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::Realize {
                        name: n2,
                        types: t2,
                        memory_type: m2,
                        bounds: r2,
                        condition: c2,
                        body: b2,
                    }
                );
                n1.cmp(n2)
                    .then_with(|| compare_slices(t1, t2))
                    .then_with(|| m1.cmp(m2))
                    .then_with(|| self.compare_bounds(r1, r2))
                    .then_with(|| self.compare_expr(c1, c2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
            K::Block {
                first: f1,
                rest: r1,
            } => {
                same_kind!(
                    b,
                    K::Block {
                        first: f2,
                        rest: r2,
                    }
                );
                self.compare_stmt(f1, f2)
                    .then_with(|| self.compare_stmt(r1, r2))
            }
            K::Fork {
                first: f1,
                rest: r1,
            } => {
                same_kind!(
                    b,
                    K::Fork {
                        first: f2,
                        rest: r2,
                    }
                );
                self.compare_stmt(f1, f2)
                    .then_with(|| self.compare_stmt(r1, r2))
            }
            K::IfThenElse {
                condition: c1,
                then_case: t1,
                else_case: e1,
            } => {
                same_kind!(
                    b,
                    K::IfThenElse {
                        condition: c2,
                        then_case: t2,
                        else_case: e2,
                    }
                );
                self.compare_expr(c1, c2)
                    .then_with(|| self.compare_stmt(t1, t2))
                    .then_with(|| self.compare_stmt(e1, e2))
            }
            K::Evaluate(x) => {
                same_kind!(b, K::Evaluate(y));
                self.compare_expr(x, y)
            }
            K::Atomic {
                producer_name: p1,
                mutex_name: m1,
                body: b1,
            } => {
                same_kind!(
                    b,
                    K::Atomic {
                        producer_name: p2,
                        mutex_name: m2,
                        body: b2,
                    }
                );
                p1.cmp(p2)
                    .then_with(|| m1.cmp(m2))
                    .then_with(|| self.compare_stmt(b1, b2))
            }
        }
    }

    /// Shorter lists sort first; equal lengths compare elementwise.
    fn compare_exprs(&mut self, a: &[Expr], b: &[Expr]) -> Ordering {
        a.len().cmp(&b.len()).then_with(|| {
            a.iter()
                .zip(b)
                .map(|(x, y)| self.compare_expr(x, y))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }

    fn compare_bounds(&mut self, a: &[Range], b: &[Range]) -> Ordering {
        a.len().cmp(&b.len()).then_with(|| {
            a.iter()
                .zip(b)
                .map(|(x, y)| {
                    self.compare_expr(&x.min, &y.min)
                        .then_with(|| self.compare_expr(&x.extent, &y.extent))
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl fmt::Debug for IrComparer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrComparer")
            .field("cached", &self.cache.is_some())
            .field("visited", &self.visited)
            .finish()
    }
}

/// Length-first ordering for scalar lists.
fn compare_slices<T: Ord>(a: &[T], b: &[T]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Stateless tree-mode comparator.
///
/// Suitable wherever a comparator must be a plain value. Performs no
/// memoization, so it should only see IR without repeated shared
/// subexpressions; use [`graph_compare`](crate::graph_compare) otherwise.
#[derive(Copy, Clone, Debug, Default)]
pub struct IrDeepCompare;

impl IrDeepCompare {
    pub fn compare<N: IrNode>(self, a: &N, b: &N) -> Ordering {
        IrComparer::new().compare(a, b)
    }

    /// Strict weak ordering predicate.
    pub fn less<N: IrNode>(self, a: &N, b: &N) -> bool {
        self.compare(a, b).is_lt()
    }
}

/// Tree-mode ordered-container key.
///
/// `DeepOrd(expr)` can be stored in a `BTreeSet` or used as a `BTreeMap`
/// key; equality and ordering are structural.
#[derive(Clone, Default)]
pub struct DeepOrd<N>(pub N);

impl<N: IrNode> PartialEq for DeepOrd<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl<N: IrNode> Eq for DeepOrd<N> {}

impl<N: IrNode> PartialOrd for DeepOrd<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: IrNode> Ord for DeepOrd<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        IrDeepCompare.compare(&self.0, &other.0)
    }
}

impl<N: fmt::Debug> fmt::Debug for DeepOrd<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests;
