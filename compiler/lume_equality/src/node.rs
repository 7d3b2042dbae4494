//! The two comparable handle categories.

use std::cmp::Ordering;

use lume_ir::{Expr, IrNodeType, Stmt};

use crate::IrComparer;

pub(crate) mod sealed {
    use lume_ir::{Expr, Stmt};

    /// Contents of one cache slot. Expression and statement pairs share
    /// the slot array but never match each other.
    #[derive(Default)]
    pub enum Slot {
        #[default]
        Empty,
        Exprs(Expr, Expr),
        Stmts(Stmt, Stmt),
    }

    pub trait Sealed: Sized {
        fn into_slot(a: Self, b: Self) -> Slot;
        fn slot_pair(slot: &Slot) -> Option<(&Self, &Self)>;
    }

    impl Sealed for Expr {
        fn into_slot(a: Self, b: Self) -> Slot {
            Slot::Exprs(a, b)
        }

        fn slot_pair(slot: &Slot) -> Option<(&Self, &Self)> {
            match slot {
                Slot::Exprs(a, b) => Some((a, b)),
                _ => None,
            }
        }
    }

    impl Sealed for Stmt {
        fn into_slot(a: Self, b: Self) -> Slot {
            Slot::Stmts(a, b)
        }

        fn slot_pair(slot: &Slot) -> Option<(&Self, &Self)> {
            match slot {
                Slot::Stmts(a, b) => Some((a, b)),
                _ => None,
            }
        }
    }
}

/// An IR handle category that can be compared and cached.
///
/// Implemented for [`Expr`] and [`Stmt`] only. Comparing an expression with
/// a statement is not expressible.
pub trait IrNode: sealed::Sealed + Clone {
    /// Node address used for cache hashing, 0 when undefined.
    fn node_addr(&self) -> usize;

    fn same_node(&self, other: &Self) -> bool;

    /// Kind of the root node, `None` when undefined.
    fn kind_tag(&self) -> Option<IrNodeType>;

    #[doc(hidden)]
    fn compare_in(comparer: &mut IrComparer<'_>, a: &Self, b: &Self) -> Ordering;
}

impl IrNode for Expr {
    #[inline]
    fn node_addr(&self) -> usize {
        self.addr()
    }

    #[inline]
    fn kind_tag(&self) -> Option<IrNodeType> {
        self.node_type()
    }

    #[inline]
    fn same_node(&self, other: &Self) -> bool {
        self.same_as(other)
    }

    fn compare_in(comparer: &mut IrComparer<'_>, a: &Self, b: &Self) -> Ordering {
        comparer.compare_expr(a, b)
    }
}

impl IrNode for Stmt {
    #[inline]
    fn node_addr(&self) -> usize {
        self.addr()
    }

    #[inline]
    fn kind_tag(&self) -> Option<IrNodeType> {
        self.node_type()
    }

    #[inline]
    fn same_node(&self, other: &Self) -> bool {
        self.same_as(other)
    }

    fn compare_in(comparer: &mut IrComparer<'_>, a: &Self, b: &Self) -> Ordering {
        comparer.compare_stmt(a, b)
    }
}
