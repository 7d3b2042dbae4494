//! Statement nodes and the nullable `Stmt` handle.

use std::fmt;
use std::rc::Rc;

use crate::{
    DeviceApi, Expr, ExprList, ForType, IrNodeType, MemoryType, ModulusRemainder, Parameter, Range,
    Type,
};

/// Nullable, reference-counted handle to a statement node.
#[derive(Clone, Default)]
pub struct Stmt(Option<Rc<StmtNode>>);

#[derive(Debug)]
pub struct StmtNode {
    pub kind: StmtKind,
}

/// Statement node payloads.
///
/// Scalar fields are listed before children in every variant.
#[derive(Debug)]
pub enum StmtKind {
    LetStmt {
        name: String,
        value: Expr,
        body: Stmt,
    },
    AssertStmt {
        condition: Expr,
        message: Expr,
    },
    ProducerConsumer {
        name: String,
        is_producer: bool,
        body: Stmt,
    },
    For {
        name: String,
        for_type: ForType,
        device_api: DeviceApi,
        min: Expr,
        extent: Expr,
        body: Stmt,
    },
    Acquire {
        semaphore: Expr,
        count: Expr,
        body: Stmt,
    },
    Store {
        name: String,
        alignment: ModulusRemainder,
        predicate: Expr,
        value: Expr,
        index: Expr,
        param: Option<Parameter>,
    },
    /// A multi-dimensional store to a pipeline stage, before flattening.
    Provide {
        name: String,
        values: ExprList,
        args: ExprList,
        predicate: Expr,
    },
    Allocate {
        name: String,
        ty: Type,
        memory_type: MemoryType,
        /// Empty when the default deallocator is used.
        free_function: String,
        extents: ExprList,
        condition: Expr,
        new_expr: Expr,
        body: Stmt,
    },
    Free {
        name: String,
    },
    Realize {
        name: String,
        types: Vec<Type>,
        memory_type: MemoryType,
        bounds: Vec<Range>,
        condition: Expr,
        body: Stmt,
    },
    Block {
        first: Stmt,
        rest: Stmt,
    },
    Fork {
        first: Stmt,
        rest: Stmt,
    },
    IfThenElse {
        condition: Expr,
        then_case: Stmt,
        /// Undefined when there is no else branch.
        else_case: Stmt,
    },
    Evaluate(Expr),
    Atomic {
        producer_name: String,
        /// Empty when the update lowers to native atomics.
        mutex_name: String,
        body: Stmt,
    },
}

impl StmtKind {
    pub fn node_type(&self) -> IrNodeType {
        match self {
            StmtKind::LetStmt { .. } => IrNodeType::LetStmt,
            StmtKind::AssertStmt { .. } => IrNodeType::AssertStmt,
            StmtKind::ProducerConsumer { .. } => IrNodeType::ProducerConsumer,
            StmtKind::For { .. } => IrNodeType::For,
            StmtKind::Acquire { .. } => IrNodeType::Acquire,
            StmtKind::Store { .. } => IrNodeType::Store,
            StmtKind::Provide { .. } => IrNodeType::Provide,
            StmtKind::Allocate { .. } => IrNodeType::Allocate,
            StmtKind::Free { .. } => IrNodeType::Free,
            StmtKind::Realize { .. } => IrNodeType::Realize,
            StmtKind::Block { .. } => IrNodeType::Block,
            StmtKind::Fork { .. } => IrNodeType::Fork,
            StmtKind::IfThenElse { .. } => IrNodeType::IfThenElse,
            StmtKind::Evaluate(_) => IrNodeType::Evaluate,
            StmtKind::Atomic { .. } => IrNodeType::Atomic,
        }
    }
}

impl StmtKind {
    /// Move every child statement out into `out`. Expression children are
    /// left in place; they free themselves iteratively.
    fn take_children(&mut self, out: &mut Vec<Stmt>) {
        match self {
            StmtKind::AssertStmt { .. }
            | StmtKind::Store { .. }
            | StmtKind::Provide { .. }
            | StmtKind::Free { .. }
            | StmtKind::Evaluate(_) => {}
            StmtKind::LetStmt { body, .. }
            | StmtKind::ProducerConsumer { body, .. }
            | StmtKind::For { body, .. }
            | StmtKind::Acquire { body, .. }
            | StmtKind::Allocate { body, .. }
            | StmtKind::Realize { body, .. }
            | StmtKind::Atomic { body, .. } => out.push(std::mem::take(body)),
            StmtKind::Block { first, rest } | StmtKind::Fork { first, rest } => {
                out.extend([std::mem::take(first), std::mem::take(rest)]);
            }
            StmtKind::IfThenElse {
                then_case,
                else_case,
                ..
            } => out.extend([std::mem::take(then_case), std::mem::take(else_case)]),
        }
    }
}

/// Frees uniquely owned descendants with an explicit worklist, so dropping
/// a long `Block` chain never recurses.
impl Drop for StmtNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.take_children(&mut pending);
        while let Some(child) = pending.pop() {
            if let Some(mut node) = child.0.and_then(|rc| Rc::try_unwrap(rc).ok()) {
                node.kind.take_children(&mut pending);
            }
        }
    }
}

// Handle API

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt(Some(Rc::new(StmtNode { kind })))
    }

    #[inline]
    pub const fn undefined() -> Self {
        Stmt(None)
    }

    #[inline]
    pub fn defined(&self) -> bool {
        self.0.is_some()
    }

    /// Identity: both undefined, or the same node.
    #[inline]
    pub fn same_as(&self, other: &Stmt) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn node(&self) -> Option<&StmtNode> {
        self.0.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> Option<&StmtKind> {
        self.node().map(|n| &n.kind)
    }

    #[inline]
    pub fn node_type(&self) -> Option<IrNodeType> {
        self.kind().map(StmtKind::node_type)
    }

    /// Address of the node, or 0 when undefined.
    #[inline]
    pub fn addr(&self) -> usize {
        self.0.as_ref().map_or(0, |rc| Rc::as_ptr(rc) as usize)
    }
}

// Constructors

impl Stmt {
    pub fn let_stmt(name: impl Into<String>, value: Expr, body: Stmt) -> Self {
        debug_assert!(value.defined() && body.defined());
        Stmt::new(StmtKind::LetStmt {
            name: name.into(),
            value,
            body,
        })
    }

    pub fn assert_stmt(condition: Expr, message: Expr) -> Self {
        debug_assert!(condition.ty().is_some_and(Type::is_bool));
        Stmt::new(StmtKind::AssertStmt { condition, message })
    }

    pub fn producer(name: impl Into<String>, body: Stmt) -> Self {
        Stmt::new(StmtKind::ProducerConsumer {
            name: name.into(),
            is_producer: true,
            body,
        })
    }

    pub fn consumer(name: impl Into<String>, body: Stmt) -> Self {
        Stmt::new(StmtKind::ProducerConsumer {
            name: name.into(),
            is_producer: false,
            body,
        })
    }

    /// `for (name, min, extent) body`
    pub fn for_loop(
        name: impl Into<String>,
        min: Expr,
        extent: Expr,
        for_type: ForType,
        device_api: DeviceApi,
        body: Stmt,
    ) -> Self {
        debug_assert!(min.defined() && extent.defined() && body.defined());
        Stmt::new(StmtKind::For {
            name: name.into(),
            for_type,
            device_api,
            min,
            extent,
            body,
        })
    }

    pub fn acquire(semaphore: Expr, count: Expr, body: Stmt) -> Self {
        Stmt::new(StmtKind::Acquire {
            semaphore,
            count,
            body,
        })
    }

    /// A store to the named buffer. `predicate` may be undefined for an
    /// unconditional store.
    pub fn store(
        name: impl Into<String>,
        value: Expr,
        index: Expr,
        param: Option<Parameter>,
        predicate: Expr,
        alignment: ModulusRemainder,
    ) -> Self {
        Stmt::new(StmtKind::Store {
            name: name.into(),
            alignment,
            predicate,
            value,
            index,
            param,
        })
    }

    pub fn provide(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Expr>,
        args: impl IntoIterator<Item = Expr>,
        predicate: Expr,
    ) -> Self {
        Stmt::new(StmtKind::Provide {
            name: name.into(),
            values: values.into_iter().collect(),
            args: args.into_iter().collect(),
            predicate,
        })
    }

    pub fn allocate(
        name: impl Into<String>,
        ty: Type,
        memory_type: MemoryType,
        extents: impl IntoIterator<Item = Expr>,
        condition: Expr,
        body: Stmt,
    ) -> Self {
        Stmt::new(StmtKind::Allocate {
            name: name.into(),
            ty,
            memory_type,
            free_function: String::new(),
            extents: extents.into_iter().collect(),
            condition,
            new_expr: Expr::undefined(),
            body,
        })
    }

    /// An allocation with a custom allocator expression and deallocator.
    #[allow(clippy::too_many_arguments)]
    pub fn allocate_custom(
        name: impl Into<String>,
        ty: Type,
        memory_type: MemoryType,
        extents: impl IntoIterator<Item = Expr>,
        condition: Expr,
        body: Stmt,
        new_expr: Expr,
        free_function: impl Into<String>,
    ) -> Self {
        Stmt::new(StmtKind::Allocate {
            name: name.into(),
            ty,
            memory_type,
            free_function: free_function.into(),
            extents: extents.into_iter().collect(),
            condition,
            new_expr,
            body,
        })
    }

    pub fn free(name: impl Into<String>) -> Self {
        Stmt::new(StmtKind::Free { name: name.into() })
    }

    pub fn realize(
        name: impl Into<String>,
        types: Vec<Type>,
        memory_type: MemoryType,
        bounds: Vec<Range>,
        condition: Expr,
        body: Stmt,
    ) -> Self {
        Stmt::new(StmtKind::Realize {
            name: name.into(),
            types,
            memory_type,
            bounds,
            condition,
            body,
        })
    }

    pub fn block(first: Stmt, rest: Stmt) -> Self {
        debug_assert!(first.defined() && rest.defined());
        Stmt::new(StmtKind::Block { first, rest })
    }

    /// Right-nested block of a statement sequence; undefined when empty.
    pub fn block_of(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        let stmts: Vec<Stmt> = stmts.into_iter().filter(Stmt::defined).collect();
        let mut iter = stmts.into_iter().rev();
        let Some(last) = iter.next() else {
            return Stmt::undefined();
        };
        iter.fold(last, |rest, first| Stmt::block(first, rest))
    }

    pub fn fork(first: Stmt, rest: Stmt) -> Self {
        Stmt::new(StmtKind::Fork { first, rest })
    }

    pub fn if_then_else(condition: Expr, then_case: Stmt, else_case: Stmt) -> Self {
        debug_assert!(condition.ty().is_some_and(Type::is_bool));
        Stmt::new(StmtKind::IfThenElse {
            condition,
            then_case,
            else_case,
        })
    }

    pub fn evaluate(value: Expr) -> Self {
        Stmt::new(StmtKind::Evaluate(value))
    }

    pub fn atomic(
        producer_name: impl Into<String>,
        mutex_name: impl Into<String>,
        body: Stmt,
    ) -> Self {
        Stmt::new(StmtKind::Atomic {
            producer_name: producer_name.into(),
            mutex_name: mutex_name.into(),
            body,
        })
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined() {
            fmt::Display::fmt(self, f)
        } else {
            f.write_str("<undefined>")
        }
    }
}
