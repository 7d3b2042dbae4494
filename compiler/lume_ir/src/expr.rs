//! Expression nodes and the nullable `Expr` handle.

use std::fmt;
use std::ops;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{BinaryOp, CallType, IrNodeType, ModulusRemainder, Parameter, Type, VectorReduceOp};

/// Operand list of calls and shuffles.
pub type ExprList = SmallVec<[Expr; 4]>;

/// Nullable, reference-counted handle to an expression node.
///
/// Cloning a handle shares the node. Use [`Expr::same_as`] for identity;
/// value comparison lives in the equality crate.
#[derive(Clone, Default)]
pub struct Expr(Option<Rc<ExprNode>>);

/// A typed expression node.
#[derive(Debug)]
pub struct ExprNode {
    pub ty: Type,
    pub kind: ExprKind,
}

/// Expression node payloads.
///
/// Scalar fields are listed before child expressions in every variant.
#[derive(Debug)]
pub enum ExprKind {
    IntImm(i64),
    UIntImm(u64),
    FloatImm(f64),
    StringImm(String),
    Broadcast {
        lanes: u16,
        value: Expr,
    },
    Cast(Expr),
    Reinterpret(Expr),
    /// A use of a named value. The bound parameter, if any, does not take
    /// part in structural comparison.
    Variable {
        name: String,
        param: Option<Parameter>,
    },
    Binary {
        op: BinaryOp,
        a: Expr,
        b: Expr,
    },
    Not(Expr),
    Select {
        condition: Expr,
        true_value: Expr,
        false_value: Expr,
    },
    Load {
        name: String,
        alignment: ModulusRemainder,
        index: Expr,
        predicate: Expr,
        param: Option<Parameter>,
    },
    Ramp {
        lanes: u16,
        base: Expr,
        stride: Expr,
    },
    Call {
        name: String,
        call_type: CallType,
        value_index: u32,
        args: ExprList,
    },
    Let {
        name: String,
        value: Expr,
        body: Expr,
    },
    Shuffle {
        indices: Vec<i32>,
        vectors: ExprList,
    },
    VectorReduce {
        op: VectorReduceOp,
        value: Expr,
    },
}

impl ExprKind {
    pub fn node_type(&self) -> IrNodeType {
        match self {
            ExprKind::IntImm(_) => IrNodeType::IntImm,
            ExprKind::UIntImm(_) => IrNodeType::UIntImm,
            ExprKind::FloatImm(_) => IrNodeType::FloatImm,
            ExprKind::StringImm(_) => IrNodeType::StringImm,
            ExprKind::Broadcast { .. } => IrNodeType::Broadcast,
            ExprKind::Cast(_) => IrNodeType::Cast,
            ExprKind::Reinterpret(_) => IrNodeType::Reinterpret,
            ExprKind::Variable { .. } => IrNodeType::Variable,
            ExprKind::Binary { op, .. } => op.node_type(),
            ExprKind::Not(_) => IrNodeType::Not,
            ExprKind::Select { .. } => IrNodeType::Select,
            ExprKind::Load { .. } => IrNodeType::Load,
            ExprKind::Ramp { .. } => IrNodeType::Ramp,
            ExprKind::Call { .. } => IrNodeType::Call,
            ExprKind::Let { .. } => IrNodeType::Let,
            ExprKind::Shuffle { .. } => IrNodeType::Shuffle,
            ExprKind::VectorReduce { .. } => IrNodeType::VectorReduce,
        }
    }
}

impl ExprKind {
    /// Move every child handle out into `out`, leaving undefined handles.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            ExprKind::IntImm(_)
            | ExprKind::UIntImm(_)
            | ExprKind::FloatImm(_)
            | ExprKind::StringImm(_)
            | ExprKind::Variable { .. } => {}
            ExprKind::Broadcast { value, .. }
            | ExprKind::Cast(value)
            | ExprKind::Reinterpret(value)
            | ExprKind::Not(value)
            | ExprKind::VectorReduce { value, .. } => out.push(std::mem::take(value)),
            ExprKind::Binary { a, b, .. } => out.extend([std::mem::take(a), std::mem::take(b)]),
            ExprKind::Select {
                condition,
                true_value,
                false_value,
            } => out.extend([
                std::mem::take(condition),
                std::mem::take(true_value),
                std::mem::take(false_value),
            ]),
            ExprKind::Load {
                index, predicate, ..
            } => out.extend([std::mem::take(index), std::mem::take(predicate)]),
            ExprKind::Ramp { base, stride, .. } => {
                out.extend([std::mem::take(base), std::mem::take(stride)]);
            }
            ExprKind::Let { value, body, .. } => {
                out.extend([std::mem::take(value), std::mem::take(body)]);
            }
            ExprKind::Call { args: list, .. } | ExprKind::Shuffle { vectors: list, .. } => {
                out.extend(list.drain(..));
            }
        }
    }
}

/// Frees uniquely owned descendants with an explicit worklist, so dropping
/// an arbitrarily deep chain never recurses.
impl Drop for ExprNode {
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

/// Type of an operand that must be defined.
fn operand_type(e: &Expr) -> Type {
    debug_assert!(e.defined(), "undefined operand");
    e.ty().unwrap_or_default()
}

// Handle API

impl Expr {
    /// Wrap a freshly built node.
    pub fn new(ty: Type, kind: ExprKind) -> Self {
        Expr(Some(Rc::new(ExprNode { ty, kind })))
    }

    /// The undefined handle.
    #[inline]
    pub const fn undefined() -> Self {
        Expr(None)
    }

    #[inline]
    pub fn defined(&self) -> bool {
        self.0.is_some()
    }

    /// Identity: both undefined, or the same node.
    #[inline]
    pub fn same_as(&self, other: &Expr) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    #[inline]
    pub fn node(&self) -> Option<&ExprNode> {
        self.0.as_deref()
    }

    #[inline]
    pub fn kind(&self) -> Option<&ExprKind> {
        self.node().map(|n| &n.kind)
    }

    #[inline]
    pub fn ty(&self) -> Option<Type> {
        self.node().map(|n| n.ty)
    }

    #[inline]
    pub fn node_type(&self) -> Option<IrNodeType> {
        self.kind().map(ExprKind::node_type)
    }

    /// Address of the node, or 0 when undefined.
    ///
    /// Stable for as long as any handle keeps the node alive.
    #[inline]
    pub fn addr(&self) -> usize {
        self.0.as_ref().map_or(0, |rc| Rc::as_ptr(rc) as usize)
    }

    /// Number of handles sharing this node (0 when undefined).
    #[inline]
    pub fn ref_count(&self) -> usize {
        self.0.as_ref().map_or(0, Rc::strong_count)
    }
}

// Constructors

impl Expr {
    pub fn int_imm(ty: Type, value: i64) -> Self {
        debug_assert!(ty.is_int() && ty.is_scalar(), "IntImm of type {ty}");
        Expr::new(ty, ExprKind::IntImm(value))
    }

    pub fn uint_imm(ty: Type, value: u64) -> Self {
        debug_assert!(ty.is_uint() && ty.is_scalar(), "UIntImm of type {ty}");
        Expr::new(ty, ExprKind::UIntImm(value))
    }

    pub fn float_imm(ty: Type, value: f64) -> Self {
        debug_assert!(ty.is_float() && ty.is_scalar(), "FloatImm of type {ty}");
        Expr::new(ty, ExprKind::FloatImm(value))
    }

    pub fn string_imm(value: impl Into<String>) -> Self {
        Expr::new(Type::handle(), ExprKind::StringImm(value.into()))
    }

    pub fn bool_imm(value: bool) -> Self {
        Expr::uint_imm(Type::bool(), u64::from(value))
    }

    pub fn broadcast(value: Expr, lanes: u16) -> Self {
        let vt = operand_type(&value);
        debug_assert!(vt.is_scalar(), "broadcast of a vector");
        Expr::new(vt.with_lanes(lanes), ExprKind::Broadcast { lanes, value })
    }

    pub fn cast(ty: Type, value: Expr) -> Self {
        debug_assert_eq!(ty.lanes(), operand_type(&value).lanes());
        Expr::new(ty, ExprKind::Cast(value))
    }

    pub fn reinterpret(ty: Type, value: Expr) -> Self {
        Expr::new(ty, ExprKind::Reinterpret(value))
    }

    pub fn var(ty: Type, name: impl Into<String>) -> Self {
        Expr::new(
            ty,
            ExprKind::Variable {
                name: name.into(),
                param: None,
            },
        )
    }

    /// A variable bound to an external parameter.
    pub fn param_var(ty: Type, name: impl Into<String>, param: Parameter) -> Self {
        Expr::new(
            ty,
            ExprKind::Variable {
                name: name.into(),
                param: Some(param),
            },
        )
    }

    pub fn binary(op: BinaryOp, a: Expr, b: Expr) -> Self {
        let at = operand_type(&a);
        debug_assert_eq!(at, operand_type(&b), "mismatched operand types for {op:?}");
        let ty = if op.is_boolean() {
            Type::bool().with_lanes(at.lanes())
        } else {
            at
        };
        Expr::new(ty, ExprKind::Binary { op, a, b })
    }

    pub fn min(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Min, a, b)
    }

    pub fn max(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Max, a, b)
    }

    pub fn eq(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Eq, a, b)
    }

    pub fn ne(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Ne, a, b)
    }

    pub fn lt(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Lt, a, b)
    }

    pub fn le(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Le, a, b)
    }

    pub fn gt(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Gt, a, b)
    }

    pub fn ge(a: Expr, b: Expr) -> Self {
        Expr::binary(BinaryOp::Ge, a, b)
    }

    pub fn and(a: Expr, b: Expr) -> Self {
        debug_assert!(operand_type(&a).is_bool());
        Expr::binary(BinaryOp::And, a, b)
    }

    pub fn or(a: Expr, b: Expr) -> Self {
        debug_assert!(operand_type(&a).is_bool());
        Expr::binary(BinaryOp::Or, a, b)
    }

    pub fn select(condition: Expr, true_value: Expr, false_value: Expr) -> Self {
        debug_assert!(operand_type(&condition).is_bool());
        let ty = operand_type(&true_value);
        debug_assert_eq!(ty, operand_type(&false_value));
        Expr::new(
            ty,
            ExprKind::Select {
                condition,
                true_value,
                false_value,
            },
        )
    }

    /// A load from the named buffer. `predicate` may be undefined for an
    /// unconditional load.
    pub fn load(
        ty: Type,
        name: impl Into<String>,
        index: Expr,
        param: Option<Parameter>,
        predicate: Expr,
        alignment: ModulusRemainder,
    ) -> Self {
        debug_assert_eq!(ty.lanes(), operand_type(&index).lanes());
        Expr::new(
            ty,
            ExprKind::Load {
                name: name.into(),
                alignment,
                index,
                predicate,
                param,
            },
        )
    }

    pub fn ramp(base: Expr, stride: Expr, lanes: u16) -> Self {
        let bt = operand_type(&base);
        debug_assert_eq!(bt, operand_type(&stride));
        Expr::new(
            bt.with_lanes(bt.lanes() * lanes),
            ExprKind::Ramp {
                lanes,
                base,
                stride,
            },
        )
    }

    pub fn call(
        ty: Type,
        name: impl Into<String>,
        args: impl IntoIterator<Item = Expr>,
        call_type: CallType,
    ) -> Self {
        Expr::call_value(ty, name, args, call_type, 0)
    }

    /// A call selecting one output of a multi-valued function.
    pub fn call_value(
        ty: Type,
        name: impl Into<String>,
        args: impl IntoIterator<Item = Expr>,
        call_type: CallType,
        value_index: u32,
    ) -> Self {
        Expr::new(
            ty,
            ExprKind::Call {
                name: name.into(),
                call_type,
                value_index,
                args: args.into_iter().collect(),
            },
        )
    }

    /// `let name = value in body`
    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        debug_assert!(value.defined());
        let ty = operand_type(&body);
        Expr::new(
            ty,
            ExprKind::Let {
                name: name.into(),
                value,
                body,
            },
        )
    }

    /// Select lanes out of the concatenation of `vectors`.
    pub fn shuffle(vectors: impl IntoIterator<Item = Expr>, indices: Vec<i32>) -> Self {
        let vectors: ExprList = vectors.into_iter().collect();
        let elem = vectors.first().map(operand_type).unwrap_or_default();
        let lanes = u16::try_from(indices.len()).unwrap_or(u16::MAX);
        Expr::new(
            elem.with_lanes(lanes),
            ExprKind::Shuffle { indices, vectors },
        )
    }

    /// Reduce `value` down to `lanes` lanes.
    pub fn vector_reduce(op: VectorReduceOp, value: Expr, lanes: u16) -> Self {
        let vt = operand_type(&value);
        debug_assert!(lanes > 0 && vt.lanes() % lanes == 0);
        Expr::new(vt.with_lanes(lanes), ExprKind::VectorReduce { op, value })
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::int_imm(Type::int(32), i64::from(value))
    }
}

impl From<f32> for Expr {
    fn from(value: f32) -> Self {
        Expr::float_imm(Type::float(32), f64::from(value))
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::bool_imm(value)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Sub);
impl_binary_operator!(Mul, mul, BinaryOp::Mul);
impl_binary_operator!(Div, div, BinaryOp::Div);
impl_binary_operator!(Rem, rem, BinaryOp::Mod);

impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        let ty = Type::bool().with_lanes(operand_type(&self).lanes());
        Expr::new(ty, ExprKind::Not(self))
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined() {
            fmt::Display::fmt(self, f)
        } else {
            f.write_str("<undefined>")
        }
    }
}
