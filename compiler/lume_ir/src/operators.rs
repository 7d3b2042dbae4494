//! Operator tags stored as scalar fields of expression nodes.

use crate::IrNodeType;

/// Binary operators.
///
/// Each operator is its own node kind, see [`BinaryOp::node_type`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    pub const fn node_type(self) -> IrNodeType {
        match self {
            Self::Add => IrNodeType::Add,
            Self::Sub => IrNodeType::Sub,
            Self::Mul => IrNodeType::Mul,
            Self::Div => IrNodeType::Div,
            Self::Mod => IrNodeType::Mod,
            Self::Min => IrNodeType::Min,
            Self::Max => IrNodeType::Max,
            Self::Eq => IrNodeType::Eq,
            Self::Ne => IrNodeType::Ne,
            Self::Lt => IrNodeType::Lt,
            Self::Le => IrNodeType::Le,
            Self::Gt => IrNodeType::Gt,
            Self::Ge => IrNodeType::Ge,
            Self::And => IrNodeType::And,
            Self::Or => IrNodeType::Or,
        }
    }

    /// Comparisons and logical operators produce booleans.
    pub const fn is_boolean(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::And | Self::Or
        )
    }

    /// Returns the printed form (`min`/`max` print as calls).
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Min => "min",
            Self::Max => "max",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// What a `Call` node refers to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum CallType {
    /// A buffer access by coordinates.
    Image,
    /// An external C function.
    Extern,
    /// An external C++ function (mangled name).
    ExternCPlusPlus,
    /// A pure intrinsic.
    PureIntrinsic,
    /// An intrinsic with side effects.
    Intrinsic,
    /// A reference to a pipeline stage.
    Stage,
    /// An external function with no side effects.
    PureExtern,
}

/// Reduction applied across the lanes of a `VectorReduce`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum VectorReduceOp {
    Add,
    SaturatingAdd,
    Mul,
    Min,
    Max,
    And,
    Or,
}
