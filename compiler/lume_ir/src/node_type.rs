//! Closed enumeration of IR node kinds.

/// Kind tag of an IR node.
///
/// Expression kinds come first, then statement kinds. Declaration order is
/// significant: two nodes of different kinds are ordered by their tags.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum IrNodeType {
    // Expressions
    IntImm,
    UIntImm,
    FloatImm,
    StringImm,
    Broadcast,
    Cast,
    Reinterpret,
    Variable,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Select,
    Load,
    Ramp,
    Call,
    Let,
    Shuffle,
    VectorReduce,

    // Statements
    LetStmt,
    AssertStmt,
    ProducerConsumer,
    For,
    Acquire,
    Store,
    Provide,
    Allocate,
    Free,
    Realize,
    Block,
    Fork,
    IfThenElse,
    Evaluate,
    Atomic,
}

impl IrNodeType {
    /// True for the expression half of the enumeration.
    #[inline]
    pub fn is_expr(self) -> bool {
        self <= IrNodeType::VectorReduce
    }

    #[inline]
    pub fn is_stmt(self) -> bool {
        !self.is_expr()
    }
}
