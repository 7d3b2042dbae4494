//! Element and vector types carried by every expression node.

use std::fmt;

/// Numeric class of a [`Type`].
///
/// Declaration order is the comparison order used by the structural
/// comparator.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum TypeCode {
    Int,
    UInt,
    Float,
    BFloat,
    #[default]
    Handle,
}

/// An element type plus a lane count.
///
/// Ordered by `(code, bits, lanes)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Type {
    code: TypeCode,
    bits: u8,
    lanes: u16,
}

impl Type {
    #[inline]
    pub const fn new(code: TypeCode, bits: u8, lanes: u16) -> Self {
        Type { code, bits, lanes }
    }

    #[inline]
    pub const fn int(bits: u8) -> Self {
        Type::new(TypeCode::Int, bits, 1)
    }

    #[inline]
    pub const fn uint(bits: u8) -> Self {
        Type::new(TypeCode::UInt, bits, 1)
    }

    #[inline]
    pub const fn float(bits: u8) -> Self {
        Type::new(TypeCode::Float, bits, 1)
    }

    #[inline]
    pub const fn bfloat(bits: u8) -> Self {
        Type::new(TypeCode::BFloat, bits, 1)
    }

    /// Booleans are one-bit unsigned integers.
    #[inline]
    pub const fn bool() -> Self {
        Type::uint(1)
    }

    /// Opaque pointer type, also used for statements-as-values.
    #[inline]
    pub const fn handle() -> Self {
        Type::new(TypeCode::Handle, 64, 1)
    }

    #[inline]
    pub const fn code(self) -> TypeCode {
        self.code
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    #[inline]
    pub const fn lanes(self) -> u16 {
        self.lanes
    }

    /// Same element type with a different lane count.
    #[inline]
    pub const fn with_lanes(self, lanes: u16) -> Self {
        Type::new(self.code, self.bits, lanes)
    }

    /// Scalar type of a single lane.
    #[inline]
    pub const fn element_of(self) -> Self {
        self.with_lanes(1)
    }

    #[inline]
    pub const fn is_vector(self) -> bool {
        self.lanes > 1
    }

    #[inline]
    pub const fn is_scalar(self) -> bool {
        self.lanes == 1
    }

    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self.code, TypeCode::UInt) && self.bits == 1
    }

    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self.code, TypeCode::Int)
    }

    #[inline]
    pub const fn is_uint(self) -> bool {
        matches!(self.code, TypeCode::UInt)
    }

    /// True for both IEEE and brain floats.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self.code, TypeCode::Float | TypeCode::BFloat)
    }

    #[inline]
    pub const fn is_handle(self) -> bool {
        matches!(self.code, TypeCode::Handle)
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::handle()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            TypeCode::UInt if self.bits == 1 => f.write_str("bool")?,
            TypeCode::Handle => f.write_str("handle")?,
            TypeCode::Int => write!(f, "int{}", self.bits)?,
            TypeCode::UInt => write!(f, "uint{}", self.bits)?,
            TypeCode::Float => write!(f, "float{}", self.bits)?,
            TypeCode::BFloat => write!(f, "bfloat{}", self.bits)?,
        }
        if self.is_vector() {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
