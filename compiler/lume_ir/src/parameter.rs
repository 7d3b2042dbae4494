//! External bindings referenced by `Variable`, `Load`, and `Store` nodes.
//!
//! A [`Parameter`] is a named, typed slot filled in when a compiled
//! pipeline is invoked: either a scalar value or a buffer. IR nodes carry
//! the parameter they were built from, but structural comparison only
//! looks at the node's own name and type, so rebinding a parameter (see
//! [`ParamMap`](crate::ParamMap)) never changes IR equality.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::{Expr, ParamError, Type};

/// Name of the implicit user-context argument.
pub const USER_CONTEXT_NAME: &str = "__user_context";

/// A scalar bound to a parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Handle(u64),
}

impl ScalarValue {
    /// Whether a value of this class can be stored in a parameter of `ty`.
    pub fn fits(self, ty: Type) -> bool {
        match self {
            ScalarValue::Int(_) => ty.is_int(),
            ScalarValue::UInt(_) => ty.is_uint(),
            ScalarValue::Float(_) => ty.is_float(),
            ScalarValue::Handle(_) => ty.is_handle(),
        }
    }

    pub const fn class_name(self) -> &'static str {
        match self {
            ScalarValue::Int(_) => "signed integer",
            ScalarValue::UInt(_) => "unsigned integer",
            ScalarValue::Float(_) => "floating-point",
            ScalarValue::Handle(_) => "handle",
        }
    }
}

// Buffers

/// Shared handle to externally owned buffer storage.
///
/// Only the element type and extents are visible to the compiler.
#[derive(Clone)]
pub struct Buffer(Rc<BufferContents>);

struct BufferContents {
    ty: Type,
    extents: SmallVec<[i32; 4]>,
}

impl Buffer {
    pub fn new(ty: Type, extents: &[i32]) -> Self {
        Buffer(Rc::new(BufferContents {
            ty,
            extents: SmallVec::from_slice(extents),
        }))
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.0.ty
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.0.extents.len()
    }

    #[inline]
    pub fn extents(&self) -> &[i32] {
        &self.0.extents
    }

    #[inline]
    pub fn same_as(&self, other: &Buffer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Buffer<{}>{:?}", self.0.ty, self.0.extents.as_slice())
    }
}

/// Caller-owned location that receives an output buffer.
pub type BufferSlot = Rc<RefCell<Option<Buffer>>>;

// Parameters

/// Shared handle to a named scalar or buffer binding.
///
/// Identity is the allocation: two parameters with the same name and type
/// are still distinct keys in a [`ParamMap`](crate::ParamMap).
#[derive(Clone)]
pub struct Parameter(Rc<ParameterContents>);

struct ParameterContents {
    name: String,
    ty: Type,
    is_buffer: bool,
    dimensions: usize,
    state: RefCell<ParameterState>,
}

#[derive(Default)]
struct ParameterState {
    scalar: Option<ScalarValue>,
    buffer: Option<Buffer>,
    min_value: Expr,
    max_value: Expr,
}

impl Parameter {
    pub fn new(ty: Type, is_buffer: bool, dimensions: usize, name: impl Into<String>) -> Self {
        debug_assert!(is_buffer || dimensions == 0, "scalar parameters have no dimensions");
        Parameter(Rc::new(ParameterContents {
            name: name.into(),
            ty,
            is_buffer,
            dimensions,
            state: RefCell::new(ParameterState::default()),
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.0.ty
    }

    #[inline]
    pub fn is_buffer(&self) -> bool {
        self.0.is_buffer
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.0.dimensions
    }

    #[inline]
    pub fn same_as(&self, other: &Parameter) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key, stable while the parameter is alive.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn scalar(&self) -> Option<ScalarValue> {
        self.0.state.borrow().scalar
    }

    pub fn set_scalar(&self, value: ScalarValue) -> Result<(), ParamError> {
        if self.is_buffer() {
            return Err(ParamError::NotScalar(self.0.name.clone()));
        }
        if !value.fits(self.ty()) {
            return Err(ParamError::TypeMismatch {
                name: self.0.name.clone(),
                expected: self.ty(),
                found: value.class_name(),
            });
        }
        self.store_scalar(value);
        Ok(())
    }

    /// Store without checking; callers guarantee the value fits.
    pub(crate) fn store_scalar(&self, value: ScalarValue) {
        self.0.state.borrow_mut().scalar = Some(value);
    }

    pub fn buffer(&self) -> Option<Buffer> {
        self.0.state.borrow().buffer.clone()
    }

    pub fn set_buffer(&self, buffer: Buffer) -> Result<(), ParamError> {
        self.check_buffer(&buffer)?;
        self.0.state.borrow_mut().buffer = Some(buffer);
        Ok(())
    }

    /// Verify `buffer` can be bound to this parameter.
    pub fn check_buffer(&self, buffer: &Buffer) -> Result<(), ParamError> {
        if !self.is_buffer() {
            return Err(ParamError::NotBuffer(self.0.name.clone()));
        }
        if buffer.ty() != self.ty() || buffer.dimensions() != self.dimensions() {
            return Err(ParamError::BufferMismatch {
                name: self.0.name.clone(),
                expected_ty: self.ty(),
                expected_dims: self.dimensions(),
                found_ty: buffer.ty(),
                found_dims: buffer.dimensions(),
            });
        }
        Ok(())
    }

    pub fn min_value(&self) -> Expr {
        self.0.state.borrow().min_value.clone()
    }

    pub fn max_value(&self) -> Expr {
        self.0.state.borrow().max_value.clone()
    }

    pub fn set_min_value(&self, min: Expr) {
        self.0.state.borrow_mut().min_value = min;
    }

    pub fn set_max_value(&self, max: Expr) {
        self.0.state.borrow_mut().max_value = max;
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.0.name)
            .field("ty", &self.0.ty)
            .field("is_buffer", &self.0.is_buffer)
            .field("dimensions", &self.0.dimensions)
            .finish_non_exhaustive()
    }
}

fn check_name(name: &str) -> Result<(), ParamError> {
    if name == USER_CONTEXT_NAME {
        return Err(ParamError::ReservedName(name.to_owned()));
    }
    Ok(())
}

// Typed parameters

/// Rust scalar types that can back a [`Param`].
pub trait ScalarType: Copy {
    fn lume_type() -> Type;
    fn into_scalar(self) -> ScalarValue;
    fn from_scalar(value: ScalarValue) -> Option<Self>;
}

macro_rules! impl_scalar_type {
    ($($ty:ty => $make:ident($bits:expr), $variant:ident, $wide:ty;)*) => {
        $(
            impl ScalarType for $ty {
                fn lume_type() -> Type {
                    Type::$make($bits)
                }

                fn into_scalar(self) -> ScalarValue {
                    ScalarValue::$variant(<$wide>::from(self))
                }

                fn from_scalar(value: ScalarValue) -> Option<Self> {
                    match value {
                        ScalarValue::$variant(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_type! {
    i8 => int(8), Int, i64;
    i16 => int(16), Int, i64;
    i32 => int(32), Int, i64;
    i64 => int(64), Int, i64;
    u8 => uint(8), UInt, u64;
    u16 => uint(16), UInt, u64;
    u32 => uint(32), UInt, u64;
    u64 => uint(64), UInt, u64;
}

impl ScalarType for f32 {
    fn lume_type() -> Type {
        Type::float(32)
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float(f64::from(self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl ScalarType for f64 {
    fn lume_type() -> Type {
        Type::float(64)
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float(self)
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl ScalarType for bool {
    fn lume_type() -> Type {
        Type::bool()
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::UInt(u64::from(self))
    }

    fn from_scalar(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::UInt(v) => Some(v != 0),
            _ => None,
        }
    }
}

/// A scalar pipeline argument of Rust type `T`.
pub struct Param<T: ScalarType> {
    param: Parameter,
    _marker: PhantomData<T>,
}

impl<T: ScalarType> Param<T> {
    pub fn new(name: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        check_name(&name)?;
        Ok(Param {
            param: Parameter::new(T::lume_type(), false, 0, name),
            _marker: PhantomData,
        })
    }

    /// A parameter with an initial value.
    pub fn with_value(name: impl Into<String>, value: T) -> Result<Self, ParamError> {
        let param = Self::new(name)?;
        param.set(value);
        Ok(param)
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.param.name()
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.param.ty()
    }

    #[inline]
    pub fn parameter(&self) -> &Parameter {
        &self.param
    }

    pub fn set(&self, value: T) {
        self.param.store_scalar(value.into_scalar());
    }

    pub fn get(&self) -> Option<T> {
        self.param.scalar().and_then(T::from_scalar)
    }

    /// A `Variable` node bound to this parameter.
    pub fn expr(&self) -> Expr {
        Expr::param_var(self.ty(), self.name(), self.param.clone())
    }

    pub fn set_range(&self, min: Expr, max: Expr) {
        self.set_min_value(min);
        self.set_max_value(max);
    }

    /// Bounds of another type are cast to the parameter's type.
    pub fn set_min_value(&self, min: Expr) {
        self.param.set_min_value(self.coerce(min));
    }

    pub fn set_max_value(&self, max: Expr) {
        self.param.set_max_value(self.coerce(max));
    }

    pub fn min_value(&self) -> Expr {
        self.param.min_value()
    }

    pub fn max_value(&self) -> Expr {
        self.param.max_value()
    }

    fn coerce(&self, bound: Expr) -> Expr {
        match bound.ty() {
            Some(ty) if ty != self.ty() => Expr::cast(self.ty(), bound),
            _ => bound,
        }
    }
}

impl<T: ScalarType> Clone for Param<T> {
    fn clone(&self) -> Self {
        Param {
            param: self.param.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ScalarType> fmt::Debug for Param<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Param").field(&self.param).finish()
    }
}

/// A buffer pipeline argument.
#[derive(Clone, Debug)]
pub struct ImageParam {
    param: Parameter,
}

impl ImageParam {
    pub fn new(ty: Type, dimensions: usize, name: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        check_name(&name)?;
        Ok(ImageParam {
            param: Parameter::new(ty, true, dimensions, name),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.param.name()
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.param.ty()
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.param.dimensions()
    }

    #[inline]
    pub fn parameter(&self) -> &Parameter {
        &self.param
    }
}

/// The `Variable` standing for the runtime's user context pointer.
pub fn user_context_value() -> Expr {
    Expr::param_var(
        Type::handle(),
        USER_CONTEXT_NAME,
        Parameter::new(Type::handle(), false, 0, USER_CONTEXT_NAME),
    )
}
