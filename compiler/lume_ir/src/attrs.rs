//! Non-recursive attributes of statement and load/store nodes.

use crate::Expr;

/// How a `For` loop executes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum ForType {
    #[default]
    Serial,
    Parallel,
    Vectorized,
    Unrolled,
    Extern,
    GpuBlock,
    GpuThread,
    GpuLane,
}

/// Device a loop body is offloaded to.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum DeviceApi {
    #[default]
    None,
    Host,
    DefaultGpu,
    Cuda,
    OpenCl,
    Metal,
    Vulkan,
}

/// Where an allocation lives.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum MemoryType {
    #[default]
    Auto,
    Heap,
    Stack,
    Register,
    GpuShared,
    GpuTexture,
    LockedCache,
}

/// Known alignment of an index: `index % modulus == remainder`.
///
/// Ordered by `(modulus, remainder)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ModulusRemainder {
    pub modulus: i64,
    pub remainder: i64,
}

impl ModulusRemainder {
    /// Nothing is known about the index.
    pub const UNKNOWN: ModulusRemainder = ModulusRemainder {
        modulus: 1,
        remainder: 0,
    };

    #[inline]
    pub const fn new(modulus: i64, remainder: i64) -> Self {
        ModulusRemainder { modulus, remainder }
    }
}

impl Default for ModulusRemainder {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// A half-open interval `[min, min + extent)` used by `Realize` bounds.
#[derive(Clone, Debug, Default)]
pub struct Range {
    pub min: Expr,
    pub extent: Expr,
}

impl Range {
    pub fn new(min: Expr, extent: Expr) -> Self {
        Range { min, extent }
    }
}
