//! Stack growth guard for recursive IR walks.
//!
//! Structural comparison recurses once per IR level. Front-end IR can be
//! very deep (long `Block` chains, left-leaning `Add` towers produced by
//! folding), so every recursive step of a traversal is wrapped in
//! [`ensure_sufficient_stack`], which switches to a freshly allocated stack
//! segment when the current one runs low.
//!
//! On `wasm32` the guard is a plain call.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// Wrap the body of any function that recurses once per IR level:
///
/// ```text
/// fn depth(e: &Expr) -> usize {
///     ensure_sufficient_stack(|| 1 + children(e).map(depth).max().unwrap_or(0))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
