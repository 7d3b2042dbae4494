//! Structural equality and ordering of IR.
//!
//! Two questions are answered here: do two IR trees compute the same thing
//! syntactically (same kinds, same fields, same children), and in which
//! order should they sit inside an ordered container.
//!
//! # Two modes
//!
//! - **Tree mode** ([`equal`], [`IrDeepCompare`], [`DeepOrd`]): a plain
//!   recursive field-by-field walk. Cost is proportional to the unfolded
//!   tree size, which is fine for IR that has already been deduplicated.
//! - **Graph mode** ([`graph_equal`], [`graph_compare`],
//!   [`ExprWithCompareCache`]): the same walk, but every pair of nodes that
//!   has been proven equal is remembered in an [`IrCompareCache`]. A shared
//!   subexpression reached again through another parent is then answered
//!   from the cache instead of being re-explored, which keeps front-end IR
//!   with heavy sharing from blowing up exponentially.
//!
//! Both modes return identical answers; the cache only changes cost.
//!
//! # Ordering rules
//!
//! Undefined handles sort first. Otherwise nodes are ordered by kind tag,
//! then (for expressions) by type, then by scalar fields, then by children
//! in declaration order. Variable-length lists compare their lengths first.
//!
//! # Threading
//!
//! IR handles and caches are `!Send`; every thread compares with its own
//! cache.

mod cache;
mod compare;
mod equal;
mod node;
mod with_cache;

pub use cache::{CacheStats, IrCompareCache, DEFAULT_CACHE_BITS, MAX_CACHE_BITS};
pub use compare::{DeepOrd, IrComparer, IrDeepCompare};
pub use equal::{equal, graph_compare, graph_equal, graph_equal_with};
pub use node::IrNode;
pub use with_cache::{ExprWithCompareCache, StmtWithCompareCache, WithCompareCache};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=lume_equality=debug` to report cache statistics.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
