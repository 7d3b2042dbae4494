//! Property-based tests for structural ordering.
//!
//! Random expression shapes are built into fresh IR (never sharing nodes
//! between two builds) and checked for:
//! 1. Strict weak ordering: irreflexive, asymmetric, transitive
//! 2. Consistency of `equal`/`graph_equal` with the ordering
//! 3. Cache independence: graph mode with any capacity agrees with tree mode

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use std::cmp::Ordering;

use lume_equality::{equal, graph_compare, graph_equal, IrCompareCache, IrDeepCompare};
use lume_ir::{BinaryOp, CallType, Expr, Type};
use proptest::prelude::*;

/// Plain description of an expression, built into IR on demand.
#[derive(Clone, Debug)]
enum Shape {
    Int(i8),
    Var(u8),
    Binary(u8, Box<Shape>, Box<Shape>),
    Select(Box<Shape>, Box<Shape>, Box<Shape>, Box<Shape>),
    Let(u8, Box<Shape>, Box<Shape>),
    Call(u8, Vec<Shape>),
    /// `s * s` with both operands the same node.
    Square(Box<Shape>),
}

const NAMES: [&str; 3] = ["a", "b", "c"];

const OPS: [BinaryOp; 7] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Mod,
    BinaryOp::Min,
    BinaryOp::Max,
];

fn name(i: u8) -> &'static str {
    NAMES[usize::from(i) % NAMES.len()]
}

fn build(shape: &Shape) -> Expr {
    let i32_ty = Type::int(32);
    match shape {
        Shape::Int(v) => Expr::from(i32::from(*v)),
        Shape::Var(i) => Expr::var(i32_ty, name(*i)),
        Shape::Binary(op, a, b) => {
            Expr::binary(OPS[usize::from(*op) % OPS.len()], build(a), build(b))
        }
        Shape::Select(x, y, t, f) => {
            Expr::select(Expr::lt(build(x), build(y)), build(t), build(f))
        }
        Shape::Let(i, value, body) => Expr::let_in(name(*i), build(value), build(body)),
        Shape::Call(i, args) => Expr::call(
            i32_ty,
            format!("f_{}", name(*i)),
            args.iter().map(build),
            CallType::Extern,
        ),
        Shape::Square(inner) => {
            let s = build(inner);
            s.clone() * s
        }
    }
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (-3i8..3).prop_map(Shape::Int),
        (0u8..3).prop_map(Shape::Var),
    ];
    leaf.prop_recursive(5, 48, 3, |inner| {
        prop_oneof![
            (0u8..7, inner.clone(), inner.clone())
                .prop_map(|(op, a, b)| Shape::Binary(op, Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone(), inner.clone(), inner.clone()).prop_map(
                |(x, y, t, f)| Shape::Select(Box::new(x), Box::new(y), Box::new(t), Box::new(f))
            ),
            (0u8..3, inner.clone(), inner.clone())
                .prop_map(|(i, v, b)| Shape::Let(i, Box::new(v), Box::new(b))),
            (0u8..2, prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(i, args)| Shape::Call(i, args)),
            inner.prop_map(|s| Shape::Square(Box::new(s))),
        ]
    })
}

fn less(a: &Expr, b: &Expr) -> bool {
    IrDeepCompare.less(a, b)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_irreflexive(s in shape_strategy()) {
        let a = build(&s);
        let copy = build(&s);
        prop_assert!(!less(&a, &a));
        prop_assert!(!less(&a, &copy));
        prop_assert!(!less(&copy, &a));
        prop_assert!(equal(&a, &copy));
        prop_assert!(graph_equal(&a, &copy));
    }

    #[test]
    fn prop_asymmetric(s in shape_strategy(), t in shape_strategy()) {
        let (a, b) = (build(&s), build(&t));
        let ord = IrDeepCompare.compare(&a, &b);
        prop_assert_eq!(ord, IrDeepCompare.compare(&b, &a).reverse());
        if less(&a, &b) {
            prop_assert!(!less(&b, &a));
        }
    }

    #[test]
    fn prop_transitive(s in shape_strategy(), t in shape_strategy(), u in shape_strategy()) {
        let mut items = [build(&s), build(&t), build(&u)];
        items.sort_by(|x, y| IrDeepCompare.compare(x, y));
        let [a, b, c] = &items;
        prop_assert!(!less(b, a));
        prop_assert!(!less(c, b));
        if less(a, b) && less(b, c) {
            prop_assert!(less(a, c));
        }
        if equal(a, b) && equal(b, c) {
            prop_assert!(equal(a, c));
        }
    }

    #[test]
    fn prop_equality_matches_ordering(s in shape_strategy(), t in shape_strategy()) {
        let (a, b) = (build(&s), build(&t));
        let incomparable = !less(&a, &b) && !less(&b, &a);
        prop_assert_eq!(equal(&a, &b), incomparable);
        prop_assert_eq!(graph_equal(&a, &b), incomparable);
    }

    #[test]
    fn prop_cache_capacity_is_invisible(
        s in shape_strategy(),
        t in shape_strategy(),
        bits in prop_oneof![Just(0u32), Just(1), Just(3), Just(8)],
    ) {
        let (a, b) = (build(&s), build(&t));
        let tree = IrDeepCompare.compare(&a, &b);
        let mut cache = IrCompareCache::new(bits);
        prop_assert_eq!(graph_compare(&mut cache, &a, &b), tree);
        // A warm cache must not change the answer either.
        prop_assert_eq!(graph_compare(&mut cache, &a, &b), tree);
        prop_assert_eq!(graph_compare(&mut cache, &b, &a), tree.reverse());
    }

    #[test]
    fn prop_shared_matches_unshared(s in shape_strategy()) {
        let shared = build(&Shape::Square(Box::new(s.clone())));
        let inner = build(&s);
        let unshared = inner * build(&s);
        prop_assert!(graph_equal(&shared, &unshared));
        prop_assert_eq!(
            IrDeepCompare.compare(&shared, &unshared),
            Ordering::Equal
        );
    }
}
