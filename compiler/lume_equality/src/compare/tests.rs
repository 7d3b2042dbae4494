#![allow(clippy::unwrap_used)]

use std::cmp::Ordering;
use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use lume_ir::{
    BinaryOp, CallType, DeviceApi, Expr, ForType, MemoryType, ModulusRemainder, Param, Range,
    Stmt, Type, VectorReduceOp,
};

use super::*;

fn i32_var(name: &str) -> Expr {
    Expr::var(Type::int(32), name)
}

fn int(v: i32) -> Expr {
    Expr::from(v)
}

fn cmp(a: &Expr, b: &Expr) -> Ordering {
    IrDeepCompare.compare(a, b)
}

fn cmp_stmt(a: &Stmt, b: &Stmt) -> Ordering {
    IrDeepCompare.compare(a, b)
}

#[test]
fn same_node_is_equal() {
    let e = i32_var("x") + int(1);
    assert_eq!(cmp(&e, &e), Ordering::Equal);

    let mut comparer = IrComparer::new();
    assert_eq!(comparer.compare_expr(&e, &e.clone()), Ordering::Equal);
    assert_eq!(comparer.nodes_visited(), 0);
}

#[test]
fn separately_built_trees_are_equal() {
    let a = Expr::select(
        Expr::lt(i32_var("x"), int(4)),
        i32_var("x") * int(2),
        Expr::max(i32_var("y"), int(0)),
    );
    let b = Expr::select(
        Expr::lt(i32_var("x"), int(4)),
        i32_var("x") * int(2),
        Expr::max(i32_var("y"), int(0)),
    );
    assert_eq!(cmp(&a, &b), Ordering::Equal);
}

#[test]
fn undefined_sorts_first() {
    let u = Expr::undefined();
    let x = i32_var("x");
    assert_eq!(cmp(&u, &x), Ordering::Less);
    assert_eq!(cmp(&x, &u), Ordering::Greater);
    assert_eq!(cmp(&u, &Expr::default()), Ordering::Equal);

    let s = Stmt::free("buf");
    assert_eq!(cmp_stmt(&Stmt::undefined(), &s), Ordering::Less);
    assert_eq!(cmp_stmt(&Stmt::undefined(), &Stmt::default()), Ordering::Equal);
}

#[test]
fn kind_tag_dominates() {
    // IntImm precedes Variable regardless of payload.
    let imm = Expr::int_imm(Type::int(64), 1_000);
    let var = Expr::var(Type::int(8), "a");
    assert_eq!(cmp(&imm, &var), Ordering::Less);

    // Add precedes Sub.
    let add = i32_var("z") + i32_var("z");
    let sub = i32_var("a") - i32_var("a");
    assert_eq!(cmp(&add, &sub), Ordering::Less);

    // Expression kind order for binary operators follows their tag.
    assert_eq!(
        cmp(&Expr::min(int(0), int(0)), &Expr::max(int(0), int(0))),
        Ordering::Less
    );
}

#[test]
fn type_precedes_payload() {
    let small = Expr::int_imm(Type::int(8), 100);
    let large = Expr::int_imm(Type::int(32), 1);
    assert_eq!(cmp(&small, &large), Ordering::Less);

    let a = Expr::var(Type::int(32), "z");
    let b = Expr::var(Type::uint(32), "a");
    assert_eq!(cmp(&a, &b), Ordering::Less);
}

#[test]
fn immediates_compare_by_value() {
    assert_eq!(cmp(&int(-3), &int(2)), Ordering::Less);
    let u = |v| Expr::uint_imm(Type::uint(16), v);
    assert_eq!(cmp(&u(9), &u(9)), Ordering::Equal);
    assert_eq!(cmp(&u(10), &u(9)), Ordering::Greater);
    assert_eq!(
        cmp(&Expr::string_imm("abc"), &Expr::string_imm("abd")),
        Ordering::Less
    );
}

#[test]
fn floats_use_total_order() {
    let f = |v: f64| Expr::float_imm(Type::float(64), v);
    assert_eq!(cmp(&f(1.5), &f(2.5)), Ordering::Less);
    assert_eq!(cmp(&f(-0.0), &f(0.0)), Ordering::Less);
    assert_eq!(cmp(&f(f64::NAN), &f(f64::NAN)), Ordering::Equal);
    assert_eq!(cmp(&f(f64::INFINITY), &f(f64::NAN)), Ordering::Less);
}

#[test]
fn variables_compare_by_name_only() {
    let p = Param::<i32>::new("n").unwrap();
    let q = Param::<i32>::new("n").unwrap();
    let a = Expr::param_var(Type::int(32), "n", p.parameter().clone());
    let b = Expr::param_var(Type::int(32), "n", q.parameter().clone());
    assert_eq!(cmp(&a, &b), Ordering::Equal);
    assert_eq!(cmp(&a, &i32_var("n")), Ordering::Equal);
    assert_eq!(cmp(&i32_var("m"), &i32_var("n")), Ordering::Less);
}

#[test]
fn first_difference_decides() {
    // Left operands differ; the right operands would order the other way.
    let a = i32_var("a") + i32_var("z");
    let b = i32_var("b") + i32_var("a");
    assert_eq!(cmp(&a, &b), Ordering::Less);
}

#[test]
fn broadcast_and_ramp_compare_lanes_first() {
    let b4 = Expr::broadcast(int(9), 4);
    let b8 = Expr::broadcast(int(1), 8);
    // Types differ in lanes already.
    assert_eq!(cmp(&b4, &b8), Ordering::Less);

    let r1 = Expr::ramp(int(0), int(1), 4);
    let r2 = Expr::ramp(int(0), int(2), 4);
    assert_eq!(cmp(&r1, &r2), Ordering::Less);
}

#[test]
fn load_fields() {
    let load = |name: &str, align: ModulusRemainder, idx: i32| {
        Expr::load(Type::int(32), name, int(idx), None, Expr::undefined(), align)
    };
    let base = load("buf", ModulusRemainder::UNKNOWN, 0);
    assert_eq!(
        cmp(&base, &load("buf", ModulusRemainder::UNKNOWN, 0)),
        Ordering::Equal
    );
    assert_eq!(
        cmp(&base, &load("cuf", ModulusRemainder::UNKNOWN, 0)),
        Ordering::Less
    );
    assert_eq!(
        cmp(&base, &load("buf", ModulusRemainder::new(4, 0), 0)),
        Ordering::Less
    );
    assert_eq!(
        cmp(&base, &load("buf", ModulusRemainder::UNKNOWN, -1)),
        Ordering::Greater
    );

    // An undefined predicate sorts before a defined one.
    let predicated = Expr::load(
        Type::int(32),
        "buf",
        int(0),
        None,
        Expr::bool_imm(true),
        ModulusRemainder::UNKNOWN,
    );
    assert_eq!(cmp(&base, &predicated), Ordering::Less);
}

#[test]
fn call_fields() {
    let call = |name: &str, args: Vec<Expr>, ct: CallType, idx: u32| {
        Expr::call_value(Type::int(32), name, args, ct, idx)
    };
    let base = call("f", vec![int(1)], CallType::Extern, 0);
    assert_eq!(
        cmp(&base, &call("f", vec![int(1)], CallType::Extern, 0)),
        Ordering::Equal
    );
    assert_eq!(
        cmp(&base, &call("g", vec![int(1)], CallType::Extern, 0)),
        Ordering::Less
    );
    assert_eq!(
        cmp(&base, &call("f", vec![int(1)], CallType::Image, 0)),
        Ordering::Greater
    );
    assert_eq!(
        cmp(&base, &call("f", vec![int(1)], CallType::Extern, 1)),
        Ordering::Less
    );
}

#[test]
fn shorter_lists_sort_first() {
    let f = |args: Vec<Expr>| Expr::call(Type::int(32), "f", args, CallType::Extern);
    // Length decides before contents.
    assert_eq!(cmp(&f(vec![int(9)]), &f(vec![int(0), int(0)])), Ordering::Less);
    assert_eq!(cmp(&f(vec![]), &f(vec![int(0)])), Ordering::Less);
    assert_eq!(
        cmp(&f(vec![int(0), int(1)]), &f(vec![int(0), int(2)])),
        Ordering::Less
    );

    let v = Expr::ramp(int(0), int(1), 4);
    let s1 = Expr::shuffle([v.clone()], vec![3, 2, 1, 0]);
    let s2 = Expr::shuffle([v.clone()], vec![0, 1]);
    // Types differ first (4 vs 2 lanes).
    assert_eq!(cmp(&s2, &s1), Ordering::Less);
    let s3 = Expr::shuffle([v.clone()], vec![0, 1, 2, 3]);
    assert_eq!(cmp(&s3, &s1), Ordering::Less);
}

#[test]
fn let_and_vector_reduce() {
    let l1 = Expr::let_in("t", int(1), i32_var("t") + int(1));
    let l2 = Expr::let_in("t", int(1), i32_var("t") + int(1));
    let l3 = Expr::let_in("u", int(1), i32_var("t") + int(1));
    assert_eq!(cmp(&l1, &l2), Ordering::Equal);
    assert_eq!(cmp(&l1, &l3), Ordering::Less);

    let v = Expr::ramp(int(0), int(1), 8);
    let add = Expr::vector_reduce(VectorReduceOp::Add, v.clone(), 1);
    let max = Expr::vector_reduce(VectorReduceOp::Max, v, 1);
    assert_eq!(cmp(&add, &max), Ordering::Less);
}

#[test]
fn unary_kinds() {
    let c1 = Expr::cast(Type::int(64), i32_var("x"));
    let c2 = Expr::cast(Type::int(64), i32_var("y"));
    assert_eq!(cmp(&c1, &c2), Ordering::Less);

    let r = Expr::reinterpret(Type::uint(32), i32_var("x"));
    // Cast precedes Reinterpret.
    assert_eq!(cmp(&c1, &r), Ordering::Less);

    let n1 = !Expr::lt(i32_var("x"), int(0));
    let n2 = !Expr::lt(i32_var("x"), int(0));
    assert_eq!(cmp(&n1, &n2), Ordering::Equal);
}

#[test]
fn boolean_binary_kinds() {
    let t = Expr::bool_imm(true);
    let f = Expr::bool_imm(false);
    let and = Expr::and(t.clone(), f.clone());
    let or = Expr::or(t, f);
    assert_eq!(cmp(&and, &or), Ordering::Less);
    assert_eq!(
        cmp(
            &Expr::binary(BinaryOp::Eq, int(1), int(2)),
            &Expr::binary(BinaryOp::Ne, int(1), int(2)),
        ),
        Ordering::Less
    );
}

fn loop_over(name: &str, extent: i32, body: Stmt) -> Stmt {
    Stmt::for_loop(
        name,
        int(0),
        int(extent),
        ForType::Serial,
        DeviceApi::None,
        body,
    )
}

fn store(name: &str, value: Expr) -> Stmt {
    Stmt::store(
        name,
        value,
        i32_var("x"),
        None,
        Expr::undefined(),
        ModulusRemainder::UNKNOWN,
    )
}

#[test]
fn statements_compare_structurally() {
    let a = loop_over("x", 8, store("out", i32_var("x") * int(2)));
    let b = loop_over("x", 8, store("out", i32_var("x") * int(2)));
    assert_eq!(cmp_stmt(&a, &b), Ordering::Equal);

    let c = loop_over("x", 9, store("out", i32_var("x") * int(2)));
    assert_eq!(cmp_stmt(&a, &c), Ordering::Less);

    let d = loop_over("x", 8, store("out", i32_var("x") * int(3)));
    assert_eq!(cmp_stmt(&a, &d), Ordering::Less);
}

#[test]
fn for_scalars_precede_children() {
    let body = || Stmt::evaluate(int(0));
    let serial = loop_over("x", 100, body());
    let parallel = Stmt::for_loop(
        "x",
        int(0),
        int(1),
        ForType::Parallel,
        DeviceApi::None,
        body(),
    );
    assert_eq!(cmp_stmt(&serial, &parallel), Ordering::Less);
}

/// One statement of every kind, in kind order.
fn one_of_each_stmt() -> Vec<Stmt> {
    let ev = Stmt::evaluate(int(0));
    vec![
        Stmt::let_stmt("a", int(1), ev.clone()),
        Stmt::assert_stmt(Expr::bool_imm(true), Expr::string_imm("msg")),
        Stmt::producer("f", ev.clone()),
        loop_over("x", 1, ev.clone()),
        Stmt::acquire(i32_var("sem"), int(1), ev.clone()),
        store("b", int(1)),
        Stmt::provide("f", [int(1)], [i32_var("x")], Expr::undefined()),
        Stmt::allocate(
            "tmp",
            Type::int(32),
            MemoryType::Heap,
            [int(16)],
            Expr::bool_imm(true),
            ev.clone(),
        ),
        Stmt::free("tmp"),
        Stmt::realize(
            "f",
            vec![Type::int(32)],
            MemoryType::Auto,
            vec![Range::new(int(0), int(8))],
            Expr::bool_imm(true),
            ev.clone(),
        ),
        Stmt::block(ev.clone(), ev.clone()),
        Stmt::fork(ev.clone(), ev.clone()),
        Stmt::if_then_else(Expr::bool_imm(true), ev.clone(), Stmt::undefined()),
        ev.clone(),
        Stmt::atomic("f", "", ev.clone()),
    ]
}

#[test]
fn statement_kind_order() {
    let stmts = one_of_each_stmt();
    for pair in stmts.windows(2) {
        assert_eq!(cmp_stmt(&pair[0], &pair[1]), Ordering::Less, "{pair:?}");
        assert_eq!(cmp_stmt(&pair[1], &pair[0]), Ordering::Greater);
    }
}

#[test]
fn statement_scalar_fields() {
    let ev = || Stmt::evaluate(int(0));
    assert_eq!(
        cmp_stmt(&Stmt::consumer("f", ev()), &Stmt::producer("f", ev())),
        Ordering::Less
    );
    assert_eq!(
        cmp_stmt(&Stmt::atomic("f", "", ev()), &Stmt::atomic("f", "m", ev())),
        Ordering::Less
    );

    let alloc = |ty: Type, mem: MemoryType| {
        Stmt::allocate("t", ty, mem, [int(4)], Expr::bool_imm(true), ev())
    };
    assert_eq!(
        cmp_stmt(
            &alloc(Type::int(32), MemoryType::Stack),
            &alloc(Type::int(64), MemoryType::Auto)
        ),
        Ordering::Less
    );
    assert_eq!(
        cmp_stmt(
            &alloc(Type::int(32), MemoryType::Auto),
            &alloc(Type::int(32), MemoryType::Stack)
        ),
        Ordering::Less
    );

    let custom = Stmt::allocate_custom(
        "t",
        Type::int(32),
        MemoryType::Auto,
        [int(4)],
        Expr::bool_imm(true),
        ev(),
        Expr::undefined(),
        "my_free",
    );
    assert_eq!(
        cmp_stmt(&alloc(Type::int(32), MemoryType::Auto), &custom),
        Ordering::Less
    );
}

#[test]
fn realize_bounds_compare_pairwise() {
    let realize = |bounds: Vec<Range>| {
        Stmt::realize(
            "f",
            vec![Type::int(32)],
            MemoryType::Auto,
            bounds,
            Expr::bool_imm(true),
            Stmt::evaluate(int(0)),
        )
    };
    let one = realize(vec![Range::new(int(0), int(8))]);
    let two = realize(vec![Range::new(int(0), int(8)), Range::new(int(0), int(1))]);
    assert_eq!(cmp_stmt(&one, &two), Ordering::Less);
    assert_eq!(
        cmp_stmt(&one, &realize(vec![Range::new(int(0), int(9))])),
        Ordering::Less
    );
    assert_eq!(
        cmp_stmt(&one, &realize(vec![Range::new(int(0), int(8))])),
        Ordering::Equal
    );
}

#[test]
fn missing_else_sorts_first() {
    let cond = || Expr::bool_imm(true);
    let ev = || Stmt::evaluate(int(0));
    let without = Stmt::if_then_else(cond(), ev(), Stmt::undefined());
    let with = Stmt::if_then_else(cond(), ev(), ev());
    assert_eq!(cmp_stmt(&without, &with), Ordering::Less);
}

#[test]
fn graph_mode_records_equal_pairs() {
    let a = i32_var("x") + int(1);
    let b = i32_var("x") + int(1);
    let mut cache = IrCompareCache::new(6);
    {
        let mut comparer = IrComparer::with_cache(&mut cache);
        assert_eq!(comparer.compare_expr(&a, &b), Ordering::Equal);
        assert_eq!(comparer.nodes_visited(), 3);
    }
    assert!(cache.contains(&a, &b));

    // The root pair is now answered without descending.
    let mut comparer = IrComparer::with_cache(&mut cache);
    assert_eq!(comparer.compare_expr(&b, &a), Ordering::Equal);
    assert_eq!(comparer.nodes_visited(), 0);
}

#[test]
fn graph_mode_never_caches_unequal_pairs() {
    let a = i32_var("x") + int(1);
    let b = i32_var("x") + int(2);
    let mut cache = IrCompareCache::new(6);
    assert_eq!(
        IrComparer::with_cache(&mut cache).compare_expr(&a, &b),
        Ordering::Less
    );
    assert!(!cache.contains(&a, &b));
    // The equal left operands were still recorded.
    assert_eq!(cache.stats().insertions, 1);
}

#[test]
fn tree_mode_revisits_shared_nodes() {
    let mut a = i32_var("x");
    let mut b = i32_var("x");
    for _ in 0..6 {
        a = a.clone() + a;
        b = b.clone() + b;
    }
    let mut tree = IrComparer::new();
    assert_eq!(tree.compare_expr(&a, &b), Ordering::Equal);
    assert_eq!(tree.nodes_visited(), (1 << 7) - 1);

    let mut cache = IrCompareCache::default();
    let mut graph = IrComparer::with_cache(&mut cache);
    assert_eq!(graph.compare_expr(&a, &b), Ordering::Equal);
    assert_eq!(graph.nodes_visited(), 7);
}

#[test]
fn deep_ord_dedups_in_btree_set() {
    let mut set = BTreeSet::new();
    set.insert(DeepOrd(i32_var("x") + int(1)));
    set.insert(DeepOrd(i32_var("x") + int(1)));
    set.insert(DeepOrd(i32_var("y")));
    set.insert(DeepOrd(Expr::undefined()));
    assert_eq!(set.len(), 3);
    assert!(set.contains(&DeepOrd(i32_var("y"))));
    assert!(!set.first().is_some_and(|e| e.0.defined()));
}

#[test]
fn less_is_strict() {
    let a = i32_var("a");
    let b = i32_var("b");
    assert!(IrDeepCompare.less(&a, &b));
    assert!(!IrDeepCompare.less(&b, &a));
    assert!(!IrDeepCompare.less(&a, &a));
    assert!(!IrDeepCompare.less(&a, &i32_var("a")));
}

#[test]
fn deep_recursion_is_guarded() {
    let mut a = int(0);
    let mut b = int(0);
    for i in 0..200_000 {
        a = a + int(i);
        b = b + int(i);
    }
    assert_eq!(cmp(&a, &b), Ordering::Equal);

    let mut cache = IrCompareCache::default();
    let mut graph = IrComparer::with_cache(&mut cache);
    assert_eq!(graph.compare_expr(&a, &b), Ordering::Equal);
    assert!(graph.nodes_visited() >= 200_000);
}

#[test]
fn deep_block_chains_are_guarded() {
    let build = |last: i32| {
        let mut chain = Stmt::evaluate(int(last));
        for i in 0..200_000 {
            chain = Stmt::block(Stmt::evaluate(int(i)), chain);
        }
        chain
    };
    assert_eq!(cmp_stmt(&build(0), &build(0)), Ordering::Equal);
    assert_eq!(cmp_stmt(&build(0), &build(1)), Ordering::Less);
}

/// One expression of every kind.
fn one_of_each_expr() -> Vec<Expr> {
    let v = Expr::ramp(int(0), int(1), 4);
    vec![
        int(7),
        Expr::uint_imm(Type::uint(16), 7),
        Expr::float_imm(Type::float(32), 0.5),
        Expr::string_imm("s"),
        Expr::broadcast(int(1), 4),
        Expr::cast(Type::int(64), i32_var("x")),
        Expr::reinterpret(Type::uint(32), i32_var("x")),
        i32_var("x"),
        i32_var("x") + int(1),
        !Expr::lt(i32_var("x"), int(0)),
        Expr::select(Expr::bool_imm(true), int(1), int(2)),
        Expr::load(
            Type::int(32),
            "buf",
            int(0),
            None,
            Expr::undefined(),
            ModulusRemainder::UNKNOWN,
        ),
        v.clone(),
        Expr::call(Type::int(32), "f", vec![int(1)], CallType::Extern),
        Expr::let_in("t", int(1), i32_var("t")),
        Expr::shuffle([v.clone()], vec![3, 2, 1, 0]),
        Expr::vector_reduce(VectorReduceOp::Add, v, 1),
    ]
}

#[test]
fn every_kind_equals_its_rebuild() {
    for (a, b) in one_of_each_expr().iter().zip(&one_of_each_expr()) {
        assert_eq!(cmp(a, b), Ordering::Equal, "{a:?}");
    }
    for (a, b) in one_of_each_stmt().iter().zip(&one_of_each_stmt()) {
        assert_eq!(cmp_stmt(a, b), Ordering::Equal, "{a:?}");
    }
}

#[test]
fn distinct_kinds_never_compare_equal() {
    let exprs = one_of_each_expr();
    for (i, a) in exprs.iter().enumerate() {
        for (j, b) in exprs.iter().enumerate() {
            assert_eq!(cmp(a, b).is_eq(), i == j, "{a:?} vs {b:?}");
            assert_eq!(cmp(a, b), cmp(b, a).reverse());
        }
    }
    let stmts = one_of_each_stmt();
    for (i, a) in stmts.iter().enumerate() {
        for (j, b) in stmts.iter().enumerate() {
            assert_eq!(cmp_stmt(a, b).is_eq(), i == j, "{a:?} vs {b:?}");
        }
    }
}
