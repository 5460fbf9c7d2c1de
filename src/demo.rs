//! 付属のサンプルパッケージ
//!
//! ```text
//! type Pair[A, B any] struct { a A; b B }
//! func (p *Pair(A, B)) Swap() Pair(B, A)
//! func (p Pair(A, B)) First() A
//! func Map[T1, T2 any](s []T1, f func(T1) T2) (r []T2)
//! func Reverse[T any](s []T) []T
//! func Zero[T any]() T
//! func Apply[T any](s []T, f func(T) T) []T
//! func Twice[T any](f func(T) T) func(T) T
//! type Stack[T any] struct { items []T }
//! func (s *Stack(T)) Push(v T)
//! func (s *Stack(T)) Pop() (T, bool)
//! ```

use crate::ast::{BinaryOp, UnaryOp};
use crate::builder::{FuncParts, PackageBuilder};
use crate::package::Package;
use crate::types::Universe;

/// サンプルパッケージの名前
pub const PACKAGE_NAME: &str = "main";

/// サンプルパッケージを組み立てる
pub fn build(universe: Universe) -> (Universe, Package) {
    let b = PackageBuilder::new(universe, PACKAGE_NAME);
    pair(&b);
    map(&b);
    reverse(&b);
    zero(&b);
    apply(&b);
    twice(&b);
    stack(&b);
    b.finish()
}

fn pair(b: &PackageBuilder) {
    b.doc(&["Pair holds two values of arbitrary types."]);
    let pair = b.type_decl("Pair", &["A", "B"], |b| {
        b.struct_of(vec![("a", b.ident("A")), ("b", b.ident("B"))])
    });

    b.doc(&["Swap returns a pair with the elements exchanged."]);
    b.method_decl(pair, "p", true, &["A", "B"], "Swap", |b| FuncParts {
        results: vec![b.result(b.instance("Pair", vec![b.ident("B"), b.ident("A")]))],
        body: vec![b.ret(vec![b.composite(
            b.instance("Pair", vec![b.ident("B"), b.ident("A")]),
            vec![b.selector(b.ident("p"), "b"), b.selector(b.ident("p"), "a")],
        )])],
        ..FuncParts::default()
    });

    b.method_decl(pair, "p", false, &["A", "B"], "First", |b| FuncParts {
        results: vec![b.result(b.ident("A"))],
        body: vec![b.ret(vec![b.selector(b.ident("p"), "a")])],
        ..FuncParts::default()
    });
}

fn map(b: &PackageBuilder) {
    b.doc(&["Map applies f to every element of s."]);
    b.func_decl("Map", &["T1", "T2"], |b| FuncParts {
        params: vec![
            b.param(&["s"], b.slice_of(b.ident("T1"))),
            b.param(
                &["f"],
                b.func_type_expr(vec![b.ident("T1")], vec![b.ident("T2")]),
            ),
        ],
        results: vec![b.param(&["r"], b.slice_of(b.ident("T2")))],
        body: vec![
            b.range_stmt("_", Some("v"), b.ident("s"), |b| {
                vec![b.assign(
                    vec![b.ident("r")],
                    vec![b.call(
                        b.ident("append"),
                        vec![b.ident("r"), b.call(b.ident("f"), vec![b.ident("v")])],
                    )],
                )]
            }),
            b.ret(vec![b.ident("r")]),
        ],
    });
}

fn reverse(b: &PackageBuilder) {
    b.doc(&["Reverse returns the elements of s in reverse order."]);
    b.func_decl("Reverse", &["T"], |b| FuncParts {
        params: vec![b.param(&["s"], b.slice_of(b.ident("T")))],
        results: vec![b.result(b.slice_of(b.ident("T")))],
        body: vec![
            b.define(
                &["r"],
                vec![b.call(
                    b.ident("make"),
                    vec![
                        b.slice_of(b.ident("T")),
                        b.call(b.ident("len"), vec![b.ident("s")]),
                    ],
                )],
            ),
            b.range_stmt("i", Some("v"), b.ident("s"), |b| {
                let last = b.binary(
                    b.call(b.ident("len"), vec![b.ident("s")]),
                    BinaryOp::Sub,
                    b.int_lit(1),
                );
                let target = b.index(b.ident("r"), b.binary(last, BinaryOp::Sub, b.ident("i")));
                vec![b.assign(vec![target], vec![b.ident("v")])]
            }),
            b.ret(vec![b.ident("r")]),
        ],
    });
}

fn zero(b: &PackageBuilder) {
    b.func_decl("Zero", &["T"], |b| FuncParts {
        results: vec![b.result(b.ident("T"))],
        body: vec![
            b.var_stmt("z", Some(b.ident("T")), None),
            b.ret(vec![b.ident("z")]),
        ],
        ..FuncParts::default()
    });
}

fn apply(b: &PackageBuilder) {
    b.doc(&["Apply calls f on each element of s, in order."]);
    b.func_decl("Apply", &["T"], |b| FuncParts {
        params: vec![
            b.param(&["s"], b.slice_of(b.ident("T"))),
            b.param(
                &["f"],
                b.func_type_expr(vec![b.ident("T")], vec![b.ident("T")]),
            ),
        ],
        results: vec![b.result(b.slice_of(b.ident("T")))],
        body: vec![
            b.define(
                &["out"],
                vec![b.call(
                    b.ident("make"),
                    vec![b.slice_of(b.ident("T")), b.int_lit(0)],
                )],
            ),
            b.scoped(|b| {
                b.for_stmt(
                    Some(b.define(&["i"], vec![b.int_lit(0)])),
                    Some(b.binary(
                        b.ident("i"),
                        BinaryOp::Lss,
                        b.call(b.ident("len"), vec![b.ident("s")]),
                    )),
                    Some(b.inc(b.ident("i"))),
                    b.block(|b| {
                        vec![b.assign(
                            vec![b.ident("out")],
                            vec![b.call(
                                b.ident("append"),
                                vec![
                                    b.ident("out"),
                                    b.call(
                                        b.ident("f"),
                                        vec![b.index(b.ident("s"), b.ident("i"))],
                                    ),
                                ],
                            )],
                        )]
                    }),
                )
            }),
            b.ret(vec![b.ident("out")]),
        ],
    });
}

fn twice(b: &PackageBuilder) {
    b.func_decl("Twice", &["T"], |b| {
        let fn_t = || b.func_type_expr(vec![b.ident("T")], vec![b.ident("T")]);
        FuncParts {
            params: vec![b.param(&["f"], fn_t())],
            results: vec![b.result(fn_t())],
            body: vec![b.ret(vec![b.func_lit(|b| FuncParts {
                params: vec![b.param(&["x"], b.ident("T"))],
                results: vec![b.result(b.ident("T"))],
                body: vec![b.ret(vec![b.call(
                    b.ident("f"),
                    vec![b.call(b.ident("f"), vec![b.ident("x")])],
                )])],
            })])],
        }
    });
}

fn stack(b: &PackageBuilder) {
    b.doc(&["Stack is a last-in first-out collection."]);
    let stack = b.type_decl("Stack", &["T"], |b| {
        b.struct_of(vec![("items", b.slice_of(b.ident("T")))])
    });

    b.method_decl(stack, "s", true, &["T"], "Push", |b| FuncParts {
        params: vec![b.param(&["v"], b.ident("T"))],
        body: vec![b.assign(
            vec![b.selector(b.ident("s"), "items")],
            vec![b.call(
                b.ident("append"),
                vec![b.selector(b.ident("s"), "items"), b.ident("v")],
            )],
        )],
        ..FuncParts::default()
    });

    b.method_decl(stack, "s", true, &["T"], "Pop", |b| {
        let items = || b.selector(b.ident("s"), "items");
        FuncParts {
            results: vec![b.result(b.ident("T")), b.result(b.ident("bool"))],
            body: vec![
                b.var_stmt("zero", Some(b.ident("T")), None),
                b.if_stmt(
                    b.binary(
                        b.call(b.ident("len"), vec![items()]),
                        BinaryOp::Eql,
                        b.int_lit(0),
                    ),
                    b.block(|b| vec![b.ret(vec![b.ident("zero"), b.ident("false")])]),
                    None,
                ),
                b.define(
                    &["n"],
                    vec![b.binary(
                        b.call(b.ident("len"), vec![items()]),
                        BinaryOp::Sub,
                        b.int_lit(1),
                    )],
                ),
                b.define(&["v"], vec![b.index(items(), b.ident("n"))]),
                b.assign(
                    vec![items()],
                    vec![b.slice_expr(items(), None, Some(b.ident("n")))],
                ),
                b.dec(b.ident("n")),
                b.ret(vec![b.paren(b.deref(b.unary(UnaryOp::Addr, b.ident("v")))), b.ident("true")]),
            ],
            ..FuncParts::default()
        }
    });
}
