//! 構文木の書き換え規則のテスト

mod common;

use std::rc::Rc;

use common::Demo;
use monomorph::ast::{
    BinaryOp, BranchKind, Decl, DeclKeyword, Expr, ExprKind, FuncDecl, GenDecl, Ident, Spec,
    Stmt, StmtKind, TypeSpec,
};
use monomorph::error::{InvariantViolation, MonoError};
use monomorph::types::{BasicKind, Mode, PackageId, TypeAndValue};
use monomorph::{FuncParts, PackageBuilder, PackageDb, QualifiedIdent, Translator, Type, Universe};
use pretty_assertions::assert_eq;
use test_case::test_case;

/// `build` で宣言を1つ加えたパッケージの翻訳コンテキスト
fn translator_for(build: impl FnOnce(&PackageBuilder)) -> (Translator, PackageId) {
    let b = PackageBuilder::new(Universe::new(), "main");
    build(&b);
    let (universe, package) = b.finish();
    let id = package.id;
    let mut db = PackageDb::new();
    db.insert(package);
    (Translator::new(universe, db, id), id)
}

fn float64() -> Type {
    Type::Basic(BasicKind::Float64)
}

#[test]
fn test_value_expressions_carry_substituted_types() {
    let (mut translator, pkg) = translator_for(|b| {
        b.func_decl("Convert", &["T"], |b| FuncParts {
            params: vec![b.param(&["x"], b.ident("int"))],
            results: vec![b.result(b.ident("T"))],
            body: vec![b.ret(vec![b.binary(
                b.call(b.ident("T"), vec![b.ident("x")]),
                BinaryOp::Add,
                b.index(
                    b.composite(b.slice_of(b.ident("T")), vec![b.ident("x")]),
                    b.int_lit(0),
                ),
            )])],
        });
    });

    translator
        .request_function(&QualifiedIdent::in_package(pkg, "Convert"), &[float64()])
        .unwrap();

    assert_eq!(
        translator.new_decls()[0].to_string(),
        "func Convert_float64(x int) float64 {\n\treturn float64(x) + []float64{x}[0]\n}"
    );

    let Some(Decl::Func(decl)) = translator.new_decls().first() else {
        panic!("関数宣言がありません");
    };
    let StmtKind::Return(results) = &decl.body.as_ref().unwrap().list[0].kind else {
        panic!("return 文ではありません");
    };
    let ExprKind::Binary { x, y, .. } = &results[0].kind else {
        panic!("二項演算ではありません");
    };
    let ExprKind::Index { x: lit, .. } = &y.kind else {
        panic!("インデックス式ではありません");
    };

    let value = |ty: Type| {
        Some(TypeAndValue {
            mode: Mode::Value,
            ty,
        })
    };
    assert_eq!(translator.type_of(results[0].id), value(float64()));
    assert_eq!(translator.type_of(x.id), value(float64()));
    assert_eq!(translator.type_of(y.id), value(float64()));
    // 複合リテラルには型を引き継がない
    assert_eq!(translator.type_of(lit.id), None);
}

#[test]
fn test_builtin_call_type_is_substituted() {
    let mut demo = Demo::new();
    let qid = demo.qid("Reverse");

    demo.translator
        .request_function(&qid, &[Type::string()])
        .unwrap();

    let decl = demo.last_func();
    let StmtKind::Assign { rhs, .. } = &decl.body.as_ref().unwrap().list[0].kind else {
        panic!("代入文ではありません");
    };
    assert_eq!(
        demo.translator.type_of(rhs[0].id).map(|tv| tv.ty),
        Some(Type::slice(Type::string()))
    );
}

#[test]
fn test_original_type_information_is_not_modified() {
    let mut demo = Demo::new();
    let qid = demo.qid("Reverse");
    let original = demo.func("Reverse");
    let StmtKind::Assign { rhs, .. } = &original.body.as_ref().unwrap().list[0].kind else {
        panic!("代入文ではありません");
    };
    let before = demo.package.info.as_ref().unwrap().type_of(rhs[0].id).cloned();

    demo.translator
        .request_function(&qid, &[Type::int()])
        .unwrap();

    let after = demo.package.info.as_ref().unwrap().type_of(rhs[0].id).cloned();
    assert_eq!(before, after);
    assert!(after.unwrap().ty.has_type_params());
}

#[test]
fn test_for_statement_is_rewritten() {
    let mut demo = Demo::new();
    let qid = demo.qid("Apply");

    demo.translator.request_function(&qid, &[Type::int()]).unwrap();

    assert_eq!(
        demo.emitted(),
        vec![concat!(
            "// Apply calls f on each element of s, in order.\n",
            "func Apply_int(s []int, f func(int) int) []int {\n",
            "\tout := make([]int, 0)\n",
            "\tfor i := 0; i < len(s); i++ {\n",
            "\t\tout = append(out, f(s[i]))\n",
            "\t}\n",
            "\treturn out\n",
            "}"
        )
        .to_string()]
    );
}

fn go_stmt(b: &PackageBuilder) -> Rc<Stmt> {
    Stmt::new(StmtKind::Go(b.call(b.ident("len"), vec![b.ident("s")])))
}

fn defer_stmt(b: &PackageBuilder) -> Rc<Stmt> {
    Stmt::new(StmtKind::Defer(b.call(b.ident("len"), vec![b.ident("s")])))
}

fn break_stmt(_: &PackageBuilder) -> Rc<Stmt> {
    Stmt::new(StmtKind::Branch {
        tok: BranchKind::Break,
        label: None,
    })
}

fn empty_stmt(_: &PackageBuilder) -> Rc<Stmt> {
    Stmt::new(StmtKind::Empty)
}

fn type_assert(b: &PackageBuilder) -> Rc<Stmt> {
    b.expr_stmt(Expr::new(ExprKind::TypeAssert {
        x: b.ident("s"),
        ty: Some(b.ident("T")),
    }))
}

fn map_type(b: &PackageBuilder) -> Rc<Stmt> {
    let ty = Expr::new(ExprKind::MapType {
        key: b.ident("string"),
        value: b.ident("T"),
    });
    b.var_stmt("m", Some(ty), None)
}

fn local_type(_: &PackageBuilder) -> Rc<Stmt> {
    let spec = TypeSpec {
        doc: Vec::new(),
        name: Ident::new("Local"),
        tparams: None,
        assign: false,
        ty: Expr::name("int"),
        comment: Vec::new(),
    };
    Stmt::new(StmtKind::Decl(Decl::Gen(Rc::new(GenDecl {
        doc: Vec::new(),
        tok: DeclKeyword::Type,
        specs: vec![Spec::Type(Rc::new(spec))],
        span: Default::default(),
    }))))
}

fn nested_func(_: &PackageBuilder) -> Rc<Stmt> {
    let decl = FuncDecl {
        doc: Vec::new(),
        recv: None,
        name: Ident::new("inner"),
        ty: Rc::new(monomorph::ast::FuncType {
            tparams: None,
            params: Default::default(),
            results: None,
            span: Default::default(),
        }),
        body: None,
        span: Default::default(),
    };
    Stmt::new(StmtKind::Decl(Decl::Func(Rc::new(decl))))
}

#[test_case(go_stmt, "文", "GoStmt"; "go statement")]
#[test_case(defer_stmt, "文", "DeferStmt"; "defer statement")]
#[test_case(break_stmt, "文", "BranchStmt"; "branch statement")]
#[test_case(empty_stmt, "文", "EmptyStmt"; "empty statement")]
#[test_case(type_assert, "式", "TypeAssertExpr"; "type assertion")]
#[test_case(map_type, "式", "MapType"; "map type")]
#[test_case(local_type, "宣言仕様", "TypeSpec"; "local type declaration")]
#[test_case(nested_func, "宣言", "FuncDecl"; "nested function")]
fn test_unsupported_syntax_aborts(
    stmt: fn(&PackageBuilder) -> Rc<Stmt>,
    category: &'static str,
    kind: &'static str,
) {
    let (mut translator, pkg) = translator_for(|b| {
        b.func_decl("Bad", &["T"], |b| FuncParts {
            params: vec![b.param(&["s"], b.slice_of(b.ident("T")))],
            body: vec![stmt(b)],
            ..FuncParts::default()
        });
    });
    let qid = QualifiedIdent::in_package(pkg, "Bad");

    let err = translator.request_function(&qid, &[Type::int()]).unwrap_err();

    let violation = InvariantViolation::Unsupported { category, kind };
    assert_eq!(err, MonoError::Invariant(violation.clone()));
    assert!(err.is_fatal());
    assert_eq!(translator.aborted(), Some(&violation));
    assert!(translator.new_decls().is_empty());
}

#[test]
fn test_unsupported_syntax_in_untouched_subtree_still_aborts() {
    let (mut translator, pkg) = translator_for(|b| {
        b.func_decl("Quiet", &["T"], |b| FuncParts {
            params: vec![b.param(&["x"], b.ident("T"))],
            body: vec![b.block_stmt(b.block(|_| vec![Stmt::new(StmtKind::Empty)]))],
            ..FuncParts::default()
        });
    });
    let qid = QualifiedIdent::in_package(pkg, "Quiet");

    let err = translator.request_function(&qid, &[Type::int()]).unwrap_err();

    assert!(err.is_fatal());
}
