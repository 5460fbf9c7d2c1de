//! ジェネリック型とそのメソッドのインスタンス化のテスト

mod common;

use std::rc::Rc;

use common::Demo;
use monomorph::ast::{Decl, Expr, ExprKind, FieldList, FuncDecl, TypeSpec};
use monomorph::error::{InvariantViolation, MonoError};
use monomorph::types::{Info, ObjectId, PackageId, StructField};
use monomorph::{demo, Importer, PackageDb, QualifiedIdent, Translator, Type, Universe};
use pretty_assertions::assert_eq;

#[test]
fn test_instantiate_pair_with_methods() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");

    let (ident, _) = demo
        .translator
        .request_type(&qid, &[Type::int(), Type::string()])
        .unwrap();

    assert_eq!(ident.name, "Pair_int_string");
    assert_eq!(
        demo.emitted(),
        vec![
            concat!(
                "// Pair holds two values of arbitrary types.\n",
                "type Pair_int_string struct {\n",
                "\ta int\n",
                "\tb string\n",
                "}"
            )
            .to_string(),
            concat!(
                "// Swap returns a pair with the elements exchanged.\n",
                "func (p *Pair_int_string) Swap() Pair(string, int) {\n",
                "\treturn Pair(string, int){p.b, p.a}\n",
                "}"
            )
            .to_string(),
            concat!(
                "func (p Pair_int_string) First() int {\n",
                "\treturn p.a\n",
                "}"
            )
            .to_string(),
        ]
    );
}

#[test]
fn test_instantiated_type_records_underlying_and_methods() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");

    let (ident, ty) = demo
        .translator
        .request_type(&qid, &[Type::int(), Type::string()])
        .unwrap();

    let universe = demo.translator.universe();
    let obj = demo.translator.object_of(&ident).unwrap();
    assert_eq!(
        ty,
        Type::Named {
            obj,
            name: "Pair_int_string".to_string(),
            targs: Vec::new(),
        }
    );
    assert_eq!(
        universe.underlying(&ty),
        Type::Struct(vec![
            StructField {
                name: "a".to_string(),
                ty: Type::int(),
            },
            StructField {
                name: "b".to_string(),
                ty: Type::string(),
            },
        ])
    );

    let named = universe.named(obj).unwrap();
    assert!(named.type_params.is_empty());
    let methods: Vec<_> = named
        .methods
        .iter()
        .map(|m| (universe.object(m.obj).name.as_str(), m.pointer))
        .collect();
    assert_eq!(methods, vec![("Swap", true), ("First", false)]);

    // メソッドのシグネチャにも型パラメータは残らない
    let (_, swap) = universe.lookup_method(&ty, "Swap").unwrap();
    let pair = demo.package.scope["Pair"];
    assert_eq!(
        swap.results,
        vec![universe.instance(pair, vec![Type::string(), Type::int()])]
    );
    let (_, first) = universe.lookup_method(&Type::pointer(ty.clone()), "First").unwrap();
    assert_eq!(first.results, vec![Type::int()]);
}

#[test]
fn test_receiver_types_are_recorded() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");

    let (_, ty) = demo
        .translator
        .request_type(&qid, &[Type::int(), Type::string()])
        .unwrap();

    let swap = match &demo.translator.new_decls()[1] {
        Decl::Func(func) => func.clone(),
        other => panic!("メソッドではありません: {}", other),
    };
    let recv = &swap.recv.as_ref().unwrap().list[0];
    assert_eq!(recv.names[0].name, "p");
    let ExprKind::Star(base) = &recv.ty.kind else {
        panic!("ポインタレシーバーではありません");
    };
    assert_eq!(
        demo.translator.type_of(recv.ty.id).unwrap().ty,
        Type::pointer(ty.clone())
    );
    assert_eq!(demo.translator.type_of(base.id).unwrap().ty, ty);
}

#[test]
fn test_reversed_arguments_give_distinct_instance() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");

    let (forward, _) = demo
        .translator
        .request_type(&qid, &[Type::int(), Type::string()])
        .unwrap();
    let (backward, _) = demo
        .translator
        .request_type(&qid, &[Type::string(), Type::int()])
        .unwrap();
    let (again, _) = demo
        .translator
        .request_type(&qid, &[Type::int(), Type::string()])
        .unwrap();

    assert_eq!(forward.name, "Pair_int_string");
    assert_eq!(backward.name, "Pair_string_int");
    assert_eq!(again, forward);
    assert_eq!(demo.translator.new_decls().len(), 6);
    assert_eq!(
        demo.emitted()[4],
        concat!(
            "// Swap returns a pair with the elements exchanged.\n",
            "func (p *Pair_string_int) Swap() Pair(int, string) {\n",
            "\treturn Pair(int, string){p.b, p.a}\n",
            "}"
        )
    );
}

#[test]
fn test_instantiate_stack() {
    let mut demo = Demo::new();
    let qid = demo.qid("Stack");

    demo.translator.request_type(&qid, &[Type::int()]).unwrap();

    assert_eq!(
        demo.emitted(),
        vec![
            concat!(
                "// Stack is a last-in first-out collection.\n",
                "type Stack_int struct {\n",
                "\titems []int\n",
                "}"
            )
            .to_string(),
            concat!(
                "func (s *Stack_int) Push(v int) {\n",
                "\ts.items = append(s.items, v)\n",
                "}"
            )
            .to_string(),
            concat!(
                "func (s *Stack_int) Pop() (int, bool) {\n",
                "\tvar zero int\n",
                "\tif len(s.items) == 0 {\n",
                "\t\treturn zero, false\n",
                "\t}\n",
                "\tn := len(s.items) - 1\n",
                "\tv := s.items[n]\n",
                "\ts.items = s.items[:n]\n",
                "\tn--\n",
                "\treturn (*&v), true\n",
                "}"
            )
            .to_string(),
        ]
    );
}

#[test]
fn test_method_instantiation_with_caller_syntax() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");
    let generic = demo.translator.universe().object(demo.package.scope["Pair"]).ty.clone();
    let int_expr = Expr::name("int");

    demo.translator
        .instantiate_type_decl(
            &qid,
            &generic,
            &[int_expr.clone(), Expr::name("bool")],
            &[Type::int(), Type::bool()],
        )
        .unwrap();

    // First の結果型 `A` は呼び出し側の構文に置き換わる
    let first = match &demo.translator.new_decls()[2] {
        Decl::Func(func) => func.clone(),
        other => panic!("メソッドではありません: {}", other),
    };
    let result = &first.ty.results.as_ref().unwrap().list[0];
    assert!(Rc::ptr_eq(&result.ty, &int_expr));
}

#[test]
fn test_non_named_type_is_a_violation() {
    let mut demo = Demo::new();
    let qid = demo.qid("Pair");

    let err = demo
        .translator
        .instantiate_type_decl(&qid, &Type::int(), &[], &[Type::int(), Type::int()])
        .unwrap_err();

    assert_eq!(
        err,
        MonoError::Invariant(InvariantViolation::NotNamedType {
            name: "int".to_string()
        })
    );
    assert!(demo.translator.aborted().is_some());
}

/// メソッドの宣言を隠す `Importer`
struct HideMethods {
    db: PackageDb,
    /// 隠す代わりに差し替える宣言
    replace: Option<fn(&FuncDecl) -> FuncDecl>,
}

impl Importer for HideMethods {
    fn lookup_func(&self, obj: ObjectId) -> Option<Rc<FuncDecl>> {
        let decl = self.db.lookup_func(obj)?;
        if decl.recv.is_none() {
            return Some(decl);
        }
        self.replace.map(|f| Rc::new(f(&decl)))
    }

    fn lookup_type_spec(&self, obj: ObjectId) -> Option<Rc<TypeSpec>> {
        self.db.lookup_type_spec(obj)
    }

    fn lookup_info(&self, pkg: PackageId) -> Option<Rc<Info>> {
        self.db.lookup_info(pkg)
    }

    fn lookup_scope(&self, pkg: PackageId, name: &str) -> Option<ObjectId> {
        self.db.lookup_scope(pkg, name)
    }
}

fn translator_with(replace: Option<fn(&FuncDecl) -> FuncDecl>) -> (Translator, PackageId) {
    let (universe, package) = demo::build(Universe::new());
    let id = package.id;
    let mut db = PackageDb::new();
    db.insert(package);
    (Translator::new(universe, HideMethods { db, replace }, id), id)
}

#[test]
fn test_missing_method_syntax_leaves_no_output() {
    let (mut translator, pkg) = translator_with(None);
    let pair = QualifiedIdent::in_package(pkg, "Pair");
    let reverse = QualifiedIdent::in_package(pkg, "Reverse");

    let err = translator
        .request_type(&pair, &[Type::int(), Type::string()])
        .unwrap_err();

    assert_eq!(
        err,
        MonoError::Invariant(InvariantViolation::MissingMethodSyntax {
            name: "Swap".to_string()
        })
    );
    // 型の宣言も含めて何も出力されない
    assert!(translator.new_decls().is_empty());
    assert!(translator.request_function(&reverse, &[Type::int()]).is_err());
}

/// レシーバーを `p Pair` に書き換える（型引数なし）
fn strip_receiver_arguments(decl: &FuncDecl) -> FuncDecl {
    let recv = decl.recv.as_ref().unwrap();
    let mut field = (*recv.list[0]).clone();
    field.ty = Expr::name("Pair");
    FuncDecl {
        recv: Some(Rc::new(FieldList::new(vec![Rc::new(field)]))),
        ..decl.clone()
    }
}

#[test]
fn test_receiver_without_type_arguments_is_malformed() {
    let replace: fn(&FuncDecl) -> FuncDecl = strip_receiver_arguments;
    let (mut translator, pkg) = translator_with(Some(replace));
    let pair = QualifiedIdent::in_package(pkg, "Pair");

    let err = translator
        .request_type(&pair, &[Type::int(), Type::string()])
        .unwrap_err();

    assert_eq!(
        err,
        MonoError::Invariant(InvariantViolation::MalformedReceiver {
            name: "Swap".to_string()
        })
    );
    assert!(translator.new_decls().is_empty());
}
