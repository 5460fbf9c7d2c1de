//! 結合テスト共通のヘルパー

#![allow(dead_code)]

use std::rc::Rc;

use monomorph::ast::{Decl, FuncDecl};
use monomorph::demo;
use monomorph::{Package, PackageDb, QualifiedIdent, Translator, Universe};

/// サンプルパッケージと、それを翻訳するコンテキスト
pub struct Demo {
    pub translator: Translator,
    pub package: Package,
}

impl Demo {
    pub fn new() -> Self {
        let (universe, package) = demo::build(Universe::new());
        let mut db = PackageDb::new();
        db.insert(package.clone());
        let translator = Translator::new(universe, db, package.id);
        Self {
            translator,
            package,
        }
    }

    pub fn qid(&self, name: &str) -> QualifiedIdent {
        QualifiedIdent::in_package(self.package.id, name)
    }

    /// 元の関数宣言
    pub fn func(&self, name: &str) -> Rc<FuncDecl> {
        let obj = self.package.scope[name];
        self.package.func(obj).unwrap().clone()
    }

    /// 生成された宣言を Go 風の表記で
    pub fn emitted(&self) -> Vec<String> {
        self.translator
            .new_decls()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// 生成された最後の関数宣言
    pub fn last_func(&self) -> Rc<FuncDecl> {
        match self.translator.new_decls().last() {
            Some(Decl::Func(func)) => func.clone(),
            other => panic!("関数宣言ではありません: {:?}", other),
        }
    }
}
