//! 宣言の定義

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{BlockStmt, CommentGroup, Expr, FieldList, FuncType, Ident, Span};

/// 宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Gen(Rc<GenDecl>),
    Func(Rc<FuncDecl>),
}

impl Decl {
    /// 同じノードを指しているかどうか
    pub fn ptr_eq(&self, other: &Decl) -> bool {
        match (self, other) {
            (Decl::Gen(a), Decl::Gen(b)) => Rc::ptr_eq(a, b),
            (Decl::Func(a), Decl::Func(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Decl::Gen(_) => "GenDecl",
            Decl::Func(_) => "FuncDecl",
        }
    }

    pub fn as_func(&self) -> Option<&Rc<FuncDecl>> {
        match self {
            Decl::Func(func) => Some(func),
            Decl::Gen(_) => None,
        }
    }

    pub fn as_gen(&self) -> Option<&Rc<GenDecl>> {
        match self {
            Decl::Gen(gen) => Some(gen),
            Decl::Func(_) => None,
        }
    }
}

/// `var` / `const` / `type` / `import` 宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub doc: CommentGroup,
    pub tok: DeclKeyword,
    pub specs: Vec<Spec>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKeyword {
    Var,
    Const,
    Type,
    Import,
}

impl DeclKeyword {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKeyword::Var => "var",
            DeclKeyword::Const => "const",
            DeclKeyword::Type => "type",
            DeclKeyword::Import => "import",
        }
    }
}

/// `GenDecl` の個々の仕様
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Spec {
    Value(Rc<ValueSpec>),
    Type(Rc<TypeSpec>),
    Import(Rc<ImportSpec>),
}

impl Spec {
    pub fn ptr_eq(&self, other: &Spec) -> bool {
        match (self, other) {
            (Spec::Value(a), Spec::Value(b)) => Rc::ptr_eq(a, b),
            (Spec::Type(a), Spec::Type(b)) => Rc::ptr_eq(a, b),
            (Spec::Import(a), Spec::Import(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Spec::Value(_) => "ValueSpec",
            Spec::Type(_) => "TypeSpec",
            Spec::Import(_) => "ImportSpec",
        }
    }
}

/// 変数・定数の宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub doc: CommentGroup,
    pub names: Vec<Ident>,
    pub ty: Option<Rc<Expr>>,
    pub values: Vec<Rc<Expr>>,
    pub comment: CommentGroup,
}

/// 型の宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub doc: CommentGroup,
    pub name: Ident,
    pub tparams: Option<Rc<FieldList>>,
    /// `type A = B` 形式のエイリアスかどうか
    pub assign: bool,
    pub ty: Rc<Expr>,
    pub comment: CommentGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    pub path: String,
}

/// 関数・メソッド宣言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub doc: CommentGroup,
    pub recv: Option<Rc<FieldList>>,
    pub name: Ident,
    pub ty: Rc<FuncType>,
    pub body: Option<Rc<BlockStmt>>,
    pub span: Span,
}
