//! 式と型式の定義

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{CommentGroup, Ident, NodeId, Span, BlockStmt};
use crate::types::Type;

/// 式（型を表す式を含む）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

impl Expr {
    /// 新しいIDを持つ式ノードを作成
    pub fn new(kind: ExprKind) -> Rc<Expr> {
        Self::with_span(kind, Span::dummy())
    }

    pub fn with_span(kind: ExprKind, span: Span) -> Rc<Expr> {
        Rc::new(Expr {
            id: NodeId::fresh(),
            span,
            kind,
        })
    }

    /// 識別子式を作成（式のIDは識別子のIDと同じ）
    pub fn ident(ident: Ident) -> Rc<Expr> {
        Rc::new(Expr {
            id: ident.id,
            span: ident.span,
            kind: ExprKind::Ident(ident),
        })
    }

    /// 型情報を持たない識別子式を作成
    pub fn name(name: &str) -> Rc<Expr> {
        Self::ident(Ident::new(name))
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

/// 式の種類
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Ident(Ident),
    BasicLit(BasicLit),
    FuncLit {
        ty: Rc<FuncType>,
        body: Rc<BlockStmt>,
    },
    CompositeLit {
        ty: Option<Rc<Expr>>,
        elts: Vec<Rc<Expr>>,
    },
    Paren(Rc<Expr>),
    Selector {
        x: Rc<Expr>,
        sel: Ident,
    },
    /// `*x`: ポインタ型またはデリファレンス
    Star(Rc<Expr>),
    Unary {
        op: UnaryOp,
        x: Rc<Expr>,
    },
    Binary {
        x: Rc<Expr>,
        op: BinaryOp,
        y: Rc<Expr>,
    },
    Index {
        x: Rc<Expr>,
        index: Rc<Expr>,
    },
    Slice {
        x: Rc<Expr>,
        low: Option<Rc<Expr>>,
        high: Option<Rc<Expr>>,
        max: Option<Rc<Expr>>,
        slice3: bool,
    },
    /// 関数呼び出し、型変換、およびジェネリック型のインスタンス化 `Pair(A, B)`
    Call {
        fun: Rc<Expr>,
        args: Vec<Rc<Expr>>,
        ellipsis: bool,
    },
    FuncType(Rc<FuncType>),
    /// `len` が無ければスライス型
    ArrayType {
        len: Option<Rc<Expr>>,
        elt: Rc<Expr>,
    },
    StructType(Rc<FieldList>),
    KeyValue {
        key: Rc<Expr>,
        value: Rc<Expr>,
    },
    /// `x.(T)`、`ty` が無ければ `x.(type)`
    TypeAssert {
        x: Rc<Expr>,
        ty: Option<Rc<Expr>>,
    },
    Ellipsis(Option<Rc<Expr>>),
    MapType {
        key: Rc<Expr>,
        value: Rc<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Rc<Expr>,
    },
    InterfaceType(Rc<FieldList>),
}

impl ExprKind {
    /// 構文種別の名前（エラー報告用）
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Ident(_) => "Ident",
            ExprKind::BasicLit(_) => "BasicLit",
            ExprKind::FuncLit { .. } => "FuncLit",
            ExprKind::CompositeLit { .. } => "CompositeLit",
            ExprKind::Paren(_) => "ParenExpr",
            ExprKind::Selector { .. } => "SelectorExpr",
            ExprKind::Star(_) => "StarExpr",
            ExprKind::Unary { .. } => "UnaryExpr",
            ExprKind::Binary { .. } => "BinaryExpr",
            ExprKind::Index { .. } => "IndexExpr",
            ExprKind::Slice { .. } => "SliceExpr",
            ExprKind::Call { .. } => "CallExpr",
            ExprKind::FuncType(_) => "FuncType",
            ExprKind::ArrayType { .. } => "ArrayType",
            ExprKind::StructType(_) => "StructType",
            ExprKind::KeyValue { .. } => "KeyValueExpr",
            ExprKind::TypeAssert { .. } => "TypeAssertExpr",
            ExprKind::Ellipsis(_) => "Ellipsis",
            ExprKind::MapType { .. } => "MapType",
            ExprKind::ChanType { .. } => "ChanType",
            ExprKind::InterfaceType(_) => "InterfaceType",
        }
    }
}

/// 基本リテラル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicLit {
    pub kind: LitKind,
    /// ソース上の表記（文字列ならクォートを含む）
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// 単項演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    Xor,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
            UnaryOp::Xor => "^",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}

/// 二項演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Quo => "/",
            BinaryOp::Rem => "%",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::AndNot => "&^",
            BinaryOp::LAnd => "&&",
            BinaryOp::LOr => "||",
            BinaryOp::Eql => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lss => "<",
            BinaryOp::Leq => "<=",
            BinaryOp::Gtr => ">",
            BinaryOp::Geq => ">=",
        }
    }

    /// 比較演算子かどうか（結果は bool）
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eql
                | BinaryOp::Neq
                | BinaryOp::Lss
                | BinaryOp::Leq
                | BinaryOp::Gtr
                | BinaryOp::Geq
        )
    }
}

/// チャネルの方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Send,
    Recv,
    Both,
}

/// フィールド（パラメータ、構造体フィールド、レシーバー共通）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub doc: CommentGroup,
    pub names: Vec<Ident>,
    pub ty: Rc<Expr>,
    pub tag: Option<String>,
    pub comment: CommentGroup,
}

impl Field {
    pub fn new(names: Vec<Ident>, ty: Rc<Expr>) -> Self {
        Self {
            doc: Vec::new(),
            names,
            ty,
            tag: None,
            comment: Vec::new(),
        }
    }
}

/// フィールドリスト
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldList {
    pub list: Vec<Rc<Field>>,
    pub span: Span,
}

impl FieldList {
    pub fn new(list: Vec<Rc<Field>>) -> Self {
        Self {
            list,
            span: Span::dummy(),
        }
    }
}

/// 関数型（シグネチャ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncType {
    pub tparams: Option<Rc<FieldList>>,
    pub params: Rc<FieldList>,
    pub results: Option<Rc<FieldList>>,
    pub span: Span,
}

/// 具体的な型から型引数の構文を組み立てる
pub fn type_expr(ty: &Type) -> Rc<Expr> {
    match ty {
        Type::Basic(kind) => Expr::name(kind.name()),
        Type::Named { name, targs, .. } => {
            let fun = Expr::name(name);
            if targs.is_empty() {
                fun
            } else {
                Expr::new(ExprKind::Call {
                    fun,
                    args: targs.iter().map(type_expr).collect(),
                    ellipsis: false,
                })
            }
        }
        Type::TypeParam { name, .. } => Expr::name(name),
        Type::Pointer(elem) => Expr::new(ExprKind::Star(type_expr(elem))),
        Type::Slice(elem) => Expr::new(ExprKind::ArrayType {
            len: None,
            elt: type_expr(elem),
        }),
        Type::Array { len, elem } => Expr::new(ExprKind::ArrayType {
            len: Some(Expr::new(ExprKind::BasicLit(BasicLit {
                kind: LitKind::Int,
                value: len.to_string(),
            }))),
            elt: type_expr(elem),
        }),
        Type::Map { key, value } => Expr::new(ExprKind::MapType {
            key: type_expr(key),
            value: type_expr(value),
        }),
        Type::Struct(fields) => {
            let list = fields
                .iter()
                .map(|f| Rc::new(Field::new(vec![Ident::new(f.name.clone())], type_expr(&f.ty))))
                .collect();
            Expr::new(ExprKind::StructType(Rc::new(FieldList::new(list))))
        }
        Type::Signature(sig) => {
            let unnamed = |ty: &Type| Rc::new(Field::new(Vec::new(), type_expr(ty)));
            let mut params: Vec<Rc<Field>> = sig.params.iter().map(unnamed).collect();
            if sig.variadic {
                if let Some(last) = params.pop() {
                    let elt = match &last.ty.kind {
                        ExprKind::ArrayType { elt, .. } => Some(elt.clone()),
                        _ => None,
                    };
                    params.push(Rc::new(Field::new(
                        Vec::new(),
                        Expr::new(ExprKind::Ellipsis(elt)),
                    )));
                }
            }
            let results = if sig.results.is_empty() {
                None
            } else {
                Some(Rc::new(FieldList::new(sig.results.iter().map(unnamed).collect())))
            };
            Expr::new(ExprKind::FuncType(Rc::new(FuncType {
                tparams: None,
                params: Rc::new(FieldList::new(params)),
                results,
                span: Span::dummy(),
            })))
        }
        Type::Interface => Expr::new(ExprKind::InterfaceType(Rc::new(FieldList::default()))),
        Type::Tuple(_) | Type::Invalid => Expr::name(&ty.to_string()),
    }
}

