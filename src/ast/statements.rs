//! 文の定義

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{Decl, Expr, Ident, Span};

/// 文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Rc<Stmt> {
        Rc::new(Stmt {
            span: Span::dummy(),
            kind,
        })
    }
}

/// 文の種類
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Rc<BlockStmt>),
    Expr(Rc<Expr>),
    Decl(Decl),
    IncDec {
        x: Rc<Expr>,
        inc: bool,
    },
    Assign {
        lhs: Vec<Rc<Expr>>,
        tok: AssignOp,
        rhs: Vec<Rc<Expr>>,
    },
    If {
        init: Option<Rc<Stmt>>,
        cond: Rc<Expr>,
        body: Rc<BlockStmt>,
        els: Option<Rc<Stmt>>,
    },
    For {
        init: Option<Rc<Stmt>>,
        cond: Option<Rc<Expr>>,
        post: Option<Rc<Stmt>>,
        body: Rc<BlockStmt>,
    },
    Range {
        key: Option<Rc<Expr>>,
        value: Option<Rc<Expr>>,
        /// `key` が無ければ `None`
        tok: Option<AssignOp>,
        x: Rc<Expr>,
        body: Rc<BlockStmt>,
    },
    Return(Vec<Rc<Expr>>),
    Go(Rc<Expr>),
    Defer(Rc<Expr>),
    Send {
        chan: Rc<Expr>,
        value: Rc<Expr>,
    },
    Branch {
        tok: BranchKind,
        label: Option<Ident>,
    },
    Labeled {
        label: Ident,
        stmt: Rc<Stmt>,
    },
    Switch {
        init: Option<Rc<Stmt>>,
        tag: Option<Rc<Expr>>,
        body: Rc<BlockStmt>,
    },
    /// `case` 節。`list` が空なら `default`
    Case {
        list: Vec<Rc<Expr>>,
        body: Vec<Rc<Stmt>>,
    },
    Empty,
}

impl StmtKind {
    /// 構文種別の名前（エラー報告用）
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Block(_) => "BlockStmt",
            StmtKind::Expr(_) => "ExprStmt",
            StmtKind::Decl(_) => "DeclStmt",
            StmtKind::IncDec { .. } => "IncDecStmt",
            StmtKind::Assign { .. } => "AssignStmt",
            StmtKind::If { .. } => "IfStmt",
            StmtKind::For { .. } => "ForStmt",
            StmtKind::Range { .. } => "RangeStmt",
            StmtKind::Return(_) => "ReturnStmt",
            StmtKind::Go(_) => "GoStmt",
            StmtKind::Defer(_) => "DeferStmt",
            StmtKind::Send { .. } => "SendStmt",
            StmtKind::Branch { .. } => "BranchStmt",
            StmtKind::Labeled { .. } => "LabeledStmt",
            StmtKind::Switch { .. } => "SwitchStmt",
            StmtKind::Case { .. } => "CaseClause",
            StmtKind::Empty => "EmptyStmt",
        }
    }
}

/// 代入演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Define,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::QuoAssign => "/=",
            AssignOp::RemAssign => "%=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

/// ブロック
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStmt {
    pub list: Vec<Rc<Stmt>>,
    pub span: Span,
}

impl BlockStmt {
    pub fn new(list: Vec<Rc<Stmt>>) -> Self {
        Self {
            list,
            span: Span::dummy(),
        }
    }
}
