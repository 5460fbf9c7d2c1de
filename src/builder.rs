//! 構文木と型情報を同時に組み立てるビルダー
//!
//! 構文解析と型チェックの代わりに使う。ノードを作るたびに、識別子が解決される
//! オブジェクトと式の型を `Info` に記録する。

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::*;
use crate::package::Package;
use crate::types::{
    BasicKind, Info, MethodInfo, Mode, ObjectId, ObjectKind, Signature, StructField,
    Type, TypeParamId, Universe,
};

/// 関数本体の部品
#[derive(Debug, Default)]
pub struct FuncParts {
    pub params: Vec<Rc<Field>>,
    pub results: Vec<Rc<Field>>,
    pub body: Vec<Rc<Stmt>>,
}

struct BuilderState {
    universe: Universe,
    package: Package,
    info: Info,
    /// ローカルスコープ（内側が末尾）
    scopes: Vec<IndexMap<String, ObjectId>>,
    pending_doc: CommentGroup,
}

/// 型チェック済みのパッケージを組み立てる
pub struct PackageBuilder {
    state: RefCell<BuilderState>,
}

impl PackageBuilder {
    pub fn new(mut universe: Universe, name: &str) -> Self {
        let id = universe.new_package(name);
        Self {
            state: RefCell::new(BuilderState {
                universe,
                package: Package::new(id, name),
                info: Info::new(),
                scopes: Vec::new(),
                pending_doc: Vec::new(),
            }),
        }
    }

    /// 組み立てたパッケージを取り出す
    pub fn finish(self) -> (Universe, Package) {
        let state = self.state.into_inner();
        let mut package = state.package;
        package.info = Some(Rc::new(state.info));
        package.reindex();
        (state.universe, package)
    }

    /// 次に宣言するトップレベル宣言のドキュメントコメント
    pub fn doc(&self, lines: &[&str]) {
        self.state.borrow_mut().pending_doc = lines.iter().map(|l| l.to_string()).collect();
    }

    /// パッケージスコープの名前
    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.state.borrow().package.scope.get(name).copied()
    }

    /// 記録済みの式の型
    pub fn type_of(&self, e: &Expr) -> Type {
        self.state
            .borrow()
            .info
            .type_of(e.id)
            .map(|tv| tv.ty.clone())
            .unwrap_or(Type::Invalid)
    }

    fn mode_of(&self, e: &Expr) -> Option<Mode> {
        self.state.borrow().info.type_of(e.id).map(|tv| tv.mode)
    }

    fn underlying_of(&self, e: &Expr) -> Type {
        let ty = self.type_of(e);
        self.state.borrow().universe.underlying(&ty)
    }

    fn take_doc(&self) -> CommentGroup {
        std::mem::take(&mut self.state.borrow_mut().pending_doc)
    }

    fn record(&self, e: &Rc<Expr>, mode: Mode, ty: Type) -> Rc<Expr> {
        self.state.borrow_mut().info.record_type(e.id, mode, ty);
        e.clone()
    }

    // ==================== スコープ ====================

    /// 新しいローカルスコープの中で `f` を実行
    pub fn scoped<T>(&self, f: impl FnOnce(&Self) -> T) -> T {
        self.state.borrow_mut().scopes.push(IndexMap::new());
        let result = f(self);
        self.state.borrow_mut().scopes.pop();
        result
    }

    fn lookup(&self, name: &str) -> Option<ObjectId> {
        let st = self.state.borrow();
        st.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
            .or_else(|| st.package.scope.get(name).copied())
            .or_else(|| st.universe.lookup_predeclared(name))
    }

    /// 最も内側のスコープに名前を宣言する。`_` は宣言しない
    fn declare(&self, name: &str, kind: ObjectKind, ty: Type) -> Ident {
        let ident = Ident::new(name);
        if ident.is_blank() {
            return ident;
        }
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let obj = st
            .universe
            .new_object(name, kind, Some(st.package.id), ty);
        match st.scopes.last_mut() {
            Some(scope) => scope.insert(name.to_string(), obj),
            None => st.package.scope.insert(name.to_string(), obj),
        };
        st.info.record_def(&ident, obj);
        ident
    }

    fn declare_package(&self, name: &str, kind: ObjectKind) -> (Ident, ObjectId) {
        let ident = Ident::new(name);
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let obj = st
            .universe
            .new_object(name, kind, Some(st.package.id), Type::Invalid);
        st.package.scope.insert(name.to_string(), obj);
        st.info.record_def(&ident, obj);
        (ident, obj)
    }

    /// 型パラメータを1つ宣言し、その識別子を返す
    fn declare_type_param(&self, name: &str, index: usize) -> (Ident, TypeParamId) {
        let ident = Ident::new(name);
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        let (obj, id) = st
            .universe
            .new_type_param(name, index, Some(st.package.id));
        if let Some(scope) = st.scopes.last_mut() {
            scope.insert(name.to_string(), obj);
        }
        st.info.record_def(&ident, obj);
        (ident, id)
    }

    /// `[A, B any]` 形式の型パラメータリスト
    fn type_params(&self, names: &[&str]) -> (Rc<FieldList>, Vec<TypeParamId>) {
        let (idents, ids): (Vec<_>, Vec<_>) = names
            .iter()
            .enumerate()
            .map(|(index, name)| self.declare_type_param(name, index))
            .unzip();
        let constraint = self.ident("any");
        let list = FieldList::new(vec![Rc::new(Field::new(idents, constraint))]);
        (Rc::new(list), ids)
    }

    // ==================== 識別子と型式 ====================

    /// 名前を解決した識別子式
    pub fn ident(&self, name: &str) -> Rc<Expr> {
        let ident = Ident::new(name);
        let Some(obj) = self.lookup(name) else {
            log::warn!("未定義の名前です: {}", name);
            return Expr::ident(ident);
        };
        let mut guard = self.state.borrow_mut();
        let st = &mut *guard;
        st.info.record_use(&ident, obj);
        let object = st.universe.object(obj);
        let (mode, ty) = match object.kind {
            ObjectKind::TypeName => (Mode::TypeExpr, object.ty.clone()),
            ObjectKind::Builtin => (Mode::Builtin, Type::Invalid),
            _ => (Mode::Value, object.ty.clone()),
        };
        st.info.record_type(ident.id, mode, ty);
        Expr::ident(ident)
    }

    /// `*T`
    pub fn pointer(&self, elem: Rc<Expr>) -> Rc<Expr> {
        let ty = Type::pointer(self.type_of(&elem));
        self.record(&Expr::new(ExprKind::Star(elem)), Mode::TypeExpr, ty)
    }

    /// `[]T`
    pub fn slice_of(&self, elem: Rc<Expr>) -> Rc<Expr> {
        let ty = Type::slice(self.type_of(&elem));
        let e = Expr::new(ExprKind::ArrayType { len: None, elt: elem });
        self.record(&e, Mode::TypeExpr, ty)
    }

    /// `[N]T`
    pub fn array_of(&self, len: u64, elem: Rc<Expr>) -> Rc<Expr> {
        let ty = Type::Array {
            len,
            elem: Box::new(self.type_of(&elem)),
        };
        let len = self.int_lit(len as i64);
        let e = Expr::new(ExprKind::ArrayType {
            len: Some(len),
            elt: elem,
        });
        self.record(&e, Mode::TypeExpr, ty)
    }

    /// `struct { name T; ... }`
    pub fn struct_of(&self, fields: Vec<(&str, Rc<Expr>)>) -> Rc<Expr> {
        let ty = Type::Struct(
            fields
                .iter()
                .map(|(name, ty)| StructField {
                    name: name.to_string(),
                    ty: self.type_of(ty),
                })
                .collect(),
        );
        let list = fields
            .into_iter()
            .map(|(name, ty)| Rc::new(Field::new(vec![Ident::new(name)], ty)))
            .collect();
        let e = Expr::new(ExprKind::StructType(Rc::new(FieldList::new(list))));
        self.record(&e, Mode::TypeExpr, ty)
    }

    /// `func(P...) R...`
    pub fn func_type_expr(&self, params: Vec<Rc<Expr>>, results: Vec<Rc<Expr>>) -> Rc<Expr> {
        let unnamed = |ty: Rc<Expr>| Rc::new(Field::new(Vec::new(), ty));
        let (ft, sig) = self.func_type(
            None,
            params.into_iter().map(unnamed).collect(),
            results.into_iter().map(unnamed).collect(),
        );
        let e = Expr::new(ExprKind::FuncType(ft));
        self.record(&e, Mode::TypeExpr, Type::Signature(sig))
    }

    /// ジェネリック型のインスタンス `Name(T1, T2)`
    pub fn instance(&self, generic: &str, targs: Vec<Rc<Expr>>) -> Rc<Expr> {
        let fun = self.ident(generic);
        let ty = match self.type_of(&fun) {
            Type::Named { obj, .. } => {
                let types = targs.iter().map(|t| self.type_of(t)).collect();
                self.state.borrow().universe.instance(obj, types)
            }
            _ => Type::Invalid,
        };
        let e = Expr::new(ExprKind::Call {
            fun,
            args: targs,
            ellipsis: false,
        });
        self.record(&e, Mode::TypeExpr, ty)
    }

    // ==================== 値の式 ====================

    pub fn int_lit(&self, value: i64) -> Rc<Expr> {
        let e = Expr::new(ExprKind::BasicLit(BasicLit {
            kind: LitKind::Int,
            value: value.to_string(),
        }));
        self.record(&e, Mode::Value, Type::int())
    }

    pub fn string_lit(&self, value: &str) -> Rc<Expr> {
        let e = Expr::new(ExprKind::BasicLit(BasicLit {
            kind: LitKind::String,
            value: format!("{:?}", value),
        }));
        self.record(&e, Mode::Value, Type::string())
    }

    /// 関数呼び出し、型変換、組み込み関数の呼び出し
    pub fn call(&self, fun: Rc<Expr>, args: Vec<Rc<Expr>>) -> Rc<Expr> {
        let (mode, ty) = match self.mode_of(&fun) {
            Some(Mode::TypeExpr) => (Mode::Value, self.type_of(&fun)),
            Some(Mode::Builtin) => self.builtin_result(&fun, &args),
            _ => match self.underlying_of(&fun) {
                Type::Signature(sig) if sig.results.is_empty() => {
                    (Mode::NoValue, Type::Tuple(Vec::new()))
                }
                Type::Signature(sig) => (Mode::Value, sig.result_type()),
                _ => (Mode::Value, Type::Invalid),
            },
        };
        let e = Expr::new(ExprKind::Call {
            fun,
            args,
            ellipsis: false,
        });
        self.record(&e, mode, ty)
    }

    fn builtin_result(&self, fun: &Expr, args: &[Rc<Expr>]) -> (Mode, Type) {
        let first = args
            .first()
            .map(|a| self.type_of(a))
            .unwrap_or(Type::Invalid);
        match fun.as_ident().map(|i| i.name.as_str()) {
            Some("len") | Some("cap") => (Mode::Value, Type::int()),
            Some("make") | Some("append") => (Mode::Value, first),
            Some("new") => (Mode::Value, Type::pointer(first)),
            _ => (Mode::NoValue, Type::Tuple(Vec::new())),
        }
    }

    /// `x.name`（フィールドまたはメソッド）
    pub fn selector(&self, x: Rc<Expr>, name: &str) -> Rc<Expr> {
        let xt = self.type_of(&x);
        let sel = Ident::new(name);
        let found = {
            let st = self.state.borrow();
            st.universe
                .field_type(&xt, name)
                .map(|ty| (None, ty))
                .or_else(|| {
                    st.universe
                        .lookup_method(&xt, name)
                        .map(|(obj, sig)| (Some(obj), Type::Signature(sig)))
                })
        };
        let e = Expr::new(ExprKind::Selector {
            x,
            sel: sel.clone(),
        });
        match found {
            Some((method, ty)) => {
                if let Some(obj) = method {
                    self.state.borrow_mut().info.record_use(&sel, obj);
                }
                self.record(&e, Mode::Value, ty)
            }
            None => {
                log::warn!("{} にフィールドまたはメソッド {} がありません", xt, name);
                e
            }
        }
    }

    /// `x[index]`
    pub fn index(&self, x: Rc<Expr>, index: Rc<Expr>) -> Rc<Expr> {
        let ty = match self.underlying_of(&x) {
            Type::Slice(elem) | Type::Array { elem, .. } => *elem,
            Type::Map { value, .. } => *value,
            Type::Basic(BasicKind::String) => Type::Basic(BasicKind::Uint8),
            _ => Type::Invalid,
        };
        self.record(&Expr::new(ExprKind::Index { x, index }), Mode::Value, ty)
    }

    /// `x[low:high]`
    pub fn slice_expr(
        &self,
        x: Rc<Expr>,
        low: Option<Rc<Expr>>,
        high: Option<Rc<Expr>>,
    ) -> Rc<Expr> {
        let ty = match self.underlying_of(&x) {
            Type::Slice(_) | Type::Basic(BasicKind::String) => self.type_of(&x),
            Type::Array { elem, .. } => Type::Slice(elem),
            _ => Type::Invalid,
        };
        let e = Expr::new(ExprKind::Slice {
            x,
            low,
            high,
            max: None,
            slice3: false,
        });
        self.record(&e, Mode::Value, ty)
    }

    pub fn binary(&self, x: Rc<Expr>, op: BinaryOp, y: Rc<Expr>) -> Rc<Expr> {
        let ty = if op.is_comparison() || matches!(op, BinaryOp::LAnd | BinaryOp::LOr) {
            Type::bool()
        } else {
            self.type_of(&x)
        };
        self.record(&Expr::new(ExprKind::Binary { x, op, y }), Mode::Value, ty)
    }

    pub fn unary(&self, op: UnaryOp, x: Rc<Expr>) -> Rc<Expr> {
        let xt = self.type_of(&x);
        let ty = match op {
            UnaryOp::Addr => Type::pointer(xt),
            UnaryOp::Not => Type::bool(),
            UnaryOp::Recv => xt.elem().cloned().unwrap_or(Type::Invalid),
            UnaryOp::Neg | UnaryOp::Pos | UnaryOp::Xor => xt,
        };
        self.record(&Expr::new(ExprKind::Unary { op, x }), Mode::Value, ty)
    }

    /// `*x`（値の参照外し）
    pub fn deref(&self, x: Rc<Expr>) -> Rc<Expr> {
        let ty = match self.type_of(&x) {
            Type::Pointer(elem) => *elem,
            _ => Type::Invalid,
        };
        self.record(&Expr::new(ExprKind::Star(x)), Mode::Value, ty)
    }

    pub fn paren(&self, x: Rc<Expr>) -> Rc<Expr> {
        let mode = self.mode_of(&x).unwrap_or(Mode::Value);
        let ty = self.type_of(&x);
        self.record(&Expr::new(ExprKind::Paren(x)), mode, ty)
    }

    /// `T{elts...}`
    pub fn composite(&self, ty: Rc<Expr>, elts: Vec<Rc<Expr>>) -> Rc<Expr> {
        let lit_ty = self.type_of(&ty);
        let e = Expr::new(ExprKind::CompositeLit { ty: Some(ty), elts });
        self.record(&e, Mode::Value, lit_ty)
    }

    /// 関数リテラル
    pub fn func_lit(&self, build: impl FnOnce(&Self) -> FuncParts) -> Rc<Expr> {
        let parts = self.scoped(build);
        let (ty, sig) = self.func_type(None, parts.params, parts.results);
        let body = Rc::new(BlockStmt::new(parts.body));
        let e = Expr::new(ExprKind::FuncLit { ty, body });
        self.record(&e, Mode::Value, Type::Signature(sig))
    }

    // ==================== パラメータ ====================

    /// 名前付きパラメータ（現在のスコープに変数を宣言する）
    pub fn param(&self, names: &[&str], ty: Rc<Expr>) -> Rc<Field> {
        let var_ty = self.type_of(&ty);
        let idents = names
            .iter()
            .map(|name| self.declare(name, ObjectKind::Var, var_ty.clone()))
            .collect();
        Rc::new(Field::new(idents, ty))
    }

    /// 名前の無い結果
    pub fn result(&self, ty: Rc<Expr>) -> Rc<Field> {
        Rc::new(Field::new(Vec::new(), ty))
    }

    fn func_type(
        &self,
        tparams: Option<Rc<FieldList>>,
        params: Vec<Rc<Field>>,
        results: Vec<Rc<Field>>,
    ) -> (Rc<FuncType>, Signature) {
        let flatten = |fields: &[Rc<Field>]| -> Vec<Type> {
            fields
                .iter()
                .flat_map(|f| {
                    let ty = self.type_of(&f.ty);
                    std::iter::repeat(ty).take(f.names.len().max(1))
                })
                .collect()
        };
        let sig = Signature {
            params: flatten(&params),
            results: flatten(&results),
            variadic: false,
        };
        let ft = FuncType {
            tparams,
            params: Rc::new(FieldList::new(params)),
            results: (!results.is_empty()).then(|| Rc::new(FieldList::new(results))),
            span: Span::dummy(),
        };
        (Rc::new(ft), sig)
    }

    // ==================== 文 ====================

    pub fn expr_stmt(&self, x: Rc<Expr>) -> Rc<Stmt> {
        Stmt::new(StmtKind::Expr(x))
    }

    /// `lhs = rhs`
    pub fn assign(&self, lhs: Vec<Rc<Expr>>, rhs: Vec<Rc<Expr>>) -> Rc<Stmt> {
        Stmt::new(StmtKind::Assign {
            lhs,
            tok: AssignOp::Assign,
            rhs,
        })
    }

    /// `names := rhs`
    pub fn define(&self, names: &[&str], rhs: Vec<Rc<Expr>>) -> Rc<Stmt> {
        let types: Vec<Type> = match rhs.as_slice() {
            [single] if names.len() > 1 => match self.type_of(single) {
                Type::Tuple(types) => types,
                ty => vec![ty],
            },
            _ => rhs.iter().map(|e| self.type_of(e)).collect(),
        };
        let lhs = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let ty = types.get(i).cloned().unwrap_or(Type::Invalid);
                self.define_expr(name, ty)
            })
            .collect();
        Stmt::new(StmtKind::Assign {
            lhs,
            tok: AssignOp::Define,
            rhs,
        })
    }

    fn define_expr(&self, name: &str, ty: Type) -> Rc<Expr> {
        let ident = self.declare(name, ObjectKind::Var, ty.clone());
        let blank = ident.is_blank();
        let e = Expr::ident(ident);
        if blank {
            return e;
        }
        self.record(&e, Mode::Value, ty)
    }

    pub fn inc(&self, x: Rc<Expr>) -> Rc<Stmt> {
        Stmt::new(StmtKind::IncDec { x, inc: true })
    }

    pub fn dec(&self, x: Rc<Expr>) -> Rc<Stmt> {
        Stmt::new(StmtKind::IncDec { x, inc: false })
    }

    pub fn ret(&self, results: Vec<Rc<Expr>>) -> Rc<Stmt> {
        Stmt::new(StmtKind::Return(results))
    }

    /// 新しいスコープのブロック
    pub fn block(&self, build: impl FnOnce(&Self) -> Vec<Rc<Stmt>>) -> Rc<BlockStmt> {
        Rc::new(BlockStmt::new(self.scoped(build)))
    }

    pub fn block_stmt(&self, block: Rc<BlockStmt>) -> Rc<Stmt> {
        Stmt::new(StmtKind::Block(block))
    }

    pub fn if_stmt(
        &self,
        cond: Rc<Expr>,
        body: Rc<BlockStmt>,
        els: Option<Rc<Stmt>>,
    ) -> Rc<Stmt> {
        Stmt::new(StmtKind::If {
            init: None,
            cond,
            body,
            els,
        })
    }

    /// `for init; cond; post { ... }`（`init` の変数は呼び出し側で `scoped` に入れる）
    pub fn for_stmt(
        &self,
        init: Option<Rc<Stmt>>,
        cond: Option<Rc<Expr>>,
        post: Option<Rc<Stmt>>,
        body: Rc<BlockStmt>,
    ) -> Rc<Stmt> {
        Stmt::new(StmtKind::For {
            init,
            cond,
            post,
            body,
        })
    }

    /// `for key, value := range x { ... }`
    pub fn range_stmt(
        &self,
        key: &str,
        value: Option<&str>,
        x: Rc<Expr>,
        build: impl FnOnce(&Self) -> Vec<Rc<Stmt>>,
    ) -> Rc<Stmt> {
        let (key_ty, value_ty) = match self.underlying_of(&x) {
            Type::Slice(elem) | Type::Array { elem, .. } => (Type::int(), *elem),
            Type::Map { key, value } => (*key, *value),
            Type::Basic(BasicKind::String) => (Type::int(), Type::Basic(BasicKind::Int32)),
            _ => (Type::Invalid, Type::Invalid),
        };
        self.scoped(|b| {
            let key = b.define_expr(key, key_ty);
            let value = value.map(|v| b.define_expr(v, value_ty));
            let body = Rc::new(BlockStmt::new(build(b)));
            Stmt::new(StmtKind::Range {
                key: Some(key),
                value,
                tok: Some(AssignOp::Define),
                x,
                body,
            })
        })
    }

    /// `var name T = value`
    pub fn var_stmt(&self, name: &str, ty: Option<Rc<Expr>>, value: Option<Rc<Expr>>) -> Rc<Stmt> {
        let var_ty = ty
            .as_ref()
            .or(value.as_ref())
            .map(|e| self.type_of(e))
            .unwrap_or(Type::Invalid);
        let ident = self.declare(name, ObjectKind::Var, var_ty);
        let spec = ValueSpec {
            doc: Vec::new(),
            names: vec![ident],
            ty,
            values: value.into_iter().collect(),
            comment: Vec::new(),
        };
        Stmt::new(StmtKind::Decl(Decl::Gen(Rc::new(GenDecl {
            doc: Vec::new(),
            tok: DeclKeyword::Var,
            specs: vec![Spec::Value(Rc::new(spec))],
            span: Span::dummy(),
        }))))
    }

    // ==================== 宣言 ====================

    /// トップレベル関数。`tparams` が空でなければジェネリック関数
    pub fn func_decl(
        &self,
        name: &str,
        tparams: &[&str],
        build: impl FnOnce(&Self) -> FuncParts,
    ) -> Rc<FuncDecl> {
        let doc = self.take_doc();
        let (ident, obj) = self.declare_package(name, ObjectKind::Func);
        let (tparam_list, parts) = self.scoped(|b| {
            let list = (!tparams.is_empty()).then(|| b.type_params(tparams).0);
            (list, build(b))
        });
        let (ty, sig) = self.func_type(tparam_list, parts.params, parts.results);

        let decl = Rc::new(FuncDecl {
            doc,
            recv: None,
            name: ident,
            ty,
            body: Some(Rc::new(BlockStmt::new(parts.body))),
            span: Span::dummy(),
        });
        let mut st = self.state.borrow_mut();
        st.universe.set_object_type(obj, Type::Signature(sig));
        st.package.decls.push(Decl::Func(decl.clone()));
        decl
    }

    /// 型宣言。`tparams` が空でなければジェネリック型
    pub fn type_decl(
        &self,
        name: &str,
        tparams: &[&str],
        build: impl FnOnce(&Self) -> Rc<Expr>,
    ) -> ObjectId {
        let doc = self.take_doc();
        let ident = Ident::new(name);
        let obj = {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let obj = st.universe.new_named(name, Some(st.package.id));
            st.package.scope.insert(name.to_string(), obj);
            st.info.record_def(&ident, obj);
            obj
        };
        let (tparam_list, ty) = self.scoped(|b| {
            let list = if tparams.is_empty() {
                None
            } else {
                let (list, ids) = b.type_params(tparams);
                b.state
                    .borrow_mut()
                    .universe
                    .set_named_type_params(obj, ids);
                Some(list)
            };
            (list, build(b))
        });

        let underlying = self.underlying_of(&ty);
        let spec = TypeSpec {
            doc,
            name: ident,
            tparams: tparam_list,
            assign: false,
            ty,
            comment: Vec::new(),
        };
        let mut st = self.state.borrow_mut();
        st.universe.set_underlying(obj, underlying);
        st.package.decls.push(Decl::Gen(Rc::new(GenDecl {
            doc: Vec::new(),
            tok: DeclKeyword::Type,
            specs: vec![Spec::Type(Rc::new(spec))],
            span: Span::dummy(),
        })));
        obj
    }

    /// メソッド宣言 `func (recv *Type(A, B)) name(...)`
    ///
    /// `tparams` はレシーバーで宣言する型パラメータの名前。
    pub fn method_decl(
        &self,
        type_obj: ObjectId,
        recv_name: &str,
        pointer: bool,
        tparams: &[&str],
        name: &str,
        build: impl FnOnce(&Self) -> FuncParts,
    ) -> Rc<FuncDecl> {
        let doc = self.take_doc();
        let name_ident = Ident::new(name);
        let (type_name, method_obj) = {
            let mut guard = self.state.borrow_mut();
            let st = &mut *guard;
            let method_obj =
                st.universe
                    .new_object(name, ObjectKind::Func, Some(st.package.id), Type::Invalid);
            st.info.record_def(&name_ident, method_obj);
            (st.universe.object(type_obj).name.clone(), method_obj)
        };

        let (recv, parts) = self.scoped(|b| {
            let mut recv_params = Vec::new();
            let mut args = Vec::new();
            for (index, tparam) in tparams.iter().enumerate() {
                let (ident, id) = b.declare_type_param(tparam, index);
                let ty = Type::TypeParam {
                    id,
                    name: tparam.to_string(),
                };
                let arg = Expr::ident(ident);
                b.record(&arg, Mode::TypeExpr, ty);
                recv_params.push(id);
                args.push(arg);
            }
            // 本体から自分自身を呼べるよう先に登録する
            b.state.borrow_mut().universe.add_method(
                type_obj,
                MethodInfo {
                    obj: method_obj,
                    recv_params: recv_params.clone(),
                    pointer,
                },
            );

            let fun = b.ident(&type_name);
            let base = if args.is_empty() {
                fun
            } else {
                let targs = args.iter().map(|a| b.type_of(a)).collect();
                let ty = b.state.borrow().universe.instance(type_obj, targs);
                let call = Expr::new(ExprKind::Call {
                    fun,
                    args,
                    ellipsis: false,
                });
                b.record(&call, Mode::TypeExpr, ty)
            };
            let rtype = if pointer { b.pointer(base) } else { base };
            let field = b.param(&[recv_name], rtype);
            (Rc::new(FieldList::new(vec![field])), build(b))
        });
        let (ty, sig) = self.func_type(None, parts.params, parts.results);

        let decl = Rc::new(FuncDecl {
            doc,
            recv: Some(recv),
            name: name_ident,
            ty,
            body: Some(Rc::new(BlockStmt::new(parts.body))),
            span: Span::dummy(),
        });
        let mut st = self.state.borrow_mut();
        st.universe
            .set_object_type(method_obj, Type::Signature(sig));
        st.package.decls.push(Decl::Func(decl.clone()));
        decl
    }
}
