//! 構文木の書き換え
//!
//! 型引数の束縛を宣言・文・式・フィールドリストに適用する。
//! 子が1つも変わらなかったノードは元の `Rc` をそのまま返す。

use std::rc::Rc;

use crate::ast::*;
use crate::error::{InvariantViolation, MonoError, MonoResult};

use super::substitution::instantiate_type;
use super::{Translator, TypeArgs};

fn unsupported(category: &'static str, kind: &'static str) -> MonoError {
    InvariantViolation::Unsupported { category, kind }.into()
}

fn rebuild(old: &Expr, kind: ExprKind) -> Rc<Expr> {
    Expr::with_span(kind, old.span)
}

impl Translator {
    /// 宣言を書き換える（関数本体の中の `var` / `const` のみ）
    pub(crate) fn instantiate_decl(&mut self, ta: &TypeArgs, decl: &Decl) -> MonoResult<Decl> {
        match decl {
            Decl::Gen(gen) => {
                if gen.specs.is_empty() {
                    return Ok(decl.clone());
                }
                let mut specs = Vec::with_capacity(gen.specs.len());
                let mut changed = false;
                for spec in &gen.specs {
                    let new_spec = self.instantiate_spec(ta, spec)?;
                    changed |= !new_spec.ptr_eq(spec);
                    specs.push(new_spec);
                }
                if !changed {
                    return Ok(decl.clone());
                }
                Ok(Decl::Gen(Rc::new(GenDecl {
                    doc: gen.doc.clone(),
                    tok: gen.tok,
                    specs,
                    span: gen.span,
                })))
            }
            Decl::Func(_) => Err(unsupported("宣言", decl.name())),
        }
    }

    pub(crate) fn instantiate_spec(&mut self, ta: &TypeArgs, spec: &Spec) -> MonoResult<Spec> {
        match spec {
            Spec::Value(vs) => {
                let ty = self.instantiate_opt_expr(ta, &vs.ty)?;
                let values = self.instantiate_expr_list(ta, &vs.values)?;
                if same_opt(&ty, &vs.ty) && same_list(&values, &vs.values) {
                    return Ok(spec.clone());
                }
                Ok(Spec::Value(Rc::new(ValueSpec {
                    doc: vs.doc.clone(),
                    names: vs.names.clone(),
                    ty,
                    values,
                    comment: vs.comment.clone(),
                })))
            }
            Spec::Type(_) | Spec::Import(_) => Err(unsupported("宣言仕様", spec.name())),
        }
    }

    pub(crate) fn instantiate_stmt(&mut self, ta: &TypeArgs, stmt: &Rc<Stmt>) -> MonoResult<Rc<Stmt>> {
        let kind = match &stmt.kind {
            StmtKind::Block(block) => {
                let new_block = self.instantiate_block(ta, block)?;
                if Rc::ptr_eq(&new_block, block) {
                    return Ok(stmt.clone());
                }
                StmtKind::Block(new_block)
            }
            StmtKind::Expr(x) => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(stmt.clone());
                }
                StmtKind::Expr(new_x)
            }
            StmtKind::Decl(decl) => {
                let new_decl = self.instantiate_decl(ta, decl)?;
                if new_decl.ptr_eq(decl) {
                    return Ok(stmt.clone());
                }
                StmtKind::Decl(new_decl)
            }
            StmtKind::IncDec { x, inc } => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(stmt.clone());
                }
                StmtKind::IncDec {
                    x: new_x,
                    inc: *inc,
                }
            }
            StmtKind::Assign { lhs, tok, rhs } => {
                let new_lhs = self.instantiate_expr_list(ta, lhs)?;
                let new_rhs = self.instantiate_expr_list(ta, rhs)?;
                if same_list(&new_lhs, lhs) && same_list(&new_rhs, rhs) {
                    return Ok(stmt.clone());
                }
                StmtKind::Assign {
                    lhs: new_lhs,
                    tok: *tok,
                    rhs: new_rhs,
                }
            }
            StmtKind::If {
                init,
                cond,
                body,
                els,
            } => {
                let new_init = self.instantiate_opt_stmt(ta, init)?;
                let new_cond = self.instantiate_expr(ta, cond)?;
                let new_body = self.instantiate_block(ta, body)?;
                let new_els = self.instantiate_opt_stmt(ta, els)?;
                if same_opt(&new_init, init)
                    && Rc::ptr_eq(&new_cond, cond)
                    && Rc::ptr_eq(&new_body, body)
                    && same_opt(&new_els, els)
                {
                    return Ok(stmt.clone());
                }
                StmtKind::If {
                    init: new_init,
                    cond: new_cond,
                    body: new_body,
                    els: new_els,
                }
            }
            StmtKind::For {
                init,
                cond,
                post,
                body,
            } => {
                let new_init = self.instantiate_opt_stmt(ta, init)?;
                let new_cond = self.instantiate_opt_expr(ta, cond)?;
                let new_post = self.instantiate_opt_stmt(ta, post)?;
                let new_body = self.instantiate_block(ta, body)?;
                if same_opt(&new_init, init)
                    && same_opt(&new_cond, cond)
                    && same_opt(&new_post, post)
                    && Rc::ptr_eq(&new_body, body)
                {
                    return Ok(stmt.clone());
                }
                StmtKind::For {
                    init: new_init,
                    cond: new_cond,
                    post: new_post,
                    body: new_body,
                }
            }
            StmtKind::Range {
                key,
                value,
                tok,
                x,
                body,
            } => {
                let new_key = self.instantiate_opt_expr(ta, key)?;
                let new_value = self.instantiate_opt_expr(ta, value)?;
                let new_x = self.instantiate_expr(ta, x)?;
                let new_body = self.instantiate_block(ta, body)?;
                if same_opt(&new_key, key)
                    && same_opt(&new_value, value)
                    && Rc::ptr_eq(&new_x, x)
                    && Rc::ptr_eq(&new_body, body)
                {
                    return Ok(stmt.clone());
                }
                StmtKind::Range {
                    key: new_key,
                    value: new_value,
                    tok: *tok,
                    x: new_x,
                    body: new_body,
                }
            }
            StmtKind::Return(results) => {
                let new_results = self.instantiate_expr_list(ta, results)?;
                if same_list(&new_results, results) {
                    return Ok(stmt.clone());
                }
                StmtKind::Return(new_results)
            }
            StmtKind::Go(_)
            | StmtKind::Defer(_)
            | StmtKind::Send { .. }
            | StmtKind::Branch { .. }
            | StmtKind::Labeled { .. }
            | StmtKind::Switch { .. }
            | StmtKind::Case { .. }
            | StmtKind::Empty => return Err(unsupported("文", stmt.kind.name())),
        };
        Ok(Rc::new(Stmt {
            span: stmt.span,
            kind,
        }))
    }

    fn instantiate_opt_stmt(
        &mut self,
        ta: &TypeArgs,
        stmt: &Option<Rc<Stmt>>,
    ) -> MonoResult<Option<Rc<Stmt>>> {
        stmt.as_ref()
            .map(|s| self.instantiate_stmt(ta, s))
            .transpose()
    }

    pub(crate) fn instantiate_block(
        &mut self,
        ta: &TypeArgs,
        block: &Rc<BlockStmt>,
    ) -> MonoResult<Rc<BlockStmt>> {
        let list = block
            .list
            .iter()
            .map(|s| self.instantiate_stmt(ta, s))
            .collect::<MonoResult<Vec<_>>>()?;
        if same_list(&list, &block.list) {
            return Ok(block.clone());
        }
        Ok(Rc::new(BlockStmt {
            list,
            span: block.span,
        }))
    }

    /// フィールドリスト（パラメータ、構造体フィールド、レシーバー）を書き換える
    pub(crate) fn instantiate_field_list(
        &mut self,
        ta: &TypeArgs,
        fields: &Rc<FieldList>,
    ) -> MonoResult<Rc<FieldList>> {
        let list = fields
            .list
            .iter()
            .map(|f| self.instantiate_field(ta, f))
            .collect::<MonoResult<Vec<_>>>()?;
        if same_list(&list, &fields.list) {
            return Ok(fields.clone());
        }
        Ok(Rc::new(FieldList {
            list,
            span: fields.span,
        }))
    }

    fn instantiate_opt_field_list(
        &mut self,
        ta: &TypeArgs,
        fields: &Option<Rc<FieldList>>,
    ) -> MonoResult<Option<Rc<FieldList>>> {
        fields
            .as_ref()
            .map(|f| self.instantiate_field_list(ta, f))
            .transpose()
    }

    fn instantiate_field(&mut self, ta: &TypeArgs, field: &Rc<Field>) -> MonoResult<Rc<Field>> {
        let ty = self.instantiate_expr(ta, &field.ty)?;
        if Rc::ptr_eq(&ty, &field.ty) {
            return Ok(field.clone());
        }
        Ok(Rc::new(Field {
            doc: field.doc.clone(),
            names: field.names.clone(),
            ty,
            tag: field.tag.clone(),
            comment: field.comment.clone(),
        }))
    }

    /// 関数型を書き換える。型パラメータリストは常に取り除く
    pub(crate) fn instantiate_func_type(
        &mut self,
        ta: &TypeArgs,
        ft: &Rc<FuncType>,
    ) -> MonoResult<Rc<FuncType>> {
        let params = self.instantiate_field_list(ta, &ft.params)?;
        let results = self.instantiate_opt_field_list(ta, &ft.results)?;
        if ft.tparams.is_none() && Rc::ptr_eq(&params, &ft.params) && same_opt(&results, &ft.results)
        {
            return Ok(ft.clone());
        }
        Ok(Rc::new(FuncType {
            tparams: None,
            params,
            results,
            span: ft.span,
        }))
    }

    pub(crate) fn instantiate_expr_list(
        &mut self,
        ta: &TypeArgs,
        list: &[Rc<Expr>],
    ) -> MonoResult<Vec<Rc<Expr>>> {
        list.iter().map(|e| self.instantiate_expr(ta, e)).collect()
    }

    fn instantiate_opt_expr(
        &mut self,
        ta: &TypeArgs,
        expr: &Option<Rc<Expr>>,
    ) -> MonoResult<Option<Rc<Expr>>> {
        expr.as_ref()
            .map(|e| self.instantiate_expr(ta, e))
            .transpose()
    }

    /// 式を書き換える
    pub(crate) fn instantiate_expr(&mut self, ta: &TypeArgs, e: &Rc<Expr>) -> MonoResult<Rc<Expr>> {
        let kind = match &e.kind {
            ExprKind::Ident(ident) => {
                let bound = ta.info().object_of(ident).and_then(|obj| ta.ast(obj));
                return Ok(bound.cloned().unwrap_or_else(|| e.clone()));
            }
            ExprKind::BasicLit(_) => return Ok(e.clone()),
            ExprKind::FuncLit { ty, body } => {
                let new_ty = self.instantiate_func_type(ta, ty)?;
                let new_body = self.instantiate_block(ta, body)?;
                if Rc::ptr_eq(&new_ty, ty) && Rc::ptr_eq(&new_body, body) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(
                    e,
                    ExprKind::FuncLit {
                        ty: new_ty,
                        body: new_body,
                    },
                ));
            }
            ExprKind::CompositeLit { ty, elts } => {
                let new_ty = self.instantiate_opt_expr(ta, ty)?;
                let new_elts = self.instantiate_expr_list(ta, elts)?;
                if same_opt(&new_ty, ty) && same_list(&new_elts, elts) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(
                    e,
                    ExprKind::CompositeLit {
                        ty: new_ty,
                        elts: new_elts,
                    },
                ));
            }
            ExprKind::Paren(x) => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(e, ExprKind::Paren(new_x)));
            }
            ExprKind::FuncType(ft) => {
                let new_ft = self.instantiate_func_type(ta, ft)?;
                if Rc::ptr_eq(&new_ft, ft) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(e, ExprKind::FuncType(new_ft)));
            }
            ExprKind::ArrayType { len, elt } => {
                let new_len = self.instantiate_opt_expr(ta, len)?;
                let new_elt = self.instantiate_expr(ta, elt)?;
                if same_opt(&new_len, len) && Rc::ptr_eq(&new_elt, elt) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(
                    e,
                    ExprKind::ArrayType {
                        len: new_len,
                        elt: new_elt,
                    },
                ));
            }
            ExprKind::StructType(fields) => {
                let new_fields = self.instantiate_field_list(ta, fields)?;
                if Rc::ptr_eq(&new_fields, fields) {
                    return Ok(e.clone());
                }
                return Ok(rebuild(e, ExprKind::StructType(new_fields)));
            }

            // ここから下は値を表す式で、書き換えた後に型を引き継ぐ
            ExprKind::Selector { x, sel } => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(e.clone());
                }
                ExprKind::Selector {
                    x: new_x,
                    sel: sel.clone(),
                }
            }
            ExprKind::Star(x) => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(e.clone());
                }
                ExprKind::Star(new_x)
            }
            ExprKind::Unary { op, x } => {
                let new_x = self.instantiate_expr(ta, x)?;
                if Rc::ptr_eq(&new_x, x) {
                    return Ok(e.clone());
                }
                ExprKind::Unary { op: *op, x: new_x }
            }
            ExprKind::Binary { x, op, y } => {
                let new_x = self.instantiate_expr(ta, x)?;
                let new_y = self.instantiate_expr(ta, y)?;
                if Rc::ptr_eq(&new_x, x) && Rc::ptr_eq(&new_y, y) {
                    return Ok(e.clone());
                }
                ExprKind::Binary {
                    x: new_x,
                    op: *op,
                    y: new_y,
                }
            }
            ExprKind::Index { x, index } => {
                let new_x = self.instantiate_expr(ta, x)?;
                let new_index = self.instantiate_expr(ta, index)?;
                if Rc::ptr_eq(&new_x, x) && Rc::ptr_eq(&new_index, index) {
                    return Ok(e.clone());
                }
                ExprKind::Index {
                    x: new_x,
                    index: new_index,
                }
            }
            ExprKind::Slice {
                x,
                low,
                high,
                max,
                slice3,
            } => {
                let new_x = self.instantiate_expr(ta, x)?;
                let new_low = self.instantiate_opt_expr(ta, low)?;
                let new_high = self.instantiate_opt_expr(ta, high)?;
                let new_max = self.instantiate_opt_expr(ta, max)?;
                if Rc::ptr_eq(&new_x, x)
                    && same_opt(&new_low, low)
                    && same_opt(&new_high, high)
                    && same_opt(&new_max, max)
                {
                    return Ok(e.clone());
                }
                ExprKind::Slice {
                    x: new_x,
                    low: new_low,
                    high: new_high,
                    max: new_max,
                    slice3: *slice3,
                }
            }
            ExprKind::Call {
                fun,
                args,
                ellipsis,
            } => {
                let new_fun = self.instantiate_expr(ta, fun)?;
                let new_args = self.instantiate_expr_list(ta, args)?;
                if Rc::ptr_eq(&new_fun, fun) && same_list(&new_args, args) {
                    return Ok(e.clone());
                }
                ExprKind::Call {
                    fun: new_fun,
                    args: new_args,
                    ellipsis: *ellipsis,
                }
            }

            ExprKind::KeyValue { .. }
            | ExprKind::TypeAssert { .. }
            | ExprKind::Ellipsis(_)
            | ExprKind::MapType { .. }
            | ExprKind::ChanType { .. }
            | ExprKind::InterfaceType(_) => return Err(unsupported("式", e.kind.name())),
        };

        let new = rebuild(e, kind);
        if let Some(tv) = self.lookup_type(ta, e.id) {
            let ty = instantiate_type(ta, &tv.ty);
            self.set_type(new.id, tv.mode, ty);
        }
        Ok(new)
    }
}
