//! インスタンス化処理

use std::rc::Rc;

use crate::ast::*;
use crate::error::{InvariantViolation, MonoError, MonoResult};
use crate::types::{Info, MethodInfo, Mode, ObjectId, ObjectKind, Type};

use super::substitution::instantiate_type;
use super::{QualifiedIdent, Translator, TypeArgs};

impl Translator {
    /// ジェネリック関数をインスタンス化し、新しい関数の識別子を返す
    ///
    /// `exprs` は型引数の構文（空でもよい）、`types` は具体的な型。
    pub fn instantiate_function(
        &mut self,
        qid: &QualifiedIdent,
        exprs: &[Rc<Expr>],
        types: &[Type],
    ) -> MonoResult<Ident> {
        self.guard(|t| t.instantiate_function_decl(qid, exprs, types))
    }

    fn instantiate_function_decl(
        &mut self,
        qid: &QualifiedIdent,
        exprs: &[Rc<Expr>],
        types: &[Type],
    ) -> MonoResult<Ident> {
        let name = self.instantiated_name(qid, types)?;
        let (obj, decl) = self.find_func_decl(qid)?;
        let info = self
            .info_for_id(qid)
            .ok_or_else(|| MonoError::NoTypeInfo {
                name: self.describe(qid),
            })?;
        log::debug!("関数 {} を {} としてインスタンス化", self.describe(qid), name);

        let tparams = decl
            .ty
            .tparams
            .as_ref()
            .map(|fl| fl.list.as_slice())
            .unwrap_or_default();
        let ta = TypeArgs::from_fields(&self.universe, info, exprs, types, tparams)?;

        let recv = match &decl.recv {
            Some(recv) => Some(self.instantiate_field_list(&ta, recv)?),
            None => None,
        };
        let ty = self.instantiate_func_type(&ta, &decl.ty)?;
        let body = match &decl.body {
            Some(body) => Some(self.instantiate_block(&ta, body)?),
            None => None,
        };

        let inst_ident = Ident::new(name.clone());
        let sig = instantiate_type(&ta, &self.universe.object(obj).ty);
        let new_obj = self
            .universe
            .new_object(name, ObjectKind::Func, Some(self.current), sig);
        self.synthesized.record_def(&inst_ident, new_obj);

        self.new_decls.push(Decl::Func(Rc::new(FuncDecl {
            doc: decl.doc.clone(),
            recv,
            name: inst_ident.clone(),
            ty,
            body,
            span: decl.span,
        })));
        log::debug!("関数 {} を生成しました", inst_ident);
        Ok(inst_ident)
    }

    /// ジェネリック型をインスタンス化し、新しい型の識別子と型を返す
    ///
    /// 型に宣言されたメソッドもすべてインスタンス化する。生成された宣言は
    /// メソッドまで含めてすべて書き換えが終わってから出力に追加される。
    pub fn instantiate_type_decl(
        &mut self,
        qid: &QualifiedIdent,
        typ: &Type,
        exprs: &[Rc<Expr>],
        types: &[Type],
    ) -> MonoResult<(Ident, Type)> {
        self.guard(|t| t.instantiate_type_spec(qid, typ, exprs, types))
    }

    fn instantiate_type_spec(
        &mut self,
        qid: &QualifiedIdent,
        typ: &Type,
        exprs: &[Rc<Expr>],
        types: &[Type],
    ) -> MonoResult<(Ident, Type)> {
        let generic = match typ {
            Type::Named { obj, .. } => self.universe.named(*obj).cloned(),
            _ => None,
        }
        .ok_or_else(|| InvariantViolation::NotNamedType {
            name: typ.to_string(),
        })?;

        let name = self.instantiated_name(qid, types)?;
        let spec = self.find_type_spec(qid)?;
        let info = self
            .info_for_id(qid)
            .ok_or_else(|| MonoError::NoTypeInfo {
                name: self.describe(qid),
            })?;
        log::debug!("型 {} を {} としてインスタンス化", self.describe(qid), name);

        let tparams = spec
            .tparams
            .as_ref()
            .map(|fl| fl.list.as_slice())
            .unwrap_or_default();
        let ta = TypeArgs::from_fields(&self.universe, info.clone(), exprs, types, tparams)?;

        let inst_ident = Ident::new(name.clone());
        let new_spec = TypeSpec {
            doc: spec.doc.clone(),
            name: inst_ident.clone(),
            tparams: None,
            assign: spec.assign,
            ty: self.instantiate_expr(&ta, &spec.ty)?,
            comment: spec.comment.clone(),
        };
        let mut emitted = vec![Decl::Gen(Rc::new(GenDecl {
            doc: Vec::new(),
            tok: DeclKeyword::Type,
            specs: vec![Spec::Type(Rc::new(new_spec))],
            span: Span::dummy(),
        }))];

        // メソッドの書き換え中に型を引けるよう、基底型を先に確定させる
        let new_obj = self.universe.new_named(&name, Some(self.current));
        self.universe
            .set_underlying(new_obj, instantiate_type(&ta, &generic.underlying));
        self.synthesized.record_def(&inst_ident, new_obj);
        let inst_type = self.universe.object(new_obj).ty.clone();

        for method in &generic.methods {
            let decl = self.instantiate_method(
                method.obj, &name, new_obj, &inst_type, &info, exprs, types,
            )?;
            emitted.push(decl);
        }

        log::debug!(
            "型 {} とメソッド {} 個を生成しました",
            inst_ident,
            generic.methods.len()
        );
        self.new_decls.extend(emitted);
        Ok((inst_ident, inst_type))
    }

    /// インスタンス化した型のメソッドを1つ作る
    ///
    /// メソッドの型パラメータはレシーバー `Pair(A, B)` の引数で宣言されるので、
    /// 型の束縛とは別にレシーバーから束縛を作り直す。
    #[allow(clippy::too_many_arguments)]
    fn instantiate_method(
        &mut self,
        method: ObjectId,
        type_name: &str,
        new_type: ObjectId,
        inst_type: &Type,
        info: &Rc<Info>,
        exprs: &[Rc<Expr>],
        types: &[Type],
    ) -> MonoResult<Decl> {
        let method_name = self.universe.object(method).name.clone();
        let mast = self.importer.lookup_func(method).ok_or_else(|| {
            InvariantViolation::MissingMethodSyntax {
                name: method_name.clone(),
            }
        })?;
        let malformed = || InvariantViolation::MalformedReceiver {
            name: method_name.clone(),
        };

        let recv_field = mast
            .recv
            .as_ref()
            .and_then(|recv| recv.list.first())
            .ok_or_else(malformed)?;
        let (rtyp, pointer) = match &recv_field.ty.kind {
            ExprKind::Star(x) => (x, true),
            _ => (&recv_field.ty, false),
        };
        let ExprKind::Call { args, .. } = &rtyp.kind else {
            return Err(malformed().into());
        };
        let ta = TypeArgs::from_exprs(&self.universe, info.clone(), exprs, types, args)?;

        let base_ident = Ident::new(type_name);
        self.synthesized.record_use(&base_ident, new_type);
        let base = Expr::ident(base_ident);
        self.set_type(base.id, Mode::TypeExpr, inst_type.clone());
        let new_rtype = if pointer {
            let star = Expr::new(ExprKind::Star(base));
            self.set_type(star.id, Mode::TypeExpr, Type::pointer(inst_type.clone()));
            star
        } else {
            base
        };
        let recv = FieldList::new(vec![Rc::new(Field {
            doc: recv_field.doc.clone(),
            names: recv_field.names.first().cloned().into_iter().collect(),
            ty: new_rtype,
            tag: None,
            comment: recv_field.comment.clone(),
        })]);

        let ty = self.instantiate_func_type(&ta, &mast.ty)?;
        let body = match &mast.body {
            Some(body) => Some(self.instantiate_block(&ta, body)?),
            None => None,
        };

        let method_ident = Ident::new(mast.name.name.clone());
        let sig = instantiate_type(&ta, &self.universe.object(method).ty);
        let new_method =
            self.universe
                .new_object(method_name, ObjectKind::Func, Some(self.current), sig);
        self.universe.add_method(
            new_type,
            MethodInfo {
                obj: new_method,
                recv_params: Vec::new(),
                pointer,
            },
        );
        self.synthesized.record_def(&method_ident, new_method);

        Ok(Decl::Func(Rc::new(FuncDecl {
            doc: mast.doc.clone(),
            recv: Some(Rc::new(recv)),
            name: method_ident,
            ty,
            body,
            span: mast.span,
        })))
    }

    /// 修飾識別子が指す関数宣言
    fn find_func_decl(&self, qid: &QualifiedIdent) -> MonoResult<(ObjectId, Rc<FuncDecl>)> {
        let obj = self
            .find_types_object(qid)
            .ok_or_else(|| MonoError::ObjectNotFound {
                name: self.describe(qid),
            })?;
        let decl = self
            .importer
            .lookup_func(obj)
            .ok_or_else(|| MonoError::FuncNotFound {
                name: self.describe(qid),
            })?;
        Ok((obj, decl))
    }

    /// 修飾識別子が指す型宣言
    fn find_type_spec(&self, qid: &QualifiedIdent) -> MonoResult<Rc<TypeSpec>> {
        let obj = self
            .find_types_object(qid)
            .ok_or_else(|| MonoError::ObjectNotFound {
                name: self.describe(qid),
            })?;
        self.importer
            .lookup_type_spec(obj)
            .ok_or_else(|| MonoError::TypeSpecNotFound {
                name: self.describe(qid),
            })
    }
}
