//! 型引数の束縛
//!
//! 1回のインスタンス化で、型パラメータをどの構文・型に置き換えるかを保持する。

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Expr, Field, Ident};
use crate::error::{InvariantViolation, MonoResult};
use crate::types::{Info, ObjectId, Type, TypeParamId, Universe};

/// インスタンス化中の型引数
///
/// 型パラメータを宣言した識別子のオブジェクトからは構文を、
/// 型パラメータそのものからは具体的な型を引ける。
#[derive(Debug, Clone)]
pub struct TypeArgs {
    /// 順序どおりの型引数
    types: Vec<Type>,
    /// インスタンス化する宣言を含むパッケージの型情報
    info: Rc<Info>,
    to_ast: HashMap<ObjectId, Rc<Expr>>,
    to_typ: HashMap<TypeParamId, Type>,
}

impl TypeArgs {
    fn new(types: &[Type], info: Rc<Info>) -> Self {
        Self {
            types: types.to_vec(),
            info,
            to_ast: HashMap::new(),
            to_typ: HashMap::new(),
        }
    }

    /// 宣言の型パラメータリストから束縛を作る
    ///
    /// `[A, B any]` のように1つのフィールドが複数の名前を持つ場合も、
    /// 名前ごとに位置を数える。`exprs` が空なら構文の置き換えは行わない。
    pub fn from_fields(
        universe: &Universe,
        info: Rc<Info>,
        exprs: &[Rc<Expr>],
        types: &[Type],
        tparams: &[Rc<Field>],
    ) -> MonoResult<Self> {
        let declared = tparams.iter().map(|f| f.names.len()).sum();
        check_arity(declared, exprs, types)?;

        let mut ta = Self::new(types, info);
        let names = tparams.iter().flat_map(|f| f.names.iter());
        for (index, name) in names.enumerate() {
            let obj = ta.defined_object(name)?;
            let param = type_param_of(universe, obj)?;
            ta.add(obj, param, exprs.get(index).cloned(), types[index].clone());
        }
        Ok(ta)
    }

    /// 識別子の並び（メソッドのレシーバー `Pair(A, B)` の引数）から束縛を作る
    pub fn from_exprs(
        universe: &Universe,
        info: Rc<Info>,
        exprs: &[Rc<Expr>],
        types: &[Type],
        tparams: &[Rc<Expr>],
    ) -> MonoResult<Self> {
        check_arity(tparams.len(), exprs, types)?;

        let mut ta = Self::new(types, info);
        for (index, expr) in tparams.iter().enumerate() {
            let name = expr.as_ident().ok_or_else(|| InvariantViolation::NotIdent {
                kind: expr.kind.name().to_string(),
            })?;
            let obj = ta.defined_object(name)?;
            let param = type_param_of(universe, obj)?;
            ta.add(obj, param, exprs.get(index).cloned(), types[index].clone());
        }
        Ok(ta)
    }

    fn defined_object(&self, name: &Ident) -> Result<ObjectId, InvariantViolation> {
        self.info
            .defs
            .get(&name.id)
            .copied()
            .ok_or_else(|| InvariantViolation::MissingDefinition {
                name: name.name.clone(),
            })
    }

    fn add(&mut self, obj: ObjectId, param: TypeParamId, ast: Option<Rc<Expr>>, typ: Type) {
        log::trace!("型引数を束縛: {:?} -> {}", param, typ);
        if let Some(ast) = ast {
            self.to_ast.insert(obj, ast);
        }
        self.to_typ.insert(param, typ);
    }

    /// `obj` に束縛された構文
    pub fn ast(&self, obj: ObjectId) -> Option<&Rc<Expr>> {
        self.to_ast.get(&obj)
    }

    /// `param` に束縛された型
    pub fn typ(&self, param: TypeParamId) -> Option<&Type> {
        self.to_typ.get(&param)
    }

    pub fn info(&self) -> &Rc<Info> {
        &self.info
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }
}

fn check_arity(
    declared: usize,
    exprs: &[Rc<Expr>],
    types: &[Type],
) -> Result<(), InvariantViolation> {
    if types.len() != declared {
        return Err(InvariantViolation::ArityMismatch {
            expected: declared,
            found: types.len(),
        });
    }
    if !exprs.is_empty() && exprs.len() != declared {
        return Err(InvariantViolation::ArityMismatch {
            expected: declared,
            found: exprs.len(),
        });
    }
    Ok(())
}

fn type_param_of(universe: &Universe, obj: ObjectId) -> Result<TypeParamId, InvariantViolation> {
    let object = universe.object(obj);
    match &object.ty {
        Type::TypeParam { id, .. } => Ok(*id),
        _ => Err(InvariantViolation::NotTypeParam {
            name: object.name.clone(),
        }),
    }
}
