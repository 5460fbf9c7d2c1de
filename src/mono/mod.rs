//! 単相化（Monomorphization）モジュール
//!
//! ジェネリック関数や型を具体的な型引数でインスタンス化する。
//! 1回の翻訳の状態は `Translator` がすべて保持し、生成した宣言も
//! `Translator` が所有する。

use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{type_expr, Decl, Expr, Ident, NodeId};
use crate::error::{InvariantViolation, MonoError, MonoResult};
use crate::package::Importer;
use crate::types::{Info, Mode, ObjectId, PackageId, Type, TypeAndValue, Universe};

// サブモジュール
mod instantiator;
mod mangling;
mod rewrite;
mod substitution;
mod type_args;

// 再エクスポート
pub use mangling::{mangle_name, type_to_string, InstanceNamer, Mangler};
pub use substitution::instantiate_type;
pub use type_args::TypeArgs;

/// パッケージで修飾された識別子
///
/// `pkg` が `None` なら翻訳中のパッケージで解決する。
#[derive(Debug, Clone)]
pub struct QualifiedIdent {
    pub pkg: Option<PackageId>,
    pub ident: Ident,
}

impl QualifiedIdent {
    /// 翻訳中のパッケージの識別子（型情報に記録されたもの）
    pub fn local(ident: Ident) -> Self {
        Self { pkg: None, ident }
    }

    /// パッケージスコープで名前を引く
    pub fn in_package(pkg: PackageId, name: &str) -> Self {
        Self {
            pkg: Some(pkg),
            ident: Ident::new(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InstanceKey {
    obj: ObjectId,
    types: Vec<Type>,
}

#[derive(Debug, Clone)]
enum Instance {
    Func(Ident),
    Type(Ident, Type),
}

/// 翻訳コンテキスト
pub struct Translator {
    universe: Universe,
    importer: Box<dyn Importer>,
    /// 翻訳中のパッケージ
    current: PackageId,
    namer: Box<dyn InstanceNamer>,
    /// 新しく作ったノードの型情報
    synthesized: Info,
    /// 要求済みのインスタンス
    instances: IndexMap<InstanceKey, Instance>,
    /// 生成された宣言（追加のみ）
    new_decls: Vec<Decl>,
    /// 最初に起きた不変条件違反
    aborted: Option<InvariantViolation>,
}

impl Translator {
    pub fn new(universe: Universe, importer: impl Importer + 'static, current: PackageId) -> Self {
        Self {
            universe,
            importer: Box::new(importer),
            current,
            namer: Box::new(Mangler::new()),
            synthesized: Info::new(),
            instances: IndexMap::new(),
            new_decls: Vec::new(),
            aborted: None,
        }
    }

    /// 命名規則を差し替える
    pub fn with_namer(mut self, namer: impl InstanceNamer + 'static) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// 生成されたノードの型情報
    pub fn synthesized(&self) -> &Info {
        &self.synthesized
    }

    /// 生成済みの宣言（生成順）
    pub fn new_decls(&self) -> &[Decl] {
        &self.new_decls
    }

    /// 翻訳を中断させた不変条件違反
    pub fn aborted(&self) -> Option<&InvariantViolation> {
        self.aborted.as_ref()
    }

    /// ノードの型（生成したノード、翻訳中のパッケージの順に探す）
    pub fn type_of(&self, id: NodeId) -> Option<TypeAndValue> {
        self.synthesized.type_of(id).cloned().or_else(|| {
            self.importer
                .lookup_info(self.current)
                .and_then(|info| info.type_of(id).cloned())
        })
    }

    /// 生成した識別子が宣言するオブジェクト
    pub fn object_of(&self, ident: &Ident) -> Option<ObjectId> {
        self.synthesized.object_of(ident)
    }

    /// 関数のインスタンスを要求する（同じ要求には同じ結果を返す）
    pub fn request_function(&mut self, qid: &QualifiedIdent, types: &[Type]) -> MonoResult<Ident> {
        self.check_aborted()?;
        let key = self.instance_key(qid, types)?;
        if let Some(Instance::Func(ident)) = self.instances.get(&key) {
            log::trace!("インスタンスを再利用: {}", ident);
            return Ok(ident.clone());
        }

        let exprs = self.type_arg_exprs(types);
        let ident = self.instantiate_function(qid, &exprs, types)?;
        self.instances.insert(key, Instance::Func(ident.clone()));
        Ok(ident)
    }

    /// 型のインスタンスを要求する（同じ要求には同じ結果を返す）
    pub fn request_type(
        &mut self,
        qid: &QualifiedIdent,
        types: &[Type],
    ) -> MonoResult<(Ident, Type)> {
        self.check_aborted()?;
        let key = self.instance_key(qid, types)?;
        if let Some(Instance::Type(ident, ty)) = self.instances.get(&key) {
            log::trace!("インスタンスを再利用: {}", ident);
            return Ok((ident.clone(), ty.clone()));
        }

        let generic = self.universe.object(key.obj).ty.clone();
        let exprs = self.type_arg_exprs(types);
        let (ident, ty) = self.instantiate_type_decl(qid, &generic, &exprs, types)?;
        self.instances
            .insert(key, Instance::Type(ident.clone(), ty.clone()));
        Ok((ident, ty))
    }

    /// 型引数の構文を作り、その型を記録する
    fn type_arg_exprs(&mut self, types: &[Type]) -> Vec<Rc<Expr>> {
        types
            .iter()
            .map(|ty| {
                let e = type_expr(ty);
                self.set_type(e.id, Mode::TypeExpr, ty.clone());
                e
            })
            .collect()
    }

    fn instance_key(&self, qid: &QualifiedIdent, types: &[Type]) -> MonoResult<InstanceKey> {
        let obj = self
            .find_types_object(qid)
            .ok_or_else(|| MonoError::ObjectNotFound {
                name: self.describe(qid),
            })?;
        Ok(InstanceKey {
            obj,
            types: types.to_vec(),
        })
    }

    fn check_aborted(&self) -> MonoResult<()> {
        match &self.aborted {
            Some(violation) => Err(MonoError::Invariant(violation.clone())),
            None => Ok(()),
        }
    }

    /// 処理を実行し、不変条件違反が起きたら翻訳全体を中断状態にする
    fn guard<T>(&mut self, f: impl FnOnce(&mut Self) -> MonoResult<T>) -> MonoResult<T> {
        self.check_aborted()?;
        let result = f(self);
        if let Err(MonoError::Invariant(violation)) = &result {
            log::error!("不変条件違反のため翻訳を中断します: {}", violation);
            self.aborted = Some(violation.clone());
        }
        result
    }

    /// 修飾識別子が指すオブジェクト
    fn find_types_object(&self, qid: &QualifiedIdent) -> Option<ObjectId> {
        match qid.pkg {
            None => self
                .importer
                .lookup_info(self.current)
                .and_then(|info| info.object_of(&qid.ident))
                .or_else(|| self.importer.lookup_scope(self.current, &qid.ident.name)),
            Some(pkg) => self.importer.lookup_scope(pkg, &qid.ident.name),
        }
    }

    /// 修飾識別子を宣言したパッケージの型情報
    fn info_for_id(&self, qid: &QualifiedIdent) -> Option<Rc<Info>> {
        self.importer.lookup_info(qid.pkg.unwrap_or(self.current))
    }

    /// エラー報告用の名前
    fn describe(&self, qid: &QualifiedIdent) -> String {
        match qid.pkg {
            Some(pkg) if pkg != self.current => {
                format!("{}.{}", self.universe.package_name(pkg), qid.ident.name)
            }
            _ => qid.ident.name.clone(),
        }
    }

    fn instantiated_name(&mut self, qid: &QualifiedIdent, types: &[Type]) -> MonoResult<String> {
        let qualifier = match qid.pkg {
            Some(pkg) if pkg != self.current => Some(self.universe.package_name(pkg).to_string()),
            _ => None,
        };
        self.namer
            .instantiated_name(qualifier.as_deref(), &qid.ident.name, types)
    }
}
