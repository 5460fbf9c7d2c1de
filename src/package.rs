//! パッケージと宣言の検索

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{Decl, FuncDecl, Spec, TypeSpec};
use crate::types::{Info, ObjectId, PackageId};

/// 型チェック済みのパッケージ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    /// パッケージスコープの名前
    pub scope: IndexMap<String, ObjectId>,
    pub decls: Vec<Decl>,
    pub info: Option<Rc<Info>>,
    #[serde(skip)]
    funcs: HashMap<ObjectId, Rc<FuncDecl>>,
    #[serde(skip)]
    type_specs: HashMap<ObjectId, Rc<TypeSpec>>,
}

impl Package {
    pub fn new(id: PackageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            scope: IndexMap::new(),
            decls: Vec::new(),
            info: None,
            funcs: HashMap::new(),
            type_specs: HashMap::new(),
        }
    }

    /// トップレベル宣言を宣言オブジェクトから引けるよう索引を作り直す
    pub fn reindex(&mut self) {
        self.funcs.clear();
        self.type_specs.clear();
        let Some(info) = &self.info else {
            return;
        };
        for decl in &self.decls {
            match decl {
                Decl::Func(func) => {
                    if let Some(obj) = info.defs.get(&func.name.id) {
                        self.funcs.insert(*obj, func.clone());
                    }
                }
                Decl::Gen(gen) => {
                    for spec in &gen.specs {
                        if let Spec::Type(ts) = spec {
                            if let Some(obj) = info.defs.get(&ts.name.id) {
                                self.type_specs.insert(*obj, ts.clone());
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn func(&self, obj: ObjectId) -> Option<&Rc<FuncDecl>> {
        self.funcs.get(&obj)
    }

    pub fn type_spec(&self, obj: ObjectId) -> Option<&Rc<TypeSpec>> {
        self.type_specs.get(&obj)
    }
}

/// 宣言と型情報を引くためのインターフェース
pub trait Importer {
    /// 関数・メソッドの宣言
    fn lookup_func(&self, obj: ObjectId) -> Option<Rc<FuncDecl>>;

    /// 型の宣言
    fn lookup_type_spec(&self, obj: ObjectId) -> Option<Rc<TypeSpec>>;

    /// パッケージの型チェック結果
    fn lookup_info(&self, pkg: PackageId) -> Option<Rc<Info>>;

    /// パッケージスコープの名前を解決
    fn lookup_scope(&self, pkg: PackageId, name: &str) -> Option<ObjectId>;
}

/// 読み込まれたパッケージの集まり
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageDb {
    packages: IndexMap<String, Package>,
}

impl PackageDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut package: Package) {
        package.reindex();
        self.packages.insert(package.name.clone(), package);
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.packages.values().find(|p| p.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// デシリアライズ後に索引を再構築
    pub fn reindex(&mut self) {
        for package in self.packages.values_mut() {
            package.reindex();
        }
    }
}

impl Importer for PackageDb {
    fn lookup_func(&self, obj: ObjectId) -> Option<Rc<FuncDecl>> {
        self.iter().find_map(|p| p.func(obj).cloned())
    }

    fn lookup_type_spec(&self, obj: ObjectId) -> Option<Rc<TypeSpec>> {
        self.iter().find_map(|p| p.type_spec(obj).cloned())
    }

    fn lookup_info(&self, pkg: PackageId) -> Option<Rc<Info>> {
        self.get(pkg).and_then(|p| p.info.clone())
    }

    fn lookup_scope(&self, pkg: PackageId, name: &str) -> Option<ObjectId> {
        self.get(pkg).and_then(|p| p.scope.get(name).copied())
    }
}
