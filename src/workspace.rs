//! ワークスペース
//!
//! 型チェック済みのパッケージ群と `Universe` をまとめて JSON に保存・復元する。
//! CLI はこれを読み込み、型引数の文字列を解釈してインスタンス化を要求する。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{FieldList, NodeId, Spec};
use crate::demo;
use crate::error::{MonoError, WorkspaceError};
use crate::mono::{QualifiedIdent, Translator};
use crate::package::{Package, PackageDb};
use crate::types::{ObjectId, ObjectKind, PackageId, Type, Universe};

/// 保存可能なパッケージの集まり
#[derive(Debug, Serialize, Deserialize)]
pub struct Workspace {
    pub universe: Universe,
    pub packages: PackageDb,
    /// パッケージ指定が無いときに使うパッケージ
    pub main: PackageId,
    /// 読み込み後に再利用してはいけないノードIDの下限
    next_node_id: u32,
}

/// ジェネリック宣言の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericKind {
    Func,
    Type,
}

impl fmt::Display for GenericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericKind::Func => write!(f, "func"),
            GenericKind::Type => write!(f, "type"),
        }
    }
}

/// `list` コマンドで表示するジェネリック宣言
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericDecl {
    pub package: String,
    pub name: String,
    pub kind: GenericKind,
    pub type_params: Vec<String>,
    /// 型に宣言されたメソッド
    pub methods: Vec<String>,
}

/// インスタンス化の結果
pub struct Instantiation {
    pub translator: Translator,
    pub kind: GenericKind,
    pub name: String,
}

impl Workspace {
    pub fn new(universe: Universe, packages: PackageDb, main: PackageId) -> Self {
        Self {
            universe,
            packages,
            main,
            next_node_id: NodeId::peek_next(),
        }
    }

    /// 付属のサンプルパッケージだけを含むワークスペース
    pub fn demo() -> Self {
        let (universe, package) = demo::build(Universe::new());
        let main = package.id;
        let mut packages = PackageDb::new();
        packages.insert(package);
        Self::new(universe, packages, main)
    }

    pub fn to_json(&self) -> Result<String, WorkspaceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        let mut ws: Workspace = serde_json::from_str(json)?;
        ws.validate()?;
        NodeId::advance_to(ws.next_node_id);
        ws.packages.reindex();
        log::debug!(
            "ワークスペースを読み込みました（パッケージ {} 個）",
            ws.packages.iter().count()
        );
        Ok(ws)
    }

    /// 名前でパッケージを引く。`None` なら main パッケージ
    pub fn package(&self, name: Option<&str>) -> Result<&Package, WorkspaceError> {
        let found = match name {
            Some(name) => self.packages.by_name(name),
            None => self.packages.get(self.main),
        };
        found.ok_or_else(|| WorkspaceError::UnknownPackage {
            name: name.map_or_else(|| self.main_label(), str::to_string),
        })
    }

    /// エラー報告用の main パッケージ名
    fn main_label(&self) -> String {
        self.universe
            .get_package_name(self.main)
            .map_or_else(|| format!("#{}", self.main.0), str::to_string)
    }

    /// 読み込んだ ID がすべて `Universe` に存在するか確かめる
    fn validate(&self) -> Result<(), WorkspaceError> {
        if self.packages.get(self.main).is_none() {
            return Err(WorkspaceError::UnknownPackage {
                name: self.main_label(),
            });
        }

        let check = |owner: &str, obj: ObjectId| match self.universe.get_object(obj) {
            Some(_) => Ok(()),
            None => Err(WorkspaceError::DanglingObject {
                owner: owner.to_string(),
                id: obj.0,
            }),
        };
        for package in self.packages.iter() {
            if self.universe.get_package_name(package.id).is_none() {
                return Err(WorkspaceError::UnknownPackage {
                    name: package.name.clone(),
                });
            }
            for (name, obj) in &package.scope {
                check(name.as_str(), *obj)?;
            }
            if let Some(info) = &package.info {
                for obj in info.defs.values().chain(info.uses.values()) {
                    check(package.name.as_str(), *obj)?;
                }
            }
        }
        if let Some(obj) = self.universe.dangling_object() {
            check("universe", obj)?;
        }
        Ok(())
    }

    /// すべてのパッケージのジェネリック宣言（宣言順）
    pub fn generic_declarations(&self) -> Vec<GenericDecl> {
        let mut result = Vec::new();
        for package in self.packages.iter() {
            for decl in &package.decls {
                if let Some(func) = decl.as_func() {
                    let Some(tparams) = func.ty.tparams.as_ref().filter(|_| func.recv.is_none())
                    else {
                        continue;
                    };
                    result.push(GenericDecl {
                        package: package.name.clone(),
                        name: func.name.name.clone(),
                        kind: GenericKind::Func,
                        type_params: param_names(tparams),
                        methods: Vec::new(),
                    });
                }
                for spec in decl.as_gen().map(|g| g.specs.as_slice()).unwrap_or_default() {
                    let Spec::Type(ts) = spec else {
                        continue;
                    };
                    let Some(tparams) = &ts.tparams else {
                        continue;
                    };
                    let methods = package
                        .scope
                        .get(&ts.name.name)
                        .and_then(|obj| self.universe.named(*obj))
                        .map(|named| {
                            named
                                .methods
                                .iter()
                                .map(|m| self.universe.object(m.obj).name.clone())
                                .collect()
                        })
                        .unwrap_or_default();
                    result.push(GenericDecl {
                        package: package.name.clone(),
                        name: ts.name.name.clone(),
                        kind: GenericKind::Type,
                        type_params: param_names(tparams),
                        methods,
                    });
                }
            }
        }
        result
    }

    /// 型引数の文字列を型に変換する
    ///
    /// `int`、`[]T`、`*T`、`[N]T`、`map[K]V`、パッケージの非ジェネリックな型名を受け付ける。
    pub fn resolve_type(&self, pkg: PackageId, text: &str) -> Result<Type, WorkspaceError> {
        let text = text.trim();
        let malformed = || WorkspaceError::MalformedType {
            text: text.to_string(),
        };

        if let Some(rest) = text.strip_prefix("[]") {
            return Ok(Type::slice(self.resolve_type(pkg, rest)?));
        }
        if let Some(rest) = text.strip_prefix('*') {
            return Ok(Type::pointer(self.resolve_type(pkg, rest)?));
        }
        if let Some(rest) = text.strip_prefix("map[") {
            let close = matching_bracket(rest).ok_or_else(malformed)?;
            let key = self.resolve_type(pkg, &rest[..close])?;
            let value = self.resolve_type(pkg, &rest[close + 1..])?;
            return Ok(Type::Map {
                key: Box::new(key),
                value: Box::new(value),
            });
        }
        if let Some(rest) = text.strip_prefix('[') {
            let (len, elem) = rest.split_once(']').ok_or_else(malformed)?;
            let len = len.trim().parse::<u64>().map_err(|_| malformed())?;
            return Ok(Type::Array {
                len,
                elem: Box::new(self.resolve_type(pkg, elem)?),
            });
        }

        if text.is_empty() || !text.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(malformed());
        }
        let unknown = || WorkspaceError::UnknownType {
            name: text.to_string(),
        };
        let obj = self
            .packages
            .get(pkg)
            .and_then(|p| p.scope.get(text).copied())
            .or_else(|| self.universe.lookup_predeclared(text))
            .ok_or_else(unknown)?;
        let object = self.universe.object(obj);
        if object.kind != ObjectKind::TypeName {
            return Err(unknown());
        }
        if self
            .universe
            .named(obj)
            .is_some_and(|named| !named.type_params.is_empty())
        {
            return Err(WorkspaceError::GenericType {
                name: text.to_string(),
            });
        }
        Ok(object.ty.clone())
    }

    /// パッケージ `package` の `name` を型引数 `types` でインスタンス化する
    ///
    /// 関数か型かは宣言オブジェクトの種類で決める。
    pub fn instantiate(
        self,
        package: Option<&str>,
        name: &str,
        types: &[String],
    ) -> Result<Instantiation, WorkspaceError> {
        let pkg = self.package(package)?.id;
        let types = types
            .iter()
            .map(|t| self.resolve_type(pkg, t))
            .collect::<Result<Vec<_>, _>>()?;
        let obj = self
            .packages
            .get(pkg)
            .and_then(|p| p.scope.get(name).copied())
            .ok_or_else(|| MonoError::ObjectNotFound {
                name: name.to_string(),
            })?;
        let kind = match self.universe.object(obj).kind {
            ObjectKind::Func => GenericKind::Func,
            ObjectKind::TypeName => GenericKind::Type,
            _ => {
                return Err(WorkspaceError::NotInstantiable {
                    name: name.to_string(),
                })
            }
        };

        let mut translator = Translator::new(self.universe, self.packages, pkg);
        let qid = QualifiedIdent::in_package(pkg, name);
        let ident = match kind {
            GenericKind::Func => translator.request_function(&qid, &types)?,
            GenericKind::Type => translator.request_type(&qid, &types)?.0,
        };
        Ok(Instantiation {
            translator,
            kind,
            name: ident.name,
        })
    }
}

fn param_names(list: &FieldList) -> Vec<String> {
    list.list
        .iter()
        .flat_map(|f| f.names.iter().map(|n| n.name.clone()))
        .collect()
}

/// 開き括弧の直後から数えて、対応する `]` の位置
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 1;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_bracket_skips_nested() {
        assert_eq!(matching_bracket("string]int"), Some(6));
        assert_eq!(matching_bracket("[2]int][]bool"), Some(6));
        assert_eq!(matching_bracket("int"), None);
    }
}
