//! 名前マングリング処理

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::MonoResult;
use crate::types::Type;

/// インスタンス化された宣言の名前を決める
///
/// 同じ `(qualifier, name, type_args)` には常に同じ名前を返すこと。
pub trait InstanceNamer {
    fn instantiated_name(
        &mut self,
        qualifier: Option<&str>,
        name: &str,
        type_args: &[Type],
    ) -> MonoResult<String>;
}

/// 型を文字列に変換（マングリング用）
pub fn type_to_string(ty: &Type) -> String {
    match ty {
        Type::Basic(kind) => kind.name().replace(' ', "_"),

        // ユーザー定義型
        Type::Named { name, targs, .. } => mangle_name(name, targs),
        Type::TypeParam { name, .. } => name.clone(),

        Type::Pointer(elem) => format!("ptr_{}", type_to_string(elem)),
        Type::Slice(elem) => format!("slice_{}", type_to_string(elem)),
        Type::Array { len, elem } => format!("array{}_{}", len, type_to_string(elem)),
        Type::Map { key, value } => {
            format!("map_{}_{}", type_to_string(key), type_to_string(value))
        }

        Type::Struct(fields) => {
            let field_strs: Vec<String> = fields
                .iter()
                .map(|f| format!("{}_{}", f.name, type_to_string(&f.ty)))
                .collect();
            format!("struct_{}", field_strs.join("_"))
        }

        // 関数型
        Type::Signature(sig) => {
            let param_strs: Vec<String> = sig.params.iter().map(type_to_string).collect();
            let result_strs: Vec<String> = sig.results.iter().map(type_to_string).collect();
            let ret_str = if result_strs.is_empty() {
                "void".to_string()
            } else {
                result_strs.join("_")
            };
            format!("fn_{}_{}", param_strs.join("_"), ret_str)
        }

        Type::Tuple(types) => {
            let type_strs: Vec<String> = types.iter().map(type_to_string).collect();
            format!("tuple_{}", type_strs.join("_"))
        }
        Type::Interface => "any".to_string(),
        Type::Invalid => "invalid".to_string(),
    }
}

/// 名前をマングル
pub fn mangle_name(name: &str, type_args: &[Type]) -> String {
    if type_args.is_empty() {
        name.to_string()
    } else {
        let type_strs: Vec<String> = type_args.iter().map(type_to_string).collect();
        format!("{}_{}", name, type_strs.join("_"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NameKey {
    qualifier: Option<String>,
    name: String,
    type_args: Vec<Type>,
}

/// 既定の命名規則: `[pkg_]Name_型1_型2...`
///
/// 結果はメモ化され、別のキーが同じ文字列になった場合は `_N` を付けて区別する。
#[derive(Debug, Default)]
pub struct Mangler {
    names: IndexMap<NameKey, String>,
    taken: HashSet<String>,
}

impl Mangler {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに割り当てた名前（割り当て順）
    pub fn assigned(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }
}

impl InstanceNamer for Mangler {
    fn instantiated_name(
        &mut self,
        qualifier: Option<&str>,
        name: &str,
        type_args: &[Type],
    ) -> MonoResult<String> {
        let key = NameKey {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
            type_args: type_args.to_vec(),
        };
        if let Some(existing) = self.names.get(&key) {
            return Ok(existing.clone());
        }

        let base = match qualifier {
            Some(pkg) => format!("{}_{}", pkg, mangle_name(name, type_args)),
            None => mangle_name(name, type_args),
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.taken.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if candidate != base {
            log::warn!("インスタンス名 {} は使用済みのため {} を使用します", base, candidate);
        }

        self.taken.insert(candidate.clone());
        self.names.insert(key, candidate.clone());
        Ok(candidate)
    }
}
