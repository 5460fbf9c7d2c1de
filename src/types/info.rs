//! 型チェックの結果

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ObjectId, Type};
use crate::ast::{Ident, NodeId};

/// 式がどのように使われるか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// 型を表す式
    TypeExpr,
    Value,
    Builtin,
    /// 値を持たない呼び出し
    NoValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAndValue {
    pub mode: Mode,
    pub ty: Type,
}

/// パッケージ単位の型チェック結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// 宣言している識別子 → オブジェクト
    pub defs: HashMap<NodeId, ObjectId>,
    /// 参照している識別子 → オブジェクト
    pub uses: HashMap<NodeId, ObjectId>,
    /// 式 → 型
    pub types: HashMap<NodeId, TypeAndValue>,
}

impl Info {
    pub fn new() -> Self {
        Self::default()
    }

    /// 識別子が宣言または参照しているオブジェクト
    pub fn object_of(&self, ident: &Ident) -> Option<ObjectId> {
        self.defs
            .get(&ident.id)
            .or_else(|| self.uses.get(&ident.id))
            .copied()
    }

    pub fn type_of(&self, id: NodeId) -> Option<&TypeAndValue> {
        self.types.get(&id)
    }

    pub fn record_def(&mut self, ident: &Ident, obj: ObjectId) {
        self.defs.insert(ident.id, obj);
    }

    pub fn record_use(&mut self, ident: &Ident, obj: ObjectId) {
        self.uses.insert(ident.id, obj);
    }

    pub fn record_type(&mut self, id: NodeId, mode: Mode, ty: Type) {
        self.types.insert(id, TypeAndValue { mode, ty });
    }
}
