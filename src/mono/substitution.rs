//! 型の置換処理

use crate::ast::NodeId;
use crate::types::{Mode, Type, TypeAndValue};

use super::{TypeArgs, Translator};

/// 型に含まれる型パラメータを束縛された型に置き換える
pub fn instantiate_type(ta: &TypeArgs, ty: &Type) -> Type {
    if !ty.has_type_params() {
        return ty.clone();
    }
    ty.subst(&|param| ta.typ(param).cloned())
}

impl Translator {
    /// 元のノードに記録された型
    pub(crate) fn lookup_type(&self, ta: &TypeArgs, id: NodeId) -> Option<TypeAndValue> {
        ta.info()
            .type_of(id)
            .or_else(|| self.synthesized.type_of(id))
            .cloned()
    }

    /// 新しいノードに型を記録
    pub(crate) fn set_type(&mut self, id: NodeId, mode: Mode, ty: Type) {
        self.synthesized.record_type(id, mode, ty);
    }
}
