//! オブジェクトと名前付き型の保管庫

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{BasicKind, Signature, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParamId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub u32);

/// オブジェクトの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    TypeName,
    Var,
    Const,
    Func,
    Builtin,
    Nil,
}

/// 名前が解決される先（型名、変数、関数など）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    /// 事前宣言されたオブジェクトは `None`
    pub pkg: Option<PackageId>,
    pub ty: Type,
}

/// 名前付き型の定義
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedInfo {
    pub obj: ObjectId,
    pub underlying: Type,
    pub type_params: Vec<TypeParamId>,
    /// 宣言順のメソッド
    pub methods: Vec<MethodInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub obj: ObjectId,
    /// レシーバー `Pair(A, B)` で宣言された型パラメータ
    pub recv_params: Vec<TypeParamId>,
    pub pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParamInfo {
    pub id: TypeParamId,
    pub obj: ObjectId,
    pub name: String,
    /// 宣言内での位置
    pub index: usize,
}

/// すべてのパッケージが共有するオブジェクトの表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    objects: Vec<Object>,
    type_params: Vec<TypeParamInfo>,
    named: IndexMap<ObjectId, NamedInfo>,
    packages: Vec<String>,
    predeclared: IndexMap<String, ObjectId>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    /// 事前宣言された型と組み込み関数を登録した状態で作成
    pub fn new() -> Self {
        let mut universe = Self {
            objects: Vec::new(),
            type_params: Vec::new(),
            named: IndexMap::new(),
            packages: Vec::new(),
            predeclared: IndexMap::new(),
        };

        for kind in BasicKind::NAMED {
            universe.predeclare(kind.name(), ObjectKind::TypeName, Type::Basic(kind));
        }
        universe.predeclare("byte", ObjectKind::TypeName, Type::Basic(BasicKind::Uint8));
        universe.predeclare("rune", ObjectKind::TypeName, Type::Basic(BasicKind::Int32));
        universe.predeclare("any", ObjectKind::TypeName, Type::Interface);
        for builtin in ["append", "cap", "len", "make", "new"] {
            universe.predeclare(builtin, ObjectKind::Builtin, Type::Invalid);
        }
        universe.predeclare("true", ObjectKind::Const, Type::bool());
        universe.predeclare("false", ObjectKind::Const, Type::bool());
        universe.predeclare("nil", ObjectKind::Nil, Type::Basic(BasicKind::UntypedNil));

        universe
    }

    fn predeclare(&mut self, name: &str, kind: ObjectKind, ty: Type) {
        let id = self.new_object(name, kind, None, ty);
        self.predeclared.insert(name.to_string(), id);
    }

    pub fn new_package(&mut self, name: impl Into<String>) -> PackageId {
        self.packages.push(name.into());
        PackageId(self.packages.len() as u32 - 1)
    }

    pub fn package_name(&self, id: PackageId) -> &str {
        &self.packages[id.0 as usize]
    }

    /// 登録されていない ID なら `None`
    pub fn get_package_name(&self, id: PackageId) -> Option<&str> {
        self.packages.get(id.0 as usize).map(String::as_str)
    }

    pub fn new_object(
        &mut self,
        name: impl Into<String>,
        kind: ObjectKind,
        pkg: Option<PackageId>,
        ty: Type,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Object {
            id,
            name: name.into(),
            kind,
            pkg,
            ty,
        });
        id
    }

    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0 as usize]
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0 as usize)
    }

    /// 内部の表が参照しているのに存在しないオブジェクト
    pub fn dangling_object(&self) -> Option<ObjectId> {
        let named = self.named.iter().flat_map(|(key, info)| {
            [*key, info.obj]
                .into_iter()
                .chain(info.methods.iter().map(|m| m.obj))
        });
        let params = self.type_params.iter().map(|p| p.obj);
        let predeclared = self.predeclared.values().copied();
        named
            .chain(params)
            .chain(predeclared)
            .find(|id| self.get_object(*id).is_none())
    }

    pub fn set_object_type(&mut self, id: ObjectId, ty: Type) {
        self.objects[id.0 as usize].ty = ty;
    }

    /// 型パラメータを宣言する型名オブジェクトを作成
    pub fn new_type_param(
        &mut self,
        name: &str,
        index: usize,
        pkg: Option<PackageId>,
    ) -> (ObjectId, TypeParamId) {
        let id = TypeParamId(self.type_params.len() as u32);
        let ty = Type::TypeParam {
            id,
            name: name.to_string(),
        };
        let obj = self.new_object(name, ObjectKind::TypeName, pkg, ty);
        self.type_params.push(TypeParamInfo {
            id,
            obj,
            name: name.to_string(),
            index,
        });
        (obj, id)
    }

    /// 名前付き型を宣言する。基底型は後から `set_underlying` で設定する
    pub fn new_named(&mut self, name: &str, pkg: Option<PackageId>) -> ObjectId {
        let obj = ObjectId(self.objects.len() as u32);
        let ty = Type::Named {
            obj,
            name: name.to_string(),
            targs: Vec::new(),
        };
        self.new_object(name, ObjectKind::TypeName, pkg, ty);
        self.named.insert(
            obj,
            NamedInfo {
                obj,
                underlying: Type::Invalid,
                type_params: Vec::new(),
                methods: Vec::new(),
            },
        );
        obj
    }

    pub fn named(&self, obj: ObjectId) -> Option<&NamedInfo> {
        self.named.get(&obj)
    }

    pub fn set_named_type_params(&mut self, obj: ObjectId, params: Vec<TypeParamId>) {
        if let Some(info) = self.named.get_mut(&obj) {
            info.type_params = params;
        }
    }

    pub fn set_underlying(&mut self, obj: ObjectId, underlying: Type) {
        if let Some(info) = self.named.get_mut(&obj) {
            info.underlying = underlying;
        }
    }

    pub fn add_method(&mut self, named: ObjectId, method: MethodInfo) {
        if let Some(info) = self.named.get_mut(&named) {
            info.methods.push(method);
        }
    }

    pub fn lookup_predeclared(&self, name: &str) -> Option<ObjectId> {
        self.predeclared.get(name).copied()
    }

    /// 名前付き型の基底型。インスタンスなら型引数を代入したもの
    pub fn underlying(&self, ty: &Type) -> Type {
        match ty {
            Type::Named { obj, targs, .. } => match self.named.get(obj) {
                Some(info) => {
                    let underlying = substitute_params(&info.underlying, &info.type_params, targs);
                    // 名前付き型の連鎖をたどる
                    if matches!(underlying, Type::Named { .. }) {
                        self.underlying(&underlying)
                    } else {
                        underlying
                    }
                }
                None => ty.clone(),
            },
            _ => ty.clone(),
        }
    }

    /// 構造体フィールドの型（ポインタは自動的にたどる）
    pub fn field_type(&self, ty: &Type, name: &str) -> Option<Type> {
        match self.underlying(ty.deref()) {
            Type::Struct(fields) => fields
                .into_iter()
                .find(|field| field.name == name)
                .map(|field| field.ty),
            _ => None,
        }
    }

    /// メソッドを探し、レシーバーの型引数を代入したシグネチャを返す
    pub fn lookup_method(&self, ty: &Type, name: &str) -> Option<(ObjectId, Signature)> {
        let Type::Named { obj, targs, .. } = ty.deref() else {
            return None;
        };
        let info = self.named.get(obj)?;
        info.methods.iter().find_map(|method| {
            let object = self.object(method.obj);
            if object.name != name {
                return None;
            }
            match substitute_params(&object.ty, &method.recv_params, targs) {
                Type::Signature(sig) => Some((method.obj, sig)),
                _ => None,
            }
        })
    }

    /// ジェネリック型のインスタンス `Name(targs...)`
    pub fn instance(&self, generic: ObjectId, targs: Vec<Type>) -> Type {
        Type::Named {
            obj: generic,
            name: self.object(generic).name.clone(),
            targs,
        }
    }
}

/// `params[i]` を `targs[i]` で置き換える
pub fn substitute_params(ty: &Type, params: &[TypeParamId], targs: &[Type]) -> Type {
    if params.is_empty() || targs.is_empty() {
        return ty.clone();
    }
    ty.subst(&|id| {
        params
            .iter()
            .position(|p| *p == id)
            .and_then(|i| targs.get(i).cloned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructField;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_predeclared_types() {
        let universe = Universe::new();
        let int = universe.lookup_predeclared("int").unwrap();
        assert_eq!(universe.object(int).ty, Type::int());
        assert_eq!(universe.object(int).kind, ObjectKind::TypeName);
        let len = universe.lookup_predeclared("len").unwrap();
        assert_eq!(universe.object(len).kind, ObjectKind::Builtin);
        assert!(universe.lookup_predeclared("Pair").is_none());
    }

    #[test]
    fn test_underlying_of_instance() {
        let mut universe = Universe::new();
        let pkg = universe.new_package("main");
        let pair = universe.new_named("Pair", Some(pkg));
        let (_, a) = universe.new_type_param("A", 0, Some(pkg));
        let (_, b) = universe.new_type_param("B", 1, Some(pkg));
        universe.set_named_type_params(pair, vec![a, b]);
        universe.set_underlying(
            pair,
            Type::Struct(vec![
                StructField {
                    name: "a".into(),
                    ty: Type::TypeParam { id: a, name: "A".into() },
                },
                StructField {
                    name: "b".into(),
                    ty: Type::TypeParam { id: b, name: "B".into() },
                },
            ]),
        );

        let inst = universe.instance(pair, vec![Type::int(), Type::string()]);
        assert_eq!(inst.to_string(), "Pair(int, string)");
        assert_eq!(
            universe.underlying(&inst).to_string(),
            "struct{a int; b string}"
        );
        assert_eq!(
            universe.field_type(&Type::pointer(inst), "b"),
            Some(Type::string())
        );
    }

    #[test]
    fn test_dangling_method_object() {
        let mut universe = Universe::new();
        assert_eq!(universe.dangling_object(), None);

        let pkg = universe.new_package("main");
        let stack = universe.new_named("Stack", Some(pkg));
        universe.add_method(
            stack,
            MethodInfo {
                obj: ObjectId(9999),
                recv_params: Vec::new(),
                pointer: true,
            },
        );

        assert_eq!(universe.dangling_object(), Some(ObjectId(9999)));
        assert!(universe.get_object(ObjectId(9999)).is_none());
        assert_eq!(universe.get_package_name(pkg), Some("main"));
        assert_eq!(universe.get_package_name(PackageId(7)), None);
    }
}
