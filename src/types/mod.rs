//! 意味論上の型
//!
//! 構文木とは独立した型の表現と、型チェックの結果を保持するデータベース。

use std::fmt;

use serde::{Deserialize, Serialize};

mod info;
mod universe;

pub use info::*;
pub use universe::*;

/// 組み込みの基本型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    UntypedNil,
}

impl BasicKind {
    /// 名前で宣言される基本型（`UntypedNil` を除く）
    pub const NAMED: [BasicKind; 14] = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::String => "string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }
}

/// 型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Basic(BasicKind),
    /// 名前付き型。`targs` が空でなければジェネリック型のインスタンス
    Named {
        obj: ObjectId,
        name: String,
        targs: Vec<Type>,
    },
    TypeParam {
        id: TypeParamId,
        name: String,
    },
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array {
        len: u64,
        elem: Box<Type>,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Struct(Vec<StructField>),
    Signature(Signature),
    /// 複数の戻り値
    Tuple(Vec<Type>),
    /// メソッドを持たないインターフェース（`any`）
    Interface,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// 関数のシグネチャ（レシーバーを含まない）
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<Type>,
    pub results: Vec<Type>,
    /// 最後のパラメータが `...T` かどうか（型は `[]T`）
    pub variadic: bool,
}

impl Signature {
    /// 呼び出し式の型
    pub fn result_type(&self) -> Type {
        match self.results.as_slice() {
            [] => Type::Tuple(Vec::new()),
            [single] => single.clone(),
            many => Type::Tuple(many.to_vec()),
        }
    }
}

impl Type {
    pub fn int() -> Type {
        Type::Basic(BasicKind::Int)
    }

    pub fn string() -> Type {
        Type::Basic(BasicKind::String)
    }

    pub fn bool() -> Type {
        Type::Basic(BasicKind::Bool)
    }

    pub fn pointer(elem: Type) -> Type {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Type {
        Type::Slice(Box::new(elem))
    }

    pub fn func(params: Vec<Type>, results: Vec<Type>) -> Type {
        Type::Signature(Signature {
            params,
            results,
            variadic: false,
        })
    }

    /// 型パラメータを `f` の結果で置き換えた型を返す
    ///
    /// `f` が `None` を返した型パラメータはそのまま残る。
    pub fn subst<F>(&self, f: &F) -> Type
    where
        F: Fn(TypeParamId) -> Option<Type>,
    {
        match self {
            Type::TypeParam { id, .. } => f(*id).unwrap_or_else(|| self.clone()),
            Type::Named { obj, name, targs } => Type::Named {
                obj: *obj,
                name: name.clone(),
                targs: targs.iter().map(|t| t.subst(f)).collect(),
            },
            Type::Pointer(elem) => Type::Pointer(Box::new(elem.subst(f))),
            Type::Slice(elem) => Type::Slice(Box::new(elem.subst(f))),
            Type::Array { len, elem } => Type::Array {
                len: *len,
                elem: Box::new(elem.subst(f)),
            },
            Type::Map { key, value } => Type::Map {
                key: Box::new(key.subst(f)),
                value: Box::new(value.subst(f)),
            },
            Type::Struct(fields) => Type::Struct(
                fields
                    .iter()
                    .map(|field| StructField {
                        name: field.name.clone(),
                        ty: field.ty.subst(f),
                    })
                    .collect(),
            ),
            Type::Signature(sig) => Type::Signature(Signature {
                params: sig.params.iter().map(|t| t.subst(f)).collect(),
                results: sig.results.iter().map(|t| t.subst(f)).collect(),
                variadic: sig.variadic,
            }),
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|t| t.subst(f)).collect()),
            Type::Basic(_) | Type::Interface | Type::Invalid => self.clone(),
        }
    }

    /// 型パラメータを含むかどうか
    pub fn has_type_params(&self) -> bool {
        match self {
            Type::TypeParam { .. } => true,
            Type::Named { targs, .. } => targs.iter().any(Type::has_type_params),
            Type::Pointer(elem) | Type::Slice(elem) | Type::Array { elem, .. } => {
                elem.has_type_params()
            }
            Type::Map { key, value } => key.has_type_params() || value.has_type_params(),
            Type::Struct(fields) => fields.iter().any(|f| f.ty.has_type_params()),
            Type::Signature(sig) => sig
                .params
                .iter()
                .chain(&sig.results)
                .any(Type::has_type_params),
            Type::Tuple(elems) => elems.iter().any(Type::has_type_params),
            Type::Basic(_) | Type::Interface | Type::Invalid => false,
        }
    }

    /// スライス・配列の要素型、マップの値型
    pub fn elem(&self) -> Option<&Type> {
        match self {
            Type::Slice(elem) | Type::Array { elem, .. } | Type::Pointer(elem) => Some(elem),
            Type::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// ポインタなら指す先の型、それ以外は自身
    pub fn deref(&self) -> &Type {
        match self {
            Type::Pointer(elem) => elem,
            _ => self,
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(kind) => write!(f, "{}", kind.name()),
            Type::Named { name, targs, .. } => {
                write!(f, "{}", name)?;
                if !targs.is_empty() {
                    write!(f, "(")?;
                    write_list(f, targs)?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Type::TypeParam { name, .. } => write!(f, "{}", name),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                write!(f, "}}")
            }
            Type::Signature(sig) => {
                write!(f, "func(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match param {
                        Type::Slice(elem) if sig.variadic && i + 1 == sig.params.len() => {
                            write!(f, "...{}", elem)?
                        }
                        _ => write!(f, "{}", param)?,
                    }
                }
                write!(f, ")")?;
                match sig.results.as_slice() {
                    [] => Ok(()),
                    [single] => write!(f, " {}", single),
                    many => {
                        write!(f, " (")?;
                        write_list(f, many)?;
                        write!(f, ")")
                    }
                }
            }
            Type::Tuple(elems) => {
                write!(f, "(")?;
                write_list(f, elems)?;
                write!(f, ")")
            }
            Type::Interface => write!(f, "interface{{}}"),
            Type::Invalid => write!(f, "invalid type"),
        }
    }
}
