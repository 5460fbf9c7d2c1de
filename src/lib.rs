//! Monomorph: ジェネリック宣言の単相化エンジン
//!
//! 型チェック済みのジェネリック関数・型を具体的な型引数でインスタンス化し、
//! 型パラメータを含まない新しい宣言を生成する。

pub mod ast;
pub mod builder;
pub mod demo;
pub mod error;
pub mod mono;
pub mod package;
pub mod types;
pub mod workspace;

// よく使う型の再エクスポート
pub use builder::{FuncParts, PackageBuilder};
pub use error::{InvariantViolation, MonoError, MonoResult, WorkspaceError};
pub use mono::{InstanceNamer, Mangler, QualifiedIdent, Translator, TypeArgs};
pub use package::{Importer, Package, PackageDb};
pub use types::{Info, Type, Universe};
pub use workspace::Workspace;
