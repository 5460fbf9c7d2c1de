//! 統一的なエラーハンドリングモジュール
//!
//! インスタンス化エンジンが返すエラー型を定義します。
//! 呼び出し側で報告できる通常のエラーと、前提条件の破綻を表す
//! 不変条件違反（`InvariantViolation`）の2種類に分かれます。

use thiserror::Error;

/// インスタンス化の統一エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonoError {
    /// 名前がどのオブジェクトにも解決できない
    #[error("オブジェクトが見つかりません: {name}")]
    ObjectNotFound { name: String },

    /// 宣言したパッケージの型情報が無い
    #[error("パッケージの型情報がありません: {name}")]
    NoTypeInfo { name: String },

    /// 関数宣言の構文が見つからない
    #[error("関数宣言が見つかりません: {name}")]
    FuncNotFound { name: String },

    /// 型宣言の構文が見つからない
    #[error("型宣言が見つかりません: {name}")]
    TypeSpecNotFound { name: String },

    /// 不変条件違反（翻訳全体を中断する）
    #[error("内部エラー: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// 入力が型チェック済みのジェネリックコードであるという前提の破綻
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("型パラメータ '{name}' に対応するオブジェクトがありません")]
    MissingDefinition { name: String },

    #[error("'{name}' は型パラメータではありません")]
    NotTypeParam { name: String },

    #[error("型引数の位置に識別子以外の式があります: {kind}")]
    NotIdent { kind: String },

    #[error("型引数の数が一致しません: {expected}個を期待しましたが、{found}個が渡されました")]
    ArityMismatch { expected: usize, found: usize },

    #[error("未実装の{category}: {kind}")]
    Unsupported {
        category: &'static str,
        kind: &'static str,
    },

    #[error("メソッド '{name}' の構文が見つかりません")]
    MissingMethodSyntax { name: String },

    #[error("メソッド '{name}' のレシーバーがジェネリック型のインスタンスとして書かれていません")]
    MalformedReceiver { name: String },

    #[error("'{name}' は名前付き型ではありません")]
    NotNamedType { name: String },
}

impl MonoError {
    /// 翻訳を中断すべきエラーかどうか
    pub fn is_fatal(&self) -> bool {
        matches!(self, MonoError::Invariant(_))
    }
}

/// インスタンス化の結果型
pub type MonoResult<T> = Result<T, MonoError>;

/// ワークスペースの読み書きと型引数の解釈のエラー
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("パッケージが見つかりません: {name}")]
    UnknownPackage { name: String },

    #[error("型が見つかりません: {name}")]
    UnknownType { name: String },

    #[error("ジェネリック型 '{name}' は型引数なしでは使えません")]
    GenericType { name: String },

    #[error("型の書き方が正しくありません: {text}")]
    MalformedType { text: String },

    #[error("'{name}' は関数でも型でもありません")]
    NotInstantiable { name: String },

    #[error("'{owner}' が存在しないオブジェクト #{id} を参照しています")]
    DanglingObject { owner: String, id: u32 },

    #[error("JSONの処理に失敗しました: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Mono(#[from] MonoError),
}

impl WorkspaceError {
    /// 不変条件違反によるエラーかどうか
    pub fn is_fatal(&self) -> bool {
        matches!(self, WorkspaceError::Mono(e) if e.is_fatal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_is_fatal() {
        let err: MonoError = InvariantViolation::Unsupported {
            category: "文",
            kind: "GoStmt",
        }
        .into();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "内部エラー: 未実装の文: GoStmt");
    }

    #[test]
    fn test_lookup_failure_is_recoverable() {
        let err = MonoError::FuncNotFound {
            name: "Map".to_string(),
        };
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "関数宣言が見つかりません: Map");
    }

    #[test]
    fn test_workspace_error_wraps_invariant() {
        let err: WorkspaceError = MonoError::from(InvariantViolation::ArityMismatch {
            expected: 2,
            found: 1,
        })
        .into();
        assert!(err.is_fatal());
        assert!(!WorkspaceError::UnknownType {
            name: "Foo".to_string()
        }
        .is_fatal());
    }
}
