//! エラー型定義

use thiserror::Error;

/// ツリー操作の契約違反
///
/// 呼び出し側が不正な操作を渡した場合に返す。ツリーは変更されない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("ノードが見つかりません: {0}")]
    NodeNotFound(String),

    #[error("名前が空です")]
    EmptyName,

    #[error("フォルダではないノードに子は追加できません: {0}")]
    NotAFolder(String),
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Outline error: {0}")]
    Outline(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
