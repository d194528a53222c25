use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("列が見つかりません: {column} (ヘッダ: {available})")]
    MissingColumn { column: String, available: String },

    #[error("ルールファイルが不正: {0}")]
    InvalidRuleSource(String),

    #[error("対応していないファイル形式: {0}")]
    UnsupportedFormat(String),

    #[error("行範囲が不正: {start}〜{end}")]
    InvalidRowRange { start: usize, end: usize },

    #[error("プロジェクトの読み込みがキャンセルされました: {0}")]
    Cancelled(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Core(#[from] catalog_recon_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

