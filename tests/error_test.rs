//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use catalog_recon::error::CatalogError;
use catalog_recon::project::{import_opml_file, load_project};
use catalog_recon::rule_source::{load_rules, RuleSourceOptions};
use catalog_recon_common::DEFAULT_PROGRESS_INTERVAL;
use std::path::Path;
use tempfile::tempdir;

fn options() -> RuleSourceOptions {
    RuleSourceOptions {
        path_column: "类目途径".into(),
        code_column: "分类".into(),
        row_start: 2,
        row_end: 1000,
    }
}

/// 存在しないプロジェクト
#[test]
fn test_load_nonexistent_project() {
    let result = load_project(Path::new("/nonexistent/path/12345.json"), DEFAULT_PROGRESS_INTERVAL);
    assert!(matches!(result, Err(CatalogError::FileNotFound(_))));
}

/// 壊れたプロジェクト文書
#[test]
fn test_load_malformed_project() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"name\": \"A\", \"children\": [").unwrap();

    let result = load_project(&path, DEFAULT_PROGRESS_INTERVAL);
    assert!(matches!(result, Err(CatalogError::Core(_))));
}

/// 配列でない文書も不正
#[test]
fn test_load_non_array_document() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("object.json");
    std::fs::write(&path, "{\"name\": \"A\"}").unwrap();
    assert!(load_project(&path, DEFAULT_PROGRESS_INTERVAL).is_err());
}

/// bodyのないOPML
#[test]
fn test_import_opml_without_body() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("empty.opml");
    std::fs::write(&path, "<opml><head><title>x</title></head></opml>").unwrap();

    let err = import_opml_file(&path, DEFAULT_PROGRESS_INTERVAL).unwrap_err();
    assert!(matches!(err, CatalogError::Core(catalog_recon_common::Error::Outline(_))));
}

/// 列が見つからないルールファイル
#[test]
fn test_rules_missing_column() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("rules.csv");
    std::fs::write(&path, "path,code\nA,B\n").unwrap();

    let err = load_rules(&path, &options()).unwrap_err();
    assert!(matches!(err, CatalogError::MissingColumn { .. }));
    assert!(err.to_string().contains("类目途径"));
}

/// UTF-8でないCSV
#[test]
fn test_rules_not_utf8() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("rules.csv");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

    let err = load_rules(&path, &options()).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRuleSource(_)));
}

/// 壊れたワークブック
#[test]
fn test_rules_broken_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("rules.xlsx");
    std::fs::write(&path, "not a zip").unwrap();

    let err = load_rules(&path, &options()).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRuleSource(_)));
}

/// 存在しないルールファイル
#[test]
fn test_rules_nonexistent() {
    let err = load_rules(Path::new("/nonexistent/rules.csv"), &options()).unwrap_err();
    assert!(matches!(err, CatalogError::FileNotFound(_)));
}

/// CatalogErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CatalogError::Config("テスト設定エラー".to_string()),
        CatalogError::FileNotFound("rules.csv".to_string()),
        CatalogError::InvalidRuleSource("壊れた行".to_string()),
        CatalogError::UnsupportedFormat("rules.txt".to_string()),
        CatalogError::InvalidRowRange { start: 9, end: 3 },
        CatalogError::Cancelled("project.json".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty());
    }
}
