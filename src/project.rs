//! プロジェクトファイルの入出力

use crate::error::{CatalogError, Result};
use catalog_recon_common::{
    codec, outline, CategoryTree, Flow, LoadOutcome, Progress,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// 読み込み中のスピナー
fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn complete(outcome: LoadOutcome, path: &Path) -> Result<CategoryTree> {
    outcome
        .complete()
        .ok_or_else(|| CatalogError::Cancelled(path.display().to_string()))
}

/// プロジェクト文書を読み込む（進捗はコールバックへ）
pub fn load_project_with(
    path: &Path,
    progress: &mut dyn Progress,
    interval: usize,
) -> Result<LoadOutcome> {
    ensure_exists(path)?;
    let content = std::fs::read_to_string(path)?;
    let outcome = codec::from_json(&content, progress, interval)?;
    log::info!(
        "project loaded: {} ({} nodes)",
        path.display(),
        outcome.tree().stats().nodes
    );
    Ok(outcome)
}

/// プロジェクト文書を読み込む（スピナー表示）
pub fn load_project(path: &Path, interval: usize) -> Result<CategoryTree> {
    let bar = spinner("プロジェクトを読み込み中...");
    let mut tick = |processed: usize| {
        bar.set_message(format!("プロジェクトを読み込み中... {}ノード", processed));
        Flow::Continue
    };
    let outcome = load_project_with(path, &mut tick, interval);
    bar.finish_and_clear();
    complete(outcome?, path)
}

/// 保存して未保存フラグを下ろす
pub fn save_project(tree: &mut CategoryTree, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = codec::to_json(tree)?;
    std::fs::write(path, json)?;
    tree.mark_clean();
    log::info!("project saved: {}", path.display());
    Ok(())
}

/// OPMLファイルを取り込む（進捗はコールバックへ）
pub fn import_opml_with(
    path: &Path,
    progress: &mut dyn Progress,
    interval: usize,
) -> Result<LoadOutcome> {
    ensure_exists(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok(outline::import_opml(&content, progress, interval)?)
}

/// OPMLファイルを取り込む（スピナー表示）
pub fn import_opml_file(path: &Path, interval: usize) -> Result<CategoryTree> {
    let bar = spinner("アウトラインを解析中...");
    let mut tick = |processed: usize| {
        bar.set_message(format!("ツリーを構築中... {}ノード", processed));
        Flow::Continue
    };
    let outcome = import_opml_with(path, &mut tick, interval);
    bar.finish_and_clear();
    complete(outcome?, path)
}

/// インデント付きテキストを書き出す
pub fn export_outline_file(tree: &CategoryTree, path: &Path) -> Result<()> {
    std::fs::write(path, codec::export_outline(tree))?;
    Ok(())
}
