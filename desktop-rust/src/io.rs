use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use catalog_recon::project;
use catalog_recon::rule_source::{self, RuleSourceOptions};
use catalog_recon_common::{CategoryTree, LoadOutcome, Progress, RuleRow};

pub fn read_project(path: &Path, progress: &mut dyn Progress, interval: usize) -> Result<LoadOutcome> {
    project::load_project_with(path, progress, interval)
        .with_context(|| format!("read {}", path.display()))
}

pub fn import_outline(path: &Path, progress: &mut dyn Progress, interval: usize) -> Result<LoadOutcome> {
    project::import_opml_with(path, progress, interval)
        .with_context(|| format!("import {}", path.display()))
}

pub fn write_project(path: &Path, tree: &mut CategoryTree) -> Result<()> {
    project::save_project(tree, path).with_context(|| format!("write {}", path.display()))
}

pub fn write_outline(path: &Path, tree: &CategoryTree) -> Result<()> {
    project::export_outline_file(tree, path).with_context(|| format!("write {}", path.display()))
}

pub fn read_rules(path: &Path, options: &RuleSourceOptions) -> Result<Vec<RuleRow>> {
    rule_source::load_rules(path, options).with_context(|| format!("rules {}", path.display()))
}

pub fn default_export_path(source: Option<&Path>) -> PathBuf {
    match source {
        Some(source) => source.with_extension("txt"),
        None => PathBuf::from("Catalog.txt"),
    }
}
