use crate::error::{CatalogError, Result};
use catalog_recon_common::{ColorAssigner, MatchOptions, DEFAULT_PALETTE, DEFAULT_PROGRESS_INTERVAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 既定のパス列名
pub const DEFAULT_PATH_COLUMN: &str = "类目途径";
/// 既定のコード列名
pub const DEFAULT_CODE_COLUMN: &str = "分类";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub path_column: String,
    pub code_column: String,
    /// 読み込む最初の行（ヘッダが1行目）
    pub row_start: usize,
    pub row_end: usize,
    pub fuzzy_threshold: f64,
    pub typo_threshold: f64,
    pub length_slack: usize,
    pub progress_interval: usize,
    pub palette: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_column: DEFAULT_PATH_COLUMN.into(),
            code_column: DEFAULT_CODE_COLUMN.into(),
            row_start: 2,
            row_end: 1000,
            fuzzy_threshold: 0.75,
            typo_threshold: 0.75,
            length_slack: 2,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            palette: DEFAULT_PALETTE.iter().map(|hex| hex.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// ファイルがなければ既定値
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CatalogError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("catalog-recon").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_end < self.row_start {
            return Err(CatalogError::InvalidRowRange {
                start: self.row_start,
                end: self.row_end,
            });
        }
        for (name, value) in [("fuzzy_threshold", self.fuzzy_threshold), ("typo_threshold", self.typo_threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CatalogError::Config(format!("{} は0〜1で指定してください: {}", name, value)));
            }
        }
        if self.path_column.trim().is_empty() || self.code_column.trim().is_empty() {
            return Err(CatalogError::Config("列名が空です".into()));
        }
        Ok(())
    }

    pub fn set_columns(&mut self, path_column: &str, code_column: &str) -> Result<()> {
        self.path_column = path_column.trim().to_string();
        self.code_column = code_column.trim().to_string();
        self.validate()
    }

    /// 開始行は2行目（最初のデータ行）より前にしない
    pub fn set_range(&mut self, start: usize, end: usize) -> Result<()> {
        self.row_start = start.max(2);
        self.row_end = end;
        self.validate()
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            fuzzy_threshold: self.fuzzy_threshold,
            typo_threshold: self.typo_threshold,
            length_slack: self.length_slack,
        }
    }

    pub fn color_assigner(&self) -> ColorAssigner {
        ColorAssigner::from_hex_list(&self.palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.path_column, "类目途径");
        assert_eq!(config.row_start, 2);
        assert_eq!(config.row_end, 1000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.set_columns("Path", "Code").unwrap();
        config.set_range(5, 50).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.path_column, "Path");
        assert_eq!(loaded.row_start, 5);
        assert_eq!(loaded.row_end, 50);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"code_column": "Code"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.code_column, "Code");
        assert_eq!(config.path_column, DEFAULT_PATH_COLUMN);
        assert_eq!(config.match_options(), MatchOptions::default());
    }

    #[test]
    fn test_invalid_range_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.set_range(10, 3),
            Err(CatalogError::InvalidRowRange { start: 10, end: 3 })
        ));
    }

    #[test]
    fn test_range_start_clamped_to_first_data_row() {
        let mut config = Config::default();
        config.set_range(1, 3).unwrap();
        assert_eq!((config.row_start, config.row_end), (2, 3));

        let hand_edited = Config { row_start: 0, ..Config::default() };
        assert!(hand_edited.validate().is_ok());
    }

    #[test]
    fn test_palette_from_config() {
        let config = Config {
            palette: vec!["#000000".into(), "bad".into()],
            ..Default::default()
        };
        assert_eq!(config.color_assigner().palette().len(), 1);
    }
}
