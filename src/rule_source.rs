//! ルールファイル（CSV / ワークブック）の読み込み
//!
//! ヘッダ行（1行目）から列名でパス列とコード列を探し、指定行範囲の
//! データ行を `RuleRow` にする。行番号は表計算ソフト上の番号で、
//! 最初のデータ行が2行目。開始行が2未満なら2行目から読む。終了行より
//! 後ろの行は解析しない。

use crate::config::Config;
use crate::error::{CatalogError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use catalog_recon_common::RuleRow;
use std::io::Read;
use std::path::Path;

/// 最初のデータ行（1行目はヘッダ）
const FIRST_DATA_ROW: usize = 2;

/// 読み込み条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSourceOptions {
    pub path_column: String,
    pub code_column: String,
    pub row_start: usize,
    pub row_end: usize,
}

impl RuleSourceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            path_column: config.path_column.clone(),
            code_column: config.code_column.clone(),
            row_start: config.row_start,
            row_end: config.row_end,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.row_end < self.row_start {
            return Err(CatalogError::InvalidRowRange {
                start: self.row_start,
                end: self.row_end,
            });
        }
        Ok(())
    }

    /// 実際に読み始める行
    pub fn first_row(&self) -> usize {
        self.row_start.max(FIRST_DATA_ROW)
    }

    /// 0始まりのデータ行番号が範囲内か
    fn contains(&self, data_index: usize) -> bool {
        let row = data_index + FIRST_DATA_ROW;
        row >= self.first_row() && row <= self.row_end
    }

    /// 0始まりのデータ行番号が終了行を過ぎたか
    fn is_past_end(&self, data_index: usize) -> bool {
        data_index + FIRST_DATA_ROW > self.row_end
    }
}

/// 拡張子で形式を判定して読み込む
pub fn load_rules(path: &Path, options: &RuleSourceOptions) -> Result<Vec<RuleRow>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound(path.display().to_string()));
    }
    options.validate()?;

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => {
            let bytes = std::fs::read(path)?;
            let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
            rules_from_csv_reader(content, options)?
        }
        "xlsx" | "xlsm" | "xls" | "ods" => rules_from_workbook(path, options)?,
        _ => return Err(CatalogError::UnsupportedFormat(path.display().to_string())),
    };

    log::info!("loaded {} rule rows from {}", rows.len(), path.display());
    Ok(rows)
}

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// CSV文字列から読み込む（先頭のBOMは無視）
pub fn rules_from_csv_str(content: &str, options: &RuleSourceOptions) -> Result<Vec<RuleRow>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    rules_from_csv_reader(content.as_bytes(), options)
}

/// UTF-8のCSVを読み込む
///
/// 終了行に達したら残りは読まないので、範囲外の壊れた行は問題にならない。
pub fn rules_from_csv_reader<R: Read>(source: R, options: &RuleSourceOptions) -> Result<Vec<RuleRow>> {
    options.validate()?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CatalogError::InvalidRuleSource(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let (path_idx, code_idx) = column_indices(&headers, options)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        if options.is_past_end(index) {
            break;
        }
        if !options.contains(index) {
            continue;
        }
        let record = record.map_err(|e| CatalogError::InvalidRuleSource(e.to_string()))?;
        rows.push(RuleRow::new(
            record.get(path_idx).unwrap_or(""),
            record.get(code_idx).unwrap_or(""),
        ));
    }
    Ok(rows)
}

/// 最初のワークシートから読み込む
pub fn rules_from_workbook(path: &Path, options: &RuleSourceOptions) -> Result<Vec<RuleRow>> {
    options.validate()?;
    let invalid = |e: calamine::Error| CatalogError::InvalidRuleSource(format!("{}: {}", path.display(), e));

    let mut workbook = open_workbook_auto(path).map_err(invalid)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CatalogError::InvalidRuleSource(format!("シートがありません: {}", path.display())))?
        .map_err(invalid)?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(header) => header.iter().map(|cell| cell_text(cell).trim().to_string()).collect(),
        None => Vec::new(),
    };
    let (path_idx, code_idx) = column_indices(&headers, options)?;

    let rows = sheet_rows
        .enumerate()
        .take_while(|(index, _)| !options.is_past_end(*index))
        .filter(|(index, _)| options.contains(*index))
        .map(|(_, cells)| {
            let get = |i: usize| cells.get(i).map(cell_text).unwrap_or_default();
            RuleRow::new(get(path_idx), get(code_idx))
        })
        .collect();
    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn column_indices(headers: &[String], options: &RuleSourceOptions) -> Result<(usize, usize)> {
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name.trim())
            .ok_or_else(|| CatalogError::MissingColumn {
                column: name.to_string(),
                available: headers.join(", "),
            })
    };
    Ok((find(&options.path_column)?, find(&options.code_column)?))
}
