//! プロジェクト文書の読み書きとテキスト出力
//!
//! 文書はノードオブジェクトの配列（トップレベルが仮想ルートの子）。
//! バージョン欄はなく、欠けた項目は既定値で補う。
//!
//! ```json
//! [{"name": "工具", "code": "", "remark": "", "fav": false,
//!   "is_folder": true, "expanded": false, "children": [...]}]
//! ```

use crate::error::Result;
use crate::loader::{LoadOutcome, build_forest};
use crate::progress::{Progress, Ticker};
use crate::tree::{CategoryNode, CategoryTree};
use serde::{Deserialize, Deserializer, Serialize};

/// 文書上のノード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remark: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fav: bool,
    /// 省略時は子の有無で決める
    #[serde(default)]
    pub is_folder: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expanded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<NodeRecord>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// ツリーを文書形式に変換（仮想ルートは子の配列だけ）
pub fn serialize(tree: &CategoryTree) -> Vec<NodeRecord> {
    // levels[d] は深さ d+1 の、親待ちのレコード
    let mut levels: Vec<Vec<NodeRecord>> = vec![Vec::new()];

    tree.for_each_post_order(|path, _, node| {
        let depth = path.depth();
        let children = if levels.len() > depth {
            std::mem::take(&mut levels[depth])
        } else {
            Vec::new()
        };
        while levels.len() < depth {
            levels.push(Vec::new());
        }
        levels[depth - 1].push(NodeRecord {
            name: node.name().to_string(),
            code: node.code().to_string(),
            remark: node.remark().to_string(),
            fav: node.is_favorite(),
            is_folder: Some(node.is_folder()),
            expanded: node.is_expanded(),
            children,
        });
    });

    levels.swap_remove(0)
}

/// 文書形式からツリーを組み立てる
///
/// `interval` ノードごとに `progress` を呼び、キャンセルされたら
/// そこまでの部分ツリーを返す。
pub fn deserialize(
    records: Vec<NodeRecord>,
    progress: &mut dyn Progress,
    interval: usize,
) -> LoadOutcome {
    let mut ticker = Ticker::new(progress, interval);
    build_forest(
        records,
        &mut ticker,
        |record| {
            let folder = record.is_folder.unwrap_or(!record.children.is_empty());
            let node = CategoryNode {
                name: record.name,
                code: record.code,
                remark: record.remark,
                favorite: record.fav,
                folder,
                expanded: record.expanded,
                children: Vec::new(),
            };
            Some((node, record.children))
        },
        |_| {},
    )
}

/// 整形済みJSON文字列に変換（インデント2、非ASCIIはそのまま）
///
/// 出力は `serde_json::to_string_pretty` と同じ。深いツリーでも再帰しない
/// よう明示スタックで書き出す。
pub fn to_json(tree: &CategoryTree) -> Result<String> {
    if tree.is_empty() {
        return Ok("[]".to_string());
    }

    let mut out = String::from("[");
    // 開いている配列ごとの (兄弟列, 次に書く位置)
    let mut stack: Vec<(&[CategoryNode], usize)> = vec![(tree.roots(), 0)];

    loop {
        // この配列の要素オブジェクトの字下げ段数は 2d-1
        let depth = stack.len();
        let Some(frame) = stack.last_mut() else {
            break;
        };
        let (siblings, next) = *frame;

        if next < siblings.len() {
            frame.1 += 1;
            let node = &siblings[next];
            if next > 0 {
                out.push(',');
            }
            newline(&mut out, 2 * depth - 1);
            out.push('{');
            write_field(&mut out, 2 * depth, "name", &serde_json::to_string(node.name())?);
            write_field(&mut out, 2 * depth, "code", &serde_json::to_string(node.code())?);
            write_field(&mut out, 2 * depth, "remark", &serde_json::to_string(node.remark())?);
            write_field(&mut out, 2 * depth, "fav", bool_text(node.is_favorite()));
            write_field(&mut out, 2 * depth, "is_folder", bool_text(node.is_folder()));
            write_field(&mut out, 2 * depth, "expanded", bool_text(node.is_expanded()));
            newline(&mut out, 2 * depth);
            out.push_str("\"children\": ");
            if node.children().is_empty() {
                out.push_str("[]");
                newline(&mut out, 2 * depth - 1);
                out.push('}');
            } else {
                out.push('[');
                stack.push((node.children(), 0));
            }
            continue;
        }

        stack.pop();
        newline(&mut out, 2 * depth - 2);
        out.push(']');
        if !stack.is_empty() {
            // 子配列を持つオブジェクトを閉じる
            newline(&mut out, 2 * depth - 3);
            out.push('}');
        }
    }

    Ok(out)
}

fn newline(out: &mut String, level: usize) {
    out.push('\n');
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_field(out: &mut String, level: usize, key: &str, value: &str) {
    newline(out, level);
    out.push('"');
    out.push_str(key);
    out.push_str("\": ");
    out.push_str(value);
    out.push(',');
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// JSON文字列から読み込む。不正な文書はエラー
///
/// 入れ子の深さに上限は設けない（スタックは必要に応じて伸ばす）。
pub fn from_json(
    json: &str,
    progress: &mut dyn Progress,
    interval: usize,
) -> Result<LoadOutcome> {
    let mut json_de = serde_json::Deserializer::from_str(json);
    json_de.disable_recursion_limit();
    let records = Vec::<NodeRecord>::deserialize(serde_stacker::Deserializer::new(&mut json_de))?;
    json_de.end()?;
    Ok(deserialize(records, progress, interval))
}

/// インデント付きテキストに出力
///
/// 1ノード1行、深さごとに空白4つ: `- <名前> <コード>[ # <備考>]`
pub fn export_outline(tree: &CategoryTree) -> String {
    let mut out = String::new();
    tree.for_each_pre_order(|depth, node| {
        out.push_str(&"    ".repeat(depth));
        out.push_str("- ");
        out.push_str(node.name());
        out.push(' ');
        out.push_str(node.code());
        if !node.remark().is_empty() {
            out.push_str(" # ");
            out.push_str(node.remark());
        }
        out.push('\n');
    });
    out
}
