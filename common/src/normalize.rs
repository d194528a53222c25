//! パス正規化
//!
//! ツリー側とコード表側のパスを同じキー空間で比較するための変換。

/// 比較用の正規化パスに変換する
///
/// - 小文字化
/// - 半角スペースを除去
/// - 区切り文字 `>` と `\` を `/` に統一
pub fn normalize_path(path: &str) -> String {
    path.chars()
        .filter(|c| *c != ' ')
        .map(|c| match c {
            '>' | '\\' => '/',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// パスの最終セグメント（区切りは `/` と `\`）
pub fn last_segment(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path).trim()
}
