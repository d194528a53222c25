//! 文字列類似度
//!
//! 編集距離ベースの類似度。引数の順序に依存しない（対称）。

/// 類似度を計算（0.0〜1.0）
///
/// `1 - レーベンシュタイン距離 / 長い方の文字数`。
/// 同一文字列は1.0、片方だけ空なら0.0。
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    ratio(&a_chars, &b_chars)
}

/// 文字配列同士の類似度
pub(crate) fn ratio(a: &[char], b: &[char]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    1.0 - (levenshtein(a, b) as f64 / max_len as f64)
}

/// 長さだけから求まる類似度の上限
///
/// 距離は少なくとも文字数の差になるため、これを下回る候補は計算不要。
pub(crate) fn upper_bound(a_len: usize, b_len: usize) -> f64 {
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 1.0;
    }
    a_len.min(b_len) as f64 / max_len as f64
}

/// レーベンシュタイン距離を計算（2行DP）
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
