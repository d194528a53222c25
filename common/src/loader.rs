//! 外部データからツリーを組み立てる
//!
//! 保存文書の読込とアウトライン取込で共用する。切り離した作業用ツリーに
//! 組み立て、キャンセル時はそこまでの部分ツリーを返す。

use crate::progress::Ticker;
use crate::tree::{CategoryNode, CategoryTree};

/// 読込結果
#[derive(Debug)]
pub enum LoadOutcome {
    /// 最後まで読み込んだ
    Complete(CategoryTree),
    /// 途中でキャンセルされた（処理済みノードのみ）
    Cancelled(CategoryTree),
}

impl LoadOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, LoadOutcome::Complete(_))
    }

    pub fn tree(&self) -> &CategoryTree {
        match self {
            LoadOutcome::Complete(tree) | LoadOutcome::Cancelled(tree) => tree,
        }
    }

    /// 完了時のみツリーを返す
    pub fn complete(self) -> Option<CategoryTree> {
        match self {
            LoadOutcome::Complete(tree) => Some(tree),
            LoadOutcome::Cancelled(_) => None,
        }
    }

    pub fn into_tree(self) -> CategoryTree {
        match self {
            LoadOutcome::Complete(tree) | LoadOutcome::Cancelled(tree) => tree,
        }
    }
}

struct Frame<T> {
    node: CategoryNode,
    pending: std::vec::IntoIter<T>,
}

/// 入れ子の外部ノード列から森を組み立てる（明示スタック）
///
/// `split` は1要素をノード本体と子要素列に分ける。`None` ならその要素を
/// 子孫ごと読み飛ばす。`finish` は子をすべて付け終えたノードに呼ばれる。
pub(crate) fn build_forest<T, S, F>(
    items: Vec<T>,
    ticker: &mut Ticker<'_>,
    mut split: S,
    mut finish: F,
) -> LoadOutcome
where
    S: FnMut(T) -> Option<(CategoryNode, Vec<T>)>,
    F: FnMut(&mut CategoryNode),
{
    let mut roots: Vec<CategoryNode> = Vec::new();
    let mut top = items.into_iter();
    let mut stack: Vec<Frame<T>> = Vec::new();
    let mut cancelled = false;

    loop {
        let next = match stack.last_mut() {
            Some(frame) => frame.pending.next(),
            None => top.next(),
        };

        match next {
            Some(item) => {
                let Some((node, children)) = split(item) else {
                    continue;
                };
                stack.push(Frame {
                    node,
                    pending: children.into_iter(),
                });
                if !ticker.step() {
                    cancelled = true;
                    break;
                }
            }
            None => {
                let Some(frame) = stack.pop() else {
                    break;
                };
                attach(frame.node, &mut stack, &mut roots, &mut finish);
            }
        }
    }

    // キャンセル時は組み立て途中のノードを親に付けて閉じる
    while let Some(frame) = stack.pop() {
        attach(frame.node, &mut stack, &mut roots, &mut finish);
    }

    log::debug!("built {} nodes (cancelled: {})", ticker.processed(), cancelled);
    let tree = CategoryTree::from_roots(roots);
    if cancelled {
        LoadOutcome::Cancelled(tree)
    } else {
        LoadOutcome::Complete(tree)
    }
}

fn attach<T, F>(
    mut node: CategoryNode,
    stack: &mut [Frame<T>],
    roots: &mut Vec<CategoryNode>,
    finish: &mut F,
) where
    F: FnMut(&mut CategoryNode),
{
    finish(&mut node);
    match stack.last_mut() {
        Some(parent) => parent.node.children.push(node),
        None => roots.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{Flow, NoProgress};

    struct Item {
        name: &'static str,
        children: Vec<Item>,
    }

    fn item(name: &'static str, children: Vec<Item>) -> Item {
        Item { name, children }
    }

    fn build(items: Vec<Item>, ticker: &mut Ticker<'_>) -> LoadOutcome {
        build_forest(
            items,
            ticker,
            |item| {
                if item.name.is_empty() {
                    return None;
                }
                Some((CategoryNode::leaf(item.name), item.children))
            },
            |node| node.folder = !node.children.is_empty(),
        )
    }

    #[test]
    fn test_build_nested() {
        let items = vec![item("a", vec![item("b", vec![]), item("c", vec![item("d", vec![])])]), item("e", vec![])];
        let mut progress = NoProgress;
        let mut ticker = Ticker::new(&mut progress, 50);
        let outcome = build(items, &mut ticker);
        assert!(outcome.is_complete());
        let tree = outcome.into_tree();
        assert_eq!(tree.roots().len(), 2);
        let a = &tree.roots()[0];
        assert!(a.is_folder());
        assert_eq!(a.children()[1].children()[0].name(), "d");
        assert!(!a.children()[0].is_folder());
        assert_eq!(ticker.processed(), 5);
    }

    #[test]
    fn test_skipped_item_drops_subtree() {
        let items = vec![item("a", vec![item("", vec![item("x", vec![])]), item("b", vec![])])];
        let mut progress = NoProgress;
        let mut ticker = Ticker::new(&mut progress, 50);
        let tree = build(items, &mut ticker).into_tree();
        assert_eq!(tree.stats().nodes, 2);
        assert_eq!(tree.roots()[0].children()[0].name(), "b");
    }

    #[test]
    fn test_cancel_keeps_partial_tree() {
        let items: Vec<Item> = (0..10).map(|_| item("n", vec![item("m", vec![])])).collect();
        let mut cancel_at_four = |n: usize| if n >= 4 { Flow::Cancel } else { Flow::Continue };
        let mut ticker = Ticker::new(&mut cancel_at_four, 2);
        let outcome = build(items, &mut ticker);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.tree().stats().nodes, 4);
        assert!(outcome.complete().is_none());
    }
}
