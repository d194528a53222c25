//! カテゴリツリー
//!
//! 仮想ルート直下に並ぶ順序付きの森。ノードの同一性はツリー上の位置
//! （`NodePath`）で表し、グローバルIDは持たない。
//! 走査はすべて明示スタックで行い、深いツリーでも再帰しない。

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 仮想ルートからの子インデックス列
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// 深さ（トップレベルが1）
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// 親のパス。トップレベルノードと空パスは `None`
    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(Self(self.0[..n - 1].to_vec())),
        }
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "[{}]", parts.join("."))
    }
}

/// カテゴリノード
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryNode {
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) remark: String,
    pub(crate) favorite: bool,
    pub(crate) folder: bool,
    pub(crate) expanded: bool,
    pub(crate) children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// リーフ（コード割当対象）を作成
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// フォルダを作成
    pub fn folder(name: impl Into<String>, children: Vec<CategoryNode>) -> Self {
        Self {
            name: name.into(),
            folder: true,
            children,
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    pub fn is_folder(&self) -> bool {
        self.folder
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }
}

/// ツリーの集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub folders: usize,
    pub leaves: usize,
    pub coded: usize,
    pub favorites: usize,
}

/// カテゴリツリー（1プロジェクトに1つ）
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
    dirty: bool,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// トップレベルノード列から作成（未変更状態）
    pub fn from_roots(roots: Vec<CategoryNode>) -> Self {
        Self { roots, dirty: false }
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// 未保存の変更があるか
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// 保存成功後に呼ぶ
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn node(&self, path: &NodePath) -> Option<&CategoryNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        for &index in rest {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, path: &NodePath) -> Result<&mut CategoryNode, TreeError> {
        let not_found = || TreeError::NodeNotFound(path.to_string());
        let (first, rest) = path.indices().split_first().ok_or_else(not_found)?;
        let mut node = self.roots.get_mut(*first).ok_or_else(not_found)?;
        for &index in rest {
            node = node.children.get_mut(index).ok_or_else(not_found)?;
        }
        Ok(node)
    }

    /// 子ノードを追加して、そのパスを返す
    ///
    /// `parent` が `None` ならトップレベルに追加する。
    /// 親はフォルダでなければならず、追加後に展開される。
    pub fn add_child(
        &mut self,
        parent: Option<&NodePath>,
        name: &str,
        folder: bool,
    ) -> Result<NodePath, TreeError> {
        if name.trim().is_empty() {
            return Err(TreeError::EmptyName);
        }
        let node = CategoryNode {
            name: name.to_string(),
            folder,
            ..Default::default()
        };

        let path = match parent {
            None => {
                self.roots.push(node);
                NodePath::new(vec![self.roots.len() - 1])
            }
            Some(parent_path) => {
                let parent_node = self.node_mut(parent_path)?;
                if !parent_node.folder {
                    return Err(TreeError::NotAFolder(parent_path.to_string()));
                }
                parent_node.children.push(node);
                parent_node.expanded = true;
                parent_path.child(parent_node.children.len() - 1)
            }
        };
        self.dirty = true;
        Ok(path)
    }

    /// ノードをサブツリーごと削除
    ///
    /// 後続の兄弟のパスは1つ前にずれる。
    pub fn remove(&mut self, path: &NodePath) -> Result<CategoryNode, TreeError> {
        let not_found = || TreeError::NodeNotFound(path.to_string());
        let (&last, _) = path.indices().split_last().ok_or_else(not_found)?;
        let siblings = match path.parent() {
            None => &mut self.roots,
            Some(parent) => &mut self.node_mut(&parent)?.children,
        };
        if last >= siblings.len() {
            return Err(not_found());
        }
        let removed = siblings.remove(last);
        self.dirty = true;
        Ok(removed)
    }

    pub fn rename(&mut self, path: &NodePath, name: &str) -> Result<(), TreeError> {
        if name.trim().is_empty() {
            return Err(TreeError::EmptyName);
        }
        let node = self.node_mut(path)?;
        if node.name != name {
            node.name = name.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    /// コードを設定。値が変わった場合 `true`
    pub fn set_code(&mut self, path: &NodePath, code: &str) -> Result<bool, TreeError> {
        let node = self.node_mut(path)?;
        if node.code == code {
            return Ok(false);
        }
        node.code = code.to_string();
        self.dirty = true;
        Ok(true)
    }

    pub fn set_remark(&mut self, path: &NodePath, remark: &str) -> Result<(), TreeError> {
        let node = self.node_mut(path)?;
        if node.remark != remark {
            node.remark = remark.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    /// お気に入りを反転し、新しい状態を返す
    pub fn toggle_favorite(&mut self, path: &NodePath) -> Result<bool, TreeError> {
        let node = self.node_mut(path)?;
        node.favorite = !node.favorite;
        let favorite = node.favorite;
        self.dirty = true;
        Ok(favorite)
    }

    /// 展開状態は表示状態なので dirty にしない
    pub fn set_expanded(&mut self, path: &NodePath, expanded: bool) -> Result<(), TreeError> {
        self.node_mut(path)?.expanded = expanded;
        Ok(())
    }

    /// 祖先をすべて展開（ノード自身は変更しない）
    pub fn expand_ancestors(&mut self, path: &NodePath) -> Result<(), TreeError> {
        let indices = path.indices();
        if self.node(path).is_none() {
            return Err(TreeError::NodeNotFound(path.to_string()));
        }
        for depth in 1..indices.len() {
            let ancestor = NodePath::new(indices[..depth].to_vec());
            self.node_mut(&ancestor)?.expanded = true;
        }
        Ok(())
    }

    /// ノードと子孫をすべて折りたたむ
    pub fn collapse_subtree(&mut self, path: &NodePath) -> Result<(), TreeError> {
        let mut stack = vec![self.node_mut(path)?];
        while let Some(node) = stack.pop() {
            node.expanded = false;
            stack.extend(node.children.iter_mut());
        }
        Ok(())
    }

    /// 仮想ルートを除いた `/` 区切りのフルパス
    pub fn full_path(&self, path: &NodePath) -> Option<String> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.roots.get(*first)?;
        let mut names = vec![node.name.as_str()];
        for &index in rest {
            node = node.children.get(index)?;
            names.push(node.name.as_str());
        }
        Some(names.join("/"))
    }

    /// 後行順で全ノードを訪問する
    ///
    /// `visit` には自身のパス、ルートから自身までの名前列、ノードが渡る。
    /// 子はすべて親より先に訪問される。
    pub fn for_each_post_order<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&NodePath, &[&'a str], &'a CategoryNode),
    {
        // (所有ノード, 兄弟列, 次に見る位置)
        let mut stack: Vec<(Option<&'a CategoryNode>, &'a [CategoryNode], usize)> =
            vec![(None, self.roots.as_slice(), 0)];
        let mut indices: Vec<usize> = Vec::new();
        let mut names: Vec<&'a str> = Vec::new();

        while let Some(frame) = stack.last_mut() {
            let (owner, siblings, next) = *frame;
            if next < siblings.len() {
                frame.2 += 1;
                let node = &siblings[next];
                indices.push(next);
                names.push(node.name.as_str());
                stack.push((Some(node), node.children.as_slice(), 0));
                continue;
            }

            stack.pop();
            if let Some(node) = owner {
                let path = NodePath::new(indices.clone());
                visit(&path, &names, node);
                indices.pop();
                names.pop();
            }
        }
    }

    /// 後行順でリーフ（フォルダ以外）のみ訪問する
    pub fn for_each_leaf_post_order<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&NodePath, &[&'a str], &'a CategoryNode),
    {
        self.for_each_post_order(|path, names, node| {
            if !node.folder {
                visit(path, names, node);
            }
        });
    }

    /// 先行順で全ノードを訪問する（`depth` はトップレベルが0）
    pub fn for_each_pre_order<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(usize, &'a CategoryNode),
    {
        let mut stack: Vec<(usize, &'a CategoryNode)> =
            self.roots.iter().rev().map(|node| (0, node)).collect();
        while let Some((depth, node)) = stack.pop() {
            visit(depth, node);
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.for_each_pre_order(|_, node| {
            stats.nodes += 1;
            if node.folder {
                stats.folders += 1;
            } else {
                stats.leaves += 1;
            }
            if !node.code.trim().is_empty() {
                stats.coded += 1;
            }
            if node.favorite {
                stats.favorites += 1;
            }
        });
        stats
    }
}

impl Drop for CategoryTree {
    // 深いツリーでもスタックを使い切らないよう明示的に解体する
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.roots);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CategoryTree {
        CategoryTree::from_roots(vec![
            CategoryNode::folder(
                "Tools",
                vec![
                    CategoryNode::folder(
                        "Drills",
                        vec![
                            CategoryNode::leaf("Cordless Drill"),
                            CategoryNode::leaf("Hammer Drill"),
                        ],
                    ),
                    CategoryNode::leaf("Saws"),
                ],
            ),
            CategoryNode::leaf("Garden"),
        ])
    }

    fn path(indices: &[usize]) -> NodePath {
        NodePath::new(indices.to_vec())
    }

    #[test]
    fn test_full_path() {
        let tree = sample_tree();
        assert_eq!(tree.full_path(&path(&[0, 0, 1])).as_deref(), Some("Tools/Drills/Hammer Drill"));
        assert_eq!(tree.full_path(&path(&[1])).as_deref(), Some("Garden"));
        assert_eq!(tree.full_path(&path(&[5])), None);
        assert_eq!(tree.full_path(&path(&[])), None);
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let tree = sample_tree();
        let mut order = Vec::new();
        tree.for_each_post_order(|_, names, _| order.push(names.join("/")));
        assert_eq!(
            order,
            vec![
                "Tools/Drills/Cordless Drill",
                "Tools/Drills/Hammer Drill",
                "Tools/Drills",
                "Tools/Saws",
                "Tools",
                "Garden",
            ]
        );
    }

    #[test]
    fn test_leaf_post_order_skips_folders() {
        let tree = sample_tree();
        let mut leaves = Vec::new();
        tree.for_each_leaf_post_order(|p, _, node| leaves.push((p.clone(), node.name().to_string())));
        assert_eq!(leaves.len(), 4);
        assert_eq!(leaves[0], (path(&[0, 0, 0]), "Cordless Drill".to_string()));
        assert_eq!(leaves[3], (path(&[1]), "Garden".to_string()));
    }

    #[test]
    fn test_pre_order_depths() {
        let tree = sample_tree();
        let mut seen = Vec::new();
        tree.for_each_pre_order(|depth, node| seen.push((depth, node.name().to_string())));
        assert_eq!(seen[0], (0, "Tools".to_string()));
        assert_eq!(seen[1], (1, "Drills".to_string()));
        assert_eq!(seen[2], (2, "Cordless Drill".to_string()));
        assert_eq!(seen[5], (0, "Garden".to_string()));
    }

    #[test]
    fn test_add_child_marks_dirty_and_expands_parent() {
        let mut tree = sample_tree();
        assert!(!tree.is_dirty());
        let new_path = tree.add_child(Some(&path(&[0, 0])), "Impact Driver", false).unwrap();
        assert_eq!(new_path, path(&[0, 0, 2]));
        assert!(tree.is_dirty());
        assert!(tree.node(&path(&[0, 0])).unwrap().is_expanded());
        assert_eq!(tree.full_path(&new_path).as_deref(), Some("Tools/Drills/Impact Driver"));
    }

    #[test]
    fn test_add_top_level() {
        let mut tree = CategoryTree::new();
        let p = tree.add_child(None, "Kitchen", true).unwrap();
        assert_eq!(p, path(&[0]));
        assert!(tree.node(&p).unwrap().is_folder());
    }

    #[test]
    fn test_add_child_rejects_invalid() {
        let mut tree = sample_tree();
        assert_eq!(tree.add_child(None, "  ", true), Err(TreeError::EmptyName));
        assert!(matches!(
            tree.add_child(Some(&path(&[1])), "Pots", false),
            Err(TreeError::NotAFolder(_))
        ));
        assert!(matches!(
            tree.add_child(Some(&path(&[9])), "Pots", false),
            Err(TreeError::NodeNotFound(_))
        ));
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = sample_tree();
        let removed = tree.remove(&path(&[0, 0])).unwrap();
        assert_eq!(removed.children().len(), 2);
        assert_eq!(tree.stats().nodes, 3);
        assert_eq!(tree.full_path(&path(&[0, 0])).as_deref(), Some("Tools/Saws"));
        assert!(tree.is_dirty());
        assert!(tree.remove(&path(&[0, 7])).is_err());
    }

    #[test]
    fn test_rename_empty_rejected() {
        let mut tree = sample_tree();
        assert_eq!(tree.rename(&path(&[1]), ""), Err(TreeError::EmptyName));
        assert!(!tree.is_dirty());
        tree.rename(&path(&[1]), "Outdoor").unwrap();
        assert_eq!(tree.node(&path(&[1])).unwrap().name(), "Outdoor");
        assert!(tree.is_dirty());
    }

    #[test]
    fn test_set_code_reports_change() {
        let mut tree = sample_tree();
        assert!(!tree.set_code(&path(&[1]), "").unwrap());
        assert!(!tree.is_dirty());
        assert!(tree.set_code(&path(&[1]), "GD-1").unwrap());
        assert!(tree.is_dirty());
        assert_eq!(tree.node(&path(&[1])).unwrap().code(), "GD-1");
    }

    #[test]
    fn test_toggle_favorite_and_remark() {
        let mut tree = sample_tree();
        assert!(tree.toggle_favorite(&path(&[0, 1])).unwrap());
        assert!(!tree.toggle_favorite(&path(&[0, 1])).unwrap());
        tree.set_remark(&path(&[0, 1]), "要確認").unwrap();
        assert_eq!(tree.node(&path(&[0, 1])).unwrap().remark(), "要確認");
    }

    #[test]
    fn test_expand_ancestors_and_collapse() {
        let mut tree = sample_tree();
        tree.expand_ancestors(&path(&[0, 0, 1])).unwrap();
        assert!(tree.node(&path(&[0])).unwrap().is_expanded());
        assert!(tree.node(&path(&[0, 0])).unwrap().is_expanded());
        assert!(!tree.node(&path(&[0, 0, 1])).unwrap().is_expanded());
        assert!(!tree.is_dirty());

        tree.collapse_subtree(&path(&[0])).unwrap();
        assert!(!tree.node(&path(&[0])).unwrap().is_expanded());
        assert!(!tree.node(&path(&[0, 0])).unwrap().is_expanded());
    }

    #[test]
    fn test_deep_tree_traversal() {
        // 再帰なしで深いツリーを走査できること
        let mut node = CategoryNode::leaf("bottom");
        for i in 0..5000 {
            node = CategoryNode::folder(format!("level{i}"), vec![node]);
        }
        let tree = CategoryTree::from_roots(vec![node]);
        let mut leaves = 0;
        let mut depth = 0;
        tree.for_each_leaf_post_order(|p, names, _| {
            leaves += 1;
            depth = p.depth();
            assert_eq!(names.len(), p.depth());
        });
        assert_eq!(leaves, 1);
        assert_eq!(depth, 5001);
        assert_eq!(tree.stats().nodes, 5001);
    }

    #[test]
    fn test_stats() {
        let tree = CategoryTree::from_roots(vec![CategoryNode::folder(
            "A",
            vec![
                CategoryNode::leaf("B").with_code("X/1").with_favorite(true),
                CategoryNode::leaf("C"),
            ],
        )]);
        let stats = tree.stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.folders, 1);
        assert_eq!(stats.leaves, 2);
        assert_eq!(stats.coded, 1);
        assert_eq!(stats.favorites, 1);
    }

    #[test]
    fn test_node_path_display_and_parent() {
        let p = path(&[0, 3, 2]);
        assert_eq!(p.to_string(), "[0.3.2]");
        assert_eq!(p.parent(), Some(path(&[0, 3])));
        assert_eq!(path(&[4]).parent(), None);
    }
}
