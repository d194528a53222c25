use std::path::PathBuf;

use catalog_recon::config::Config;
use catalog_recon::rule_source::RuleSourceOptions;
use catalog_recon_common::{CategoryNode, CategoryTree, NodePath, ReconciliationSession, ReviewRequest};

pub struct AppState {
    pub tree: CategoryTree,
    pub session: ReconciliationSession,
    pub source_path: Option<PathBuf>,
    pub selected: Option<NodePath>,
    pub rule_options: RuleSourceOptions,
    pub progress_interval: usize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let tree = CategoryTree::new();
        let session = ReconciliationSession::for_tree(&tree, config.color_assigner(), config.match_options());
        Self {
            tree,
            session,
            source_path: None,
            selected: None,
            rule_options: RuleSourceOptions::from_config(config),
            progress_interval: config.progress_interval,
        }
    }

    /// 読み込み完了したツリーに差し替える
    pub fn replace_tree(&mut self, tree: CategoryTree, source_path: Option<PathBuf>) {
        self.session.reset_for(&tree);
        self.tree = tree;
        self.source_path = source_path;
        self.selected = None;
    }
}

/// 表示中の1行
#[derive(Debug, Clone)]
pub struct Row {
    pub path: NodePath,
    pub depth: usize,
    pub name: String,
    pub code: String,
    pub remark: String,
    pub favorite: bool,
    pub folder: bool,
    pub expanded: bool,
}

impl Row {
    fn new(path: NodePath, node: &CategoryNode) -> Self {
        Self {
            depth: path.depth() - 1,
            path,
            name: node.name().to_string(),
            code: node.code().to_string(),
            remark: node.remark().to_string(),
            favorite: node.is_favorite(),
            folder: node.is_folder(),
            expanded: node.is_expanded(),
        }
    }
}

/// 展開されている部分だけを先行順に並べる
pub fn visible_rows(tree: &CategoryTree) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut stack: Vec<(NodePath, &CategoryNode)> = tree
        .roots()
        .iter()
        .enumerate()
        .rev()
        .map(|(i, node)| (NodePath::new(vec![i]), node))
        .collect();

    while let Some((path, node)) = stack.pop() {
        if node.is_expanded() {
            for (i, child) in node.children().iter().enumerate().rev() {
                stack.push((path.child(i), child));
            }
        }
        rows.push(Row::new(path, node));
    }
    rows
}

/// レビューウィンドウの状態
pub struct ReviewState {
    pub request: ReviewRequest,
    pub checked: Vec<bool>,
}

impl ReviewState {
    /// 初期状態は全選択
    pub fn new(request: ReviewRequest) -> Self {
        let checked = vec![true; request.fuzzy.len()];
        Self { request, checked }
    }

    pub fn approved_indices(&self) -> Vec<usize> {
        self.checked
            .iter()
            .enumerate()
            .filter(|(_, checked)| **checked)
            .map(|(i, _)| i)
            .collect()
    }
}
