use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use anyhow::Result;
use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};

use catalog_recon::config::Config;
use catalog_recon_common::{
    find_best, Color, Flow, LoadOutcome, MatchKind, NodePath, ReviewDecision, ReviewRequest,
};

use crate::io::{default_export_path, import_outline, read_project, read_rules, write_outline, write_project};
use crate::model::{visible_rows, AppState, ReviewState, Row};

const ROW_HEIGHT: f32 = 24.0;
const INDENT: f32 = 18.0;

pub struct DesktopApp {
    state: AppState,
    status: String,
    search_text: String,
    load_job: Option<LoadJob>,
    edit: Option<EditDialog>,
    confirm_delete: Option<NodePath>,
    review: Option<ReviewState>,
    scroll_to: Option<NodePath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadKind {
    Project,
    Outline,
}

enum UiMessage {
    Progress(usize),
    Loaded {
        kind: LoadKind,
        path: PathBuf,
        result: std::result::Result<LoadOutcome, String>,
    },
}

struct LoadJob {
    rx: Receiver<UiMessage>,
    cancel: Arc<AtomicBool>,
    processed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Rename,
    Code,
    Remark,
    AddChild { folder: bool },
}

struct EditDialog {
    kind: EditKind,
    /// `AddChild` で `None` ならトップレベル
    target: Option<NodePath>,
    text: String,
}

enum RowAction {
    Select(NodePath),
    SetExpanded(NodePath, bool),
    ToggleFavorite(NodePath),
    Edit(EditKind, Option<NodePath>),
    Delete(NodePath),
    CopyPath(NodePath),
}

impl DesktopApp {
    pub fn new(config: &Config) -> Self {
        Self {
            state: AppState::new(config),
            status: String::new(),
            search_text: String::new(),
            load_job: None,
            edit: None,
            confirm_delete: None,
            review: None,
            scroll_to: None,
        }
    }

    fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("JSON", &["json"]).pick_file() {
            self.start_load(LoadKind::Project, path);
        }
    }

    fn open_outline(&mut self) {
        if let Some(path) = rfd::FileDialog::new().add_filter("OPML", &["opml", "xml"]).pick_file() {
            self.start_load(LoadKind::Outline, path);
        }
    }

    fn reload_project(&mut self) {
        let Some(path) = self.state.source_path.clone() else {
            self.status = "プロジェクトが開かれていません".to_string();
            return;
        };
        self.start_load(LoadKind::Project, path);
    }

    /// 別スレッドで作業用ツリーに読み込む
    fn start_load(&mut self, kind: LoadKind, path: PathBuf) {
        if self.load_job.is_some() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);
        let interval = self.state.progress_interval;

        std::thread::spawn(move || {
            let progress_tx = tx.clone();
            let mut tick = |processed: usize| {
                let _ = progress_tx.send(UiMessage::Progress(processed));
                if cancel_flag.load(Ordering::Relaxed) {
                    Flow::Cancel
                } else {
                    Flow::Continue
                }
            };
            let result = match kind {
                LoadKind::Project => read_project(&path, &mut tick, interval),
                LoadKind::Outline => import_outline(&path, &mut tick, interval),
            };
            let _ = tx.send(UiMessage::Loaded {
                kind,
                path,
                result: result.map_err(|err| format!("{err:#}")),
            });
        });

        self.load_job = Some(LoadJob {
            rx,
            cancel,
            processed: 0,
        });
        self.status = "読み込み中...".to_string();
    }

    fn poll_messages(&mut self) {
        let Some(job) = &mut self.load_job else {
            return;
        };
        let mut finished = None;
        while let Ok(msg) = job.rx.try_recv() {
            match msg {
                UiMessage::Progress(processed) => job.processed = processed,
                UiMessage::Loaded { kind, path, result } => {
                    finished = Some((kind, path, result));
                    break;
                }
            }
        }

        if let Some((kind, path, result)) = finished {
            self.load_job = None;
            self.finish_load(kind, path, result);
        }
    }

    fn finish_load(&mut self, kind: LoadKind, path: PathBuf, result: std::result::Result<LoadOutcome, String>) {
        match result {
            Ok(LoadOutcome::Complete(tree)) => {
                let nodes = tree.stats().nodes;
                let source = match kind {
                    LoadKind::Project => Some(path.clone()),
                    LoadKind::Outline => None,
                };
                self.state.replace_tree(tree, source);
                self.status = match kind {
                    LoadKind::Project => format!("読み込み完了: {} ({}ノード)", path.display(), nodes),
                    LoadKind::Outline => format!("新規プロジェクト: {} ({}ノード)", path.display(), nodes),
                };
            }
            Ok(LoadOutcome::Cancelled(partial)) => {
                self.status = format!("キャンセルしました ({}ノードで中断)", partial.stats().nodes);
            }
            Err(err) => self.status = format!("読み込み失敗: {err}"),
        }
    }

    fn save_project(&mut self) {
        let path = match self.state.source_path.clone() {
            Some(path) => path,
            None => match rfd::FileDialog::new()
                .add_filter("JSON", &["json"])
                .set_file_name("Catalog.json")
                .save_file()
            {
                Some(path) => path,
                None => return,
            },
        };
        match write_project(&path, &mut self.state.tree) {
            Ok(()) => {
                self.status = format!("保存しました: {}", path.display());
                self.state.source_path = Some(path);
            }
            Err(err) => self.status = format!("保存失敗: {err:#}"),
        }
    }

    fn export_outline(&mut self) {
        let default_path = default_export_path(self.state.source_path.as_deref());
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Text", &["txt"])
            .set_file_name(default_path.file_name().and_then(|s| s.to_str()).unwrap_or("Catalog.txt"))
            .save_file()
        else {
            return;
        };
        match write_outline(&path, &self.state.tree) {
            Ok(()) => self.status = format!("出力しました: {}", path.display()),
            Err(err) => self.status = format!("出力失敗: {err:#}"),
        }
    }

    fn run_reconcile(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Rules", &["csv", "xlsx", "xls", "ods"])
            .pick_file()
        else {
            return;
        };
        if let Err(err) = self.reconcile_with(&path) {
            self.status = format!("照合失敗: {err:#}");
        }
    }

    fn reconcile_with(&mut self, path: &std::path::Path) -> Result<()> {
        let rows = read_rules(path, &self.state.rule_options)?;
        let request = self.state.session.run(&self.state.tree, &rows);
        if request.needs_review() {
            self.status = format!(
                "完全一致 {}件 / あいまい一致 {}件 を確認してください",
                request.exact.len(),
                request.fuzzy.len()
            );
            self.review = Some(ReviewState::new(request));
        } else {
            self.apply_review(request, ReviewDecision::RejectAll);
        }
        Ok(())
    }

    fn apply_review(&mut self, request: ReviewRequest, decision: ReviewDecision) {
        let report = self.state.session.apply_decision(&mut self.state.tree, request, &decision);
        self.status = format!(
            "更新: {}件 (完全一致 {}, あいまい一致 {}){}",
            report.applied,
            report.exact_applied,
            report.fuzzy_applied,
            if report.stale > 0 { format!(", スキップ {}件", report.stale) } else { String::new() }
        );
    }

    fn run_search(&mut self) {
        let query = self.search_text.trim().to_string();
        if query.is_empty() {
            return;
        }
        match find_best(&self.state.tree, &query) {
            Some(hit) => {
                for index in 0..self.state.tree.roots().len() {
                    let _ = self.state.tree.collapse_subtree(&NodePath::new(vec![index]));
                }
                let _ = self.state.tree.expand_ancestors(&hit.path);
                self.state.selected = Some(hit.path.clone());
                self.scroll_to = Some(hit.path);
                self.status = format!("見つかりました: {}", hit.full_path);
            }
            None => self.status = format!("一致する項目がありません: {query}"),
        }
    }

    fn apply_action(&mut self, ctx: &egui::Context, action: RowAction) {
        let tree = &mut self.state.tree;
        let result = match action {
            RowAction::Select(path) => {
                self.state.selected = Some(path);
                Ok(())
            }
            RowAction::SetExpanded(path, true) => tree.set_expanded(&path, true),
            // 折りたたむと子孫もすべて折りたたむ
            RowAction::SetExpanded(path, false) => tree.collapse_subtree(&path),
            RowAction::ToggleFavorite(path) => tree.toggle_favorite(&path).map(|_| ()),
            RowAction::Edit(kind, target) => {
                let text = match (&kind, &target) {
                    (EditKind::Rename, Some(path)) => tree.node(path).map(|n| n.name().to_string()),
                    (EditKind::Code, Some(path)) => tree.node(path).map(|n| n.code().to_string()),
                    (EditKind::Remark, Some(path)) => tree.node(path).map(|n| n.remark().to_string()),
                    _ => None,
                };
                self.edit = Some(EditDialog {
                    kind,
                    target,
                    text: text.unwrap_or_default(),
                });
                Ok(())
            }
            RowAction::Delete(path) => {
                self.confirm_delete = Some(path);
                Ok(())
            }
            RowAction::CopyPath(path) => {
                if let Some(full_path) = tree.full_path(&path) {
                    ctx.output_mut(|o| o.copied_text = full_path);
                }
                Ok(())
            }
        };
        if let Err(err) = result {
            self.status = format!("操作失敗: {err}");
        }
    }

    fn commit_edit(&mut self, dialog: EditDialog) {
        let tree = &mut self.state.tree;
        let text = dialog.text.trim();
        let result = match (dialog.kind, dialog.target.as_ref()) {
            (EditKind::Rename, Some(path)) => tree.rename(path, text),
            (EditKind::Code, Some(path)) => tree.set_code(path, text).map(|changed| {
                if changed {
                    self.state.session.colors_mut().color_for(text);
                }
            }),
            (EditKind::Remark, Some(path)) => tree.set_remark(path, text),
            (EditKind::AddChild { folder }, parent) => tree.add_child(parent, text, folder).map(|path| {
                self.state.selected = Some(path);
            }),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.status = format!("操作失敗: {err}");
        }
    }

    fn delete_node(&mut self, path: &NodePath) {
        match self.state.tree.remove(path) {
            Ok(node) => {
                self.status = format!("削除しました: {}", node.name());
                self.state.selected = None;
            }
            Err(err) => self.status = format!("削除失敗: {err}"),
        }
    }

    fn title(&self) -> String {
        let name = self
            .state
            .source_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "新規".to_string());
        let dirty = if self.state.tree.is_dirty() { " *" } else { "" };
        format!("Catalog Recon - {name}{dirty}")
    }

    fn render_row(&self, ui: &mut egui::Ui, row: &Row, actions: &mut Vec<RowAction>) {
        ui.horizontal(|ui| {
            ui.add_space(row.depth as f32 * INDENT);

            if row.folder {
                let arrow = if row.expanded { "▼" } else { "▶" };
                if ui.small_button(arrow).clicked() {
                    actions.push(RowAction::SetExpanded(row.path.clone(), !row.expanded));
                }
            } else {
                ui.add_space(INDENT);
            }

            let icon = if row.folder { "📂" } else { "📄" };
            let selected = self.state.selected.as_ref() == Some(&row.path);
            let response = ui.selectable_label(selected, format!("{icon} {}", row.name));
            if response.clicked() {
                actions.push(RowAction::Select(row.path.clone()));
            }
            if response.double_clicked() {
                actions.push(RowAction::Edit(EditKind::Rename, Some(row.path.clone())));
            }
            response.context_menu(|ui| {
                if ui.button("✏ 名前を変更").clicked() {
                    actions.push(RowAction::Edit(EditKind::Rename, Some(row.path.clone())));
                    ui.close_menu();
                }
                if !row.folder && ui.button("🏷 コードを編集").clicked() {
                    actions.push(RowAction::Edit(EditKind::Code, Some(row.path.clone())));
                    ui.close_menu();
                }
                if ui.button("📝 備考を編集").clicked() {
                    actions.push(RowAction::Edit(EditKind::Remark, Some(row.path.clone())));
                    ui.close_menu();
                }
                if ui.button("🗑 削除").clicked() {
                    actions.push(RowAction::Delete(row.path.clone()));
                    ui.close_menu();
                }
                if row.folder {
                    ui.separator();
                    if ui.button("📂 サブフォルダを追加").clicked() {
                        actions.push(RowAction::Edit(EditKind::AddChild { folder: true }, Some(row.path.clone())));
                        ui.close_menu();
                    }
                    if ui.button("📄 項目を追加").clicked() {
                        actions.push(RowAction::Edit(EditKind::AddChild { folder: false }, Some(row.path.clone())));
                        ui.close_menu();
                    }
                }
                ui.separator();
                if ui.button("📋 パスをコピー").clicked() {
                    actions.push(RowAction::CopyPath(row.path.clone()));
                    ui.close_menu();
                }
            });

            if !row.code.is_empty() {
                let fill = self
                    .state
                    .session
                    .colors()
                    .peek(&row.code)
                    .map(to_color32)
                    .unwrap_or(Color32::TRANSPARENT);
                egui::Frame::none()
                    .fill(fill)
                    .rounding(egui::Rounding::same(4.0))
                    .inner_margin(egui::Margin::symmetric(6.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&row.code).color(Color32::BLACK).monospace());
                    });
            }
            if !row.remark.is_empty() {
                ui.label(RichText::new(format!("# {}", row.remark)).color(Color32::from_gray(140)));
            }

            let star = if row.favorite {
                RichText::new("★").color(Color32::from_rgb(0xFF, 0xD7, 0x00))
            } else {
                RichText::new("☆").color(Color32::from_gray(0xBD))
            };
            if ui.add(egui::Button::new(star).frame(false)).clicked() {
                actions.push(RowAction::ToggleFavorite(row.path.clone()));
            }
        });
    }

    fn render_tree(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let rows = visible_rows(&self.state.tree);
        let mut actions = Vec::new();

        let mut scroll = egui::ScrollArea::vertical().auto_shrink([false, false]);
        if let Some(target) = self.scroll_to.take() {
            if let Some(index) = rows.iter().position(|row| row.path == target) {
                let spacing = ui.spacing().item_spacing.y;
                scroll = scroll.vertical_scroll_offset(index as f32 * (ROW_HEIGHT + spacing));
            }
        }

        scroll.show_rows(ui, ROW_HEIGHT, rows.len(), |ui, range| {
            for row in &rows[range] {
                self.render_row(ui, row, &mut actions);
            }
        });

        for action in actions {
            self.apply_action(ctx, action);
        }
    }

    fn render_review(&mut self, ctx: &egui::Context) {
        let Some(review) = &mut self.review else {
            return;
        };
        let mut decision = None;

        egui::Window::new(format!("🔍 あいまい一致の確認 - {}件", review.request.fuzzy.len()))
            .collapsible(false)
            .resizable(true)
            .default_size([900.0, 600.0])
            .show(ctx, |ui| {
                ui.label(
                    RichText::new("上段が認識結果、下段が正しいパスです")
                        .color(Color32::from_rgb(0xE6, 0x51, 0x00))
                        .strong(),
                );
                ui.separator();
                egui::ScrollArea::vertical().max_height(480.0).show(ui, |ui| {
                    egui::Grid::new("review_grid").striped(true).num_columns(4).show(ui, |ui| {
                        ui.label(RichText::new("選択").strong());
                        ui.label(RichText::new("種別").strong());
                        ui.label(RichText::new("パスの比較").strong());
                        ui.label(RichText::new("コード").strong());
                        ui.end_row();

                        for (i, candidate) in review.request.fuzzy.iter().enumerate() {
                            ui.checkbox(&mut review.checked[i], "");
                            let kind = RichText::new(candidate.classification.to_string()).strong();
                            let kind = match candidate.classification {
                                MatchKind::TruncatedTail => kind.color(Color32::from_rgb(0x80, 0x00, 0x80)),
                                MatchKind::OcrTypo => kind,
                            };
                            ui.label(kind);
                            ui.vertical(|ui| {
                                ui.label(
                                    RichText::new(format!("🔴 認識: {}", candidate.full_path))
                                        .monospace()
                                        .background_color(Color32::from_rgb(0xFF, 0xF3, 0xE0))
                                        .color(Color32::BLACK),
                                );
                                ui.label(
                                    RichText::new(format!("🟢 標準: {}", candidate.matched_raw_path))
                                        .monospace()
                                        .background_color(Color32::from_rgb(0xE8, 0xF5, 0xE9))
                                        .color(Color32::BLACK),
                                );
                            });
                            ui.label(RichText::new(&candidate.code).color(Color32::BLUE).strong());
                            ui.end_row();
                        }
                    });
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("全部却下").clicked() {
                        decision = Some(ReviewDecision::RejectAll);
                    }
                    if ui.button(RichText::new("✅ 確定して適用").strong()).clicked() {
                        decision = Some(ReviewDecision::Approve(review.approved_indices()));
                    }
                });
            });

        if let Some(decision) = decision {
            if let Some(review) = self.review.take() {
                self.apply_review(review.request, decision);
            }
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(dialog) = &mut self.edit {
            let title = match dialog.kind {
                EditKind::Rename => "名前を変更",
                EditKind::Code => "コードを編集",
                EditKind::Remark => "備考を編集",
                EditKind::AddChild { folder: true } => "フォルダを追加",
                EditKind::AddChild { folder: false } => "項目を追加",
            };
            let mut commit = false;
            let mut cancel = false;
            egui::Window::new(title).collapsible(false).resizable(false).show(ctx, |ui| {
                let response = ui.text_edit_singleline(&mut dialog.text);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    commit = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        commit = true;
                    }
                    if ui.button("キャンセル").clicked() {
                        cancel = true;
                    }
                });
            });
            // 名前は空にできない
            let needs_name = matches!(dialog.kind, EditKind::Rename | EditKind::AddChild { .. });
            if commit && needs_name && dialog.text.trim().is_empty() {
                commit = false;
            }
            if commit {
                if let Some(dialog) = self.edit.take() {
                    self.commit_edit(dialog);
                }
            } else if cancel {
                self.edit = None;
            }
        }

        if let Some(path) = self.confirm_delete.clone() {
            let name = self
                .state
                .tree
                .node(&path)
                .map(|n| n.name().to_string())
                .unwrap_or_default();
            let mut close = false;
            egui::Window::new("削除の確認").collapsible(false).resizable(false).show(ctx, |ui| {
                ui.label(format!("'{name}' を削除しますか？"));
                ui.horizontal(|ui| {
                    if ui.button("削除").clicked() {
                        self.delete_node(&path);
                        close = true;
                    }
                    if ui.button("キャンセル").clicked() {
                        close = true;
                    }
                });
            });
            if close {
                self.confirm_delete = None;
            }
        }

        if let Some(job) = &self.load_job {
            let processed = job.processed;
            let cancel = Arc::clone(&job.cancel);
            egui::Window::new("読み込み中").collapsible(false).resizable(false).show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(format!("大きなツリーを解析しています... {processed}ノード"));
                });
                if ui.button("キャンセル").clicked() {
                    cancel.store(true, Ordering::Relaxed);
                }
            });
        }
    }
}

fn to_color32(color: Color) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\msyh.ttc",
        r"C:\Windows\Fonts\meiryo.ttc",
        "/System/Library/Fonts/PingFang.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("cjk_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "cjk_fallback".to_string());
            fonts.families
                .entry(FontFamily::Monospace)
                .or_default()
                .insert(0, "cjk_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.load_job.is_some() {
            ctx.request_repaint();
        }
        self.poll_messages();
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.title()));

        let idle = self.load_job.is_none() && self.review.is_none();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("ファイル", |ui| {
                    if ui.add_enabled(idle, egui::Button::new("📂 OPMLから新規作成")).clicked() {
                        self.open_outline();
                        ui.close_menu();
                    }
                    if ui.add_enabled(idle, egui::Button::new("📖 プロジェクトを開く")).clicked() {
                        self.open_project();
                        ui.close_menu();
                    }
                    let has_source = self.state.source_path.is_some();
                    if ui.add_enabled(idle && has_source, egui::Button::new("🔄 再読み込み")).clicked() {
                        self.reload_project();
                        ui.close_menu();
                    }
                    if ui.add_enabled(idle, egui::Button::new("💾 保存")).clicked() {
                        self.save_project();
                        ui.close_menu();
                    }
                    if ui.add_enabled(idle, egui::Button::new("📝 テキスト出力")).clicked() {
                        self.export_outline();
                        ui.close_menu();
                    }
                });

                ui.menu_button("照合", |ui| {
                    let options = &mut self.state.rule_options;
                    ui.horizontal(|ui| {
                        ui.label("開始行");
                        ui.add(egui::DragValue::new(&mut options.row_start).clamp_range(2..=1_000_000));
                        ui.label("終了行");
                        ui.add(egui::DragValue::new(&mut options.row_end).clamp_range(2..=1_000_000));
                    });
                    ui.horizontal(|ui| {
                        ui.label("パス列");
                        ui.text_edit_singleline(&mut options.path_column);
                    });
                    ui.horizontal(|ui| {
                        ui.label("コード列");
                        ui.text_edit_singleline(&mut options.code_column);
                    });
                    if ui.add_enabled(idle, egui::Button::new("🔗 ルールファイルを選んで照合")).clicked() {
                        self.run_reconcile();
                        ui.close_menu();
                    }
                });

                ui.separator();
                let response = ui.add(egui::TextEdit::singleline(&mut self.search_text).hint_text("検索..."));
                let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("🔍").clicked() || enter {
                    self.run_search();
                }
                if ui.add_enabled(idle, egui::Button::new("➕ トップレベル")).clicked() {
                    self.edit = Some(EditDialog {
                        kind: EditKind::AddChild { folder: true },
                        target: None,
                        text: String::new(),
                    });
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let stats = self.state.tree.stats();
                if self.state.tree.is_dirty() {
                    ui.label(RichText::new("状態: 未保存").color(Color32::RED).strong());
                } else {
                    ui.label(RichText::new("状態: 保存済み").color(Color32::from_rgb(0x2E, 0x7D, 0x32)));
                }
                ui.separator();
                ui.label(format!("{}ノード / コード設定済み {}", stats.nodes, stats.coded));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.tree.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("ファイルメニューからOPMLかプロジェクトを開いてください");
                });
                return;
            }
            ui.add_enabled_ui(idle, |ui| {
                self.render_tree(ui, ctx);
            });
        });

        self.render_review(ctx);
        self.render_dialogs(ctx);
    }
}
