//! アウトライン文書（OPML）の取込
//!
//! `<body>` 以下の `<outline>` 要素を入れ子のままノードにする。表示名は
//! `text` 属性、なければ `title` 属性。どちらもない要素は子孫ごと無視する。
//! 取り込んだノードはすべて折りたたみ状態で、子を持つものがフォルダになる。

use crate::error::{Error, Result};
use crate::loader::{LoadOutcome, build_forest};
use crate::progress::{Progress, Ticker};
use crate::tree::CategoryNode;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// `<outline>` 要素1つ分
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineNode {
    pub text: String,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(text: impl Into<String>, children: Vec<OutlineNode>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }
}

/// OPML文字列を解析してトップレベルの要素列を返す
///
/// XMLとして壊れている場合、`<body>` がない場合は `Error::Outline`。
pub fn parse_opml(xml: &str) -> Result<Vec<OutlineNode>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_body = false;
    // 開いている outline の (名前, 子)
    let mut open: Vec<OutlineNode> = Vec::new();
    let mut top: Vec<OutlineNode> = Vec::new();
    // 読み飛ばし中の要素の深さ
    let mut skipping = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Outline(format!("{} バイト目付近: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(ref e) if !in_body => {
                if e.name().as_ref() == b"body" {
                    in_body = true;
                }
            }
            Event::Empty(ref e) if !in_body => {
                if e.name().as_ref() == b"body" {
                    return Ok(top);
                }
            }
            Event::Start(ref e) => {
                if skipping > 0 || e.name().as_ref() != b"outline" {
                    skipping += 1;
                    continue;
                }
                match outline_text(e)? {
                    Some(text) => open.push(OutlineNode::new(text, Vec::new())),
                    None => skipping += 1,
                }
            }
            Event::Empty(ref e) => {
                if skipping > 0 || e.name().as_ref() != b"outline" {
                    continue;
                }
                if let Some(text) = outline_text(e)? {
                    let node = OutlineNode::new(text, Vec::new());
                    match open.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => top.push(node),
                    }
                }
            }
            Event::End(_) if in_body => {
                if skipping > 0 {
                    skipping -= 1;
                    continue;
                }
                match open.pop() {
                    Some(node) => match open.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => top.push(node),
                    },
                    // </body>
                    None => return Ok(top),
                }
            }
            Event::Eof => {
                let message = if in_body {
                    "<body> が閉じられていません"
                } else {
                    "<body> がありません"
                };
                return Err(Error::Outline(message.to_string()));
            }
            _ => {}
        }
    }
}

/// `text`、なければ `title`（空文字はないものとみなす）
fn outline_text(element: &BytesStart<'_>) -> Result<Option<String>> {
    let mut text = None;
    let mut title = None;
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::Outline(e.to_string()))?;
        let slot = match attr.key.as_ref() {
            b"text" => &mut text,
            b"title" => &mut title,
            _ => continue,
        };
        let raw = String::from_utf8_lossy(&attr.value);
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| Error::Outline(e.to_string()))?
            .into_owned();
        *slot = Some(value);
    }
    Ok(text
        .filter(|t| !t.is_empty())
        .or(title.filter(|t| !t.is_empty())))
}

/// 解析済みの要素列からツリーを組み立てる
pub fn import_outline(
    nodes: Vec<OutlineNode>,
    progress: &mut dyn Progress,
    interval: usize,
) -> LoadOutcome {
    let mut ticker = Ticker::new(progress, interval);
    let outcome = build_forest(
        nodes,
        &mut ticker,
        |node| Some((CategoryNode::leaf(node.text), node.children)),
        |node| node.folder = !node.children.is_empty(),
    );
    log::info!(
        "outline imported: {} nodes{}",
        outcome.tree().stats().nodes,
        if outcome.is_complete() { "" } else { " (cancelled)" }
    );
    outcome
}

/// OPML文字列を解析してツリーにする
pub fn import_opml(
    xml: &str,
    progress: &mut dyn Progress,
    interval: usize,
) -> Result<LoadOutcome> {
    Ok(import_outline(parse_opml(xml)?, progress, interval))
}
