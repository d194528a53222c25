//! コード接頭辞ごとの色割当
//!
//! コードの最初の `/` より前（接頭辞）でグループ化し、初出順にパレットの
//! スロットを割り当てる。割当はセッション中は固定で、ツリー読込時に
//! リセットする。

use crate::tree::CategoryTree;
use std::collections::HashMap;
use std::fmt;

/// 既定パレット
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#FF9999", "#99CCFF", "#99FF99", "#FFE066", "#CC99FF",
    "#FFB366", "#66FFFF", "#FF99CC", "#CCFF33", "#DDDDDD",
];

/// RGB色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB` 形式を解析
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// コードの接頭辞（最初の `/` より前、なければ全体）
pub fn code_prefix(code: &str) -> &str {
    code.split('/').next().unwrap_or(code)
}

/// 接頭辞→パレットスロットの割当表
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Vec<Color>,
    slots: HashMap<String, usize>,
    next_slot: usize,
}

fn default_palette() -> Vec<Color> {
    DEFAULT_PALETTE
        .iter()
        .filter_map(|hex| Color::from_hex(hex))
        .collect()
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::with_palette(default_palette())
    }
}

impl ColorAssigner {
    /// パレットを指定して作成（空なら既定パレット）
    pub fn with_palette(mut palette: Vec<Color>) -> Self {
        if palette.is_empty() {
            palette = default_palette();
        }
        Self {
            palette,
            slots: HashMap::new(),
            next_slot: 0,
        }
    }

    /// `#RRGGBB` の一覧から作成。解析できない値は無視する
    pub fn from_hex_list<S: AsRef<str>>(hexes: &[S]) -> Self {
        let palette = hexes
            .iter()
            .filter_map(|hex| Color::from_hex(hex.as_ref()))
            .collect();
        Self::with_palette(palette)
    }

    /// コードに対応する色。空コードは `None`
    ///
    /// 未出の接頭辞には次のスロットを割り当てる。
    pub fn color_for(&mut self, code: &str) -> Option<Color> {
        self.slot_for(code).map(|slot| self.palette[slot])
    }

    /// コードに対応するスロット番号
    pub fn slot_for(&mut self, code: &str) -> Option<usize> {
        if code.trim().is_empty() {
            return None;
        }
        let prefix = code_prefix(code);
        if let Some(&slot) = self.slots.get(prefix) {
            return Some(slot);
        }
        let slot = self.next_slot;
        self.slots.insert(prefix.to_string(), slot);
        self.next_slot = (self.next_slot + 1) % self.palette.len();
        Some(slot)
    }

    /// 割当済みの色を参照する（新規割当はしない）
    pub fn peek(&self, code: &str) -> Option<Color> {
        if code.trim().is_empty() {
            return None;
        }
        self.slots.get(code_prefix(code)).map(|&slot| self.palette[slot])
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// 割当済み接頭辞の数
    pub fn assigned(&self) -> usize {
        self.slots.len()
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.next_slot = 0;
    }

    /// リセットしてからツリーの既存コードを先行順に割り当てる
    pub fn seed_from(&mut self, tree: &CategoryTree) {
        self.reset();
        tree.for_each_pre_order(|_, node| {
            self.slot_for(node.code());
        });
    }
}
