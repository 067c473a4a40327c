use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, CharBox};

/// Block typing as declared by the source adapter. Only `Text` blocks are
/// descended into; everything else passes through as a placeholder region.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Photo,
    Table,
    Separator,
}

/// One raw character slot from a source adapter. `code` is an unvalidated
/// code point; surrogate halves may appear here when the source exposes
/// them (see the sanitizer's salvage mode).
#[derive(Debug, Clone)]
pub struct RawChar {
    pub code: u32,
    pub bbox: CharBox,
    pub confidence: Option<f32>,
    pub word_start: bool,
}

impl RawChar {
    pub fn new(code: u32, bbox: CharBox) -> Self {
        Self {
            code,
            bbox,
            confidence: None,
            word_start: false,
        }
    }
}

/// Maximal run of characters sharing one font size within a line.
#[derive(Debug, Clone, Default)]
pub struct Span {
    pub font_size: Option<f32>,
    pub chars: Vec<RawChar>,
}

#[derive(Debug, Clone, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    pub bbox: CharBox,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub dpi: Option<u32>,
    pub image: Option<String>,
    pub blocks: Vec<Block>,
}

/// A sanitized character with its leaf geometry already resolved.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub ch: char,
    pub bbox: Option<BBox>,
    pub confidence: Option<f32>,
    pub word_start: bool,
    pub font_size: Option<f32>,
}

impl Glyph {
    pub fn is_space(&self) -> bool {
        self.ch == ' '
    }
}

/// Ordered, non-empty run of non-space glyphs. Empty words are never
/// constructed; the segmenter discards them.
#[derive(Debug, Clone)]
pub struct Word {
    pub glyphs: Vec<Glyph>,
    pub bbox: Option<BBox>,
}

impl Word {
    pub fn new(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs, bbox: None }
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }

    /// Font size attributed from the last contributing span.
    pub fn font_size(&self) -> Option<f32> {
        self.glyphs.iter().rev().find_map(|g| g.font_size)
    }

    /// Mean of the per-character confidences, or the fixed placeholder 100
    /// when the source supplies none.
    pub fn confidence(&self) -> f32 {
        let confs: Vec<f32> = self.glyphs.iter().filter_map(|g| g.confidence).collect();
        if confs.is_empty() {
            100.0
        } else {
            confs.iter().sum::<f32>() / confs.len() as f32
        }
    }
}
