use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::core::geometry::CharBox;
use crate::core::model::{Block, BlockKind, Line, Page, Paragraph, RawChar, Span};
use crate::core::segment::BoundaryMode;

/// PDF text-layer front end. Consumes the JSON character dump produced by a
/// text extractor; word boundaries are implicit (literal spaces).
///
/// Characters may arrive either as text (`"c"`) or as a raw code point
/// (`"u"`), the latter allowing unpaired surrogate halves from broken text
/// layers to reach the sanitizer's salvage mode.
pub struct PdfTextAdapter {
    pages: std::vec::IntoIter<Page>,
}

impl PdfTextAdapter {
    pub fn open(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read text dump: {}", path.display()))?;
        Self::parse_str(&json)
    }

    pub fn parse_str(json: &str) -> Result<Self> {
        let dump: Dump = serde_json::from_str(json).context("Malformed text dump JSON")?;
        let pages: Vec<Page> = dump
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| convert_page(index, page))
            .collect();
        Ok(Self {
            pages: pages.into_iter(),
        })
    }
}

impl SourceAdapter for PdfTextAdapter {
    fn boundary_mode(&self) -> BoundaryMode {
        BoundaryMode::Implicit
    }

    fn next_page(&mut self) -> Result<Option<Page>> {
        Ok(self.pages.next())
    }
}

#[derive(Debug, Deserialize)]
struct Dump {
    pages: Vec<DumpPage>,
}

#[derive(Debug, Deserialize)]
struct DumpPage {
    width: u32,
    height: u32,
    #[serde(default)]
    dpi: Option<u32>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    blocks: Vec<DumpBlock>,
}

#[derive(Debug, Deserialize)]
struct DumpBlock {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    l: Option<i32>,
    #[serde(default)]
    t: Option<i32>,
    #[serde(default)]
    r: Option<i32>,
    #[serde(default)]
    b: Option<i32>,
    #[serde(default)]
    lines: Vec<DumpLine>,
}

#[derive(Debug, Deserialize)]
struct DumpLine {
    #[serde(default)]
    font_size: Option<f32>,
    #[serde(default)]
    chars: Vec<DumpChar>,
}

#[derive(Debug, Deserialize)]
struct DumpChar {
    #[serde(default)]
    c: Option<String>,
    #[serde(default)]
    u: Option<u32>,
    #[serde(default)]
    l: Option<i32>,
    #[serde(default)]
    t: Option<i32>,
    #[serde(default)]
    r: Option<i32>,
    #[serde(default)]
    b: Option<i32>,
    #[serde(default)]
    conf: Option<f32>,
}

fn convert_page(index: usize, page: DumpPage) -> Page {
    Page {
        index,
        width: page.width,
        height: page.height,
        dpi: page.dpi,
        image: page.image,
        blocks: page.blocks.into_iter().map(convert_block).collect(),
    }
}

fn convert_block(block: DumpBlock) -> Block {
    let kind = match block.kind.as_deref() {
        Some("table") => BlockKind::Table,
        Some("separator") => BlockKind::Separator,
        Some("photo") | Some("image") | Some("figure") => BlockKind::Photo,
        _ => BlockKind::Text,
    };
    let bbox = CharBox {
        left: block.l,
        top: block.t,
        right: block.r,
        bottom: block.b,
    };
    // The dump has no paragraph level; each block is a single paragraph.
    let lines = block.lines.into_iter().map(convert_line).collect();
    Block {
        kind,
        bbox,
        paragraphs: vec![Paragraph { lines }],
    }
}

fn convert_line(line: DumpLine) -> Line {
    let mut span = Span {
        font_size: line.font_size,
        chars: Vec::new(),
    };
    for ch in line.chars {
        let bbox = CharBox {
            left: ch.l,
            top: ch.t,
            right: ch.r,
            bottom: ch.b,
        };
        if let Some(code) = ch.u {
            span.chars.push(RawChar {
                code,
                bbox,
                confidence: ch.conf,
                word_start: false,
            });
        } else if let Some(text) = ch.c {
            for c in text.chars() {
                span.chars.push(RawChar {
                    code: c as u32,
                    bbox,
                    confidence: ch.conf,
                    word_start: false,
                });
            }
        }
    }
    Line { spans: vec![span] }
}
