use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};

use crate::adapter::SourceAdapter;
use crate::core::geometry::CharBox;
use crate::core::model::{Block, BlockKind, Line, Page, Paragraph, RawChar, Span};
use crate::core::segment::BoundaryMode;

/// ABBYY FineReader XML front end. Word boundaries are explicit: each
/// `charParams` element may carry a `wordStart` marker.
pub struct AbbyyAdapter {
    pages: std::vec::IntoIter<Page>,
}

impl AbbyyAdapter {
    pub fn open(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)
            .with_context(|| format!("Failed to read source XML: {}", path.display()))?;
        Self::parse_str(&xml)
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        let pages = parse_document(xml).context("Malformed ABBYY XML document")?;
        Ok(Self {
            pages: pages.into_iter(),
        })
    }
}

impl SourceAdapter for AbbyyAdapter {
    fn boundary_mode(&self) -> BoundaryMode {
        BoundaryMode::Explicit
    }

    fn next_page(&mut self) -> Result<Option<Page>> {
        Ok(self.pages.next())
    }
}

fn parse_document(xml: &str) -> Result<Vec<Page>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut pages: Vec<Page> = Vec::new();
    let mut page: Option<Page> = None;
    let mut block: Option<Block> = None;
    let mut paragraph: Option<Paragraph> = None;
    let mut line: Option<Line> = None;
    let mut span: Option<Span> = None;
    let mut pending: Option<RawChar> = None;
    let mut page_index = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => {
                    page = Some(Page {
                        index: page_index,
                        width: int_attr(&e, b"width").unwrap_or(0) as u32,
                        height: int_attr(&e, b"height").unwrap_or(0) as u32,
                        dpi: int_attr(&e, b"resolution").map(|v| v as u32),
                        image: None,
                        blocks: Vec::new(),
                    });
                    page_index += 1;
                }
                b"block" => block = Some(start_block(&e)),
                b"par" => paragraph = Some(Paragraph::default()),
                b"line" => line = Some(Line::default()),
                b"formatting" => {
                    span = Some(Span {
                        font_size: float_attr(&e, b"fs"),
                        chars: Vec::new(),
                    })
                }
                b"charParams" => pending = Some(start_char(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                // Childless blocks (separators, pictures) close immediately.
                if e.name().as_ref() == b"block" {
                    if let Some(p) = page.as_mut() {
                        p.blocks.push(start_block(&e));
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(template) = &pending {
                    let text = e.unescape().context("Invalid character data")?;
                    let target = span.get_or_insert_with(Span::default);
                    for (i, ch) in text.chars().enumerate() {
                        let mut raw = template.clone();
                        raw.code = ch as u32;
                        // Only the first slot of a multi-char cell keeps the
                        // word-start marker.
                        raw.word_start = template.word_start && i == 0;
                        target.chars.push(raw);
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"charParams" => pending = None,
                b"formatting" => {
                    if let (Some(l), Some(s)) = (line.as_mut(), span.take()) {
                        l.spans.push(s);
                    }
                }
                b"line" => {
                    if let (Some(p), Some(l)) = (paragraph.as_mut(), line.take()) {
                        p.lines.push(l);
                    }
                }
                b"par" => {
                    if let (Some(b), Some(p)) = (block.as_mut(), paragraph.take()) {
                        b.paragraphs.push(p);
                    }
                }
                b"block" => {
                    if let (Some(pg), Some(b)) = (page.as_mut(), block.take()) {
                        pg.blocks.push(b);
                    }
                }
                b"page" => {
                    if let Some(p) = page.take() {
                        pages.push(p);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(pages)
}

fn start_block(e: &BytesStart) -> Block {
    let kind = match attr(e, b"blockType").as_deref() {
        Some("Table") => BlockKind::Table,
        Some("Separator") | Some("SeparatorsBox") => BlockKind::Separator,
        None | Some("Text") => BlockKind::Text,
        Some(_) => BlockKind::Photo,
    };
    Block {
        kind,
        bbox: char_box(e),
        paragraphs: Vec::new(),
    }
}

fn start_char(e: &BytesStart) -> RawChar {
    RawChar {
        code: 0,
        bbox: char_box(e),
        confidence: float_attr(e, b"charConfidence").filter(|v| *v >= 0.0),
        word_start: matches!(attr(e, b"wordStart").as_deref(), Some("true") | Some("1")),
    }
}

fn char_box(e: &BytesStart) -> CharBox {
    CharBox {
        left: int_attr(e, b"l"),
        top: int_attr(e, b"t"),
        right: int_attr(e, b"r"),
        bottom: int_attr(e, b"b"),
    }
}

fn attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn int_attr(e: &BytesStart, name: &[u8]) -> Option<i32> {
    attr(e, name).and_then(|v| v.trim().parse().ok())
}

fn float_attr(e: &BytesStart, name: &[u8]) -> Option<f32> {
    attr(e, name).and_then(|v| v.trim().parse().ok())
}
