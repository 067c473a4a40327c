use crate::core::baseline;
use crate::core::geometry::{BBox, BBoxAggregator};
use crate::core::ids::{IdAllocator, NodeKind};
use crate::core::model::{Block, BlockKind, Glyph, Line, Page, Paragraph, Word};
use crate::core::sanitize::CharSanitizer;
use crate::core::segment::{segment_line, BoundaryMode};
use crate::core::title::Title;
use crate::core::warn::Warnings;

#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Scalar applied to all source coordinates before validity checks.
    pub scale: f64,
    /// Combine exposed surrogate halves into one scalar (see sanitizer).
    pub salvage_surrogates: bool,
    /// Emit per-character `ocrx_cinfo` spans inside each word.
    pub char_details: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            salvage_surrogates: false,
            char_details: true,
        }
    }
}

/// One finalized hOCR node. `title` arrives pre-escaped from [`Title`];
/// `text` is raw and escaped by the writer.
#[derive(Debug, Clone)]
pub struct HocrElement {
    pub elem: &'static str,
    pub class: &'static str,
    pub id: Option<String>,
    pub title: String,
    pub text: Option<String>,
    pub children: Vec<HocrElement>,
}

/// Turns one adapter page at a time into a finalized hOCR element tree.
///
/// Holds the only cross-page state in the pipeline: the id counter table
/// with its last-page marker and the log-once warning sink.
pub struct PageComposer {
    ids: IdAllocator,
    warnings: Warnings,
    sanitizer: CharSanitizer,
    aggregator: BBoxAggregator,
    char_details: bool,
    words_emitted: usize,
}

impl PageComposer {
    pub fn new(options: &ComposeOptions) -> Self {
        Self {
            ids: IdAllocator::new(),
            warnings: Warnings::new(),
            sanitizer: CharSanitizer::new(options.salvage_surrogates),
            aggregator: BBoxAggregator::with_scale(options.scale),
            char_details: options.char_details,
            words_emitted: 0,
        }
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn words_emitted(&self) -> usize {
        self.words_emitted
    }

    pub fn compose(&mut self, page: &Page, mode: BoundaryMode) -> HocrElement {
        let id = self.ids.page_id(page.index);

        let mut children = Vec::with_capacity(page.blocks.len());
        for block in &page.blocks {
            let element = match block.kind {
                BlockKind::Text => self.compose_text_block(page.index, block, mode),
                BlockKind::Photo => {
                    self.compose_region(page.index, block, "ocr_photo", NodeKind::Photo)
                }
                BlockKind::Table => {
                    self.compose_region(page.index, block, "ocr_table", NodeKind::Table)
                }
                BlockKind::Separator => {
                    self.compose_region(page.index, block, "ocr_separator", NodeKind::Separator)
                }
            };
            children.push(element);
        }

        let mut title = Title::new();
        if let Some(image) = &page.image {
            title.push("image", format!("\"{image}\""));
        }
        title.push_list(
            "bbox",
            bbox_tokens(&BBox::new(0, 0, page.width as i32, page.height as i32)),
        );
        title.push("ppageno", page.index.to_string());
        if let Some(dpi) = page.dpi {
            title.push_list("scan_res", vec![dpi.to_string(), dpi.to_string()]);
        }

        HocrElement {
            elem: "div",
            class: "ocr_page",
            id: Some(id),
            title: title.render(),
            text: None,
            children,
        }
    }

    fn compose_text_block(
        &mut self,
        page_index: usize,
        block: &Block,
        mode: BoundaryMode,
    ) -> HocrElement {
        let id = self.ids.next_id(page_index, NodeKind::Block);

        let mut children = Vec::with_capacity(block.paragraphs.len());
        let mut child_boxes = Vec::with_capacity(block.paragraphs.len());
        for paragraph in &block.paragraphs {
            if let Some((element, bbox)) = self.compose_paragraph(page_index, paragraph, mode) {
                children.push(element);
                child_boxes.push(bbox);
            }
        }

        let bbox = self.aggregator.aggregate(child_boxes);
        let mut title = Title::new();
        if let Some(b) = bbox {
            title.push_list("bbox", bbox_tokens(&b));
        }

        HocrElement {
            elem: "div",
            class: "ocr_carea",
            id: Some(id),
            title: title.render(),
            text: None,
            children,
        }
    }

    fn compose_paragraph(
        &mut self,
        page_index: usize,
        paragraph: &Paragraph,
        mode: BoundaryMode,
    ) -> Option<(HocrElement, Option<BBox>)> {
        let mut children = Vec::with_capacity(paragraph.lines.len());
        let mut child_boxes = Vec::with_capacity(paragraph.lines.len());
        for line in &paragraph.lines {
            if let Some((element, bbox)) = self.compose_line(page_index, line, mode) {
                children.push(element);
                child_boxes.push(bbox);
            }
        }
        if children.is_empty() {
            return None;
        }

        let id = self.ids.next_id(page_index, NodeKind::Par);
        let bbox = self.aggregator.aggregate(child_boxes);
        let mut title = Title::new();
        if let Some(b) = bbox {
            title.push_list("bbox", bbox_tokens(&b));
        }

        Some((
            HocrElement {
                elem: "p",
                class: "ocr_par",
                id: Some(id),
                title: title.render(),
                text: None,
                children,
            },
            bbox,
        ))
    }

    fn compose_line(
        &mut self,
        page_index: usize,
        line: &Line,
        mode: BoundaryMode,
    ) -> Option<(HocrElement, Option<BBox>)> {
        let mut glyphs = Vec::new();
        for span in &line.spans {
            for clean in self.sanitizer.sanitize(&span.chars, &mut self.warnings) {
                let bbox = self
                    .aggregator
                    .resolve_leaf(&clean.raw.bbox, &mut self.warnings);
                glyphs.push(Glyph {
                    ch: clean.ch,
                    bbox,
                    confidence: clean.raw.confidence,
                    word_start: clean.raw.word_start,
                    font_size: span.font_size,
                });
            }
        }

        let mut words = segment_line(glyphs, mode);
        if words.is_empty() {
            return None;
        }
        for word in &mut words {
            word.bbox = self.aggregator.aggregate(word.glyphs.iter().map(|g| g.bbox));
        }

        let line_bbox = self.aggregator.aggregate(words.iter().map(|w| w.bbox));
        let char_boxes: Vec<BBox> = words
            .iter()
            .flat_map(|w| w.glyphs.iter().filter_map(|g| g.bbox))
            .collect();

        let id = self.ids.next_id(page_index, NodeKind::Line);
        let mut title = Title::new();
        if let Some(b) = line_bbox {
            title.push_list("bbox", bbox_tokens(&b));
        }
        if let Some(fit) = baseline::estimate(&char_boxes) {
            title.push_list(
                "baseline",
                vec![format!("{:.3}", fit.slope), fit.intercept.to_string()],
            );
        }
        if !char_boxes.is_empty() {
            let mean_height = char_boxes.iter().map(|b| f64::from(b.height())).sum::<f64>()
                / char_boxes.len() as f64;
            title.push("x_size", (mean_height.round() as i64).to_string());
        }

        let children = words
            .into_iter()
            .map(|word| self.compose_word(page_index, word))
            .collect();

        Some((
            HocrElement {
                elem: "span",
                class: "ocr_line",
                id: Some(id),
                title: title.render(),
                text: None,
                children,
            },
            line_bbox,
        ))
    }

    fn compose_word(&mut self, page_index: usize, word: Word) -> HocrElement {
        let id = self.ids.next_id(page_index, NodeKind::Word);
        self.words_emitted += 1;

        let mut title = Title::new();
        if let Some(b) = word.bbox {
            title.push_list("bbox", bbox_tokens(&b));
        }
        title.push("x_wconf", (word.confidence().round() as i64).to_string());
        if let Some(size) = word.font_size() {
            title.push("x_fsize", (size.round() as i64).to_string());
        }

        let (text, children) = if self.char_details {
            let spans = word.glyphs.iter().map(char_details).collect();
            (None, spans)
        } else {
            (Some(word.text()), Vec::new())
        };

        HocrElement {
            elem: "span",
            class: "ocrx_word",
            id: Some(id),
            title: title.render(),
            text,
            children,
        }
    }

    fn compose_region(
        &mut self,
        page_index: usize,
        block: &Block,
        class: &'static str,
        kind: NodeKind,
    ) -> HocrElement {
        let id = self.ids.next_id(page_index, kind);
        let mut title = Title::new();
        // Non-text regions keep the box the source declared; an incomplete
        // box is simply omitted rather than warned as a character defect.
        if block.bbox.is_complete() {
            if let Some(b) = self.aggregator.resolve_leaf(&block.bbox, &mut self.warnings) {
                title.push_list("bbox", bbox_tokens(&b));
            }
        }

        HocrElement {
            elem: "div",
            class,
            id: Some(id),
            title: title.render(),
            text: None,
            children: Vec::new(),
        }
    }
}

fn char_details(glyph: &Glyph) -> HocrElement {
    let mut title = Title::new();
    if let Some(b) = glyph.bbox {
        title.push_list("x_bboxes", bbox_tokens(&b));
    }
    if let Some(conf) = glyph.confidence {
        title.push("x_confs", format!("{conf}"));
    }
    HocrElement {
        elem: "span",
        class: "ocrx_cinfo",
        id: None,
        title: title.render(),
        text: Some(glyph.ch.to_string()),
        children: Vec::new(),
    }
}

fn bbox_tokens(bbox: &BBox) -> Vec<String> {
    vec![
        bbox.left.to_string(),
        bbox.top.to_string(),
        bbox.right.to_string(),
        bbox.bottom.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::CharBox;
    use crate::core::model::{RawChar, Span};
    use pretty_assertions::assert_eq;

    fn ch(c: char, left: i32, word_start: bool) -> RawChar {
        RawChar {
            code: c as u32,
            bbox: CharBox::new(left, 10, left + 8, 20),
            confidence: Some(90.0),
            word_start,
        }
    }

    fn text_page(chars: Vec<RawChar>) -> Page {
        Page {
            index: 0,
            width: 100,
            height: 50,
            dpi: Some(300),
            image: Some("page.png".into()),
            blocks: vec![Block {
                kind: BlockKind::Text,
                bbox: CharBox::missing(),
                paragraphs: vec![Paragraph {
                    lines: vec![Line {
                        spans: vec![Span {
                            font_size: Some(10.0),
                            chars,
                        }],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn composes_full_hierarchy() {
        let mut composer = PageComposer::new(&ComposeOptions::default());
        let page = text_page(vec![ch('h', 0, true), ch('i', 8, false), ch('!', 20, true)]);
        let root = composer.compose(&page, BoundaryMode::Explicit);

        assert_eq!(root.class, "ocr_page");
        assert_eq!(root.id.as_deref(), Some("page_000000"));
        assert!(root.title.contains("ppageno 0"));
        assert!(root.title.contains("scan_res 300 300"));
        assert!(root.title.contains("image &quot;page.png&quot;"));

        let carea = &root.children[0];
        assert_eq!(carea.class, "ocr_carea");
        assert_eq!(carea.id.as_deref(), Some("block_000000_000000"));
        assert!(carea.title.starts_with("bbox 0 10 28 20"));

        let line = &carea.children[0].children[0];
        assert_eq!(line.class, "ocr_line");
        assert!(line.title.contains("baseline"));
        assert!(line.title.contains("x_size 10"));

        let words: Vec<&HocrElement> = line.children.iter().collect();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id.as_deref(), Some("word_000000_000000"));
        assert_eq!(words[1].id.as_deref(), Some("word_000000_000001"));
        assert!(words[0].title.contains("x_wconf 90"));
        assert!(words[0].title.contains("x_fsize 10"));

        // Per-character detail spans carry geometry and confidence.
        let cinfo = &words[0].children[0];
        assert_eq!(cinfo.class, "ocrx_cinfo");
        assert_eq!(cinfo.text.as_deref(), Some("h"));
        assert!(cinfo.title.contains("x_bboxes 0 10 8 20"));
        assert!(cinfo.title.contains("x_confs 90"));

        assert_eq!(composer.words_emitted(), 2);
    }

    #[test]
    fn word_text_mode_skips_char_details() {
        let options = ComposeOptions {
            char_details: false,
            ..ComposeOptions::default()
        };
        let mut composer = PageComposer::new(&options);
        let page = text_page(vec![ch('o', 0, false), ch('k', 8, false)]);
        let root = composer.compose(&page, BoundaryMode::Explicit);
        let word = &root.children[0].children[0].children[0].children[0];
        assert_eq!(word.text.as_deref(), Some("ok"));
        assert!(word.children.is_empty());
    }

    #[test]
    fn line_with_no_surviving_characters_is_dropped() {
        let mut composer = PageComposer::new(&ComposeOptions::default());
        let page = text_page(vec![RawChar::new(0xFFFD, CharBox::new(0, 0, 1, 1))]);
        let root = composer.compose(&page, BoundaryMode::Implicit);
        let carea = &root.children[0];
        assert!(carea.children.is_empty());
        assert!(carea.title.is_empty());
    }

    #[test]
    fn non_text_blocks_become_placeholder_regions() {
        let mut composer = PageComposer::new(&ComposeOptions::default());
        let page = Page {
            index: 3,
            width: 10,
            height: 10,
            dpi: None,
            image: None,
            blocks: vec![
                Block {
                    kind: BlockKind::Photo,
                    bbox: CharBox::new(1, 2, 3, 4),
                    paragraphs: Vec::new(),
                },
                Block {
                    kind: BlockKind::Separator,
                    bbox: CharBox::missing(),
                    paragraphs: Vec::new(),
                },
            ],
        };
        let root = composer.compose(&page, BoundaryMode::Implicit);
        assert_eq!(root.children[0].class, "ocr_photo");
        assert_eq!(root.children[0].id.as_deref(), Some("photo_000003_000000"));
        assert_eq!(root.children[0].title, "bbox 1 2 3 4");
        assert_eq!(root.children[1].class, "ocr_separator");
        assert!(root.children[1].title.is_empty());
        assert_eq!(composer.warnings().total(), 0);
    }

    #[test]
    fn page_change_resets_id_counters() {
        let mut composer = PageComposer::new(&ComposeOptions::default());
        let mut first = text_page(vec![ch('a', 0, false)]);
        first.index = 0;
        let mut second = text_page(vec![ch('b', 0, false)]);
        second.index = 1;

        let one = composer.compose(&first, BoundaryMode::Explicit);
        let two = composer.compose(&second, BoundaryMode::Explicit);

        let word_id = |root: &HocrElement| {
            root.children[0].children[0].children[0].children[0]
                .id
                .clone()
                .unwrap()
        };
        assert_eq!(word_id(&one), "word_000000_000000");
        assert_eq!(word_id(&two), "word_000001_000000");
    }
}
