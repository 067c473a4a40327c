use std::io::Write;

use anyhow::Result;

use crate::adapter::SourceAdapter;
use crate::compose::{ComposeOptions, PageComposer};
use crate::export::HocrWriter;

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub document_title: String,
    pub compose: ComposeOptions,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            document_title: "OCR output".to_string(),
            compose: ComposeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertStats {
    pub pages: usize,
    pub words: usize,
    pub warnings: u64,
}

/// Drive a source adapter through the composer into an hOCR stream. Pages
/// are composed, written, and released one at a time.
pub fn convert<A, W>(adapter: &mut A, config: &ConvertConfig, out: W) -> Result<ConvertStats>
where
    A: SourceAdapter + ?Sized,
    W: Write,
{
    let mut composer = PageComposer::new(&config.compose);
    let mut writer = HocrWriter::new(out);
    let mode = adapter.boundary_mode();

    writer.begin(&config.document_title)?;
    let mut pages = 0;
    while let Some(page) = adapter.next_page()? {
        let element = composer.compose(&page, mode);
        writer.write_page(&element)?;
        pages += 1;
    }
    writer.finish()?;

    Ok(ConvertStats {
        pages,
        words: composer.words_emitted(),
        warnings: composer.warnings().total(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::PdfTextAdapter;

    #[test]
    fn converts_a_dump_end_to_end() -> Result<()> {
        let json = r#"{"pages":[{"width":100,"height":50,"blocks":[{"lines":[{
            "font_size": 9.0,
            "chars":[
                {"c":"o","l":0,"t":0,"r":8,"b":12,"conf":80.0},
                {"c":"k","l":8,"t":0,"r":16,"b":12,"conf":90.0},
                {"c":" "},
                {"c":"!","l":20,"t":0,"r":28,"b":12,"conf":70.0}
            ]
        }]}]}]}"#;
        let mut adapter = PdfTextAdapter::parse_str(json)?;

        let mut buf = Vec::new();
        let stats = convert(&mut adapter, &ConvertConfig::default(), &mut buf)?;
        assert_eq!(stats.pages, 1);
        assert_eq!(stats.words, 2);

        let html = String::from_utf8(buf)?;
        assert!(html.contains("id=\"page_000000\""));
        assert!(html.contains("id=\"word_000000_000001\""));
        assert!(html.contains("x_wconf 85"));
        Ok(())
    }
}
