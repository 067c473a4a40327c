use std::io::Write;

use anyhow::Result;
use quick_xml::escape::escape;

use crate::compose::HocrElement;

const CAPABILITIES: &str = "ocr_page ocr_carea ocr_par ocr_line ocrx_word ocrx_cinfo";

/// Streams an hOCR document: XHTML shell up front, one page at a time,
/// closing markup at the end. Pages are written as they are composed so the
/// working set never exceeds one page.
pub struct HocrWriter<W: Write> {
    out: W,
}

impl<W: Write> HocrWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn begin(&mut self, document_title: &str) -> Result<()> {
        writeln!(self.out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(
            self.out,
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \
             \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">"
        )?;
        writeln!(self.out, "<html xmlns=\"http://www.w3.org/1999/xhtml\">")?;
        writeln!(self.out, " <head>")?;
        writeln!(self.out, "  <title>{}</title>", escape(document_title))?;
        writeln!(
            self.out,
            "  <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\"/>"
        )?;
        writeln!(
            self.out,
            "  <meta name=\"ocr-system\" content=\"hocrize {}\"/>",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(
            self.out,
            "  <meta name=\"ocr-capabilities\" content=\"{CAPABILITIES}\"/>"
        )?;
        writeln!(self.out, " </head>")?;
        writeln!(self.out, " <body>")?;
        Ok(())
    }

    pub fn write_page(&mut self, page: &HocrElement) -> Result<()> {
        self.write_element(page, 2)
    }

    pub fn finish(&mut self) -> Result<()> {
        writeln!(self.out, " </body>")?;
        writeln!(self.out, "</html>")?;
        self.out.flush()?;
        Ok(())
    }

    fn write_element(&mut self, element: &HocrElement, depth: usize) -> Result<()> {
        let indent = " ".repeat(depth);
        write!(self.out, "{indent}<{} class=\"{}\"", element.elem, element.class)?;
        if let Some(id) = &element.id {
            write!(self.out, " id=\"{id}\"")?;
        }
        if !element.title.is_empty() {
            // Title strings are escaped by the serializer already.
            write!(self.out, " title=\"{}\"", element.title)?;
        }
        write!(self.out, ">")?;

        if let Some(text) = &element.text {
            write!(self.out, "{}", escape(text.as_str()))?;
        }
        if element.children.is_empty() {
            writeln!(self.out, "</{}>", element.elem)?;
        } else {
            writeln!(self.out)?;
            for child in &element.children {
                self.write_element(child, depth + 1)?;
            }
            writeln!(self.out, "{indent}</{}>", element.elem)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(text: &str) -> HocrElement {
        HocrElement {
            elem: "span",
            class: "ocrx_word",
            id: Some("word_000000_000000".into()),
            title: "bbox 0 0 5 5; x_wconf 100".into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    #[test]
    fn writes_document_shell_and_page() {
        let page = HocrElement {
            elem: "div",
            class: "ocr_page",
            id: Some("page_000000".into()),
            title: "bbox 0 0 10 10; ppageno 0".into(),
            text: None,
            children: vec![leaf("hi")],
        };

        let mut buf = Vec::new();
        let mut writer = HocrWriter::new(&mut buf);
        writer.begin("sample").unwrap();
        writer.write_page(&page).unwrap();
        writer.finish().unwrap();

        let html = String::from_utf8(buf).unwrap();
        assert!(html.starts_with("<?xml version=\"1.0\""));
        assert!(html.contains("<meta name=\"ocr-system\""));
        assert!(html.contains("<div class=\"ocr_page\" id=\"page_000000\""));
        assert!(html.contains("title=\"bbox 0 0 5 5; x_wconf 100\">hi</span>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn escapes_text_content() {
        let mut buf = Vec::new();
        let mut writer = HocrWriter::new(&mut buf);
        writer.write_page(&leaf("a<b&c")).unwrap();
        let html = String::from_utf8(buf).unwrap();
        assert!(html.contains(">a&lt;b&amp;c</span>"));
    }
}
