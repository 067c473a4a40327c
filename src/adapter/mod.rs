pub mod abbyy;
pub mod pdftext;

use anyhow::Result;

use crate::core::model::Page;
use crate::core::segment::BoundaryMode;

pub use abbyy::AbbyyAdapter;
pub use pdftext::PdfTextAdapter;

/// A source front end that has already mapped its native format onto the
/// canonical character-stream model.
pub trait SourceAdapter {
    /// Which word-boundary signal this source supplies.
    fn boundary_mode(&self) -> BoundaryMode;

    /// Next page in document order; `Ok(None)` at end of input. Inability
    /// to produce the next structural unit is fatal and propagated.
    fn next_page(&mut self) -> Result<Option<Page>>;
}
