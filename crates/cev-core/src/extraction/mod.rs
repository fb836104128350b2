pub mod pdftotext;
pub mod region;

use crate::config::Limits;
use crate::error::CevError;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in page points, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BBox {
    pub fn width(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y_max - self.y_min).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection_area(&self, other: &BBox) -> f32 {
        let w = self.x_max.min(other.x_max) - self.x_min.max(other.x_min);
        let h = self.y_max.min(other.y_max) - self.y_min.max(other.y_min);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

/// A visual text line as grouped by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub words: Vec<Word>,
}

/// Positioned text of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_number: usize,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }
}

/// A loaded PDF. Read-only after construction, so it can be shared across
/// threads by the page extractors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pages: Vec<PageLayout>,
}

impl Document {
    pub fn new(pages: Vec<PageLayout>) -> Self {
        Document { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based number.
    pub fn page(&self, page_number: usize) -> Option<&PageLayout> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
    }

    pub fn pages(&self) -> &[PageLayout] {
        &self.pages
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfBackend: Send + Sync {
    /// Load positioned text from PDF bytes, honouring the timeout and page
    /// ceilings in `limits`.
    fn extract_document(&self, pdf_bytes: &[u8], limits: &Limits) -> Result<Document, CevError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Run a backend with the input and output ceilings of `limits` applied.
pub fn load_document(
    pdf_bytes: &[u8],
    backend: &dyn PdfBackend,
    limits: &Limits,
) -> Result<Document, CevError> {
    limits.check_input(pdf_bytes.len())?;
    let document = backend.extract_document(pdf_bytes, limits)?;
    limits.check_document(&document)?;
    tracing::debug!(
        backend = backend.backend_name(),
        pages = document.page_count(),
        "document loaded"
    );
    Ok(document)
}
