use crate::error::CevError;
use crate::extraction::{region, Document};
use crate::model::{RawField, RawRecord};
use crate::schema::{self, PageSchema};
use std::sync::LazyLock;

static EXTRACTORS: LazyLock<Vec<PageExtractor<'static>>> = LazyLock::new(|| {
    schema::registry()
        .pages()
        .iter()
        .map(PageExtractor::from_schema)
        .collect()
});

/// One extractor per report page, in page order.
pub fn extractors() -> &'static [PageExtractor<'static>] {
    &EXTRACTORS
}

/// Reads the raw text of one page.
#[derive(Debug, Clone, Copy)]
pub enum PageExtractor<'a> {
    /// Reads every field region of the schema.
    Schema(&'a PageSchema),
    /// Page without tabular content; yields an empty record.
    Stub(usize),
}

impl<'a> PageExtractor<'a> {
    pub fn from_schema(schema: &'a PageSchema) -> Self {
        if schema.is_stub() {
            PageExtractor::Stub(schema.page)
        } else {
            PageExtractor::Schema(schema)
        }
    }

    pub fn page(&self) -> usize {
        match self {
            PageExtractor::Schema(schema) => schema.page,
            PageExtractor::Stub(page) => *page,
        }
    }

    /// Raw text of every field region, in schema order. Fails only when the
    /// page itself is missing from the document.
    pub fn extract(&self, document: &Document) -> Result<RawRecord, CevError> {
        let page = self.page();
        if document.page(page).is_none() {
            return Err(CevError::PageCount {
                found: document.page_count(),
                required: page,
            });
        }

        let schema = match self {
            PageExtractor::Schema(schema) => schema,
            PageExtractor::Stub(_) => {
                return Ok(RawRecord {
                    page,
                    fields: Vec::new(),
                })
            }
        };

        let mut fields = Vec::with_capacity(schema.fields.len());
        for def in &schema.fields {
            let lines = region::read_lines(document, page, &def.region)?;
            let text = def.pick.apply(&lines);
            tracing::debug!(page, key = %def.key, text = %text, "field read");
            fields.push(RawField {
                page,
                key: def.key.clone(),
                text,
            });
        }

        let empty = fields.iter().filter(|f| f.text.is_empty()).count();
        tracing::info!(page, fields = fields.len(), empty, "page extracted");
        Ok(RawRecord { page, fields })
    }
}
