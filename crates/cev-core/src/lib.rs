pub mod config;
pub mod error;
pub mod extract;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod report;
pub mod schema;
pub mod session;
pub mod table;
pub mod validate;

use config::Limits;
use error::CevError;
use extraction::{Document, PdfBackend};
use model::FieldWarning;
use report::Report;
use serde::Serialize;

pub use validate::{validate, ValidationResult};

/// A validated document's report with the checks it passed and the
/// field issues found while reading it.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub validation: ValidationResult,
    pub report: Report,
    pub warnings: Vec<FieldWarning>,
}

/// Main API entry point: turn the bytes of a CEV v2 PDF into a report.
///
/// Applies `limits` around the backend, refuses documents that do not
/// validate, then extracts and normalizes every page.
pub fn process_pdf(
    pdf_bytes: &[u8],
    backend: &dyn PdfBackend,
    limits: &Limits,
) -> Result<Extraction, CevError> {
    let document = extraction::load_document(pdf_bytes, backend, limits)?;
    let validation = validate(&document);
    validation.clone().into_result()?;
    let report = extract_validated(&document)?;
    Ok(Extraction {
        validation,
        warnings: report.warnings(),
        report,
    })
}

/// Extract a report from an already loaded document. Fails with the
/// validation error when the document is not a CEV v2 report.
pub fn extract_report(document: &Document) -> Result<Report, CevError> {
    validate(document).into_result()?;
    extract_validated(document)
}

pub(crate) fn extract_validated(document: &Document) -> Result<Report, CevError> {
    let mut records = Vec::new();
    for extractor in extract::extractors() {
        let raw = extractor.extract(document)?;
        records.push(parsing::normalize(&raw)?);
    }
    let report = report::assemble(records)?;
    tracing::info!(
        pages = report.page_numbers().len(),
        warnings = report.warnings().len(),
        "report extracted"
    );
    Ok(report)
}
