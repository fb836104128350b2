use cev_core::config::Limits;
use cev_core::error::CevError;
use cev_core::extraction::load_document;
use cev_core::extraction::pdftotext::PdftotextBackend;
use cev_core::ValidationResult;
use std::path::PathBuf;

pub fn run(pdf_file: PathBuf, limits: &Limits) -> Result<(), CevError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    tracing::debug!(file = %pdf_file.display(), bytes = pdf_bytes.len(), "input read");
    let backend = PdftotextBackend::new();
    let document = load_document(&pdf_bytes, &backend, limits)?;

    let result = cev_core::validate(&document);
    match &result {
        ValidationResult::Valid => println!("{}: valid CEV v2 report", pdf_file.display()),
        ValidationResult::Invalid { failure } => {
            println!("{}: invalid ({})", pdf_file.display(), failure)
        }
    }
    result.into_result()
}
