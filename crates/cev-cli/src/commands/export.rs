use cev_core::config::Limits;
use cev_core::error::CevError;
use cev_core::extraction::pdftotext::PdftotextBackend;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(pdf_file: PathBuf, out: Option<PathBuf>, limits: &Limits) -> Result<(), CevError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    tracing::debug!(file = %pdf_file.display(), bytes = pdf_bytes.len(), "input read");
    let backend = PdftotextBackend::new();
    let extraction = cev_core::process_pdf(&pdf_bytes, &backend, limits)?;

    let bytes = output::xlsx::write_workbook(&extraction.report)?;
    let path = out.unwrap_or_else(|| default_workbook_path(&pdf_file));
    std::fs::write(&path, bytes)?;

    eprintln!("Workbook written to {}", path.display());
    if !extraction.warnings.is_empty() {
        eprintln!("  {} field warning(s)", extraction.warnings.len());
    }
    Ok(())
}

/// `informe.pdf` -> `informe_Extracted_Data.xlsx`, next to the input.
fn default_workbook_path(pdf_file: &Path) -> PathBuf {
    let stem = pdf_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".into());
    pdf_file.with_file_name(format!("{stem}_Extracted_Data.xlsx"))
}
