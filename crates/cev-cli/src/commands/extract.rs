use cev_core::config::Limits;
use cev_core::error::CevError;
use cev_core::extraction::pdftotext::PdftotextBackend;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    page: Option<usize>,
    transpose: bool,
    output_file: Option<PathBuf>,
    limits: &Limits,
) -> Result<(), CevError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    tracing::debug!(file = %pdf_file.display(), bytes = pdf_bytes.len(), "input read");
    let backend = PdftotextBackend::new();
    let extraction = cev_core::process_pdf(&pdf_bytes, &backend, limits)?;
    let report = &extraction.report;

    let pages = match page {
        Some(p) => {
            report.table(p)?;
            vec![p]
        }
        None => report.page_numbers(),
    };

    match output_file {
        Some(path) => {
            // Files always get the typed records, not the display tables
            if display_flags_set(output_format, transpose) {
                tracing::warn!("--out writes typed JSON records; --transpose and --output are ignored");
            }
            let json = output::json::render_records(report, &pages)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} page(s), written to {}",
                pages.len(),
                path.display()
            );
        }
        None => {
            let rendered = match output_format {
                "json" => output::json::render_tables(report, &pages, transpose)?,
                _ => output::table::render(report, &pages, transpose)?,
            };
            println!("{rendered}");
        }
    }

    for w in &extraction.warnings {
        if pages.contains(&w.page) {
            eprintln!("  warning: {w}");
        }
    }

    Ok(())
}

/// Whether any flag that only shapes printed tables was given.
fn display_flags_set(output_format: &str, transpose: bool) -> bool {
    transpose || output_format != "table"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_flags_detected() {
        assert!(!display_flags_set("table", false));
        assert!(display_flags_set("table", true));
        assert!(display_flags_set("json", false));
    }
}
