use cev_core::error::CevError;
use cev_core::report::Report;
use cev_core::schema::registry;
use cev_core::table::Table;
use std::fmt::Write;

pub fn render(report: &Report, pages: &[usize], transpose: bool) -> Result<String, CevError> {
    let mut out = String::new();
    for (i, &page) in pages.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let title = registry()
            .schema_for(page)
            .map(|s| s.title.as_str())
            .unwrap_or_default();
        let _ = writeln!(out, "=== Pagina{page}: {title} ===\n");

        let table = if transpose {
            report.transposed_view(page)?
        } else {
            report.table(page)?
        };
        if table.n_rows() == 0 || table.n_cols() == 0 {
            out.push_str("  (no fields on this page)\n");
            continue;
        }
        out.push_str(&format_table(&table));
    }
    Ok(out)
}

/// Left-aligned columns separated by two spaces.
fn format_table(table: &Table) -> String {
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    let mut widths = vec![0usize; table.n_cols()];
    for row in &rows {
        for (c, cell) in row.iter().enumerate() {
            widths[c] = widths[c].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        let _ = writeln!(out, "  {}", line.join("  ").trim_end());
    }
    out
}
