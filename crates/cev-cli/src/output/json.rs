use cev_core::error::CevError;
use cev_core::model::PageRecord;
use cev_core::report::Report;
use cev_core::table::Table;
use std::collections::BTreeMap;

/// Page number -> rows of the canonical (or transposed) table.
pub fn render_tables(report: &Report, pages: &[usize], transpose: bool) -> Result<String, CevError> {
    let mut tables: BTreeMap<usize, Table> = BTreeMap::new();
    for &page in pages {
        let table = if transpose {
            report.transposed_view(page)?
        } else {
            report.table(page)?
        };
        tables.insert(page, table);
    }
    Ok(serde_json::to_string_pretty(&tables)?)
}

/// Page number -> typed fields, including field issues.
pub fn render_records(report: &Report, pages: &[usize]) -> Result<String, CevError> {
    let records: BTreeMap<usize, &PageRecord> = pages
        .iter()
        .filter_map(|&p| report.page(p).map(|record| (p, record)))
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
