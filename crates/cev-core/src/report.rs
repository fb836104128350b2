use crate::error::CevError;
use crate::model::{FieldWarning, PageRecord};
use crate::schema;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The seven page records of one CEV v2 report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pages: BTreeMap<usize, PageRecord>,
}

/// Combine page records into a report. Every schema page must be present
/// exactly once; stub pages contribute empty records.
pub fn assemble(records: Vec<PageRecord>) -> Result<Report, CevError> {
    let registry = schema::registry();
    let mut pages = BTreeMap::new();
    for record in records {
        let page = record.page;
        registry.schema_for(page)?;
        if pages.insert(page, record).is_some() {
            return Err(CevError::Configuration(format!(
                "page {} assembled twice",
                page
            )));
        }
    }

    let missing: Vec<usize> = registry
        .page_numbers()
        .filter(|p| !pages.contains_key(p))
        .collect();
    if !missing.is_empty() {
        return Err(CevError::IncompleteReport { missing });
    }

    Ok(Report { pages })
}

impl Report {
    pub fn page(&self, page: usize) -> Option<&PageRecord> {
        self.pages.get(&page)
    }

    /// Records in page order.
    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.pages.values()
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages.keys().copied().collect()
    }

    fn record(&self, page: usize) -> Result<&PageRecord, CevError> {
        self.pages.get(&page).ok_or(CevError::UnknownPage(page))
    }

    /// Two rows: labels, then values.
    pub fn table(&self, page: usize) -> Result<Table, CevError> {
        Ok(Table::canonical(self.record(page)?))
    }

    /// One row per field: label, value.
    pub fn transposed_view(&self, page: usize) -> Result<Table, CevError> {
        Ok(self.table(page)?.transpose())
    }

    /// Field issues across all pages, in page then schema order.
    pub fn warnings(&self) -> Vec<FieldWarning> {
        self.pages
            .values()
            .flat_map(|record| {
                record.fields.iter().filter_map(move |field| {
                    field.issue.as_ref().map(|issue| FieldWarning {
                        page: record.page,
                        key: field.key.clone(),
                        label: field.label.clone(),
                        kind: issue.kind,
                        message: issue.message.clone(),
                    })
                })
            })
            .collect()
    }

    /// The report code as printed on page 1, if it was read.
    pub fn codigo_evaluacion(&self) -> Option<String> {
        self.page(1)
            .and_then(|p| p.value("codigo_evaluacion"))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldIssue, IssueKind, Value};
    use pretty_assertions::assert_eq;

    fn all_empty() -> Vec<PageRecord> {
        (1..=7).map(PageRecord::empty).collect()
    }

    #[test]
    fn test_assemble_complete() {
        let report = assemble(all_empty()).unwrap();
        assert_eq!(report.page_numbers(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(report.warnings().is_empty());
    }

    #[test]
    fn test_assemble_order_independent() {
        let mut records = all_empty();
        records.reverse();
        assert_eq!(assemble(records).unwrap(), assemble(all_empty()).unwrap());
    }

    #[test]
    fn test_missing_pages_reported() {
        let records: Vec<PageRecord> = all_empty()
            .into_iter()
            .filter(|r| r.page != 3 && r.page != 6)
            .collect();
        match assemble(records) {
            Err(CevError::IncompleteReport { missing }) => assert_eq!(missing, vec![3, 6]),
            other => panic!("expected IncompleteReport, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_and_unknown_pages_rejected() {
        let mut records = all_empty();
        records.push(PageRecord::empty(2));
        assert!(matches!(assemble(records), Err(CevError::Configuration(_))));

        let mut records = all_empty();
        records.push(PageRecord::empty(8));
        assert!(matches!(assemble(records), Err(CevError::UnknownPage(8))));
    }

    #[test]
    fn test_views_and_warnings() {
        let mut records = all_empty();
        records[0] = PageRecord {
            page: 1,
            fields: vec![
                Field {
                    key: "codigo_evaluacion".into(),
                    label: "Código de Evaluación".into(),
                    value: Value::Text("CEV-1".into()),
                    issue: None,
                },
                Field {
                    key: "region".into(),
                    label: "Región".into(),
                    value: Value::Empty,
                    issue: Some(FieldIssue {
                        kind: IssueKind::MissingField,
                        message: "required field 'Región' is empty".into(),
                    }),
                },
            ],
        };
        let report = assemble(records).unwrap();

        let table = report.table(1).unwrap();
        assert_eq!((table.n_rows(), table.n_cols()), (2, 2));
        let view = report.transposed_view(1).unwrap();
        assert_eq!((view.n_rows(), view.n_cols()), (2, 2));
        assert_eq!(view.get(1, 0).unwrap().to_string(), "Región");

        let stub = report.table(5).unwrap();
        assert_eq!((stub.n_rows(), stub.n_cols()), (2, 0));
        assert!(matches!(report.table(9), Err(CevError::UnknownPage(9))));

        let warnings = report.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "region");
        assert_eq!(warnings[0].kind, IssueKind::MissingField);

        assert_eq!(report.codigo_evaluacion().as_deref(), Some("CEV-1"));
    }
}
