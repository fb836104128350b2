use cev_core::error::CevError;
use cev_core::model::Value;
use cev_core::report::Report;
use cev_core::table::Cell;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

/// One sheet per page ("Pagina1".."Pagina7"), labels on the first row and
/// values on the second. Numbers are written as numbers; stub pages give
/// empty sheets.
pub fn write_workbook(report: &Report) -> Result<Vec<u8>, CevError> {
    let mut workbook = Workbook::new();
    for record in report.pages() {
        let table = report.table(record.page)?;
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(format!("Pagina{}", record.page))
            .map_err(export_error)?;

        for (r, row) in table.rows().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let col = u16::try_from(c)
                    .map_err(|_| CevError::Export(format!("page {} has too many columns", record.page)))?;
                write_cell(sheet, r as u32, col, cell)?;
            }
        }
    }
    workbook.save_to_buffer().map_err(export_error)
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), CevError> {
    let written = match cell {
        Cell::Label(label) => sheet.write_string(row, col, label.as_str()),
        Cell::Value(Value::Empty) => return Ok(()),
        Cell::Value(Value::Number(n)) => match n.to_f64() {
            Some(f) => sheet.write_number(row, col, f),
            None => sheet.write_string(row, col, n.to_string()),
        },
        Cell::Value(other) => sheet.write_string(row, col, other.to_string()),
    };
    written.map(|_| ()).map_err(export_error)
}

fn export_error(e: XlsxError) -> CevError {
    CevError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use cev_core::model::{Field, PageRecord};
    use cev_core::report::assemble;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn field(key: &str, label: &str, value: Value) -> Field {
        Field {
            key: key.into(),
            label: label.into(),
            value,
            issue: None,
        }
    }

    fn report() -> Report {
        let mut records: Vec<PageRecord> = (1..=7).map(PageRecord::empty).collect();
        records[0].fields = vec![
            field("codigo_evaluacion", "Código de Evaluación", Value::Text("CEV-1".into())),
            field(
                "superficie_interior_util_m2",
                "Superficie Interior Útil (m²)",
                Value::Number(dec!(82.35)),
            ),
            field("rol_vivienda_proyecto", "Rol de Vivienda o Proyecto", Value::Empty),
        ];
        assemble(records).unwrap()
    }

    #[test]
    fn test_workbook_reads_back() {
        let bytes = write_workbook(&report()).unwrap();
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = (1..=7).map(|p| format!("Pagina{p}")).collect();
        assert_eq!(workbook.sheet_names(), names);

        let range = workbook.worksheet_range("Pagina1").unwrap();
        assert_eq!(
            range.get_value((0, 1)),
            Some(&Data::String("Superficie Interior Útil (m²)".into()))
        );
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("CEV-1".into())));
        match range.get_value((1, 1)) {
            Some(Data::Float(f)) => assert!((f - 82.35).abs() < 1e-9),
            other => panic!("expected a number, got {other:?}"),
        }
        assert!(matches!(range.get_value((1, 2)), None | Some(Data::Empty)));

        let stub = workbook.worksheet_range("Pagina5").unwrap();
        assert!(stub.is_empty());
    }
}
