use crate::error::CevError;
use crate::model::{Field, FieldIssue, IssueKind, PageRecord, RawRecord, Value};
use crate::parsing::grade::energy_grade;
use crate::parsing::values::{match_variant, parse_date, parse_number};
use crate::schema::{self, Derivation, DerivedField, FieldKind, FieldSchema, PageSchema};
use std::collections::HashSet;

/// Normalize a raw record against the embedded schema of its page.
pub fn normalize(raw: &RawRecord) -> Result<PageRecord, CevError> {
    normalize_with(schema::schema_for(raw.page)?, raw)
}

/// Turn raw region text into typed, labelled fields.
///
/// Field-level failures never abort: an empty required field carries a
/// `MissingField` issue and unparseable text is kept as `Value::Unparsed`
/// with a `ParseError` issue. Only a raw key the schema does not know, or
/// the same key twice, is an error.
pub fn normalize_with(schema: &PageSchema, raw: &RawRecord) -> Result<PageRecord, CevError> {
    if raw.page != schema.page {
        return Err(CevError::Configuration(format!(
            "raw record for page {} normalized with schema of page {}",
            raw.page, schema.page
        )));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(raw.fields.len() + schema.derived.len());
    for raw_field in &raw.fields {
        let def = schema.field(&raw_field.key).ok_or_else(|| {
            CevError::Configuration(format!(
                "page {} has no label for raw field '{}'",
                schema.page, raw_field.key
            ))
        })?;
        if !seen.insert(raw_field.key.as_str()) {
            return Err(CevError::Configuration(format!(
                "page {} raw field '{}' appears twice",
                schema.page, raw_field.key
            )));
        }
        fields.push(normalize_field(def, &raw_field.text));
    }

    for derived in &schema.derived {
        let field = derive_field(derived, &fields);
        fields.push(field);
    }

    for field in &fields {
        if let Some(issue) = &field.issue {
            tracing::warn!(page = schema.page, key = %field.key, kind = %issue.kind, "{}", issue.message);
        }
    }

    Ok(PageRecord {
        page: schema.page,
        fields,
    })
}

fn normalize_field(def: &FieldSchema, text: &str) -> Field {
    let text = text.trim();
    let mut field = Field {
        key: def.key.clone(),
        label: def.label.clone(),
        value: Value::Empty,
        issue: None,
    };

    if text.is_empty() {
        if def.required {
            field.issue = Some(FieldIssue {
                kind: IssueKind::MissingField,
                message: format!("required field '{}' is empty", def.label),
            });
        }
        return field;
    }

    match coerce(def, text) {
        Ok(value) => field.value = value,
        Err(message) => {
            field.value = Value::Unparsed(text.to_string());
            field.issue = Some(FieldIssue {
                kind: IssueKind::ParseError,
                message,
            });
        }
    }
    field
}

fn coerce(def: &FieldSchema, text: &str) -> Result<Value, String> {
    match def.kind {
        FieldKind::Text => Ok(Value::Text(text.to_string())),
        FieldKind::Numeric => parse_number(text)
            .map(Value::Number)
            .map_err(|e| e.to_string()),
        FieldKind::Date => parse_date(text).map(Value::Date).map_err(|e| e.to_string()),
        FieldKind::Enum => match_variant(text, &def.variants)
            .map(|v| Value::Text(v.to_string()))
            .ok_or_else(|| {
                format!(
                    "'{}' is none of {}",
                    text,
                    def.variants.join(", ")
                )
            }),
    }
}

fn derive_field(derived: &DerivedField, fields: &[Field]) -> Field {
    let source = fields
        .iter()
        .find(|f| f.key == derived.source)
        .and_then(|f| f.value.as_number());
    let value = match (derived.derivation, source) {
        (Derivation::EnergyGrade, Some(percent)) => energy_grade(percent)
            .map(|grade| Value::Text(grade.to_string()))
            .unwrap_or(Value::Empty),
        (_, None) => Value::Empty,
    };
    Field {
        key: derived.key.clone(),
        label: derived.label.clone(),
        value,
        issue: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawField;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn raw(page: usize, pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord {
            page,
            fields: pairs
                .iter()
                .map(|(key, text)| RawField {
                    page,
                    key: key.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_page_one_values_and_grade() {
        let record = normalize(&raw(
            1,
            &[
                ("tipo_evaluacion", "CALIFICACIÓN ENERGÉTICA DE VIVIENDAS"),
                ("codigo_evaluacion", "CEV-2023-0042"),
                ("superficie_interior_util_m2", "82,35"),
                ("porcentaje_ahorro", "45"),
                ("emitida_el", "14-03-2023"),
            ],
        ))
        .unwrap();

        assert_eq!(
            record.value("tipo_evaluacion"),
            Some(&Value::Text("Calificación".into()))
        );
        assert_eq!(
            record.value("superficie_interior_util_m2"),
            Some(&Value::Number(dec!(82.35)))
        );
        assert_eq!(
            record.value("letra_eficiencia_energetica_dem"),
            Some(&Value::Text("C".into()))
        );
        let date = record.get("emitida_el").unwrap();
        assert_eq!(date.value.to_string(), "14-03-2023");
        assert!(date.issue.is_none());
    }

    #[test]
    fn test_savings_above_full_leave_grade_empty() {
        let record = normalize(&raw(1, &[("porcentaje_ahorro", "150")])).unwrap();
        assert_eq!(record.value("porcentaje_ahorro"), Some(&Value::Number(dec!(150))));
        let grade = record.get("letra_eficiencia_energetica_dem").unwrap();
        assert_eq!(grade.value, Value::Empty);
        assert!(grade.issue.is_none());
    }

    #[test]
    fn test_labels_come_from_schema() {
        let record = normalize(&raw(7, &[("mandante_rut", "12.345.678-9")])).unwrap();
        let field = record.by_label("Mandante: RUT").unwrap();
        assert_eq!(field.key, "mandante_rut");
        assert_eq!(field.value, Value::Text("12.345.678-9".into()));
    }

    #[test]
    fn test_empty_required_field_is_missing() {
        let record = normalize(&raw(7, &[("codigo_evaluacion", "  ")])).unwrap();
        let field = record.get("codigo_evaluacion").unwrap();
        assert_eq!(field.value, Value::Empty);
        assert_eq!(field.issue.as_ref().unwrap().kind, IssueKind::MissingField);
    }

    #[test]
    fn test_empty_optional_field_has_no_issue() {
        let record = normalize(&raw(7, &[("evaluador_rol_minvu", "")])).unwrap();
        assert!(record.get("evaluador_rol_minvu").unwrap().issue.is_none());
    }

    #[test]
    fn test_unparseable_number_kept_with_issue() {
        let record = normalize(&raw(1, &[("porcentaje_ahorro", "n/a")])).unwrap();
        let field = record.get("porcentaje_ahorro").unwrap();
        assert_eq!(field.value, Value::Unparsed("n/a".into()));
        assert_eq!(field.issue.as_ref().unwrap().kind, IssueKind::ParseError);
        // No number, no grade.
        assert_eq!(
            record.value("letra_eficiencia_energetica_dem"),
            Some(&Value::Empty)
        );
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let record = normalize(&raw(1, &[("tipo_evaluacion", "CERTIFICADO")])).unwrap();
        let field = record.get("tipo_evaluacion").unwrap();
        assert_eq!(field.issue.as_ref().unwrap().kind, IssueKind::ParseError);
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        let err = normalize(&raw(7, &[("no_such_field", "x")])).unwrap_err();
        assert!(matches!(err, CevError::Configuration(_)));
    }

    #[test]
    fn test_duplicate_key_is_configuration_error() {
        let err = normalize(&raw(7, &[("mandante_rut", "1"), ("mandante_rut", "2")])).unwrap_err();
        assert!(matches!(err, CevError::Configuration(_)));
    }

    #[test]
    fn test_stub_page_normalizes_to_empty_record() {
        let record = normalize(&raw(5, &[])).unwrap();
        assert!(record.is_empty());
    }
}
