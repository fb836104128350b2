use crate::error::CevError;
use crate::extraction::{region, Document};
use crate::parsing::values::fold;
use crate::schema::{self, Anchor, SchemaRegistry};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// Fewer pages than a report has.
    PageCount { found: usize, required: usize },
    /// The title area does not carry a CEV v2 title.
    InvalidFormat { page: usize, found: String },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationFailure::PageCount { found, required } => {
                write!(f, "document has {found} page(s), expected at least {required}")
            }
            ValidationFailure::InvalidFormat { page, found } => {
                write!(f, "page {page} title area reads '{found}'")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    Valid,
    Invalid { failure: ValidationFailure },
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid { failure } => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<(), CevError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid {
                failure: ValidationFailure::PageCount { found, required },
            } => Err(CevError::PageCount { found, required }),
            ValidationResult::Invalid {
                failure: ValidationFailure::InvalidFormat { page, found },
            } => Err(CevError::InvalidFormat { page, found }),
        }
    }
}

/// Decide whether `document` is a CEV v2 report.
pub fn validate(document: &Document) -> ValidationResult {
    validate_with(schema::registry(), document)
}

/// Page count first, then the title in the anchor region. Only the document
/// is inspected; nothing is extracted.
pub fn validate_with(registry: &SchemaRegistry, document: &Document) -> ValidationResult {
    let required = registry.min_pages();
    if document.page_count() < required {
        tracing::warn!(found = document.page_count(), required, "too few pages");
        return ValidationResult::Invalid {
            failure: ValidationFailure::PageCount {
                found: document.page_count(),
                required,
            },
        };
    }

    let anchor = registry.anchor();
    let found = region::read(document, anchor.page, &anchor.region).unwrap_or_default();
    if has_title(anchor, &found) {
        ValidationResult::Valid
    } else {
        tracing::warn!(page = anchor.page, found = %found, "title not recognised");
        ValidationResult::Invalid {
            failure: ValidationFailure::InvalidFormat {
                page: anchor.page,
                found,
            },
        }
    }
}

fn has_title(anchor: &Anchor, text: &str) -> bool {
    let text = fold(text);
    anchor.titles.iter().any(|title| {
        let title = fold(title);
        !title.is_empty() && text.starts_with(&title)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{BBox, PageLayout, TextLine, Word};
    use crate::schema::{REPORT_HEIGHT_MM, REPORT_WIDTH_MM};

    fn doc_with_title(pages: usize, title: &str) -> Document {
        let mut layouts: Vec<PageLayout> = (1..=pages)
            .map(|n| PageLayout {
                page_number: n,
                width: REPORT_WIDTH_MM,
                height: REPORT_HEIGHT_MM,
                lines: Vec::new(),
            })
            .collect();
        if let Some(first) = layouts.first_mut() {
            let words = title
                .split_whitespace()
                .enumerate()
                .map(|(i, w)| {
                    let x = 10.0 + 40.0 * i as f32;
                    Word {
                        text: w.to_string(),
                        bbox: BBox {
                            x_min: x,
                            y_min: 11.0,
                            x_max: x + 35.0,
                            y_max: 17.0,
                        },
                    }
                })
                .collect();
            first.lines.push(TextLine { words });
        }
        Document::new(layouts)
    }

    #[test]
    fn test_calificacion_is_valid() {
        assert!(validate(&doc_with_title(7, "CALIFICACIÓN ENERGÉTICA")).is_valid());
    }

    #[test]
    fn test_precalificacion_is_valid() {
        assert!(validate(&doc_with_title(8, "PRECALIFICACIÓN ENERGÉTICA DE VIVIENDAS")).is_valid());
    }

    #[test]
    fn test_unaccented_title_is_valid() {
        assert!(validate(&doc_with_title(7, "Calificacion Energetica")).is_valid());
    }

    #[test]
    fn test_too_few_pages() {
        let result = validate(&doc_with_title(6, "CALIFICACIÓN ENERGÉTICA"));
        assert_eq!(
            result.failure(),
            Some(&ValidationFailure::PageCount {
                found: 6,
                required: 7
            })
        );
        assert!(matches!(
            result.into_result(),
            Err(CevError::PageCount { found: 6, required: 7 })
        ));
    }

    #[test]
    fn test_wrong_title() {
        let result = validate(&doc_with_title(7, "INFORME TÉCNICO"));
        match result {
            ValidationResult::Invalid {
                failure: ValidationFailure::InvalidFormat { page, ref found },
            } => {
                assert_eq!(page, 1);
                assert_eq!(found, "INFORME TÉCNICO");
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_title_area() {
        let result = validate(&doc_with_title(7, ""));
        assert!(matches!(
            result.into_result(),
            Err(CevError::InvalidFormat { page: 1, .. })
        ));
    }
}
