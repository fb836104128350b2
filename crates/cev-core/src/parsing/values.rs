use crate::error::CevError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Date layouts printed on CEV reports.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y"];

/// Parse a number as printed on a CEV report.
///
/// Handles formats like:
/// - "123,45" -> 123.45 (decimal comma)
/// - "1.234,5" -> 1234.5 (dot as thousands separator)
/// - "1.234.567" -> 1234567 (several dots can only be grouping)
/// - "12.345" -> 12345 (dot followed by exactly three digits is grouping)
/// - "12.5" -> 12.5
/// - "-10" -> -10
/// - "45 %" and "0,35 [W/m2K]" -> unit suffixes are dropped
pub fn parse_number(s: &str) -> Result<Decimal, CevError> {
    let cleaned = strip_units(s);
    if cleaned.is_empty() {
        return Err(CevError::ParseError(format!("no number in '{}'", s.trim())));
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else if is_dot_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized)
        .map_err(|e| CevError::ParseError(format!("invalid number '{}': {}", s.trim(), e)))
}

/// `-?d{1,3}(.ddd)+`: dots used only as thousands separators.
fn is_dot_grouped(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let lead_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    let rest: Vec<&str> = groups.collect();
    lead_ok
        && !rest.is_empty()
        && rest
            .iter()
            .all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

/// Drop a trailing `[unit]` and `%`, and any whitespace inside the number.
fn strip_units(s: &str) -> String {
    let mut s = s.trim();
    if s.ends_with(']') {
        if let Some(open) = s.rfind('[') {
            s = s[..open].trim_end();
        }
    }
    s.trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Parse a `dd-mm-yyyy` or `dd/mm/yyyy` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, CevError> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| CevError::ParseError(format!("invalid date '{}'", s)))
}

/// Canonical variant whose folded form prefixes the folded text.
pub fn match_variant<'a>(s: &str, variants: &'a [String]) -> Option<&'a str> {
    let folded = fold(s);
    variants
        .iter()
        .find(|v| {
            let v = fold(v);
            !v.is_empty() && folded.starts_with(&v)
        })
        .map(|v| v.as_str())
}

/// Uppercase, strip Spanish diacritics and collapse whitespace, so that
/// "Precalificación" and "PRECALIFICACION" compare equal.
pub fn fold(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}
