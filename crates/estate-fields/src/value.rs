//! Typed field values and coercion from raw answer text
//!
//! Coercion never fails: anything that cannot be read degrades to absent
//! (`None`) or, for dates, passes through unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Literal markers exporters write for "no answer"
const ABSENT_MARKERS: &[&str] = &["none", "null", "undefined"];

/// Text values of at most this many ASCII digits are repeat-count artifacts
const MAX_ARTIFACT_DIGITS: usize = 2;

/// Declared value type of an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// `TextValue`, or a `SelValue` choice
    Text,
    /// `TFValue`
    Bool,
    /// `NumValue`
    Number,
    /// `DateValue`
    Date,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
        };
        f.write_str(name)
    }
}

impl ValueKind {
    /// Value kind for a value element name
    #[must_use]
    pub fn from_element(name: &[u8]) -> Option<Self> {
        match name {
            b"TextValue" | b"SelValue" => Some(Self::Text),
            b"TFValue" => Some(Self::Bool),
            b"NumValue" => Some(Self::Number),
            b"DateValue" => Some(Self::Date),
            _ => None,
        }
    }
}

/// One typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text or a multiple-choice selection
    Text(String),
    /// Yes/no answer
    Bool(bool),
    /// Numeric answer; unparseable input reads as 0
    Number(f64),
    /// ISO `YYYY-MM-DD` when the source was readable, the original text otherwise
    Date(String),
}

impl FieldValue {
    /// Kind of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Number(_) => ValueKind::Number,
            FieldValue::Date(_) => ValueKind::Date,
        }
    }

    /// Text or date content
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric content
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Date content, when it was normalized to ISO
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Date(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Coerce raw answer text into a value of the declared kind.
///
/// Returns `None` for absent answers: empty text, the "None"/"null"/"undefined"
/// markers, and (for text) one- or two-digit strings.
#[must_use]
pub fn coerce(kind: ValueKind, raw: &str) -> Option<FieldValue> {
    let raw = raw.trim();
    if raw.is_empty() || ABSENT_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return None;
    }

    match kind {
        ValueKind::Text if is_digit_artifact(raw) => None,
        ValueKind::Text => Some(FieldValue::Text(raw.to_string())),
        ValueKind::Bool => Some(FieldValue::Bool(raw.eq_ignore_ascii_case("true"))),
        ValueKind::Number => Some(FieldValue::Number(parse_number(raw))),
        ValueKind::Date => Some(FieldValue::Date(normalize_date(raw))),
    }
}

fn is_digit_artifact(raw: &str) -> bool {
    raw.len() <= MAX_ARTIFACT_DIGITS && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Float parse tolerant of thousands separators; 0 on failure.
///
/// `NaN` and infinities count as failures.
#[must_use]
pub fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$')
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Normalize a slash-separated `day/month/year` date to ISO `YYYY-MM-DD`.
///
/// A first group above 12 can only be a day; at or below 12 the exporter's
/// day-first convention is still assumed. Month-first input whose second group
/// is not a valid month (`01/15/2024`) is not reinterpreted and passes through.
/// Anything that does not form a real calendar date passes through unchanged.
#[must_use]
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    let parts: Vec<&str> = raw.split('/').map(str::trim).collect();

    let [first, second, year] = parts.as_slice() else {
        return raw.to_string();
    };
    let (Ok(first), Ok(second), Ok(year)) = (first.parse::<u32>(), second.parse::<u32>(), year.parse::<i32>())
    else {
        return raw.to_string();
    };
    if parts[2].len() != 4 {
        return raw.to_string();
    }

    // Day-first either way: certain above 12, the exporter's convention otherwise.
    let (day, month) = (first, second);

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_numbers_become_zero() {
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "-Infinity"] {
            assert_eq!(parse_number(raw), 0.0, "{raw}");
        }
        assert_eq!(coerce(ValueKind::Number, "NaN"), Some(FieldValue::Number(0.0)));
        assert_eq!(parse_number("1,250.50"), 1250.5);
    }

    #[test]
    fn date_day_first() {
        assert_eq!(normalize_date("25/12/1980"), "1980-12-25");
        assert_eq!(normalize_date("13/02/1975"), "1975-02-13");
        assert_eq!(normalize_date("05/06/2001"), "2001-06-05");
        assert_eq!(normalize_date(" 1/2/2020 "), "2020-02-01");
    }

    #[test]
    fn date_passthrough() {
        assert_eq!(normalize_date("01/15/2024"), "01/15/2024");
        assert_eq!(normalize_date("31/02/2020"), "31/02/2020");
        assert_eq!(normalize_date("25/12/80"), "25/12/80");
        assert_eq!(normalize_date("December 25, 1980"), "December 25, 1980");
        assert_eq!(normalize_date("1980-12-25"), "1980-12-25");
    }

    #[test]
    fn absent_markers() {
        for raw in ["", "   ", "None", "null", "UNDEFINED"] {
            assert_eq!(coerce(ValueKind::Text, raw), None, "{raw:?}");
            assert_eq!(coerce(ValueKind::Number, raw), None, "{raw:?}");
        }
    }

    #[test]
    fn short_digit_text_is_absent() {
        assert_eq!(coerce(ValueKind::Text, "1"), None);
        assert_eq!(coerce(ValueKind::Text, "12"), None);
        assert_eq!(
            coerce(ValueKind::Text, "123"),
            Some(FieldValue::Text("123".into()))
        );
        assert_eq!(coerce(ValueKind::Number, "12"), Some(FieldValue::Number(12.0)));
    }

    #[test]
    fn bool_and_number_coercion() {
        assert_eq!(coerce(ValueKind::Bool, "TRUE"), Some(FieldValue::Bool(true)));
        assert_eq!(coerce(ValueKind::Bool, "false"), Some(FieldValue::Bool(false)));
        assert_eq!(coerce(ValueKind::Bool, "yes"), Some(FieldValue::Bool(false)));
        assert_eq!(coerce(ValueKind::Number, "1,250.5"), Some(FieldValue::Number(1250.5)));
        assert_eq!(coerce(ValueKind::Number, "abc"), Some(FieldValue::Number(0.0)));
    }

    #[test]
    fn value_accessors() {
        let d = FieldValue::Date("1980-12-25".into());
        assert_eq!(d.as_date(), NaiveDate::from_ymd_opt(1980, 12, 25));
        assert_eq!(d.as_text(), Some("1980-12-25"));
        assert_eq!(FieldValue::Date("31/02/2020".into()).as_date(), None);
        assert_eq!(FieldValue::Bool(true).as_text(), None);
        assert_eq!(FieldValue::Number(2.5).to_string(), "2.5");
    }
}
