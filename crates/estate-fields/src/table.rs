//! The field table: ordered, name-keyed, typed answers
//!
//! A field holds a scalar when its name occurred once and a list when it
//! recurred. Lists keep absent slots so parallel fields (`Child name[i]`,
//! `Child DOB[i]`) stay aligned by index.

use crate::error::FieldError;
use crate::value::{FieldValue, ValueKind};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value(s) recorded under one field name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldEntry {
    /// Single occurrence (possibly absent)
    Scalar(Option<FieldValue>),
    /// Repeated occurrences in source order
    List(Vec<Option<FieldValue>>),
}

impl FieldEntry {
    /// All slots, in source order
    #[must_use]
    pub fn slots(&self) -> &[Option<FieldValue>] {
        match self {
            FieldEntry::Scalar(v) => std::slice::from_ref(v),
            FieldEntry::List(vs) => vs,
        }
    }

    /// First present value
    #[must_use]
    pub fn first(&self) -> Option<&FieldValue> {
        self.slots().iter().flatten().next()
    }

    /// Kind of the values held (from the first present value)
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        self.first().map(FieldValue::kind)
    }

    /// Whether the field recurred
    #[inline]
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, FieldEntry::List(_))
    }

    /// Number of slots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Whether every slot is absent
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.first().is_none()
    }

    fn push(&mut self, value: Option<FieldValue>) {
        match self {
            FieldEntry::Scalar(existing) => {
                let first = existing.take();
                *self = FieldEntry::List(vec![first, value]);
            }
            FieldEntry::List(vs) => vs.push(value),
        }
    }
}

/// Ordered mapping from field name to typed value(s)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldTable {
    fields: IndexMap<String, FieldEntry>,
}

impl FieldTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `name`.
    ///
    /// A value whose kind differs from the kind already held is recorded as
    /// absent so the field stays homogeneous. Returns whether the value was kept.
    pub fn record(&mut self, name: impl Into<String>, value: Option<FieldValue>) -> bool {
        let name = name.into();
        let held = self.fields.get(&name).and_then(FieldEntry::kind);

        let (value, kept) = match (&value, held) {
            (Some(v), Some(kind)) if v.kind() != kind => {
                tracing::warn!(
                    field = %name,
                    expected = ?kind,
                    actual = ?v.kind(),
                    "mixed value kinds in repeated field; slot degraded to absent"
                );
                (None, false)
            }
            _ => (value, true),
        };

        match self.fields.get_mut(&name) {
            Some(entry) => entry.push(value),
            None => {
                self.fields.insert(name, FieldEntry::Scalar(value));
            }
        }
        kept
    }

    /// Entry for `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.fields.get(name)
    }

    /// Whether `name` has at least one present value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| !e.is_absent())
    }

    /// First present value of `name`
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name).and_then(FieldEntry::first)
    }

    /// All slots of `name` (empty when the field never occurred)
    #[must_use]
    pub fn slots(&self, name: &str) -> &[Option<FieldValue>] {
        self.get(name).map_or(&[], FieldEntry::slots)
    }

    /// First present text (or date) value of `name`
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.slots(name).iter().flatten().find_map(FieldValue::as_text)
    }

    /// First present text among name variants, in the order given
    #[must_use]
    pub fn first_text(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.text(n))
    }

    /// First present text among name variants, failing when none is present
    /// or the first present variant holds a non-text kind.
    ///
    /// # Errors
    ///
    /// [`FieldError::Missing`] naming the first variant, or
    /// [`FieldError::WrongKind`] for a boolean or numeric field.
    pub fn require_text(&self, names: &[&str]) -> Result<&str, FieldError> {
        for name in names {
            if let Some(value) = self.value(name) {
                return value.as_text().ok_or_else(|| FieldError::WrongKind {
                    field: (*name).to_string(),
                    expected: ValueKind::Text,
                    actual: value.kind(),
                });
            }
        }
        Err(FieldError::missing(names.first().copied().unwrap_or_default()))
    }

    /// First present boolean of `name`
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(FieldValue::as_bool)
    }

    /// First present number of `name`
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(FieldValue::as_number)
    }

    /// First present date of `name` that normalized to a calendar date
    #[must_use]
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.slots(name).iter().flatten().find_map(FieldValue::as_date)
    }

    /// Text of every slot of `name`, aligned by index
    #[must_use]
    pub fn texts(&self, name: &str) -> Vec<Option<&str>> {
        self.slots(name)
            .iter()
            .map(|slot| slot.as_ref().and_then(FieldValue::as_text))
            .collect()
    }

    /// Present texts of `name`, absent slots skipped
    #[must_use]
    pub fn present_texts(&self, name: &str) -> Vec<&str> {
        self.texts(name).into_iter().flatten().collect()
    }

    /// Field names, in first-occurrence order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Name/entry pairs, in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct field names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a plain JSON object (lists as arrays, absent as null)
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        fn plain(v: &Option<FieldValue>) -> serde_json::Value {
            match v {
                None => serde_json::Value::Null,
                Some(FieldValue::Text(s) | FieldValue::Date(s)) => serde_json::Value::String(s.clone()),
                Some(FieldValue::Bool(b)) => serde_json::Value::Bool(*b),
                Some(FieldValue::Number(n)) => serde_json::json!(n),
            }
        }

        let map = self
            .fields
            .iter()
            .map(|(name, entry)| {
                let value = match entry {
                    FieldEntry::Scalar(v) => plain(v),
                    FieldEntry::List(vs) => serde_json::Value::Array(vs.iter().map(plain).collect()),
                };
                (name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}
