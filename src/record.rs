//! One logical line of a fixed-width file.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::field::is_blank;
use crate::layout::{Layout, RecordKind, RecordSpec};

/// Field values of one segment repetition.
pub type Part = BTreeMap<String, String>;

/// A record: a type code plus its raw field values.
///
/// A record does not know its own line number; that is its position in the
/// owning [`Document`](crate::Document) and shifts whenever records are
/// inserted or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub code: char,
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    pub is_padding: bool,
}

impl Record {
    pub fn new(code: char) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// A block-filler record.
    pub fn filler(code: char) -> Self {
        Self {
            code,
            is_padding: true,
            ..Self::default()
        }
    }

    /// Raw value of a top-level field, empty when unset.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw value of a field inside segment part `part`, empty when unset.
    pub fn part_value(&self, part: usize, key: &str) -> &str {
        self.parts
            .get(part)
            .and_then(|p| p.get(key))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Numeric value of a top-level field. Blank reads as zero.
    pub fn number(&self, key: &str) -> u64 {
        parse_number(self.get(key), key)
    }

    pub fn spec(&self, layout: Layout) -> Result<&'static RecordSpec> {
        if self.is_padding {
            if let Some(spec) = layout.padding_record() {
                return Ok(spec);
            }
        }
        layout.lookup(self.code)
    }

    pub fn kind(&self, layout: Layout) -> Option<RecordKind> {
        self.spec(layout).ok().map(|spec| spec.kind)
    }
}

/// True when a segment part holds no data: an unused slot.
pub fn part_is_blank(part: &Part) -> bool {
    part.values().all(|value| is_blank(value))
}

/// Parse a stored numeric value. Blank reads as zero; anything unreadable
/// also reads as zero and is logged.
pub(crate) fn parse_number(raw: &str, key: &str) -> u64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(key, value = raw, "non-numeric value counted as zero");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_field_is_empty() {
        let record = Record::new('6');
        assert_eq!(record.get("amount"), "");
        assert_eq!(record.number("amount"), 0);
    }

    #[test]
    fn test_number() {
        let mut record = Record::new('6');
        record.set("amount", "0000010000");
        assert_eq!(record.number("amount"), 10000);
        record.set("amount", "12x");
        assert_eq!(record.number("amount"), 0);
    }

    #[test]
    fn test_spec_for_filler_uses_padding_record() {
        let record = Record::filler('9');
        assert_eq!(record.kind(Layout::Nacha), Some(RecordKind::Padding));
        assert_eq!(Record::new('9').kind(Layout::Nacha), Some(RecordKind::FileTrailer));
    }

    #[test]
    fn test_part_value() {
        let mut record = Record::new('C');
        let mut part = Part::new();
        part.insert("amount".to_string(), "0000000100".to_string());
        record.parts.push(part);
        assert_eq!(record.part_value(0, "amount"), "0000000100");
        assert_eq!(record.part_value(1, "amount"), "");
    }
}
