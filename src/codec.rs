//! Positional parser and serializer.
//!
//! Both directions walk the record's layout left to right. Parsing consumes
//! exact-width slices of the line; serializing writes every field in its
//! canonical padded form, so `parse(serialize(doc))` gives back the same
//! field values.

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{AchError, Result};
use crate::field::FieldSpec;
use crate::layout::{Layout, RecordKind, SpecItem};
use crate::record::{Part, Record, part_is_blank};

/// Split file text into non-empty lines, accepting CR+LF or LF endings.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
}

/// Parse file text into a document.
///
/// Lines whose record type code has no layout are logged and skipped; the
/// rest of the file is still read.
pub fn parse(text: &str, layout: Layout) -> Document {
    let mut records = Vec::new();
    for (index, line) in lines(text).enumerate() {
        match parse_record(line, layout) {
            Ok(record) => records.push(record),
            Err(err) => warn!(line = index + 1, %err, "skipping record"),
        }
    }
    debug!(records = records.len(), %layout, "parsed file");
    Document::new(layout, records)
}

/// Parse one line into a record.
pub fn parse_record(line: &str, layout: Layout) -> Result<Record> {
    let chars: Vec<char> = line.chars().filter(|&c| c != '\r').collect();
    let code = *chars.first().ok_or(AchError::UnknownRecordType { code: ' ' })?;
    let spec = match layout.padding_record() {
        Some(padding) if layout.is_padding_line(line) => padding,
        _ => layout.lookup(code)?,
    };

    let mut record = Record::new(code);
    record.is_padding = spec.kind == RecordKind::Padding;
    let mut pos = 1;
    for item in spec.items {
        match item {
            SpecItem::Field(field) => {
                record.set(field.key, slice(&chars, pos, field.length));
                pos += field.length;
            }
            SpecItem::Segment(segment) => {
                while pos < chars.len() && record.parts.len() < segment.limit {
                    let mut part = Part::new();
                    for field in segment.fields {
                        part.insert(field.key.to_string(), slice(&chars, pos, field.length));
                        pos += field.length;
                    }
                    record.parts.push(part);
                }
            }
            SpecItem::Padding(padding) => {
                record.padding = Some(slice(&chars, pos, padding.limit.saturating_sub(pos)));
                pos = padding.limit;
            }
        }
    }
    Ok(record)
}

/// Serialize a document. Records are joined with a single newline.
pub fn serialize(doc: &Document) -> String {
    let mut lines = Vec::with_capacity(doc.len());
    for (index, record) in doc.records().iter().enumerate() {
        match serialize_record(record, doc.layout()) {
            Ok(line) => lines.push(line),
            Err(err) => warn!(line = index + 1, %err, "skipping record"),
        }
    }
    lines.join("\n")
}

/// Serialize one record to its fixed-width line.
pub fn serialize_record(record: &Record, layout: Layout) -> Result<String> {
    let spec = record.spec(layout)?;
    let mut out = String::with_capacity(layout.line_width());
    out.push(spec.code);
    let mut pos = 1;
    for item in spec.items {
        match item {
            SpecItem::Field(field) => {
                out.push_str(&fit(field, record.get(field.key)));
                pos += field.length;
            }
            SpecItem::Segment(segment) => {
                for part in record.parts.iter().take(segment.limit) {
                    if part_is_blank(part) {
                        out.extend(std::iter::repeat_n(' ', segment.width()));
                        pos += segment.width();
                        continue;
                    }
                    for field in segment.fields {
                        let value = part.get(field.key).map(String::as_str).unwrap_or("");
                        out.push_str(&fit(field, value));
                        pos += field.length;
                    }
                }
            }
            SpecItem::Padding(padding) => {
                let width = padding.limit.saturating_sub(pos);
                let stored = record.padding.as_deref().unwrap_or("");
                let kept = stored.chars().take(width).count();
                out.extend(stored.chars().take(width));
                out.extend(std::iter::repeat_n(padding.fill, width - kept));
                pos = padding.limit;
            }
        }
    }
    Ok(out)
}

/// Canonical force-padded value, cut to the field width.
fn fit(field: &FieldSpec, value: &str) -> String {
    field
        .canonicalize(value, true)
        .chars()
        .take(field.length)
        .collect()
}

/// Up to `len` characters starting at `pos`, clamped to the end of the line.
fn slice(chars: &[char], pos: usize, len: usize) -> String {
    chars.iter().skip(pos).take(len).collect()
}
