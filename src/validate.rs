//! Field validation, commit and whole-document checks.
//!
//! Problems are always scoped: a rejected value leaves its record as it
//! was, and never touches sibling fields or other records.

use serde::Serialize;
use tracing::debug;

use crate::document::{Document, FieldRef};
use crate::engine;
use crate::error::{AchError, Result};
use crate::layout::{Layout, RecordKind};
use crate::record::part_is_blank;

/// A field whose stored value fails its layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub line: usize,
    pub part: Option<usize>,
    pub key: String,
    pub message: String,
}

/// A problem with record order, block count or aggregate consistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureIssue {
    pub line: Option<usize>,
    pub message: String,
}

/// Every outstanding problem in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub fields: Vec<FieldIssue>,
    pub structure: Vec<StructureIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fields.is_empty() && self.structure.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.fields.len() + self.structure.len()
    }
}

/// Validate a user edit and commit it.
///
/// Computed fields are read-only here. On success returns the canonical
/// value that was stored.
pub fn validate_field(doc: &mut Document, at: &FieldRef, proposed: &str) -> Result<String> {
    let field = doc.field_spec(at)?;
    if field.computed {
        return Err(AchError::ComputedField {
            line: at.line,
            name: field.name,
        });
    }
    commit(doc, at, proposed)
}

/// Validate and store a value, then run the field's recompute rules.
///
/// If a rule fails the whole document is restored to its state before the
/// call, so a rejected edit never leaves aggregates half updated.
pub(crate) fn commit(doc: &mut Document, at: &FieldRef, proposed: &str) -> Result<String> {
    let field = doc.field_spec(at)?;
    let value = field
        .validate(proposed, true)
        .map_err(|source| AchError::Validation {
            line: at.line,
            key: at.key.clone(),
            source,
        })?;

    if field.on_mutate.is_empty() {
        store(doc, at, value.clone());
        return Ok(value);
    }

    let snapshot = doc.records.clone();
    store(doc, at, value.clone());
    for rule in field.on_mutate {
        if let Err(err) = engine::recompute(doc, *rule, at.line) {
            debug!(%err, "recompute failed, rolling back edit");
            doc.records = snapshot;
            return Err(err);
        }
    }
    Ok(value)
}

fn store(doc: &mut Document, at: &FieldRef, value: String) {
    let record = &mut doc.records[at.line];
    match at.part {
        Some(part) => {
            record.parts[part].insert(at.key.clone(), value);
        }
        None => record.set(&at.key, value),
    }
}

/// Check every field, the record order and the aggregate fields.
pub fn validate_document(doc: &Document) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_fields(doc, &mut report);
    check_structure(doc, &mut report);
    check_aggregates(doc, &mut report);
    report
}

fn check_fields(doc: &Document, report: &mut ValidationReport) {
    for (line, record) in doc.records().iter().enumerate() {
        let Ok(spec) = record.spec(doc.layout()) else {
            report.structure.push(StructureIssue {
                line: Some(line),
                message: format!("unknown record type '{}'", record.code),
            });
            continue;
        };
        for field in spec.fields() {
            if let Err(err) = field.validate(record.get(field.key), true) {
                report.fields.push(FieldIssue {
                    line,
                    part: None,
                    key: field.key.to_string(),
                    message: err.to_string(),
                });
            }
        }
        let Some(segment) = spec.segment() else {
            continue;
        };
        for (index, part) in record.parts.iter().enumerate() {
            if part_is_blank(part) {
                continue;
            }
            for field in segment.fields {
                let value = part.get(field.key).map(String::as_str).unwrap_or("");
                if let Err(err) = field.validate(value, true) {
                    report.fields.push(FieldIssue {
                        line,
                        part: Some(index),
                        key: field.key.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Start,
    BetweenBatches,
    InBatch,
    AfterEntry,
    Closed,
}

fn check_structure(doc: &Document, report: &mut ValidationReport) {
    let layout = doc.layout();
    let mut position = Position::Start;
    let mut batches = 0;
    let mut issue = |line: usize, message: String| {
        report.structure.push(StructureIssue {
            line: Some(line),
            message,
        })
    };

    for line in 0..doc.len() {
        let Some(kind) = doc.kind_at(line) else {
            continue;
        };
        position = match (position, kind) {
            (Position::Start, RecordKind::FileHeader) => Position::BetweenBatches,
            (Position::Start, _) => {
                issue(line, "file must start with a file header".to_string());
                Position::BetweenBatches
            }
            (Position::BetweenBatches, RecordKind::BatchHeader) => {
                batches += 1;
                Position::InBatch
            }
            (Position::BetweenBatches, RecordKind::Entry) if !layout.has_batches() => {
                Position::BetweenBatches
            }
            (Position::BetweenBatches, RecordKind::FileTrailer) => Position::Closed,
            (Position::InBatch | Position::AfterEntry, RecordKind::Entry) => Position::AfterEntry,
            (Position::AfterEntry, RecordKind::Addendum) => Position::AfterEntry,
            (Position::InBatch | Position::AfterEntry, RecordKind::BatchTrailer) => {
                Position::BetweenBatches
            }
            (Position::Closed, RecordKind::Padding) => Position::Closed,
            (current, kind) => {
                issue(line, format!("{kind:?} record is out of place"));
                current
            }
        };
    }

    if position != Position::Closed {
        report.structure.push(StructureIssue {
            line: None,
            message: "file has no closing file trailer".to_string(),
        });
    }
    if layout.has_batches() && batches == 0 {
        report.structure.push(StructureIssue {
            line: None,
            message: "file has no batches".to_string(),
        });
    }
    if doc.len() % layout.block_size() != 0 {
        report.structure.push(StructureIssue {
            line: None,
            message: format!(
                "record count {} is not a multiple of {}",
                doc.len(),
                layout.block_size()
            ),
        });
    }
}

/// Compare every computed field against a fresh recomputation.
fn check_aggregates(doc: &Document, report: &mut ValidationReport) {
    if !report.structure.is_empty() {
        return;
    }
    let mut expected = doc.clone();
    for err in engine::recompute_each(&mut expected) {
        report.structure.push(StructureIssue {
            line: None,
            message: format!("aggregate cannot be recomputed: {err}"),
        });
    }
    for (line, (stored, fresh)) in doc.records().iter().zip(expected.records()).enumerate() {
        let Ok(spec) = stored.spec(doc.layout()) else {
            continue;
        };
        let derived = spec
            .fields()
            .filter(|field| field.computed && is_aggregate(doc.layout(), field.key));
        for field in derived {
            let (have, want) = (stored.get(field.key), fresh.get(field.key));
            if have != want {
                report.structure.push(StructureIssue {
                    line: Some(line),
                    message: format!("\"{}\" is {have:?}, expected {want:?}", field.name),
                });
            }
        }
    }
}

fn is_aggregate(layout: Layout, key: &str) -> bool {
    match layout {
        Layout::Nacha => matches!(
            key,
            "service_class"
                | "entry_count"
                | "entry_hash"
                | "total_debits"
                | "total_credits"
                | "company_id"
                | "originating_dfi_id"
                | "trace_number"
                | "batch_count"
                | "block_count"
        ),
        Layout::Aft => matches!(
            key,
            "logical_record_count"
                | "origination_control_data"
                | "total_debit_amount"
                | "total_debit_count"
                | "total_credit_amount"
                | "total_credit_count"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_record;
    use crate::error::ValidationError;
    use chrono::NaiveDate;

    fn doc() -> Document {
        let now = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Document::empty_at(Layout::Nacha, now).unwrap()
    }

    fn entry(code: &str, amount: &str) -> crate::record::Record {
        let line = format!(
            "6{code}{}{}{:<17}{amount}{:<15}{:<22}{}{}{}",
            "12345678", "9", "ACCT1", "ID1", "ALICE", "  ", "0", "000000000000000"
        );
        parse_record(&line, Layout::Nacha).unwrap()
    }

    /// Skeleton with one entry in its batch and every aggregate current.
    fn with_entry() -> Document {
        let mut doc = doc();
        doc.records.insert(2, entry("22", "0000001000"));
        doc.reblock();
        engine::recompute_all(&mut doc).unwrap();
        doc
    }

    #[test]
    fn test_edit_updates_dependents() {
        let mut doc = with_entry();
        let stored = validate_field(&mut doc, &FieldRef::new(2, "amount"), "2500").unwrap();
        assert_eq!(stored, "0000002500");
        assert_eq!(doc.records[3].get("total_credits"), "000000002500");
        assert_eq!(doc.records[4].get("total_credits"), "000000002500");

        validate_field(&mut doc, &FieldRef::new(2, "transaction_code"), "27").unwrap();
        assert_eq!(doc.records[1].get("service_class"), "225");
        assert_eq!(doc.records[3].get("total_credits"), "000000000000");
        assert_eq!(doc.records[3].get("total_debits"), "000000002500");
        assert!(doc.validate().is_valid());
    }

    #[test]
    fn test_rejected_value_leaves_field_unchanged() {
        let mut doc = with_entry();
        let before = doc.clone();

        let err = validate_field(&mut doc, &FieldRef::new(1, "company_name"), "   ").unwrap_err();
        assert!(matches!(
            err,
            AchError::Validation {
                line: 1,
                source: ValidationError::Required { .. },
                ..
            }
        ));

        let err = validate_field(&mut doc, &FieldRef::new(2, "amount"), "12a").unwrap_err();
        assert!(matches!(
            err,
            AchError::Validation {
                source: ValidationError::PatternMismatch { .. },
                ..
            }
        ));

        let err = validate_field(&mut doc, &FieldRef::new(2, "amount"), "12345678901").unwrap_err();
        assert_eq!(err.to_string(), "line 3: \"Amount\" must be 10 characters long.");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_computed_fields_are_read_only() {
        let mut doc = with_entry();
        let err = validate_field(&mut doc, &FieldRef::new(3, "entry_hash"), "1").unwrap_err();
        assert!(matches!(err, AchError::ComputedField { line: 3, .. }));
    }

    #[test]
    fn test_failed_recompute_rolls_back() {
        let mut doc = with_entry();
        // A second batch whose trailer already holds the largest total.
        let header = doc.records[1].clone();
        let mut trailer = doc.records[3].clone();
        trailer.set("total_credits", "999999999999");
        doc.records.insert(4, trailer);
        doc.records.insert(4, header);
        let before = doc.clone();

        let err = validate_field(&mut doc, &FieldRef::new(2, "amount"), "5").unwrap_err();
        assert!(matches!(err, AchError::Overflow { .. }));
        assert_eq!(doc, before);
        assert_eq!(doc.records[2].get("amount"), "0000001000");
    }

    #[test]
    fn test_report_lists_bad_fields() {
        let mut doc = with_entry();
        doc.records[2].set("check_digit", "X");
        let report = validate_document(&doc);
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].line, 2);
        assert_eq!(report.fields[0].key, "check_digit");
        assert!(!report.is_valid());
    }

    #[test]
    fn test_report_flags_stale_aggregates() {
        let mut doc = with_entry();
        doc.records[2].set("amount", "0000009999");
        let report = validate_document(&doc);
        assert!(report.fields.is_empty());
        let lines: Vec<_> = report.structure.iter().map(|issue| issue.line).collect();
        assert_eq!(lines, vec![Some(3), Some(4)]);
    }

    #[test]
    fn test_bad_batch_does_not_hide_other_mismatches() {
        let mut doc = with_entry();
        let header = doc.records[1].clone();
        let trailer = doc.records[3].clone();
        doc.records.insert(4, trailer);
        doc.records.insert(4, header);
        doc.reblock();
        engine::recompute_all(&mut doc).unwrap();
        // FH, BH, E, BT, BH, BT, FT
        doc.records[4].set("originating_dfi_id", "ABCDEFGH");
        doc.records[2].set("amount", "0000009999");

        let report = validate_document(&doc);
        assert_eq!(report.fields.len(), 1);
        assert_eq!(report.fields[0].key, "originating_dfi_id");
        let lines: Vec<_> = report.structure.iter().map(|issue| issue.line).collect();
        assert_eq!(lines, vec![None, Some(3), Some(6)]);
        assert!(report.structure[0].message.contains("line 6"));
    }

    #[test]
    fn test_report_flags_structure() {
        let mut doc = with_entry();
        doc.records.swap(1, 2);
        let report = validate_document(&doc);
        assert!(report
            .structure
            .iter()
            .any(|issue| issue.message.contains("out of place")));

        let mut doc = with_entry();
        doc.records.truncate(4);
        let report = validate_document(&doc);
        let messages: Vec<_> = report.structure.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.contains(&"file has no closing file trailer"));
        assert!(messages.contains(&"record count 4 is not a multiple of 10"));
    }
}
