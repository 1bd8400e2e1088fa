//! The in-memory file document.
//!
//! A [`Document`] is the single owned, mutable sequence of records for one
//! file. Every operation takes it explicitly; positions are always derived
//! from the current order of `records`.

use chrono::{Local, NaiveDateTime};

use crate::codec;
use crate::engine;
use crate::error::{AchError, Result};
use crate::field::FieldSpec;
use crate::import;
use crate::layout::{Layout, RecordKind, RecordSpec, SpecItem};
use crate::record::Record;
use crate::validate::{self, ValidationReport};

/// Address of one field: a top-level field, or a field inside a segment part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// 0-based record position.
    pub line: usize,
    /// 0-based segment part, for segment fields.
    pub part: Option<usize>,
    pub key: String,
}

impl FieldRef {
    pub fn new(line: usize, key: impl Into<String>) -> Self {
        Self {
            line,
            part: None,
            key: key.into(),
        }
    }

    pub fn in_part(line: usize, part: usize, key: impl Into<String>) -> Self {
        Self {
            line,
            part: Some(part),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    layout: Layout,
    pub(crate) records: Vec<Record>,
}

impl Document {
    pub fn new(layout: Layout, records: Vec<Record>) -> Self {
        Self { layout, records }
    }

    /// Parse file text. Lines with unknown record types are skipped.
    pub fn parse(text: &str, layout: Layout) -> Self {
        codec::parse(text, layout)
    }

    /// A minimal valid file stamped with the current local time.
    pub fn empty(layout: Layout) -> Result<Self> {
        Self::empty_at(layout, Local::now().naive_local())
    }

    /// A minimal valid file: header, one empty batch (NACHA only), trailer
    /// and block padding, with every aggregate computed.
    pub fn empty_at(layout: Layout, now: NaiveDateTime) -> Result<Self> {
        let kinds: &[RecordKind] = if layout.has_batches() {
            &[
                RecordKind::FileHeader,
                RecordKind::BatchHeader,
                RecordKind::BatchTrailer,
                RecordKind::FileTrailer,
            ]
        } else {
            &[RecordKind::FileHeader, RecordKind::FileTrailer]
        };
        let mut records = Vec::with_capacity(layout.block_size());
        for kind in kinds {
            let code = layout.code_for(*kind).ok_or(AchError::MissingRecord(*kind))?;
            records.push(blank_record(layout.lookup(code)?, now));
        }
        let mut doc = Self::new(layout, records);
        doc.reblock();
        engine::recompute_all(&mut doc)?;
        Ok(doc)
    }

    pub fn to_text(&self) -> String {
        codec::serialize(self)
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, line: usize) -> Result<&Record> {
        self.records.get(line).ok_or(AchError::NoSuchLine { line })
    }

    pub fn spec_at(&self, line: usize) -> Result<&'static RecordSpec> {
        self.record(line)?.spec(self.layout)
    }

    pub fn kind_at(&self, line: usize) -> Option<RecordKind> {
        self.records.get(line)?.kind(self.layout)
    }

    /// Positions of every record of `kind`, in order.
    pub fn lines_of(&self, kind: RecordKind) -> Vec<usize> {
        (0..self.records.len())
            .filter(|&line| self.kind_at(line) == Some(kind))
            .collect()
    }

    /// Raw stored value of a field.
    pub fn value(&self, at: &FieldRef) -> Result<&str> {
        let record = self.record(at.line)?;
        match at.part {
            Some(part) => {
                if part >= record.parts.len() {
                    return Err(AchError::NoSuchPart { line: at.line, part });
                }
                Ok(record.part_value(part, &at.key))
            }
            None => Ok(record.get(&at.key)),
        }
    }

    /// Layout of the field `at` points to.
    pub fn field_spec(&self, at: &FieldRef) -> Result<&'static FieldSpec> {
        let record = self.record(at.line)?;
        let spec = record.spec(self.layout)?;
        let unknown = || AchError::UnknownField {
            line: at.line,
            code: record.code,
            key: at.key.clone(),
        };
        match at.part {
            Some(part) => {
                let segment = spec.segment().ok_or_else(unknown)?;
                if part >= record.parts.len() {
                    return Err(AchError::NoSuchPart { line: at.line, part });
                }
                segment.field(&at.key).ok_or_else(unknown)
            }
            None => spec.field(&at.key).ok_or_else(unknown),
        }
    }

    /// User edit of one field: validate, commit and recompute dependents.
    ///
    /// Computed fields are rejected. On any failure the document is left as
    /// it was before the call.
    pub fn edit_field(&mut self, at: &FieldRef, value: &str) -> Result<String> {
        validate::validate_field(self, at, value)
    }

    /// Every outstanding problem in the document.
    pub fn validate(&self) -> ValidationReport {
        validate::validate_document(self)
    }

    /// Splice transactions from CSV text into the batch whose header is at
    /// `batch_header`. Returns the number of entries added.
    pub fn import_transactions(&mut self, batch_header: usize, text: &str) -> Result<usize> {
        import::import_transactions(self, batch_header, text)
    }

    /// Recompute every aggregate field from the leaf entries.
    pub fn recompute_all(&mut self) -> Result<()> {
        engine::recompute_all(self)
    }

    /// Drop filler records and append new ones until the record count is a
    /// multiple of the layout's block size.
    pub(crate) fn reblock(&mut self) {
        self.records.retain(|record| !record.is_padding);
        let Some(padding) = self.layout.padding_record() else {
            return;
        };
        let block = self.layout.block_size();
        while self.records.len() % block != 0 {
            self.records.push(Record::filler(padding.code));
        }
    }
}

/// A record of `spec` filled with placeholder values.
fn blank_record(spec: &RecordSpec, now: NaiveDateTime) -> Record {
    let mut record = Record::new(spec.code);
    for item in spec.items {
        if let SpecItem::Field(field) = item {
            let value = field.placeholder(now);
            record.set(field.key, field.canonicalize(&value, true));
        }
    }
    record
}
