//! Derived-field engine.
//!
//! Aggregate fields (entry hashes, totals, service class, trace numbers,
//! record counts) are pure functions of a batch's or file's leaf entries.
//! Committing a leaf field runs the [`Recompute`] rules its layout names;
//! each rule re-derives batch boundaries from the current record order and
//! writes the results through the same validated commit path as user edits.
//!
//! Entry hashes keep only the low-order digits that fit their field. Every
//! other aggregate that outgrows its field fails with
//! [`AchError::Overflow`].

use tracing::{debug, warn};

use crate::document::{Document, FieldRef};
use crate::error::{AchError, Result};
use crate::field::Recompute;
use crate::layout::{Layout, RecordKind};
use crate::record::{parse_number, part_is_blank};
use crate::validate;

/// Which side of the ledger an entry is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Credit,
    Debit,
}

/// Classify a NACHA transaction code.
///
/// Codes below 80 are credits when the last digit is 0-4 and debits when it
/// is 5-9. From 80 up, odd codes are credits and even codes are debits.
pub fn is_credit(code: u32) -> bool {
    if code < 80 { code % 10 < 5 } else { code % 2 == 1 }
}

/// Side of a raw transaction code, `None` when it is not a number.
pub fn side_of(raw: &str) -> Option<Side> {
    let code: u32 = raw.trim().parse().ok()?;
    Some(if is_credit(code) { Side::Credit } else { Side::Debit })
}

/// Batch service class code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceClass {
    Mixed,
    CreditsOnly,
    DebitsOnly,
}

impl ServiceClass {
    /// Class for a batch with the given entry counts. A batch with no
    /// entries reports credits only.
    pub fn from_counts(credits: usize, debits: usize) -> Self {
        if debits == 0 {
            ServiceClass::CreditsOnly
        } else if credits == 0 {
            ServiceClass::DebitsOnly
        } else {
            ServiceClass::Mixed
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServiceClass::Mixed => "200",
            ServiceClass::CreditsOnly => "220",
            ServiceClass::DebitsOnly => "225",
        }
    }
}

/// Positions of a batch header and its trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchBounds {
    pub header: usize,
    pub trailer: usize,
}

impl BatchBounds {
    /// Entry records strictly between header and trailer.
    pub fn entries(&self, doc: &Document) -> Vec<usize> {
        self.members(doc, |kind| kind == RecordKind::Entry)
    }

    /// Entry and addenda records strictly between header and trailer.
    pub fn entries_and_addenda(&self, doc: &Document) -> Vec<usize> {
        self.members(doc, |kind| matches!(kind, RecordKind::Entry | RecordKind::Addendum))
    }

    fn members(&self, doc: &Document, keep: impl Fn(RecordKind) -> bool) -> Vec<usize> {
        (self.header + 1..self.trailer)
            .filter(|&line| doc.kind_at(line).is_some_and(&keep))
            .collect()
    }
}

/// Find the batch containing `line`: the nearest batch header at or before
/// it and the nearest batch trailer at or after it.
pub fn batch_bounds(doc: &Document, line: usize) -> Result<BatchBounds> {
    doc.record(line)?;
    let header = (0..=line)
        .rev()
        .find(|&i| doc.kind_at(i) == Some(RecordKind::BatchHeader));
    let trailer = (line..doc.len()).find(|&i| doc.kind_at(i) == Some(RecordKind::BatchTrailer));
    match (header, trailer) {
        (Some(header), Some(trailer)) => Ok(BatchBounds { header, trailer }),
        _ => Err(AchError::NotInBatch { line }),
    }
}

/// Run one recompute rule for a mutation at `line`.
pub fn recompute(doc: &mut Document, rule: Recompute, line: usize) -> Result<()> {
    debug!(?rule, line = line + 1, "recompute");
    match rule {
        Recompute::EntryHash => {
            let bounds = batch_bounds(doc, line)?;
            batch_entry_hash(doc, bounds)?;
            file_entry_hash(doc)
        }
        Recompute::Totals => {
            let bounds = batch_bounds(doc, line)?;
            batch_totals(doc, bounds)?;
            file_totals(doc)
        }
        Recompute::ServiceClass => {
            let bounds = batch_bounds(doc, line)?;
            service_class(doc, bounds)
        }
        Recompute::OriginatingDfi => {
            let bounds = batch_bounds(doc, line)?;
            originating_dfi(doc, bounds)
        }
        Recompute::CompanyId => {
            let bounds = batch_bounds(doc, line)?;
            company_id(doc, bounds)
        }
        Recompute::SegmentTotals => segment_totals(doc),
        Recompute::OriginationControl => origination_control(doc),
    }
}

type BatchStep = fn(&mut Document, BatchBounds) -> Result<()>;
type FileStep = fn(&mut Document) -> Result<()>;

const BATCH_STEPS: &[BatchStep] = &[
    batch_entry_hash,
    batch_totals,
    service_class,
    originating_dfi,
    company_id,
];
const NACHA_FILE_STEPS: &[FileStep] = &[file_entry_hash, file_totals, recount];
const AFT_FILE_STEPS: &[FileStep] = &[segment_totals, origination_control, recount];

/// Recompute every aggregate in the document from its leaves.
///
/// Every batch and file-level step runs even when an earlier one fails, so
/// one bad field only leaves its own aggregates stale. All failures are
/// returned together as [`AchError::Recompute`].
pub fn recompute_all(doc: &mut Document) -> Result<()> {
    let errors = recompute_each(doc);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AchError::Recompute(errors))
    }
}

/// Run every recompute step and collect the failures.
pub(crate) fn recompute_each(doc: &mut Document) -> Vec<AchError> {
    let mut errors = Vec::new();
    if doc.layout().has_batches() {
        for header in doc.lines_of(RecordKind::BatchHeader) {
            errors.extend(batch_steps(doc, header));
        }
    }
    errors.extend(file_steps(doc));
    for err in &errors {
        warn!(%err, "aggregate left stale");
    }
    errors
}

/// Recompute the batch whose header is at `header`, then the file-level
/// sums and counts. Other batches are read but never rewritten.
pub fn recompute_batch(doc: &mut Document, header: usize) -> Result<()> {
    first_error(batch_steps(doc, header))?;
    first_error(file_steps(doc))
}

fn batch_steps(doc: &mut Document, header: usize) -> Vec<AchError> {
    let bounds = match batch_bounds(doc, header) {
        Ok(bounds) => bounds,
        Err(err) => return vec![err],
    };
    BATCH_STEPS
        .iter()
        .filter_map(|step| step(doc, bounds).err())
        .collect()
}

fn file_steps(doc: &mut Document) -> Vec<AchError> {
    let steps = match doc.layout() {
        Layout::Nacha => NACHA_FILE_STEPS,
        Layout::Aft => AFT_FILE_STEPS,
    };
    steps.iter().filter_map(|step| step(doc).err()).collect()
}

fn first_error(errors: Vec<AchError>) -> Result<()> {
    match errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Recompute record counts after records were inserted or removed.
pub fn recount(doc: &mut Document) -> Result<()> {
    match doc.layout() {
        Layout::Nacha => {
            let mut entries = 0;
            let headers = doc.lines_of(RecordKind::BatchHeader);
            for &header in &headers {
                let bounds = batch_bounds(doc, header)?;
                let count = bounds.entries_and_addenda(doc).len();
                entries += count;
                write_number(doc, bounds.trailer, "entry_count", count as u64)?;
            }
            let trailer = file_trailer(doc)?;
            let blocks = doc.len().div_ceil(doc.layout().block_size());
            write_number(doc, trailer, "batch_count", headers.len() as u64)?;
            write_number(doc, trailer, "block_count", blocks as u64)?;
            write_number(doc, trailer, "entry_count", entries as u64)
        }
        Layout::Aft => {
            for line in 0..doc.len() {
                if doc.kind_at(line) == Some(RecordKind::FileHeader) {
                    continue;
                }
                write_number(doc, line, "logical_record_count", line as u64 + 1)?;
            }
            Ok(())
        }
    }
}

fn batch_entry_hash(doc: &mut Document, bounds: BatchBounds) -> Result<()> {
    let sum: u64 = bounds
        .entries(doc)
        .into_iter()
        .map(|line| doc.records[line].number("receiving_dfi_id"))
        .sum();
    write_truncated(doc, bounds.trailer, "entry_hash", sum)
}

fn file_entry_hash(doc: &mut Document) -> Result<()> {
    let sum = sum_over(doc, RecordKind::BatchTrailer, "entry_hash");
    let trailer = file_trailer(doc)?;
    write_truncated(doc, trailer, "entry_hash", sum)
}

fn batch_totals(doc: &mut Document, bounds: BatchBounds) -> Result<()> {
    let (mut credits, mut debits) = (0u64, 0u64);
    for line in bounds.entries(doc) {
        let record = &doc.records[line];
        match side_of(record.get("transaction_code")) {
            Some(Side::Credit) => credits += record.number("amount"),
            Some(Side::Debit) => debits += record.number("amount"),
            None => {}
        }
    }
    write_number(doc, bounds.trailer, "total_credits", credits)?;
    write_number(doc, bounds.trailer, "total_debits", debits)
}

fn file_totals(doc: &mut Document) -> Result<()> {
    let credits = sum_over(doc, RecordKind::BatchTrailer, "total_credits");
    let debits = sum_over(doc, RecordKind::BatchTrailer, "total_debits");
    let trailer = file_trailer(doc)?;
    write_number(doc, trailer, "total_credits", credits)?;
    write_number(doc, trailer, "total_debits", debits)
}

fn service_class(doc: &mut Document, bounds: BatchBounds) -> Result<()> {
    let (mut credits, mut debits) = (0, 0);
    for line in bounds.entries(doc) {
        match side_of(doc.records[line].get("transaction_code")) {
            Some(Side::Credit) => credits += 1,
            Some(Side::Debit) => debits += 1,
            None => {}
        }
    }
    let class = ServiceClass::from_counts(credits, debits).code();
    write(doc, bounds.header, "service_class", class)?;
    write(doc, bounds.trailer, "service_class", class)
}

fn originating_dfi(doc: &mut Document, bounds: BatchBounds) -> Result<()> {
    let odfi = doc.records[bounds.header].get("originating_dfi_id").to_string();
    for (seq, line) in bounds.entries(doc).into_iter().enumerate() {
        write(doc, line, "trace_number", &format!("{odfi}{:07}", seq + 1))?;
    }
    write(doc, bounds.trailer, "originating_dfi_id", &odfi)
}

fn company_id(doc: &mut Document, bounds: BatchBounds) -> Result<()> {
    let company = doc.records[bounds.header].get("company_id").to_string();
    write(doc, bounds.trailer, "company_id", &company)
}

/// AFT trailer totals over every used segment of `C` and `D` records.
fn segment_totals(doc: &mut Document) -> Result<()> {
    let (mut credit_amount, mut credit_count) = (0u64, 0u64);
    let (mut debit_amount, mut debit_count) = (0u64, 0u64);
    for record in &doc.records {
        let totals = match record.code {
            'C' => (&mut credit_amount, &mut credit_count),
            'D' => (&mut debit_amount, &mut debit_count),
            _ => continue,
        };
        for part in record.parts.iter().filter(|part| !part_is_blank(part)) {
            let amount = part.get("amount").map(String::as_str).unwrap_or("");
            *totals.0 += parse_number(amount, "amount");
            *totals.1 += 1;
        }
    }
    let trailer = file_trailer(doc)?;
    write_number(doc, trailer, "total_credit_amount", credit_amount)?;
    write_number(doc, trailer, "total_credit_count", credit_count)?;
    write_number(doc, trailer, "total_debit_amount", debit_amount)?;
    write_number(doc, trailer, "total_debit_count", debit_count)
}

/// AFT origination control data: originator id followed by file creation
/// number, copied onto every record after the header.
fn origination_control(doc: &mut Document) -> Result<()> {
    let header = doc
        .lines_of(RecordKind::FileHeader)
        .first()
        .copied()
        .ok_or(AchError::MissingRecord(RecordKind::FileHeader))?;
    let control = format!(
        "{}{}",
        doc.records[header].get("originator_id"),
        doc.records[header].get("file_creation_number")
    );
    for line in 0..doc.len() {
        if matches!(doc.kind_at(line), Some(RecordKind::Entry | RecordKind::FileTrailer)) {
            write(doc, line, "origination_control_data", &control)?;
        }
    }
    Ok(())
}

fn file_trailer(doc: &Document) -> Result<usize> {
    doc.lines_of(RecordKind::FileTrailer)
        .first()
        .copied()
        .ok_or(AchError::MissingRecord(RecordKind::FileTrailer))
}

fn sum_over(doc: &Document, kind: RecordKind, key: &str) -> u64 {
    doc.lines_of(kind)
        .into_iter()
        .map(|line| doc.records[line].number(key))
        .sum()
}

/// Write a hash, keeping only the low-order digits that fit the field.
fn write_truncated(doc: &mut Document, line: usize, key: &str, value: u64) -> Result<()> {
    let length = doc.field_spec(&FieldRef::new(line, key))?.length;
    let kept = match 10u64.checked_pow(length as u32) {
        Some(modulus) => value % modulus,
        None => value,
    };
    write(doc, line, key, &kept.to_string())
}

fn write_number(doc: &mut Document, line: usize, key: &str, value: u64) -> Result<()> {
    let field = doc.field_spec(&FieldRef::new(line, key))?;
    let text = value.to_string();
    if text.len() > field.length {
        return Err(AchError::Overflow {
            name: field.name,
            value,
            length: field.length,
        });
    }
    write(doc, line, key, &text)
}

fn write(doc: &mut Document, line: usize, key: &str, value: &str) -> Result<()> {
    validate::commit(doc, &FieldRef::new(line, key), value).map(|_| ())
}
