//! Transaction list import.
//!
//! Rows are `type,id,amount,routing,account,account type,institution`:
//!
//! ```text
//! credit,ID1,100.00,123456789,ACCT1,checking,Bank A
//! ```
//!
//! Each row becomes one NACHA entry record spliced in after a batch header.

use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use tracing::info;

use crate::document::Document;
use crate::engine;
use crate::error::{AchError, Result};
use crate::layout::{Layout, RecordKind};
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "credit" => Some(TransactionType::Credit),
            "debit" => Some(TransactionType::Debit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Checking,
    Savings,
    GeneralLedger,
    LoanAccount,
}

impl AccountType {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "checking" => Some(AccountType::Checking),
            "savings" => Some(AccountType::Savings),
            "general ledger" => Some(AccountType::GeneralLedger),
            "loan account" => Some(AccountType::LoanAccount),
            _ => None,
        }
    }

    fn digit(&self) -> u8 {
        match self {
            AccountType::Checking => 2,
            AccountType::Savings => 3,
            AccountType::GeneralLedger => 4,
            AccountType::LoanAccount => 5,
        }
    }
}

/// One imported transaction, already checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub kind: TransactionType,
    pub id: String,
    /// Integer cents.
    pub amount: u64,
    pub routing: String,
    pub account: String,
    pub account_type: AccountType,
    pub institution: String,
}

impl Transaction {
    /// Two-digit NACHA transaction code: account digit then type digit.
    pub fn transaction_code(&self) -> String {
        let kind = match (self.kind, self.account_type) {
            (TransactionType::Credit, _) => 2,
            (TransactionType::Debit, AccountType::LoanAccount) => 5,
            (TransactionType::Debit, _) => 7,
        };
        format!("{}{}", self.account_type.digit(), kind)
    }

    /// 8-digit receiving DFI id, `None` when the routing number is short.
    pub fn receiving_dfi_id(&self) -> Option<&str> {
        self.routing.get(..8)
    }

    pub fn check_digit(&self) -> Option<&str> {
        self.routing.get(8..).filter(|digit| !digit.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    kind: String,
    id: String,
    amount: String,
    routing: String,
    account: String,
    account_type: String,
    institution: String,
}

/// Parse transaction rows. A leading header row is skipped.
pub fn parse_transactions(text: &str) -> Result<Vec<Transaction>> {
    Ok(numbered_rows(text)?.into_iter().map(|(_, tx)| tx).collect())
}

/// Transactions paired with their 1-based CSV row.
fn numbered_rows(text: &str) -> Result<Vec<(usize, Transaction)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut transactions = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        if record.iter().all(str::is_empty) {
            continue;
        }
        if index == 0 && is_header(&record) {
            continue;
        }
        let raw: Row = record
            .deserialize(None)
            .map_err(|err| malformed(row, format!("expected 7 columns: {err}")))?;
        transactions.push((row, transaction(row, raw)?));
    }
    Ok(transactions)
}

/// A header row names its columns: neither its type nor its amount column
/// holds a value.
fn is_header(record: &StringRecord) -> bool {
    let kind = record.get(0).unwrap_or("");
    let amount = record.get(2).unwrap_or("");
    TransactionType::parse(kind).is_none() && Decimal::from_str(amount).is_err()
}

fn transaction(row: usize, raw: Row) -> Result<Transaction> {
    let kind = TransactionType::parse(&raw.kind)
        .ok_or_else(|| malformed(row, format!("unknown transaction type \"{}\"", raw.kind)))?;
    let account_type = AccountType::parse(&raw.account_type)
        .ok_or_else(|| malformed(row, format!("unknown account type \"{}\"", raw.account_type)))?;
    if raw.routing.len() != 9 || !raw.routing.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed(row, format!("routing number \"{}\" is not 9 digits", raw.routing)));
    }
    Ok(Transaction {
        kind,
        id: raw.id,
        amount: cents(row, &raw.amount)?,
        routing: raw.routing,
        account: raw.account,
        account_type,
        institution: raw.institution,
    })
}

/// Decimal dollars to integer cents, half away from zero.
fn cents(row: usize, amount: &str) -> Result<u64> {
    let dollars = Decimal::from_str(amount)
        .map_err(|err| malformed(row, format!("amount \"{amount}\": {err}")))?;
    (dollars * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| malformed(row, format!("amount \"{amount}\" is out of range")))
}

fn malformed(row: usize, reason: String) -> AchError {
    AchError::MalformedImportRow { row, reason }
}

/// Build the entry record for one transaction.
fn entry_record(row: usize, tx: &Transaction) -> Result<Record> {
    let spec = Layout::Nacha.lookup('6')?;
    let name: String = tx.institution.chars().take(22).collect();
    let mut record = Record::new(spec.code);
    for field in spec.fields() {
        let value = match field.key {
            "transaction_code" => tx.transaction_code(),
            "receiving_dfi_id" => tx.receiving_dfi_id().unwrap_or("").to_string(),
            "check_digit" => tx.check_digit().unwrap_or("").to_string(),
            "dfi_account_number" => tx.account.clone(),
            "amount" => tx.amount.to_string(),
            "id_number" => tx.id.clone(),
            "receiving_name" => name.clone(),
            _ => field.default.unwrap_or("").to_string(),
        };
        let value = field
            .validate(&value, true)
            .map_err(|err| malformed(row, err.to_string()))?;
        record.set(field.key, value);
    }
    Ok(record)
}

/// Splice transactions from `text` after the batch header at
/// `batch_header`, then recompute that batch and the file totals.
///
/// Returns the number of entries added. On any error the document is left
/// unchanged.
pub fn import_transactions(doc: &mut Document, batch_header: usize, text: &str) -> Result<usize> {
    if !doc.layout().has_batches() {
        return Err(AchError::Unsupported("transaction import", doc.layout()));
    }
    doc.record(batch_header)?;
    if doc.kind_at(batch_header) != Some(RecordKind::BatchHeader) {
        return Err(AchError::NotBatchHeader { line: batch_header });
    }

    let rows = numbered_rows(text)?;
    let mut entries = Vec::with_capacity(rows.len());
    for (row, tx) in &rows {
        entries.push(entry_record(*row, tx)?);
    }

    let count = entries.len();
    let snapshot = doc.records.clone();
    let at = batch_header + 1;
    doc.records.splice(at..at, entries);
    doc.reblock();
    if let Err(err) = engine::recompute_batch(doc, batch_header) {
        doc.records = snapshot;
        return Err(err);
    }
    info!(count, batch = batch_header + 1, "imported transactions");
    Ok(count)
}
