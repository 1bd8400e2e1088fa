//! Record layouts for the two supported file dialects.
//!
//! Each [`Layout`] owns a registry mapping a one-character record type code
//! to a [`RecordSpec`]: the ordered list of fields, repeating segments and
//! trailing padding that make up one line.
//!
//! NACHA lines are 94 characters and files are blocked in tens with lines
//! of `9`. AFT (CPA-005) lines are 1464 characters; `C` and `D` records
//! carry up to six 240-character transaction segments.

use std::fmt;

use serde::Serialize;

use crate::error::{AchError, Result};
use crate::field::{CodeTable, FieldSpec, Format, Pattern, Recompute};

/// Structural role of a record within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    FileHeader,
    BatchHeader,
    Entry,
    Addendum,
    BatchTrailer,
    FileTrailer,
    Padding,
}

/// A repeatable group of fields.
#[derive(Debug, Clone, Copy)]
pub struct SegmentSpec {
    pub limit: usize,
    pub fields: &'static [FieldSpec],
}

impl SegmentSpec {
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.length).sum()
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Filler running up to byte `limit` of the line.
#[derive(Debug, Clone, Copy)]
pub struct PaddingSpec {
    pub limit: usize,
    pub fill: char,
}

#[derive(Debug, Clone, Copy)]
pub enum SpecItem {
    Field(FieldSpec),
    Segment(SegmentSpec),
    Padding(PaddingSpec),
}

/// Layout of one record type.
#[derive(Debug)]
pub struct RecordSpec {
    pub code: char,
    pub kind: RecordKind,
    pub name: &'static str,
    pub items: &'static [SpecItem],
}

impl RecordSpec {
    /// Top-level fields in line order.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> + use<> {
        self.items.iter().filter_map(|item| match item {
            SpecItem::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|f| f.key == key)
    }

    pub fn segment(&self) -> Option<&'static SegmentSpec> {
        self.items.iter().find_map(|item| match item {
            SpecItem::Segment(segment) => Some(segment),
            _ => None,
        })
    }
}

/// File dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    Nacha,
    Aft,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Nacha => write!(f, "NACHA"),
            Layout::Aft => write!(f, "AFT"),
        }
    }
}

impl Layout {
    /// Guess the layout from the first record type code in `text`.
    pub fn detect(text: &str) -> Option<Layout> {
        let first = text.trim_start_matches(['\r', '\n']).chars().next()?;
        match first {
            '1' => Some(Layout::Nacha),
            'A' => Some(Layout::Aft),
            _ => None,
        }
    }

    /// All registered record specs, padding excluded.
    pub fn specs(&self) -> &'static [RecordSpec] {
        match self {
            Layout::Nacha => NACHA_SPECS,
            Layout::Aft => AFT_SPECS,
        }
    }

    pub fn lookup(&self, code: char) -> Result<&'static RecordSpec> {
        self.specs()
            .iter()
            .find(|spec| spec.code == code)
            .ok_or(AchError::UnknownRecordType { code })
    }

    /// Record type code used for a structural role.
    pub fn code_for(&self, kind: RecordKind) -> Option<char> {
        if kind == RecordKind::Padding {
            return self.padding_record().map(|spec| spec.code);
        }
        self.specs().iter().find(|spec| spec.kind == kind).map(|spec| spec.code)
    }

    pub fn padding_record(&self) -> Option<&'static RecordSpec> {
        match self {
            Layout::Nacha => Some(&NACHA_PADDING),
            Layout::Aft => None,
        }
    }

    /// True when `line` is a block-filler line rather than a record.
    pub fn is_padding_line(&self, line: &str) -> bool {
        match self {
            Layout::Nacha => !line.is_empty() && line.chars().all(|c| c == '9'),
            Layout::Aft => false,
        }
    }

    pub fn line_width(&self) -> usize {
        match self {
            Layout::Nacha => 94,
            Layout::Aft => 1464,
        }
    }

    /// Record count of the file must be a multiple of this.
    pub fn block_size(&self) -> usize {
        match self {
            Layout::Nacha => 10,
            Layout::Aft => 1,
        }
    }

    /// Whether the dialect has batch header/trailer records.
    pub fn has_batches(&self) -> bool {
        matches!(self, Layout::Nacha)
    }
}

// ---------------------------------------------------------------------------
// Code tables
// ---------------------------------------------------------------------------

pub const SERVICE_CLASS_CODES: CodeTable = &[
    ("200", "Mixed Credits and Debits"),
    ("220", "Credits Only"),
    ("225", "Debits Only"),
];

pub const TRANSACTION_CODES: CodeTable = &[
    ("22", "Checking Credit"),
    ("23", "Checking Credit Prenote"),
    ("27", "Checking Debit"),
    ("28", "Checking Debit Prenote"),
    ("32", "Savings Credit"),
    ("33", "Savings Credit Prenote"),
    ("37", "Savings Debit"),
    ("38", "Savings Debit Prenote"),
    ("42", "General Ledger Credit"),
    ("47", "General Ledger Debit"),
    ("52", "Loan Account Credit"),
    ("55", "Loan Account Debit Reversal"),
];

pub const STANDARD_ENTRY_CLASSES: CodeTable = &[
    ("PPD", "Prearranged Payment and Deposit"),
    ("CCD", "Corporate Credit or Debit"),
    ("WEB", "Internet-Initiated Entry"),
    ("TEL", "Telephone-Initiated Entry"),
];

pub const AFT_TRANSACTION_TYPES: CodeTable = &[("450", "Miscellaneous Payments")];

// ---------------------------------------------------------------------------
// NACHA
// ---------------------------------------------------------------------------

const NACHA_FILE_HEADER: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("priority_code", "Priority Code", 2, Pattern::Literal("01")).computed().default_value("01")),
    SpecItem::Field(FieldSpec::new("immediate_destination", "Immediate Destination", 10, Pattern::Routing).required()),
    SpecItem::Field(FieldSpec::new("immediate_origin", "Immediate Origin", 10, Pattern::Routing).required()),
    SpecItem::Field(FieldSpec::new("creation_date", "File Creation Date", 6, Pattern::Date).required().format(Format::Date)),
    SpecItem::Field(FieldSpec::new("creation_time", "File Creation Time", 4, Pattern::Time).format(Format::Time)),
    SpecItem::Field(FieldSpec::new("id_modifier", "File ID Modifier", 1, Pattern::UpperAlphanumeric).required().default_value("A")),
    SpecItem::Field(FieldSpec::new("record_size", "Record Size", 3, Pattern::Literal("094")).computed().default_value("094")),
    SpecItem::Field(FieldSpec::new("blocking_factor", "Blocking Factor", 2, Pattern::Literal("10")).computed().default_value("10")),
    SpecItem::Field(FieldSpec::new("format_code", "Format Code", 1, Pattern::Literal("1")).computed().default_value("1")),
    SpecItem::Field(FieldSpec::new("destination_name", "Immediate Destination Name", 23, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("origin_name", "Immediate Origin Name", 23, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("reference_code", "Reference Code", 8, Pattern::Alphanumeric)),
];

const NACHA_BATCH_HEADER: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("service_class", "Service Class Code", 3, Pattern::Numeric).computed().context(SERVICE_CLASS_CODES)),
    SpecItem::Field(FieldSpec::new("company_name", "Company Name", 16, Pattern::Alphanumeric).required()),
    SpecItem::Field(FieldSpec::new("company_discretionary_data", "Company Discretionary Data", 20, Pattern::Alphanumeric)),
    SpecItem::Field(
        FieldSpec::new("company_id", "Company Identification", 10, Pattern::Alphanumeric)
            .required()
            .on_mutate(&[Recompute::CompanyId]),
    ),
    SpecItem::Field(
        FieldSpec::new("standard_entry_class", "Standard Entry Class Code", 3, Pattern::Alphanumeric)
            .required()
            .default_value("PPD")
            .context(STANDARD_ENTRY_CLASSES),
    ),
    SpecItem::Field(FieldSpec::new("company_entry_description", "Company Entry Description", 10, Pattern::Alphanumeric).required()),
    SpecItem::Field(FieldSpec::new("company_descriptive_date", "Company Descriptive Date", 6, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("effective_entry_date", "Effective Entry Date", 6, Pattern::Date).required().format(Format::Date)),
    SpecItem::Field(FieldSpec::new("settlement_date", "Settlement Date", 3, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("originator_status", "Originator Status Code", 1, Pattern::OneOf(&["0", "1", "2"])).required().default_value("1")),
    SpecItem::Field(
        FieldSpec::new("originating_dfi_id", "Originating DFI Identification", 8, Pattern::Numeric)
            .required()
            .on_mutate(&[Recompute::OriginatingDfi]),
    ),
    SpecItem::Field(FieldSpec::new("batch_number", "Batch Number", 7, Pattern::Numeric).required().default_value("1")),
];

const NACHA_ENTRY: &[SpecItem] = &[
    SpecItem::Field(
        FieldSpec::new("transaction_code", "Transaction Code", 2, Pattern::Numeric)
            .required()
            .on_mutate(&[Recompute::ServiceClass, Recompute::Totals])
            .context(TRANSACTION_CODES),
    ),
    SpecItem::Field(
        FieldSpec::new("receiving_dfi_id", "Receiving DFI Identification", 8, Pattern::Numeric)
            .required()
            .on_mutate(&[Recompute::EntryHash]),
    ),
    SpecItem::Field(FieldSpec::new("check_digit", "Check Digit", 1, Pattern::Numeric).required()),
    SpecItem::Field(FieldSpec::new("dfi_account_number", "DFI Account Number", 17, Pattern::Alphanumeric).required()),
    SpecItem::Field(
        FieldSpec::new("amount", "Amount", 10, Pattern::Numeric)
            .required()
            .on_mutate(&[Recompute::Totals])
            .format(Format::Money),
    ),
    SpecItem::Field(FieldSpec::new("id_number", "Identification Number", 15, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("receiving_name", "Receiving Individual/Company Name", 22, Pattern::Alphanumeric).required()),
    SpecItem::Field(FieldSpec::new("discretionary_data", "Discretionary Data", 2, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("addenda_record_indicator", "Addenda Record Indicator", 1, Pattern::OneOf(&["0", "1"])).required().default_value("0")),
    SpecItem::Field(FieldSpec::new("trace_number", "Trace Number", 15, Pattern::Numeric).computed()),
];

const NACHA_ADDENDUM: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("addenda_type", "Addenda Type Code", 2, Pattern::Literal("05")).required().default_value("05")),
    SpecItem::Field(FieldSpec::new("payment_related_information", "Payment Related Information", 80, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("addenda_sequence_number", "Addenda Sequence Number", 4, Pattern::Numeric).required().default_value("1")),
    SpecItem::Field(FieldSpec::new("entry_sequence_number", "Entry Detail Sequence Number", 7, Pattern::Numeric).required()),
];

const NACHA_BATCH_TRAILER: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("service_class", "Service Class Code", 3, Pattern::Numeric).computed().context(SERVICE_CLASS_CODES)),
    SpecItem::Field(FieldSpec::new("entry_count", "Entry/Addenda Count", 6, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("entry_hash", "Entry Hash", 10, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("total_debits", "Total Debit Entry Dollar Amount", 12, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_credits", "Total Credit Entry Dollar Amount", 12, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("company_id", "Company Identification", 10, Pattern::Alphanumeric).computed()),
    SpecItem::Field(FieldSpec::new("message_auth_code", "Message Authentication Code", 19, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("reserved", "Reserved", 6, Pattern::Blank).computed()),
    SpecItem::Field(FieldSpec::new("originating_dfi_id", "Originating DFI Identification", 8, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("batch_number", "Batch Number", 7, Pattern::Numeric).required().default_value("1")),
];

const NACHA_FILE_TRAILER: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("batch_count", "Batch Count", 6, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("block_count", "Block Count", 6, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("entry_count", "Entry/Addenda Count", 8, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("entry_hash", "Entry Hash", 10, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("total_debits", "Total Debit Entry Dollar Amount in File", 12, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_credits", "Total Credit Entry Dollar Amount in File", 12, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("reserved", "Reserved", 39, Pattern::Blank).computed()),
];

static NACHA_SPECS: &[RecordSpec] = &[
    RecordSpec { code: '1', kind: RecordKind::FileHeader, name: "File Header", items: NACHA_FILE_HEADER },
    RecordSpec { code: '5', kind: RecordKind::BatchHeader, name: "Batch Header", items: NACHA_BATCH_HEADER },
    RecordSpec { code: '6', kind: RecordKind::Entry, name: "Entry Detail", items: NACHA_ENTRY },
    RecordSpec { code: '7', kind: RecordKind::Addendum, name: "Addenda", items: NACHA_ADDENDUM },
    RecordSpec { code: '8', kind: RecordKind::BatchTrailer, name: "Batch Control", items: NACHA_BATCH_TRAILER },
    RecordSpec { code: '9', kind: RecordKind::FileTrailer, name: "File Control", items: NACHA_FILE_TRAILER },
];

static NACHA_PADDING: RecordSpec = RecordSpec {
    code: '9',
    kind: RecordKind::Padding,
    name: "Block Padding",
    items: &[SpecItem::Padding(PaddingSpec { limit: 94, fill: '9' })],
};

// ---------------------------------------------------------------------------
// AFT (CPA-005)
// ---------------------------------------------------------------------------

const AFT_LINE: PaddingSpec = PaddingSpec { limit: 1464, fill: ' ' };

const AFT_FILE_HEADER: &[SpecItem] = &[
    SpecItem::Field(
        FieldSpec::new("logical_record_count", "Logical Record Count", 9, Pattern::Literal("000000001"))
            .computed()
            .default_value("000000001"),
    ),
    SpecItem::Field(
        FieldSpec::new("originator_id", "Originator's ID", 10, Pattern::Alphanumeric)
            .required()
            .on_mutate(&[Recompute::OriginationControl]),
    ),
    SpecItem::Field(
        FieldSpec::new("file_creation_number", "File Creation No.", 4, Pattern::Numeric)
            .required()
            .on_mutate(&[Recompute::OriginationControl]),
    ),
    SpecItem::Field(FieldSpec::new("creation_date", "Creation Date", 6, Pattern::JulianDate).required().format(Format::JulianDate)),
    SpecItem::Field(FieldSpec::new("destination_data_centre", "Destination Data Centre", 5, Pattern::Numeric).required()),
    SpecItem::Field(FieldSpec::new("dc_communication_area", "Direct Clearer Communication Area", 20, Pattern::Alphanumeric)),
    SpecItem::Field(FieldSpec::new("currency_code", "Currency Code Identifier", 3, Pattern::Alphanumeric).required().default_value("CAD")),
    SpecItem::Padding(AFT_LINE),
];

const AFT_FILE_TRAILER: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("logical_record_count", "Logical Record Count", 9, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("origination_control_data", "Origination Control Data", 14, Pattern::Alphanumeric).computed()),
    SpecItem::Field(FieldSpec::new("total_debit_amount", "Total Value of Debit Transactions", 14, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_debit_count", "Total Number of Debit Transactions", 8, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("total_credit_amount", "Total Value of Credit Transactions", 14, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_credit_count", "Total Number of Credit Transactions", 8, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("total_debit_error_amount", "Total Value of Error Corrections (debits)", 14, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_debit_error_count", "Total Number of Error Corrections (debits)", 8, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("total_credit_error_amount", "Total Value of Error Corrections (credits)", 14, Pattern::Numeric).computed().format(Format::Money)),
    SpecItem::Field(FieldSpec::new("total_credit_error_count", "Total Number of Error Corrections (credits)", 8, Pattern::Numeric).computed()),
    SpecItem::Padding(AFT_LINE),
];

const fn aft_transaction(date_key: &'static str, date_name: &'static str, account_key: &'static str, account_name: &'static str, party_key: &'static str, party_name: &'static str) -> [FieldSpec; 18] {
    [
        FieldSpec::new("transaction_type", "Transaction Type", 3, Pattern::Numeric).required().default_value("450").context(AFT_TRANSACTION_TYPES),
        FieldSpec::new("amount", "Amount", 10, Pattern::Numeric).required().on_mutate(&[Recompute::SegmentTotals]).format(Format::Money),
        FieldSpec::new(date_key, date_name, 6, Pattern::JulianDate).required().format(Format::JulianDate),
        FieldSpec::new("institution_id", "Institutional Identification No.", 9, Pattern::Numeric).required(),
        FieldSpec::new(account_key, account_name, 12, Pattern::Alphanumeric).required(),
        FieldSpec::new("item_trace_number", "Item Trace No.", 22, Pattern::Numeric).required(),
        FieldSpec::new("stored_transaction_type", "Stored Transaction Type", 3, Pattern::Numeric).required().default_value("000"),
        FieldSpec::new("originator_short_name", "Originator's Short Name", 15, Pattern::Alphanumeric).required(),
        FieldSpec::new(party_key, party_name, 30, Pattern::Alphanumeric).required(),
        FieldSpec::new("originator_long_name", "Originator's Long Name", 30, Pattern::Alphanumeric).required(),
        FieldSpec::new("originating_dc_user_id", "Originating Direct Clearer's User ID", 10, Pattern::Alphanumeric).required(),
        FieldSpec::new("originator_cross_reference", "Originator's Cross Reference No.", 19, Pattern::Alphanumeric).required(),
        FieldSpec::new("institution_id_for_returns", "Institutional ID Number for Returns", 9, Pattern::Numeric).required(),
        FieldSpec::new("account_number_for_returns", "Account Number for Returns", 12, Pattern::Alphanumeric).required(),
        FieldSpec::new("originator_sundry_info", "Originator's Sundry Information", 15, Pattern::Alphanumeric),
        FieldSpec::new("filler", "Filler", 22, Pattern::Blank).computed(),
        FieldSpec::new("settlement_code", "Originator-Direct Clearer Settlement Code", 2, Pattern::Alphanumeric),
        FieldSpec::new("invalid_data_element_id", "Invalid Data Element I.D.", 11, Pattern::Numeric).required().default_value("0"),
    ]
}

const AFT_CREDIT_FIELDS: [FieldSpec; 18] = aft_transaction(
    "funds_available_date",
    "Date Funds to be Available",
    "payee_account_number",
    "Payee Account No.",
    "payee_name",
    "Payee Name",
);

const AFT_DEBIT_FIELDS: [FieldSpec; 18] = aft_transaction(
    "due_date",
    "Due Date",
    "payor_account_number",
    "Payor Account No.",
    "payor_name",
    "Payor Name",
);

const AFT_CREDIT: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("logical_record_count", "Logical Record Count", 9, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("origination_control_data", "Origination Control Data", 14, Pattern::Alphanumeric).computed()),
    SpecItem::Segment(SegmentSpec { limit: 6, fields: &AFT_CREDIT_FIELDS }),
    SpecItem::Padding(AFT_LINE),
];

const AFT_DEBIT: &[SpecItem] = &[
    SpecItem::Field(FieldSpec::new("logical_record_count", "Logical Record Count", 9, Pattern::Numeric).computed()),
    SpecItem::Field(FieldSpec::new("origination_control_data", "Origination Control Data", 14, Pattern::Alphanumeric).computed()),
    SpecItem::Segment(SegmentSpec { limit: 6, fields: &AFT_DEBIT_FIELDS }),
    SpecItem::Padding(AFT_LINE),
];

static AFT_SPECS: &[RecordSpec] = &[
    RecordSpec { code: 'A', kind: RecordKind::FileHeader, name: "File Header", items: AFT_FILE_HEADER },
    RecordSpec { code: 'C', kind: RecordKind::Entry, name: "Credit Transactions", items: AFT_CREDIT },
    RecordSpec { code: 'D', kind: RecordKind::Entry, name: "Debit Transactions", items: AFT_DEBIT },
    RecordSpec { code: 'Z', kind: RecordKind::FileTrailer, name: "File Trailer", items: AFT_FILE_TRAILER },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_width(spec: &RecordSpec) -> usize {
        1 + spec
            .items
            .iter()
            .map(|item| match item {
                SpecItem::Field(f) => f.length,
                SpecItem::Segment(s) => s.width() * s.limit,
                SpecItem::Padding(_) => 0,
            })
            .sum::<usize>()
    }

    #[test]
    fn test_nacha_records_are_94_wide() {
        for spec in Layout::Nacha.specs() {
            assert_eq!(spec_width(spec), 94, "record '{}'", spec.code);
        }
    }

    #[test]
    fn test_aft_segment_width() {
        let spec = Layout::Aft.lookup('C').unwrap();
        let segment = spec.segment().unwrap();
        assert_eq!(segment.width(), 240);
        assert_eq!(spec_width(spec), 1464);
    }

    #[test]
    fn test_lookup_unknown_code() {
        let err = Layout::Nacha.lookup('X').unwrap_err();
        assert!(matches!(err, AchError::UnknownRecordType { code: 'X' }));
    }

    #[test]
    fn test_padding_line_detection() {
        assert!(Layout::Nacha.is_padding_line(&"9".repeat(94)));
        assert!(!Layout::Nacha.is_padding_line("9000001"));
        assert!(!Layout::Aft.is_padding_line(&"9".repeat(94)));
    }

    #[test]
    fn test_detect_layout() {
        assert_eq!(Layout::detect("101 091000019"), Some(Layout::Nacha));
        assert_eq!(Layout::detect("\r\nA000000001"), Some(Layout::Aft));
        assert_eq!(Layout::detect("X"), None);
    }

    #[test]
    fn test_code_for_kind() {
        assert_eq!(Layout::Nacha.code_for(RecordKind::BatchTrailer), Some('8'));
        assert_eq!(Layout::Nacha.code_for(RecordKind::Padding), Some('9'));
        assert_eq!(Layout::Aft.code_for(RecordKind::BatchHeader), None);
    }
}
