//! # achfile-rs
//!
//! Reading, editing and validating fixed-width payment batch files: NACHA
//! ACH files (94-character records blocked in tens) and the Canadian AFT
//! (CPA-005) variant (1464-character records).
//!
//! ## Overview
//!
//! - **Layouts** describe every record type as an ordered list of
//!   fixed-width fields, repeating segments and trailing padding.
//! - **The codec** turns text into a [`Document`] and back, driven only by
//!   the layout.
//! - **Edits** go through one validated commit path. Committing a leaf
//!   field (an amount, a routing number) recomputes the aggregates that
//!   depend on it: entry hashes, totals, service class codes, trace
//!   numbers and record counts.
//!
//! ## Example
//!
//! ```
//! use achfile_rs::{Document, FieldRef, Layout};
//!
//! let mut doc = Document::empty(Layout::Nacha).unwrap();
//! doc.import_transactions(1, "credit,ID1,100.00,123456789,ACCT1,checking,Bank A")
//!     .unwrap();
//!
//! // Line 3 is the new entry, line 4 its batch trailer.
//! doc.edit_field(&FieldRef::new(2, "amount"), "2500").unwrap();
//! assert_eq!(doc.records()[3].get("total_credits"), "000000002500");
//! assert!(doc.validate().is_valid());
//!
//! let text = doc.to_text();
//! assert_eq!(Document::parse(&text, Layout::Nacha).to_text(), text);
//! ```

pub mod codec;
pub mod document;
pub mod engine;
pub mod error;
pub mod field;
pub mod import;
pub mod layout;
pub mod record;
pub mod script;
pub mod validate;

pub use codec::{parse, serialize};
pub use document::{Document, FieldRef};
pub use engine::{Side, ServiceClass, is_credit};
pub use error::{AchError, Result, ValidationError};
pub use field::{FieldSpec, Format, Pattern, Recompute};
pub use import::{Transaction, parse_transactions};
pub use layout::{Layout, RecordKind, RecordSpec};
pub use record::Record;
pub use script::{Command, ScriptOutcome, apply_commands, parse_commands};
pub use validate::{FieldIssue, StructureIssue, ValidationReport};
