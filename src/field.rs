//! Field layout model.
//!
//! A [`FieldSpec`] describes one fixed-width field: its width, the pattern
//! its raw text must match, whether it is required or computed, and how it
//! is padded back out to its width. Layout tables are built from `const`
//! constructors so the whole schema lives in static data.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;

static ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\x20-\x7E]*$").expect("alphanumeric pattern"));
static UPPER_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]*$").expect("upper alphanumeric pattern"));
static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern"));
static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("date pattern"));
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}$").expect("time pattern"));
static JULIAN_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[0-9]{5}$").expect("julian date pattern"));
static ROUTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^( [0-9]{9}|[0-9]{10})$").expect("routing pattern"));

/// The pattern a field's raw text must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Printable ASCII, right-padded with spaces.
    Alphanumeric,
    /// Upper-case letters and digits only.
    UpperAlphanumeric,
    /// Digits only, left-padded with zeros.
    Numeric,
    /// `YYMMDD`
    Date,
    /// `HHMM`
    Time,
    /// `0YYDDD`, day of year.
    JulianDate,
    /// Routing number with a leading blank, or a 10-digit identifier.
    Routing,
    /// Spaces only.
    Blank,
    /// Exactly this text.
    Literal(&'static str),
    /// One of these texts.
    OneOf(&'static [&'static str]),
}

impl Pattern {
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Alphanumeric => ALPHANUMERIC.is_match(value),
            Pattern::UpperAlphanumeric => UPPER_ALPHANUMERIC.is_match(value),
            Pattern::Numeric => NUMERIC.is_match(value),
            Pattern::Date => DATE.is_match(value),
            Pattern::Time => TIME.is_match(value),
            Pattern::JulianDate => JULIAN_DATE.is_match(value),
            Pattern::Routing => ROUTING.is_match(value),
            Pattern::Blank => is_blank(value),
            Pattern::Literal(text) => value == *text,
            Pattern::OneOf(options) => options.contains(&value),
        }
    }

    /// Human readable form used in validation messages.
    pub fn describe(&self) -> String {
        match self {
            Pattern::Alphanumeric => ALPHANUMERIC.as_str().to_string(),
            Pattern::UpperAlphanumeric => UPPER_ALPHANUMERIC.as_str().to_string(),
            Pattern::Numeric => NUMERIC.as_str().to_string(),
            Pattern::Date => DATE.as_str().to_string(),
            Pattern::Time => TIME.as_str().to_string(),
            Pattern::JulianDate => JULIAN_DATE.as_str().to_string(),
            Pattern::Routing => ROUTING.as_str().to_string(),
            Pattern::Blank => "<blank>".to_string(),
            Pattern::Literal(text) => format!("\"{text}\""),
            Pattern::OneOf(options) => format!("one of {}", options.join("|")),
        }
    }
}

/// Display formatter for a field's raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Integer cents shown as dollars.
    Money,
    /// `YYMMDD` shown as `MM/DD/20YY`.
    Date,
    /// `0YYDDD` shown as `M/D/YYYY`.
    JulianDate,
    /// `HHMM` shown as `h:MM am`.
    Time,
}

impl Format {
    /// Render a raw value, or `None` when it cannot be read in this format.
    pub fn render(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        match self {
            Format::Money => {
                let cents: i64 = raw.parse().ok()?;
                Some(format!("${}", Decimal::new(cents, 2)))
            }
            Format::Date => {
                if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let year: i32 = raw[..2].parse().ok()?;
                let month: u32 = raw[2..4].parse().ok()?;
                let day: u32 = raw[4..].parse().ok()?;
                let date = NaiveDate::from_ymd_opt(2000 + year, month, day)?;
                Some(date.format("%m/%d/%Y").to_string())
            }
            Format::JulianDate => {
                let digits = raw.strip_prefix('0')?;
                if digits.len() != 5 {
                    return None;
                }
                let year: i32 = digits[..2].parse().ok()?;
                let ordinal: u32 = digits[2..].parse().ok()?;
                let date = NaiveDate::from_yo_opt(2000 + year, ordinal)?;
                Some(date.format("%-m/%-d/%Y").to_string())
            }
            Format::Time => {
                let time = NaiveTime::parse_from_str(raw, "%H%M").ok()?;
                Some(time.format("%-I:%M %P").to_string())
            }
        }
    }
}

/// A code → label table attached to a field.
pub type CodeTable = &'static [(&'static str, &'static str)];

/// Recompute rule triggered when a field is committed.
///
/// The schema only names the rule; `engine::recompute` dispatches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute {
    /// Batch and file entry hash from receiving DFI ids.
    EntryHash,
    /// Batch and file credit/debit totals from entry amounts.
    Totals,
    /// Batch service class code from entry transaction codes.
    ServiceClass,
    /// Trace numbers and trailer copy of the originating DFI id.
    OriginatingDfi,
    /// Trailer copy of the batch company id.
    CompanyId,
    /// AFT trailer amounts and counts from segment amounts.
    SegmentTotals,
    /// AFT origination control data from the file header.
    OriginationControl,
}

/// One fixed-width field.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub length: usize,
    pub pattern: Pattern,
    pub required: bool,
    /// System-computed, read-only to the user.
    pub computed: bool,
    pub default: Option<&'static str>,
    pub on_mutate: &'static [Recompute],
    pub format: Option<Format>,
    pub context: Option<CodeTable>,
}

impl FieldSpec {
    pub const fn new(key: &'static str, name: &'static str, length: usize, pattern: Pattern) -> Self {
        Self {
            key,
            name,
            length,
            pattern,
            required: false,
            computed: false,
            default: None,
            on_mutate: &[],
            format: None,
            context: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn on_mutate(mut self, rules: &'static [Recompute]) -> Self {
        self.on_mutate = rules;
        self
    }

    pub const fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub const fn context(mut self, table: CodeTable) -> Self {
        self.context = Some(table);
        self
    }

    /// Pad a value out to this field's canonical form.
    ///
    /// Alphanumeric fields are right-padded with spaces. Numeric fields are
    /// left-padded with zeros when required, computed or `force_pad`. Anything
    /// else passes through, or is right-padded with spaces under `force_pad`.
    pub fn canonicalize(&self, value: &str, force_pad: bool) -> String {
        if self.pattern == Pattern::Alphanumeric {
            pad_end(value, self.length, ' ')
        } else if self.pattern == Pattern::Numeric && (self.required || self.computed || force_pad) {
            pad_start(value, self.length, '0')
        } else if force_pad {
            pad_end(value, self.length, ' ')
        } else {
            value.to_string()
        }
    }

    /// Check a proposed value and return its canonical form.
    pub fn validate(&self, value: &str, force_pad: bool) -> Result<String, ValidationError> {
        let blank = is_blank(value);
        if self.required && blank {
            return Err(ValidationError::Required { name: self.name });
        }
        if value.chars().count() > self.length {
            return Err(ValidationError::TooLong {
                name: self.name,
                length: self.length,
            });
        }
        if !blank && !self.pattern.is_match(value) {
            return Err(ValidationError::PatternMismatch {
                name: self.name,
                pattern: self.pattern.describe(),
            });
        }
        Ok(self.canonicalize(value, force_pad))
    }

    /// The text shown while a field is being edited.
    pub fn edit_text(&self, raw: &str) -> String {
        match self.pattern {
            Pattern::Alphanumeric => raw.trim().to_string(),
            Pattern::Numeric if !is_blank(raw) => {
                let stripped = raw.trim().trim_start_matches('0');
                if stripped.is_empty() {
                    "0".to_string()
                } else {
                    stripped.to_string()
                }
            }
            _ => raw.to_string(),
        }
    }

    /// Formatted value, if this field has a formatter and the value is set.
    pub fn display(&self, raw: &str) -> Option<String> {
        if is_blank(raw) {
            return None;
        }
        self.format.and_then(|format| format.render(raw))
    }

    /// Label for a coded value, if this field has a code table.
    pub fn describe(&self, raw: &str) -> Option<&'static str> {
        let code = raw.trim();
        self.context?
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map(|(_, label)| *label)
    }

    /// Starting value for a field of a freshly created record.
    pub fn placeholder(&self, now: NaiveDateTime) -> String {
        if let Some(default) = self.default {
            return default.to_string();
        }
        if !self.required {
            return String::new();
        }
        match self.pattern {
            Pattern::Alphanumeric | Pattern::UpperAlphanumeric => self
                .key
                .replace('_', " ")
                .to_uppercase()
                .chars()
                .filter(|c| self.pattern != Pattern::UpperAlphanumeric || c.is_ascii_alphanumeric())
                .take(self.length)
                .collect(),
            Pattern::Numeric => "0".to_string(),
            Pattern::Date => now.format("%y%m%d").to_string(),
            Pattern::Time => now.format("%H%M").to_string(),
            Pattern::JulianDate => format!("0{}", now.format("%y%j")),
            Pattern::Literal(text) => text.to_string(),
            Pattern::OneOf(options) => options.first().map(|o| o.to_string()).unwrap_or_default(),
            Pattern::Routing => format!(" {}", "0".repeat(9)),
            Pattern::Blank => String::new(),
        }
    }
}

/// True for empty text or text made only of spaces.
pub fn is_blank(value: &str) -> bool {
    value.chars().all(|c| c == ' ')
}

fn pad_end(value: &str, width: usize, fill: char) -> String {
    let mut out = value.to_string();
    out.extend(std::iter::repeat_n(fill, width.saturating_sub(value.chars().count())));
    out
}

fn pad_start(value: &str, width: usize, fill: char) -> String {
    let mut out: String = std::iter::repeat_n(fill, width.saturating_sub(value.chars().count())).collect();
    out.push_str(value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldSpec = FieldSpec::new("receiving_name", "Receiving Name", 22, Pattern::Alphanumeric);
    const AMOUNT: FieldSpec = FieldSpec::new("amount", "Amount", 10, Pattern::Numeric).required();
    const DATE_FIELD: FieldSpec = FieldSpec::new("creation_date", "Creation Date", 6, Pattern::Date);

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_alphanumeric_right_pads() {
        assert_eq!(NAME.validate("ALICE", false).unwrap(), format!("ALICE{}", " ".repeat(17)));
    }

    #[test]
    fn test_required_numeric_left_pads() {
        assert_eq!(AMOUNT.validate("10000", false).unwrap(), "0000010000");
    }

    #[test]
    fn test_optional_numeric_pads_only_when_forced() {
        let field = FieldSpec::new("count", "Count", 4, Pattern::Numeric);
        assert_eq!(field.validate("12", false).unwrap(), "12");
        assert_eq!(field.validate("12", true).unwrap(), "0012");
    }

    #[test]
    fn test_unclassified_pattern_pads_with_spaces_when_forced() {
        assert_eq!(DATE_FIELD.validate("", false).unwrap(), "");
        assert_eq!(DATE_FIELD.validate("", true).unwrap(), "      ");
    }

    #[test]
    fn test_required_blank_rejected_first() {
        let err = AMOUNT.validate("   ", false).unwrap_err();
        assert_eq!(err, ValidationError::Required { name: "Amount" });
    }

    #[test]
    fn test_too_long_rejected_before_pattern() {
        let err = AMOUNT.validate("12345678901x", false).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { length: 10, .. }));
    }

    #[test]
    fn test_pattern_mismatch() {
        let err = AMOUNT.validate("12a", false).unwrap_err();
        assert!(matches!(err, ValidationError::PatternMismatch { .. }));
    }

    #[test]
    fn test_blank_optional_skips_pattern() {
        assert!(DATE_FIELD.validate("      ", false).is_ok());
    }

    #[test]
    fn test_padded_length_matches_field() {
        for value in ["", "1", "123", "1234567890"] {
            assert_eq!(AMOUNT.canonicalize(value, true).len(), 10);
        }
        for value in ["", "A", "ALICE SMITH"] {
            assert_eq!(NAME.canonicalize(value, true).len(), 22);
        }
    }

    #[test]
    fn test_edit_text() {
        assert_eq!(AMOUNT.edit_text("0000010000"), "10000");
        assert_eq!(AMOUNT.edit_text("0000000000"), "0");
        assert_eq!(NAME.edit_text("ALICE     "), "ALICE");
    }

    #[test]
    fn test_formats() {
        assert_eq!(Format::Money.render("0000012345").as_deref(), Some("$123.45"));
        assert_eq!(Format::Date.render("250203").as_deref(), Some("02/03/2025"));
        assert_eq!(Format::JulianDate.render("025034").as_deref(), Some("2/3/2025"));
        assert_eq!(Format::Time.render("1405").as_deref(), Some("2:05 pm"));
        assert_eq!(Format::Time.render("0005").as_deref(), Some("12:05 am"));
        assert_eq!(Format::Date.render("999999"), None);
        assert_eq!(Format::Date.render("990101").as_deref(), Some("01/01/2099"));
        assert_eq!(Format::Date.render("25020"), None);
    }

    #[test]
    fn test_context_lookup() {
        const TABLE: CodeTable = &[("220", "Credits Only")];
        let field = FieldSpec::new("service_class", "Service Class", 3, Pattern::Numeric).context(TABLE);
        assert_eq!(field.describe("220"), Some("Credits Only"));
        assert_eq!(field.describe("200"), None);
    }

    #[test]
    fn test_placeholders() {
        let company = FieldSpec::new("company_name", "Company Name", 16, Pattern::Alphanumeric).required();
        assert_eq!(company.placeholder(noon()), "COMPANY NAME");
        assert_eq!(AMOUNT.placeholder(noon()), "0");
        let date = FieldSpec::new("d", "D", 6, Pattern::Date).required();
        assert_eq!(date.placeholder(noon()), "250203");
        let julian = FieldSpec::new("d", "D", 6, Pattern::JulianDate).required();
        assert_eq!(julian.placeholder(noon()), "025034");
        let time = FieldSpec::new("t", "T", 4, Pattern::Time).required();
        assert_eq!(time.placeholder(noon()), "1405");
        assert_eq!(NAME.placeholder(noon()), "");
    }

    #[test]
    fn test_routing_pattern() {
        assert!(Pattern::Routing.is_match(" 091000019"));
        assert!(Pattern::Routing.is_match("1234567890"));
        assert!(!Pattern::Routing.is_match("12345"));
    }
}
