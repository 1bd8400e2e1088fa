//! Edit scripts.
//!
//! One command per line:
//! ```text
//! # set the second entry's amount
//! SET 4 amount = "2500"
//! SET 2:1 payee_name = "JANE DOE"
//! RECALC
//! ```
//!
//! - `SET line[:part] key = "value"` edits one field through the same path
//!   as an interactive edit. Lines and parts are 1-based. The value is a
//!   delimited string: its first non-blank character is the delimiter.
//! - `RECALC` recomputes every aggregate from the leaf entries.
//! - Lines starting with `#` are comments.

use tracing::warn;

use crate::document::{Document, FieldRef};
use crate::error::{AchError, Result};

/// Parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// SET line[:part] key = "value"
    Set { target: FieldRef, value: String },
    /// RECALC
    Recalc,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Recalc => "RECALC",
        }
    }
}

/// A command that was rejected while applying a script.
#[derive(Debug)]
pub struct ScriptFailure {
    /// 1-based position of the command in the script.
    pub index: usize,
    pub command: Command,
    pub error: AchError,
}

/// Result of applying a script: later commands still run after a failure.
#[derive(Debug, Default)]
pub struct ScriptOutcome {
    pub applied: usize,
    pub failures: Vec<ScriptFailure>,
}

impl ScriptOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse script text into commands. Stops at the first malformed line.
pub fn parse_commands(text: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_command(line).map_err(|reason| AchError::Script {
            line: line_num + 1,
            reason,
        })?;
        commands.push(command);
    }
    Ok(commands)
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let upper = line.to_uppercase();
    if upper == "RECALC" {
        Ok(Command::Recalc)
    } else if upper.starts_with("SET ") {
        parse_set(&line[4..])
    } else {
        Err(format!(
            "Unknown command: {}",
            line.split_whitespace().next().unwrap_or(line)
        ))
    }
}

/// Parse the operands of SET: `line[:part] key = value`.
fn parse_set(rest: &str) -> std::result::Result<Command, String> {
    let (lhs, value) = rest
        .split_once('=')
        .ok_or("SET requires = between field and value")?;
    let mut words = lhs.split_whitespace();
    let (Some(address), Some(key), None) = (words.next(), words.next(), words.next()) else {
        return Err("SET requires line[:part] and a field key".to_string());
    };

    let (line, part) = match address.split_once(':') {
        Some((line, part)) => (line, Some(part)),
        None => (address, None),
    };
    let line = one_based(line, "line")?;
    let target = match part {
        Some(part) => FieldRef::in_part(line, one_based(part, "part")?, key),
        None => FieldRef::new(line, key),
    };
    let value = parse_delimited_string(value)?;
    Ok(Command::Set { target, value })
}

/// Parse a 1-based number and return it 0-based.
fn one_based(text: &str, what: &str) -> std::result::Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("Invalid {what} number '{text}'")),
    }
}

/// The first non-blank character is the delimiter and the string runs to
/// its next occurrence.
fn parse_delimited_string(s: &str) -> std::result::Result<String, String> {
    let s = s.trim_start();
    let delim = s.chars().next().ok_or("Expected delimited string")?;
    let after_delim = &s[delim.len_utf8()..];
    let end = after_delim
        .find(delim)
        .ok_or_else(|| format!("Unclosed delimiter '{delim}'"))?;
    if !after_delim[end + delim.len_utf8()..].trim().is_empty() {
        return Err("Unexpected text after value".to_string());
    }
    Ok(after_delim[..end].to_string())
}

/// Apply commands in order. A rejected command is recorded and the rest
/// still run.
pub fn apply_commands(doc: &mut Document, commands: &[Command]) -> ScriptOutcome {
    let mut outcome = ScriptOutcome::default();
    for (index, command) in commands.iter().enumerate() {
        let result = match command {
            Command::Set { target, value } => doc.edit_field(target, value).map(|_| ()),
            Command::Recalc => doc.recompute_all(),
        };
        match result {
            Ok(()) => outcome.applied += 1,
            Err(error) => {
                warn!(command = command.name(), index = index + 1, %error, "command rejected");
                outcome.failures.push(ScriptFailure {
                    index: index + 1,
                    command: command.clone(),
                    error,
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use chrono::NaiveDate;

    fn doc() -> Document {
        let now = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let mut doc = Document::empty_at(Layout::Nacha, now).unwrap();
        doc.import_transactions(1, "credit,ID1,100.00,123456789,ACCT1,checking,Bank A")
            .unwrap();
        doc
    }

    #[test]
    fn test_parse_set() {
        let commands = parse_commands("SET 3 amount = \"2500\"").unwrap();
        assert_eq!(
            commands,
            vec![Command::Set {
                target: FieldRef::new(2, "amount"),
                value: "2500".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_set_with_part_and_delimiter() {
        let commands = parse_commands("set 2:3 payee_name = /JANE \"JD\" DOE/").unwrap();
        assert_eq!(
            commands,
            vec![Command::Set {
                target: FieldRef::in_part(1, 2, "payee_name"),
                value: "JANE \"JD\" DOE".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let text = "# header\n\nRECALC\n  # indented\nrecalc\n";
        let commands = parse_commands(text).unwrap();
        assert_eq!(commands, vec![Command::Recalc, Command::Recalc]);
        assert_eq!(commands[0].name(), "RECALC");
    }

    #[test]
    fn test_parse_errors_report_script_line() {
        let cases = [
            ("RECALC\nDELETE 3", 2, "Unknown command: DELETE"),
            ("SET 3 amount \"1\"", 1, "SET requires = between field and value"),
            ("SET amount = \"1\"", 1, "SET requires line[:part] and a field key"),
            ("SET 0 amount = \"1\"", 1, "Invalid line number '0'"),
            ("SET 3:x amount = \"1\"", 1, "Invalid part number 'x'"),
            ("SET 3 amount = \"1", 1, "Unclosed delimiter '\"'"),
            ("SET 3 amount = \"1\" extra", 1, "Unexpected text after value"),
        ];
        for (text, line, reason) in cases {
            match parse_commands(text) {
                Err(AchError::Script { line: l, reason: r }) => {
                    assert_eq!((l, r.as_str()), (line, reason), "{text}");
                }
                other => panic!("{text}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_apply_collects_failures() {
        let mut doc = doc();
        let script = "SET 3 amount = \"2500\"\nSET 2 company_name = \"   \"\nSET 4 entry_hash = \"1\"\nSET 3 id_number = \"INV-7\"";
        let commands = parse_commands(script).unwrap();
        let outcome = apply_commands(&mut doc, &commands);

        assert_eq!(outcome.applied, 2);
        assert!(!outcome.is_clean());
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![2, 3]);
        assert!(matches!(outcome.failures[0].error, AchError::Validation { .. }));
        assert!(matches!(outcome.failures[1].error, AchError::ComputedField { .. }));

        assert_eq!(doc.records()[2].get("amount"), "0000002500");
        assert_eq!(doc.records()[2].get("id_number"), format!("{:<15}", "INV-7"));
        assert_eq!(doc.records()[3].get("total_credits"), "000000002500");
    }

    #[test]
    fn test_recalc_repairs_stale_aggregates() {
        let mut doc = doc();
        doc.records[3].set("total_credits", "000000000001");
        assert!(!doc.validate().is_valid());
        let outcome = apply_commands(&mut doc, &[Command::Recalc]);
        assert!(outcome.is_clean());
        assert!(doc.validate().is_valid());
    }
}
