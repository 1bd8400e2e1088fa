//! CLI tool to create, inspect and edit NACHA and AFT files.
//!
//! Usage:
//!   achedit new --layout nacha -o payroll.ach
//!   achedit show payroll.ach
//!   achedit set payroll.ach 3 amount 2500 -o payroll.ach
//!   achedit import payroll.ach transactions.csv --batch 2
//!   achedit check payroll.ach
//!
//! Line and segment numbers are 1-based. Commands that produce a document
//! write it to stdout unless `-o` is given.

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use achfile_rs::{
    AchError, Document, FieldRef, Layout, Record, ValidationReport, apply_commands, parse_commands,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

type CliResult<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayoutArg {
    Nacha,
    Aft,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Nacha => Layout::Nacha,
            LayoutArg::Aft => Layout::Aft,
        }
    }
}

/// Edit and validate NACHA ACH and Canadian AFT files.
#[derive(Parser)]
#[command(name = "achedit", version)]
struct Cli {
    /// File layout (detected from the first record when omitted)
    #[arg(long, global = true, env = "ACHEDIT_LAYOUT", value_enum)]
    layout: Option<LayoutArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a minimal valid file (NACHA unless --layout says otherwise)
    New {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print every record and field
    Show {
        file: PathBuf,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a file; exits with status 1 when problems are found
    Check { file: PathBuf },
    /// Edit one field
    Set {
        file: PathBuf,
        /// Record line number
        line: usize,
        /// Field key, e.g. amount
        key: String,
        value: String,
        /// Segment number, for AFT transaction fields
        #[arg(long)]
        part: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply an edit script
    Apply {
        file: PathBuf,
        script: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a CSV transaction list into a batch
    Import {
        file: PathBuf,
        transactions: PathBuf,
        /// Line number of the batch header
        #[arg(long)]
        batch: usize,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recompute every total, hash and count
    Recalc {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let layout = cli.layout.map(Layout::from);
    match cli.command {
        Commands::New { output } => {
            let doc = Document::empty(layout.unwrap_or(Layout::Nacha))?;
            emit(&doc, output.as_deref())?;
        }
        Commands::Show { file, json } => {
            let doc = load(&file, layout)?;
            if json {
                show_json(&doc)?;
            } else {
                show(&doc);
            }
        }
        Commands::Check { file } => {
            let doc = load(&file, layout)?;
            let report = doc.validate();
            print_report(&doc, &report);
            if !report.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Set {
            file,
            line,
            key,
            value,
            part,
            output,
        } => {
            let mut doc = load(&file, layout)?;
            let line = zero_based(line, "line")?;
            let at = match part {
                Some(part) => FieldRef::in_part(line, zero_based(part, "part")?, key),
                None => FieldRef::new(line, key),
            };
            let stored = doc.edit_field(&at, &value)?;
            eprintln!("{} = \"{stored}\"", at.key);
            emit(&doc, output.as_deref())?;
        }
        Commands::Apply {
            file,
            script,
            output,
        } => {
            let mut doc = load(&file, layout)?;
            let commands = parse_commands(&read(&script)?)?;
            let outcome = apply_commands(&mut doc, &commands);
            for failure in &outcome.failures {
                eprintln!("command {}: {}", failure.index, failure.error);
            }
            eprintln!(
                "Applied {} of {} commands",
                outcome.applied,
                commands.len()
            );
            emit(&doc, output.as_deref())?;
            if !outcome.is_clean() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Import {
            file,
            transactions,
            batch,
            output,
        } => {
            let mut doc = load(&file, layout)?;
            let count = doc.import_transactions(zero_based(batch, "batch")?, &read(&transactions)?)?;
            eprintln!("Imported {count} transactions");
            emit(&doc, output.as_deref())?;
        }
        Commands::Recalc { file, output } => {
            let mut doc = load(&file, layout)?;
            let result = doc.recompute_all();
            if let Err(AchError::Recompute(errors)) = &result {
                for err in errors {
                    eprintln!("{err}");
                }
            }
            emit(&doc, output.as_deref())?;
            match result {
                Ok(()) => {}
                Err(AchError::Recompute(_)) => return Ok(ExitCode::FAILURE),
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn read(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {e}", path.display()).into())
}

fn load(path: &Path, layout: Option<Layout>) -> CliResult<Document> {
    let text = read(path)?;
    let layout = match layout.or_else(|| Layout::detect(&text)) {
        Some(layout) => layout,
        None => {
            return Err(format!(
                "cannot detect the layout of '{}' (use --layout)",
                path.display()
            )
            .into());
        }
    };
    Ok(Document::parse(&text, layout))
}

fn zero_based(n: usize, what: &str) -> CliResult<usize> {
    n.checked_sub(1)
        .ok_or_else(|| format!("{what} numbers start at 1").into())
}

/// Write the document to `output`, or to stdout.
fn emit(doc: &Document, output: Option<&Path>) -> CliResult<()> {
    let text = doc.to_text();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &text)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.is_empty() {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

fn show(doc: &Document) {
    println!("{} file, {} records", doc.layout(), doc.len());
    for (line, record) in doc.records().iter().enumerate() {
        let Ok(spec) = record.spec(doc.layout()) else {
            continue;
        };
        println!("{:>4} {}", line + 1, spec.name);
        for field in spec.fields() {
            print_field(8, field, record.get(field.key));
        }
        if let Some(segment) = spec.segment() {
            for (index, part) in record.parts.iter().enumerate() {
                if achfile_rs::record::part_is_blank(part) {
                    continue;
                }
                println!("       segment {}", index + 1);
                for field in segment.fields {
                    print_field(10, field, record.part_value(index, field.key));
                }
            }
        }
    }
}

fn print_field(indent: usize, field: &achfile_rs::FieldSpec, raw: &str) {
    let note = field.display(raw).or_else(|| field.describe(raw).map(str::to_string));
    match note {
        Some(note) => println!("{:indent$}{:<28} \"{raw}\"  {note}", "", field.key),
        None => println!("{:indent$}{:<28} \"{raw}\"", "", field.key),
    }
}

#[derive(Serialize)]
struct ShowJson<'a> {
    layout: Layout,
    records: &'a [Record],
}

fn show_json(doc: &Document) -> CliResult<()> {
    let body = ShowJson {
        layout: doc.layout(),
        records: doc.records(),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_report(doc: &Document, report: &ValidationReport) {
    if report.is_valid() {
        println!("OK: {} records", doc.len());
        return;
    }
    for issue in &report.fields {
        match issue.part {
            Some(part) => println!(
                "line {} segment {}, {}: {}",
                issue.line + 1,
                part + 1,
                issue.key,
                issue.message
            ),
            None => println!("line {}, {}: {}", issue.line + 1, issue.key, issue.message),
        }
    }
    for issue in &report.structure {
        match issue.line {
            Some(line) => println!("line {}: {}", line + 1, issue.message),
            None => println!("file: {}", issue.message),
        }
    }
    println!("{} problems found", report.issue_count());
}
