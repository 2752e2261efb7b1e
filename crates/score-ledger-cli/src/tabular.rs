// crates/score-ledger-cli/src/tabular.rs
// ============================================================================
// Module: Tabular Import
// Description: Minimal RFC 4180 reader and named column schema for imports.
// Purpose: Turn CSV/TSV exports into candidate rows for the reconciler.
// Dependencies: score-ledger-core, score-ledger-config, thiserror
// ============================================================================

//! ## Overview
//! Import files are untrusted text. [`parse_table`] reads quoted fields,
//! doubled quotes, and CRLF line endings with a delimiter sniffed from the
//! header line (`,`, `;`, or tab). [`ImportSchema`] then resolves the code,
//! subject, and score columns by configured header aliases. Any structural
//! problem is a single file-level [`CsvError`]; row-level problems are left
//! to the reconciler so every data row still gets its own outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use score_ledger_config::ColumnAliases;
use score_ledger_core::CandidateRow;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delimiters considered when sniffing the header line.
const DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Spreadsheet extensions that must be exported to CSV first.
const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xls", "xlsm", "xlsb", "ods"];

/// Byte-order mark some spreadsheet tools prepend to CSV exports.
const BOM: char = '\u{feff}';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// File-level import errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    /// The file has no header row.
    #[error("file has no header row")]
    Empty,
    /// A quoted field is not closed before end of input.
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote {
        /// Line the record starts on.
        line: usize,
    },
    /// Text follows a closing quote inside a field.
    #[error("unexpected character after closing quote on line {line}")]
    StrayQuote {
        /// Line of the offending character.
        line: usize,
    },
    /// No header matches any alias of a required column.
    #[error("missing {column} column (accepted headers: {aliases})")]
    MissingColumn {
        /// Column role.
        column: &'static str,
        /// Accepted header names.
        aliases: String,
    },
    /// More than one header matches a required column.
    #[error("{column} column appears more than once")]
    DuplicateColumn {
        /// Column role.
        column: &'static str,
    },
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// One parsed data record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// 1-based line the record starts on.
    pub line: usize,
    /// Field values as read.
    pub fields: Vec<String>,
}

/// A parsed file: header plus data records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    /// Delimiter detected from the header line.
    pub delimiter: char,
    /// Header fields.
    pub header: Vec<String>,
    /// Data records, blank lines skipped.
    pub records: Vec<CsvRecord>,
}

/// Returns true when `path` names a spreadsheet format this reader cannot parse.
#[must_use]
pub fn is_spreadsheet_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            SPREADSHEET_EXTENSIONS.iter().any(|known| extension.eq_ignore_ascii_case(known))
        })
}

/// Picks the delimiter that occurs most often outside quotes in `line`.
///
/// Ties resolve in the order `,`, `;`, tab; a line with none uses `,`.
#[must_use]
pub fn sniff_delimiter(line: &str) -> char {
    let mut counts = [0_usize; DELIMITERS.len()];
    let mut quoted = false;
    for ch in line.chars() {
        if ch == '"' {
            quoted = !quoted;
        } else if !quoted && let Some(index) = DELIMITERS.iter().position(|d| *d == ch) {
            counts[index] += 1;
        }
    }
    DELIMITERS
        .iter()
        .zip(counts)
        .fold((DELIMITERS[0], 0), |best, (delimiter, count)| {
            if count > best.1 { (*delimiter, count) } else { best }
        })
        .0
}

/// Parses CSV text into a header and data records.
///
/// # Errors
///
/// Returns [`CsvError`] when the text has no header or quoting is malformed.
pub fn parse_table(text: &str) -> Result<CsvTable, CsvError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let header_line = text.lines().find(|line| !line.trim().is_empty()).ok_or(CsvError::Empty)?;
    let delimiter = sniff_delimiter(header_line);
    let mut records = read_records(text, delimiter)?.into_iter();
    let header = records.next().ok_or(CsvError::Empty)?.fields;
    Ok(CsvTable {
        delimiter,
        header,
        records: records.collect(),
    })
}

/// Splits text into records, skipping records that hold only blank fields.
fn read_records(text: &str, delimiter: char) -> Result<Vec<CsvRecord>, CsvError> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut record_line = 1;
    let mut quoted = false;
    let mut after_quote = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if quoted {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    quoted = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() && !after_quote => quoted = true,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
                after_quote = false;
            }
            _ if ch == delimiter => {
                fields.push(std::mem::take(&mut field));
                after_quote = false;
            }
            _ if after_quote => {
                return Err(CsvError::StrayQuote {
                    line,
                });
            }
            _ => field.push(ch),
        }
    }
    if quoted {
        return Err(CsvError::UnterminatedQuote {
            line: record_line,
        });
    }
    if !field.is_empty() || !fields.is_empty() || after_quote {
        fields.push(field);
        push_record(&mut records, record_line, fields);
    }
    Ok(records)
}

/// Appends a record unless every field is blank.
fn push_record(records: &mut Vec<CsvRecord>, line: usize, fields: Vec<String>) {
    if fields.iter().any(|field| !field.trim().is_empty()) {
        records.push(CsvRecord {
            line,
            fields,
        });
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSchema {
    /// Index of the national code column.
    pub code: usize,
    /// Index of the subject column.
    pub subject: usize,
    /// Index of the score column.
    pub score: usize,
}

impl ImportSchema {
    /// Resolves each column role against `header` using `aliases`.
    ///
    /// Header matching ignores case and surrounding or repeated whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::MissingColumn`] or [`CsvError::DuplicateColumn`]
    /// when a role matches no header or more than one.
    pub fn resolve(header: &[String], aliases: &ColumnAliases) -> Result<Self, CsvError> {
        let folded: Vec<String> = header.iter().map(|name| fold_header(name)).collect();
        Ok(Self {
            code: find_column(&folded, "code", &aliases.code)?,
            subject: find_column(&folded, "subject", &aliases.subject)?,
            score: find_column(&folded, "score", &aliases.score)?,
        })
    }

    /// Projects each record onto `[code, subject, score]` candidate rows.
    ///
    /// Missing cells are dropped, so short records surface as format
    /// rejections from the reconciler.
    #[must_use]
    pub fn candidate_rows(&self, table: &CsvTable) -> Vec<CandidateRow> {
        table
            .records
            .iter()
            .map(|record| {
                let cell = |index: usize| record.fields.get(index).map_or("", String::as_str);
                CandidateRow::from_fields(
                    record.line,
                    [cell(self.code), cell(self.subject), cell(self.score)],
                )
            })
            .collect()
    }
}

/// Finds the single header index matching one of `aliases`.
fn find_column(
    folded: &[String],
    column: &'static str,
    aliases: &[String],
) -> Result<usize, CsvError> {
    let wanted: Vec<String> = aliases.iter().map(|alias| fold_header(alias)).collect();
    let mut matches = folded.iter().enumerate().filter(|(_, name)| wanted.contains(*name));
    let Some((index, _)) = matches.next() else {
        return Err(CsvError::MissingColumn {
            column,
            aliases: aliases.join(", "),
        });
    };
    if matches.next().is_some() {
        return Err(CsvError::DuplicateColumn {
            column,
        });
    }
    Ok(index)
}

/// Folds a header name for alias comparison.
fn fold_header(name: &str) -> String {
    name.trim_matches(BOM).split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
