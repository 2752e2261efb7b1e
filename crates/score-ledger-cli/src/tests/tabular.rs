// crates/score-ledger-cli/src/tests/tabular.rs
// ============================================================================
// Module: Tabular Import Tests
// Description: Unit tests for the CSV reader and column schema.
// Purpose: Ensure quoting, delimiters, and header aliases resolve correctly.
// Dependencies: score-ledger-cli tabular module, score-ledger-config
// ============================================================================

//! ## Overview
//! Covers delimiter sniffing, RFC 4180 quoting, blank-record handling, and
//! alias-based column resolution including Persian headers.

use std::path::Path;

use score_ledger_config::ColumnAliases;

use crate::tabular::CsvError;
use crate::tabular::ImportSchema;
use crate::tabular::is_spreadsheet_path;
use crate::tabular::parse_table;
use crate::tabular::sniff_delimiter;

#[test]
fn delimiter_is_sniffed_outside_quotes() {
    assert_eq!(sniff_delimiter("code,subject,score"), ',');
    assert_eq!(sniff_delimiter("code;subject;score"), ';');
    assert_eq!(sniff_delimiter("code\tsubject\tscore"), '\t');
    assert_eq!(sniff_delimiter("\"a;b;c\",subject,score"), ',');
    assert_eq!(sniff_delimiter("code"), ',');
}

#[test]
fn quoted_fields_and_crlf_are_read() {
    let text = "code,subject,score\r\n0012345679,\"art, modern\",18\r\n\r\n0084571233,\"say \"\"hi\"\"\",17\r\n";
    let table = parse_table(text).unwrap();
    assert_eq!(table.header, vec!["code", "subject", "score"]);
    assert_eq!(table.records.len(), 2);
    assert_eq!(table.records[0].fields[1], "art, modern");
    assert_eq!(table.records[1].fields[1], "say \"hi\"");
    assert_eq!(table.records[1].line, 4);
}

#[test]
fn multi_line_quoted_fields_keep_record_start_line() {
    let table = parse_table("code,subject,score\n1,\"two\nlines\",3\n4,5,6").unwrap();
    assert_eq!(table.records[0].fields[1], "two\nlines");
    assert_eq!(table.records[1].line, 4);
}

#[test]
fn malformed_quoting_is_a_file_error() {
    assert_eq!(
        parse_table("code,subject,score\n1,\"open,3\n"),
        Err(CsvError::UnterminatedQuote {
            line: 2
        })
    );
    assert_eq!(
        parse_table("code,subject,score\n1,\"a\"b,3\n"),
        Err(CsvError::StrayQuote {
            line: 2
        })
    );
    assert_eq!(parse_table("\n \n"), Err(CsvError::Empty));
}

#[test]
fn schema_resolves_aliases_case_insensitively() {
    let table = parse_table("\u{feff}Score;National  Code;Course\n18;0012345679;math\n").unwrap();
    let schema = ImportSchema::resolve(&table.header, &ColumnAliases::default()).unwrap();
    assert_eq!(
        schema,
        ImportSchema {
            code: 1,
            subject: 2,
            score: 0
        }
    );
    let rows = schema.candidate_rows(&table);
    assert_eq!(rows[0].fields, vec!["0012345679", "math", "18"]);
    assert_eq!(rows[0].line, 2);
}

#[test]
fn persian_headers_resolve_with_defaults() {
    let table = parse_table("کد ملی,درس,نمره\n0012345679,ریاضی,۱۸\n").unwrap();
    let schema = ImportSchema::resolve(&table.header, &ColumnAliases::default()).unwrap();
    assert_eq!(schema.candidate_rows(&table)[0].fields, vec!["0012345679", "ریاضی", "۱۸"]);
}

#[test]
fn missing_and_duplicate_columns_are_rejected() {
    let table = parse_table("code,subject\n1,2\n").unwrap();
    assert!(matches!(
        ImportSchema::resolve(&table.header, &ColumnAliases::default()),
        Err(CsvError::MissingColumn {
            column: "score",
            ..
        })
    ));
    let table = parse_table("code,national_code,subject,score\n").unwrap();
    assert_eq!(
        ImportSchema::resolve(&table.header, &ColumnAliases::default()),
        Err(CsvError::DuplicateColumn {
            column: "code"
        })
    );
}

#[test]
fn short_records_become_short_candidate_rows() {
    let table = parse_table("code,subject,score\n0012345679,,18\n").unwrap();
    let schema = ImportSchema::resolve(&table.header, &ColumnAliases::default()).unwrap();
    assert_eq!(schema.candidate_rows(&table)[0].fields.len(), 2);
}

#[test]
fn spreadsheet_extensions_are_detected() {
    assert!(is_spreadsheet_path(Path::new("grades.XLSX")));
    assert!(is_spreadsheet_path(Path::new("grades.xls")));
    assert!(!is_spreadsheet_path(Path::new("grades.csv")));
    assert!(!is_spreadsheet_path(Path::new("grades")));
}
