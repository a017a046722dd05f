//! CSV codec for transaction import and export.
//!
//! Columns: `date,type,category,amount,note`. Export always writes ISO
//! dates; import also understands the common slash formats.

use std::fmt;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;

use crate::{EngineError, Money, ResultEngine, TransactionKind, report::TransactionEntry};

pub const CSV_HEADER: [&str; 5] = ["date", "type", "category", "amount", "note"];

/// Import stops listing problems after this many.
pub const MAX_IMPORT_ERRORS: usize = 10;

/// Upper bound for an uploaded file.
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Serialize)]
struct ExportRow<'a> {
    date: String,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'a str,
    amount: String,
    note: &'a str,
}

/// Serializes `entries` in the given order.
pub fn write_csv(entries: &[TransactionEntry]) -> ResultEngine<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for entry in entries {
        let tx = &entry.transaction;
        writer
            .serialize(ExportRow {
                date: tx.occurred_on.format("%Y-%m-%d").to_string(),
                kind: tx.kind.as_str(),
                category: entry.category.as_ref().map_or("", |c| c.name.as_str()),
                amount: tx.amount.to_string(),
                note: tx.note.as_deref().unwrap_or_default(),
            })
            .map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Internal(format!("failed to finalize csv: {err}")))
}

/// A validated data row, before category resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRow {
    /// 1-based line in the file; the header is line 1.
    pub line: u64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Option<String>,
    pub amount: Money,
    pub note: Option<String>,
}

/// A problem found on one line of the file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.line, self.message)
    }
}

/// Outcome of parsing: the rows that validated and one error per bad row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub rows: Vec<CsvRow>,
    pub errors: Vec<RowError>,
    /// Data rows seen, valid or not.
    pub row_count: usize,
}

struct Columns {
    date: usize,
    kind: usize,
    amount: usize,
    category: Option<usize>,
    note: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> ResultEngine<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            find(name).ok_or_else(|| {
                EngineError::ImportRejected(vec![format!("missing required column '{name}'")])
            })
        };
        Ok(Self {
            date: required("date")?,
            kind: required("type")?,
            amount: required("amount")?,
            category: find("category"),
            note: find("note"),
        })
    }
}

/// Parses and validates every row. Structural problems (unreadable header,
/// missing columns) fail immediately; row problems are collected.
pub fn parse_csv(input: &[u8]) -> ResultEngine<ParsedCsv> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|err| EngineError::ImportRejected(vec![format!("unreadable header: {err}")]))?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut parsed = ParsedCsv::default();
    for (index, record) in reader.records().enumerate() {
        parsed.row_count += 1;
        let fallback_line = index as u64 + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err
                    .position()
                    .map_or(fallback_line, |p| p.line());
                parsed.errors.push(RowError {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line());
        match parse_record(&record, &columns, line) {
            Ok(row) => parsed.rows.push(row),
            Err(message) => parsed.errors.push(RowError { line, message }),
        }
    }
    Ok(parsed)
}

fn parse_record(record: &StringRecord, columns: &Columns, line: u64) -> Result<CsvRow, String> {
    let field = |index: usize| record.get(index).unwrap_or_default();
    let optional = |index: Option<usize>| {
        index
            .map(field)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    };

    let date = parse_date(field(columns.date))?;
    let kind = TransactionKind::try_from(field(columns.kind).to_lowercase().as_str())
        .map_err(|_| format!("invalid type '{}'", field(columns.kind)))?;
    let amount = Money::parse_positive(field(columns.amount))
        .map_err(|_| format!("invalid amount '{}'", field(columns.amount)))?;

    Ok(CsvRow {
        line,
        date,
        kind,
        category: optional(columns.category),
        amount,
        note: optional(columns.note),
    })
}

/// Tries ISO first, then `MM/DD/YYYY`, `DD/MM/YYYY` and `YYYY/MM/DD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("missing date".to_string());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| format!("invalid date '{input}'"))
}

fn csv_error(err: csv::Error) -> EngineError {
    EngineError::Internal(format!("csv error: {err}"))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{Category, Transaction};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2026-10-19").unwrap(), d(2026, 10, 19));
        assert_eq!(parse_date("10/19/2026").unwrap(), d(2026, 10, 19));
        assert_eq!(parse_date("19/10/2026").unwrap(), d(2026, 10, 19));
        assert_eq!(parse_date("2026/10/19").unwrap(), d(2026, 10, 19));
        // Ambiguous dates are read as month first.
        assert_eq!(parse_date("03/04/2026").unwrap(), d(2026, 3, 4));
        assert!(parse_date("19.10.2026").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn export_writes_header_and_rows() {
        let category = Category {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Food, drinks".to_string(),
            kind: TransactionKind::Expense,
            icon: None,
            color: None,
            description: None,
        };
        let tx = Transaction::new(
            Uuid::nil(),
            Some(category.id),
            TransactionKind::Expense,
            Money::new(1_250),
            d(2026, 10, 1),
            Some("pizza".to_string()),
            Utc::now(),
        )
        .unwrap();
        let entries = vec![TransactionEntry {
            transaction: tx,
            category: Some(category),
        }];

        let out = String::from_utf8(write_csv(&entries).unwrap()).unwrap();
        assert_eq!(
            out,
            "date,type,category,amount,note\n2026-10-01,expense,\"Food, drinks\",12.50,pizza\n"
        );

        let empty = String::from_utf8(write_csv(&[]).unwrap()).unwrap();
        assert_eq!(empty, "date,type,category,amount,note\n");
    }

    #[test]
    fn parse_collects_row_errors_with_line_numbers() {
        let input = b"date,type,category,amount,note\n\
2026-10-01,Expense,Food,12.50,lunch\n\
2026-13-01,expense,Food,1,\n\
2026-10-02,transfer,,1,\n\
2026-10-03,income,,-5,\n\
2026-10-04,income,,\"1,5\",\n";
        let parsed = parse_csv(input).unwrap();
        assert_eq!(parsed.row_count, 5);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].kind, TransactionKind::Expense);
        assert_eq!(parsed.rows[0].category.as_deref(), Some("Food"));
        assert_eq!(parsed.rows[0].line, 2);
        assert_eq!(parsed.rows[1].amount, Money::new(150));
        assert_eq!(parsed.rows[1].category, None);
        let errors: Vec<String> = parsed.errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            errors,
            vec![
                "Row 3: invalid date '2026-13-01'",
                "Row 4: invalid type 'transfer'",
                "Row 5: invalid amount '-5'",
            ]
        );
    }

    #[test]
    fn missing_column_rejects_file() {
        let err = parse_csv(b"date,category,amount\n2026-10-01,Food,1\n").unwrap_err();
        assert_eq!(
            err,
            EngineError::ImportRejected(vec!["missing required column 'type'".to_string()])
        );
    }

    #[test]
    fn columns_may_come_in_any_order() {
        let parsed = parse_csv(b"amount,type,date\n3.00,income,2026-01-31\n").unwrap();
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows[0].date, d(2026, 1, 31));
        assert_eq!(parsed.rows[0].note, None);
    }
}
