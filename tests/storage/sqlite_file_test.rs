//! Reads `tests/fixtures/orchard.db`, written by the sqlite3 shell from
//! `tests/fixtures/orchard.sql`.

use lontar::{
    api::{db_info, list_tables, run_query},
    executor::{
        query::scan_table,
        sequential_scan::{ScanOptions, SequentialScanner},
    },
    storage::{database::DatabaseReader, header::TextEncoding},
    types::{error::DatabaseError, value::Value},
    utils::log::{DecodeLog, LogLevel},
};

const ORCHARD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/orchard.db");

fn orchard() -> DatabaseReader {
    DatabaseReader::from_path(ORCHARD).unwrap()
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn test_header_of_sqlite_written_file() {
    let reader = orchard();
    assert_eq!(reader.page_size(), 1024);
    assert_eq!(reader.page_count(), 11);
    assert_eq!(reader.header().encoding(), TextEncoding::Utf8);

    let info = db_info(&reader, &DecodeLog::new());
    assert_eq!(info.page_size, 1024);
    // Two tables and one index.
    assert_eq!(info.number_of_tables, Some(3));
}

#[test]
fn test_index_entries_are_not_listed() {
    let reader = orchard();
    let response = list_tables(&reader, &DecodeLog::new()).unwrap();
    assert_eq!(response.tables, vec!["fruits", "harvest"]);
}

#[test]
fn test_rows_from_before_and_after_added_column() -> Result<(), DatabaseError> {
    let reader = orchard();
    let log = DecodeLog::new();
    let rows = scan_table(&reader, "fruits", ScanOptions::default(), &log)?;

    let values: Vec<Vec<Value>> = rows.into_iter().map(|row| row.values).collect();
    assert_eq!(
        values,
        vec![
            vec![Value::Integer(1), text("apple"), text("red"), Value::Null],
            vec![Value::Integer(2), text("banana"), text("yellow"), Value::Null],
            vec![Value::Integer(7), text("cherry"), Value::Null, Value::Null],
            vec![Value::Integer(8), text("grape"), text("purple"), Value::Real(2.75)],
            vec![Value::Integer(9), text("kiwi"), Value::Blob(vec![0x00, 0xff]), Value::Real(-0.5)],
        ]
    );
    assert_eq!(log.count(LogLevel::Warn), 0);
    Ok(())
}

#[test]
fn test_multi_page_table_in_rowid_order() -> Result<(), DatabaseError> {
    let reader = orchard();
    let log = DecodeLog::new();
    let scanner = SequentialScanner::new(&reader, "harvest", ScanOptions::default(), &log)?;
    assert_eq!(scanner.root_page(), 4);
    assert!(scanner.leaf_page_numbers().len() > 1);

    let rows = scan_table(&reader, "harvest", ScanOptions::default(), &log)?;
    assert_eq!(rows.len(), 300);
    assert!(rows.iter().zip(1..).all(|(row, n)| row.row_id == n));
    assert_eq!(
        rows[299].values,
        vec![Value::Integer(300), text("crate-300"), Value::Integer(300_000_900)]
    );
    assert_eq!(log.count(LogLevel::Warn), 0);
    Ok(())
}

#[test]
fn test_queries_against_sqlite_written_file() {
    let reader = orchard();

    let result = run_query(&reader, "SELECT name, price FROM fruits WHERE color = 'purple'");
    assert_eq!(result.columns, vec!["name", "price"]);
    assert_eq!(result.values, vec![vec![text("grape"), Value::Real(2.75)]]);

    let result = run_query(&reader, "SELECT crate FROM harvest WHERE day = '150'");
    assert_eq!(result.values, vec![vec![text("crate-150")]]);

    let result = run_query(&reader, "SELECT * FROM harvest LIMIT 2");
    assert_eq!(result.row_count(), 2);
    assert_eq!(result.message, "Query executed successfully. 2 rows returned.");
}
