use lontar::{
    api::{DbInfo, db_info, list_tables, run_query},
    executor::query::QueryExecutor,
    planner::{
        error::PlannerError,
        logical_plan::{EqualityFilter, Projection, SelectPlan},
        parser::{QueryParser, SUPPORTED_QUERIES},
    },
    storage::database::DatabaseReader,
    types::{RowId, error::DatabaseError, value::Value},
    utils::{log::DecodeLog, mock::DatabaseBuilder},
};

const FRUIT_SQL: &str = "CREATE TABLE fruit(id INTEGER PRIMARY KEY, name TEXT, color TEXT, weight REAL)";

fn fruit(id: RowId, name: &str, color: &str, weight: f64) -> (RowId, Vec<Value>) {
    (
        id,
        vec![
            Value::Null,
            Value::Text(name.to_string()),
            Value::Text(color.to_string()),
            Value::Real(weight),
        ],
    )
}

fn fruit_reader() -> DatabaseReader {
    let image = DatabaseBuilder::new(1024)
        .catalog(&[
            ("fruit", 2, FRUIT_SQL),
            ("notes", 5, "CREATE TABLE notes(body TEXT)"),
        ])
        .interior_page(2, vec![(3, 2)], 4)
        .leaf_page(
            3,
            vec![fruit(1, "apple", "red", 0.2), fruit(2, "banana", "yellow", 0.15)],
        )
        .leaf_page(
            4,
            vec![fruit(3, "cherry", "red", 0.01), fruit(4, "lime", "green", 0.07)],
        )
        .leaf_page(5, Vec::new())
        .build();
    DatabaseReader::open(image).unwrap()
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn test_parse_select_all() -> Result<(), PlannerError> {
    let parser = QueryParser::new();
    assert_eq!(
        parser.parse_sql("SELECT * FROM fruit")?,
        SelectPlan::scan_all("fruit", None)
    );
    assert_eq!(
        parser.parse_sql("select * from fruit limit 3;")?,
        SelectPlan::scan_all("fruit", Some(3))
    );
    Ok(())
}

#[test]
fn test_parse_filtered_select() -> Result<(), PlannerError> {
    let plan = QueryParser::new().parse_sql("SELECT name, weight FROM fruit WHERE color = 'red'")?;
    assert_eq!(plan.table_name, "fruit");
    assert_eq!(
        plan.projection,
        Projection::Columns(vec!["name".to_string(), "weight".to_string()])
    );
    assert_eq!(
        plan.filter,
        Some(EqualityFilter {
            column_name: "color".to_string(),
            literal: "red".to_string(),
        })
    );
    assert_eq!(plan.limit, None);

    let numeric = QueryParser::new().parse_sql("SELECT name FROM fruit WHERE id = 3")?;
    assert_eq!(numeric.filter.map(|f| f.literal), Some("3".to_string()));
    Ok(())
}

#[test]
fn test_unsupported_shapes_are_rejected() {
    let parser = QueryParser::new();
    for sql in [
        "SELECT * FROM fruit WHERE color = 'red'",
        "SELECT name FROM fruit",
        "SELECT name FROM fruit WHERE weight > 1",
        "SELECT name FROM fruit WHERE color = 'red' LIMIT 1",
        "SELECT * FROM fruit ORDER BY name",
        "SELECT * FROM fruit, notes",
        "SELECT count(*) FROM fruit",
        "DELETE FROM fruit",
    ] {
        assert!(
            matches!(parser.parse_sql(sql), Err(PlannerError::UnsupportedQuery(_))),
            "{}",
            sql
        );
    }
    assert!(matches!(
        parser.parse_sql("SELECT * FROM fruit; SELECT * FROM notes"),
        Err(PlannerError::InvalidQuery(_))
    ));
    assert!(matches!(
        parser.parse_sql("SELEKT everything"),
        Err(PlannerError::SqlParser(_))
    ));
}

#[test]
fn test_execute_select_all() -> Result<(), DatabaseError> {
    let reader = fruit_reader();
    let log = DecodeLog::new();
    let result = QueryExecutor::new(&reader).execute(&SelectPlan::scan_all("fruit", None), &log)?;

    assert_eq!(result.columns, vec!["id", "name", "color", "weight"]);
    assert_eq!(result.row_count(), 4);
    assert_eq!(
        result.values[2],
        vec![Value::Integer(3), text("cherry"), text("red"), Value::Real(0.01)]
    );
    assert_eq!(result.message, "Query executed successfully. 4 rows returned.");
    Ok(())
}

#[test]
fn test_execute_filtered_projection() -> Result<(), DatabaseError> {
    let reader = fruit_reader();
    let plan = SelectPlan::filtered(
        "fruit",
        vec!["name".to_string(), "id".to_string()],
        "color",
        "red",
    );
    let result = QueryExecutor::new(&reader).execute(&plan, &DecodeLog::new())?;

    assert_eq!(result.columns, vec!["name", "id"]);
    assert_eq!(
        result.values,
        vec![
            vec![text("apple"), Value::Integer(1)],
            vec![text("cherry"), Value::Integer(3)],
        ]
    );
    Ok(())
}

#[test]
fn test_filter_on_row_id_alias() -> Result<(), DatabaseError> {
    let reader = fruit_reader();
    let plan = SelectPlan::filtered("fruit", vec!["name".to_string()], "id", "4");
    let result = QueryExecutor::new(&reader).execute(&plan, &DecodeLog::new())?;
    assert_eq!(result.values, vec![vec![text("lime")]]);
    Ok(())
}

#[test]
fn test_unknown_column_in_projection() {
    let reader = fruit_reader();
    let plan = SelectPlan::filtered("fruit", vec!["taste".to_string()], "color", "red");
    let err = QueryExecutor::new(&reader)
        .execute(&plan, &DecodeLog::new())
        .unwrap_err();
    assert!(matches!(err, DatabaseError::ColumnNotFound { name, .. } if name == "taste"));
}

#[test]
fn test_run_query_select_all_with_limit() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT * FROM fruit LIMIT 3");

    assert_eq!(result.row_count(), 3);
    assert_eq!(result.values[2][1], text("cherry"));
    assert_eq!(result.message, "Query executed successfully. 3 rows returned.");
    assert_eq!(result.logs[0], "[LOG] Received query: SELECT * FROM fruit LIMIT 3");
    assert!(result.logs.iter().any(|line| line.starts_with("[LOG] Reading page 2")));
}

#[test]
fn test_run_query_filtered() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT name, weight FROM fruit WHERE color = 'green'");

    assert_eq!(result.columns, vec!["name", "weight"]);
    assert_eq!(result.values, vec![vec![text("lime"), Value::Real(0.07)]]);
}

#[test]
fn test_run_query_no_matches() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT name FROM fruit WHERE color = 'blue'");
    assert!(result.values.is_empty());
    assert_eq!(result.message, "Query executed successfully. 0 rows returned.");
}

#[test]
fn test_run_query_unknown_table() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT * FROM grapes");
    assert!(result.columns.is_empty());
    assert!(result.values.is_empty());
    assert_eq!(result.message, "Table 'grapes' not found");
    assert!(!result.logs.is_empty());
}

#[test]
fn test_run_query_unknown_column() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT name FROM fruit WHERE taste = 'sweet'");
    assert_eq!(result.message, "Column 'taste' not found");
}

#[test]
fn test_run_query_unsupported() {
    let reader = fruit_reader();
    for sql in ["SELECT name FROM fruit", "not sql at all", "DROP TABLE fruit"] {
        let result = run_query(&reader, sql);
        assert_eq!(result.message, SUPPORTED_QUERIES, "{}", sql);
        assert!(result.values.is_empty());
    }
}

#[test]
fn test_query_result_json() {
    let reader = fruit_reader();
    let result = run_query(&reader, "SELECT name FROM fruit WHERE id = 1");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["columns"], serde_json::json!(["name"]));
    assert_eq!(json["values"], serde_json::json!([["apple"]]));
    assert!(json["logs"].as_array().is_some_and(|logs| !logs.is_empty()));
}

#[test]
fn test_db_info() {
    let reader = fruit_reader();
    let info = db_info(&reader, &DecodeLog::new());
    assert_eq!(
        info,
        DbInfo {
            page_size: 1024,
            number_of_tables: Some(2),
        }
    );
    assert_eq!(
        serde_json::to_string(&info).unwrap(),
        r#"{"pageSize":1024,"numberOfTables":2}"#
    );
}

#[test]
fn test_db_info_with_interior_catalog() {
    let image = DatabaseBuilder::new(1024)
        .interior_page(1, vec![(2, 1)], 3)
        .leaf_page(2, Vec::new())
        .leaf_page(3, Vec::new())
        .build();
    let reader = DatabaseReader::open(image).unwrap();
    let info = db_info(&reader, &DecodeLog::new());

    assert_eq!(info.number_of_tables, None);
    assert_eq!(serde_json::to_string(&info).unwrap(), r#"{"pageSize":1024}"#);
}

#[test]
fn test_list_tables() -> Result<(), DatabaseError> {
    let reader = fruit_reader();
    let response = list_tables(&reader, &DecodeLog::new())?;
    assert_eq!(response.tables, vec!["fruit", "notes"]);
    Ok(())
}
