use serde::Serialize;

use crate::{
    executor::{
        predicate::Predicate,
        scan::{ScanIterator, Scanner},
        sequential_scan::{ScanOptions, SequentialScanner},
    },
    planner::logical_plan::{Projection, SelectPlan},
    storage::{database::DatabaseReader, schema::SchemaResolver},
    types::{error::DatabaseError, row::Row, value::Value},
    utils::log::DecodeLog,
};

/// Tabular answer in the shape the service returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Value>>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
}

impl QueryResult {
    /// An empty result carrying only an explanation.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
            message: message.into(),
            logs: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.values.len()
    }
}

pub struct QueryExecutor<'r> {
    reader: &'r DatabaseReader,
}

impl<'r> QueryExecutor<'r> {
    pub fn new(reader: &'r DatabaseReader) -> Self {
        Self { reader }
    }

    /// Run a plan over every leaf page of the table.
    pub fn execute(&self, plan: &SelectPlan, log: &DecodeLog) -> Result<QueryResult, DatabaseError> {
        let schema = SchemaResolver::new(self.reader).table_schema(&plan.table_name, log)?;
        log.log(format!(
            "Table '{}': root page {}, columns [{}]",
            schema.table_name,
            schema.root_page,
            schema.column_names().join(", ")
        ));

        let predicate = match &plan.filter {
            Some(filter) => Predicate::eq(filter.column_name.clone(), filter.literal.clone()),
            None => Predicate::True,
        };
        predicate.validate_against_schema(&schema)?;

        let (columns, indexes) = match &plan.projection {
            Projection::All => (schema.column_names(), (0..schema.columns.len()).collect()),
            Projection::Columns(names) => {
                let mut indexes = Vec::with_capacity(names.len());
                for name in names {
                    let index = schema.column_index(name).ok_or_else(|| {
                        DatabaseError::ColumnNotFound {
                            name: name.clone(),
                            table: schema.table_name.clone(),
                        }
                    })?;
                    indexes.push(index);
                }
                (names.clone(), indexes)
            }
        };

        // The limit applies after filtering, so the scanner itself is unbounded.
        let scanner = SequentialScanner::from_root(
            self.reader,
            schema.root_page,
            Some(schema.clone()),
            ScanOptions::default(),
            log,
        );

        let mut values = Vec::new();
        for row in ScanIterator::new(scanner) {
            if plan.limit.is_some_and(|limit| values.len() >= limit) {
                break;
            }
            let row = row?;
            if !predicate.evaluate(&row, &schema)? {
                continue;
            }
            values.push(
                indexes
                    .iter()
                    .map(|&i| row.get_value(i).cloned().unwrap_or(Value::Null))
                    .collect(),
            );
        }

        Ok(QueryResult {
            message: format!("Query executed successfully. {} rows returned.", values.len()),
            columns,
            values,
            logs: Vec::new(),
        })
    }
}

/// Scan a whole table, shaped to its schema.
pub fn scan_table(
    reader: &DatabaseReader,
    table_name: &str,
    options: ScanOptions,
    log: &DecodeLog,
) -> Result<Vec<Row>, DatabaseError> {
    SequentialScanner::new(reader, table_name, options, log)?.scan_remaining()
}
