//! Request-level entry points mirroring the service endpoints
//! (`/api/dbinfo`, `/api/tables`, `/api/query`). Each call works on its own
//! `DecodeLog`, so concurrent requests over separate readers share nothing.

use serde::Serialize;

use crate::{
    executor::query::{QueryExecutor, QueryResult},
    planner::{error::PlannerError, parser::{QueryParser, SUPPORTED_QUERIES}},
    storage::{database::DatabaseReader, schema::SchemaResolver},
    types::error::{DatabaseError, Result},
    utils::log::DecodeLog,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInfo {
    pub page_size: u32,
    /// Cell count of page 1, present only when it is a leaf table page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_tables: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

pub fn db_info(reader: &DatabaseReader, log: &DecodeLog) -> DbInfo {
    let number_of_tables = match reader.read_page(1, log) {
        Ok(page) if page.is_leaf() => Some(page.header.cell_count),
        Ok(_) => None,
        Err(e) => {
            log.warn(format!("Page 1 is not a readable table page: {}", e));
            None
        }
    };

    DbInfo {
        page_size: reader.page_size(),
        number_of_tables,
    }
}

pub fn list_tables(reader: &DatabaseReader, log: &DecodeLog) -> Result<TablesResponse> {
    let tables = SchemaResolver::new(reader).table_names(log)?;
    Ok(TablesResponse { tables })
}

/// Answer a query. Failures come back as an empty result with a message;
/// the decode trace is attached to every answer.
pub fn run_query(reader: &DatabaseReader, sql: &str) -> QueryResult {
    let log = DecodeLog::new();
    log.log(format!("Received query: {}", sql));

    let mut result = match QueryParser::new().parse_sql(sql) {
        Ok(plan) => match QueryExecutor::new(reader).execute(&plan, &log) {
            Ok(result) => result,
            Err(DatabaseError::TableNotFound { name }) => {
                QueryResult::message_only(format!("Table '{}' not found", name))
            }
            Err(DatabaseError::ColumnNotFound { name, .. }) => {
                QueryResult::message_only(format!("Column '{}' not found", name))
            }
            Err(e) => {
                log.error(e.to_string());
                QueryResult::message_only(format!("Query failed: {}", e))
            }
        },
        Err(PlannerError::SqlParser(e)) => {
            log.warn(format!("Could not parse query: {}", e));
            QueryResult::message_only(SUPPORTED_QUERIES)
        }
        Err(e) => {
            log.warn(e.to_string());
            QueryResult::message_only(SUPPORTED_QUERIES)
        }
    };

    result.logs = log.lines();
    result
}
