use serde::Serialize;
use sqlparser::{
    ast::{ColumnOption, Statement, TableConstraint},
    dialect::SQLiteDialect,
    parser::Parser,
};

use crate::{
    storage::database::DatabaseReader,
    types::{
        PageNumber,
        error::{DatabaseError, Result},
        row::Row,
        value::Value,
    },
    utils::log::DecodeLog,
};

/// Catalog page holding `sqlite_master`.
pub const CATALOG_ROOT_PAGE: PageNumber = 1;

/// One row of the catalog: `type | name | tbl_name | rootpage | sql`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableEntry {
    pub kind: String,
    pub name: String,
    pub table_name: String,
    pub root_page: PageNumber,
    pub sql: String,
}

/// Represents a column definition recovered from `CREATE TABLE` text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub declared_type: Option<String>,
    pub position: usize,
    pub primary_key: bool,
}

impl ColumnSchema {
    pub fn new(name: String, position: usize) -> Self {
        Self {
            name,
            declared_type: None,
            position,
            primary_key: false,
        }
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// `INTEGER PRIMARY KEY` columns are stored as the row id.
    pub fn is_rowid_alias(&self) -> bool {
        self.primary_key
            && self
                .declared_type
                .as_deref()
                .is_some_and(|t| t.eq_ignore_ascii_case("INTEGER"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub table_name: String,
    pub root_page: PageNumber,
    pub sql: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn from_entry(entry: &TableEntry) -> Self {
        Self {
            table_name: entry.table_name.clone(),
            root_page: entry.root_page,
            sql: entry.sql.clone(),
            columns: Self::from_create_sql(&entry.sql),
        }
    }

    /// Column definitions of a `CREATE TABLE` statement, in declaration order.
    pub fn from_create_sql(sql: &str) -> Vec<ColumnSchema> {
        let dialect = SQLiteDialect {};
        match Parser::parse_sql(&dialect, sql) {
            Ok(statements) => match statements.first() {
                Some(Statement::CreateTable(create)) => {
                    let mut columns: Vec<ColumnSchema> = create
                        .columns
                        .iter()
                        .enumerate()
                        .map(|(position, def)| {
                            let mut column = ColumnSchema::new(def.name.value.clone(), position);
                            let declared = def.data_type.to_string();
                            if !declared.is_empty() {
                                column = column.with_type(declared);
                            }
                            let is_primary = def.options.iter().any(|option| {
                                matches!(option.option, ColumnOption::Unique { is_primary: true, .. })
                            });
                            if is_primary {
                                column = column.primary_key();
                            }
                            column
                        })
                        .collect();

                    // PRIMARY KEY(col) as a table constraint on a single column
                    for constraint in &create.constraints {
                        if let TableConstraint::PrimaryKey { columns: keys, .. } = constraint {
                            if let [key] = keys.as_slice() {
                                if let Some(column) =
                                    columns.iter_mut().find(|c| c.name == key.value)
                                {
                                    column.primary_key = true;
                                }
                            }
                        }
                    }
                    columns
                }
                _ => split_column_definitions(sql),
            },
            Err(e) => {
                tracing::debug!(target: "lontar::schema", error = %e, "falling back to plain column split");
                split_column_definitions(sql)
            }
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rowid_alias_index(&self) -> Option<usize> {
        self.columns.iter().position(ColumnSchema::is_rowid_alias)
    }
}

const CONSTRAINT_KEYWORDS: [&str; 5] = ["PRIMARY", "UNIQUE", "CHECK", "FOREIGN", "CONSTRAINT"];

/// Plain-text reading of the column list for DDL the parser rejects: the text
/// between the outer parentheses, split on top-level commas, first word of
/// each piece as the name.
fn split_column_definitions(sql: &str) -> Vec<ColumnSchema> {
    let (Some(open), Some(close)) = (sql.find('('), sql.rfind(')')) else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in sql[open + 1..close].chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => pieces.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    pieces.push(current);

    let mut columns = Vec::new();
    for piece in pieces {
        let mut words = piece.split_whitespace();
        let Some(first) = words.next() else {
            continue;
        };
        if CONSTRAINT_KEYWORDS
            .iter()
            .any(|k| first.eq_ignore_ascii_case(k))
        {
            continue;
        }

        let name = first.trim_matches(|c| matches!(c, '"' | '\'' | '`' | '[' | ']'));
        let mut column = ColumnSchema::new(name.to_string(), columns.len());
        if let Some(declared) = words.next() {
            if !CONSTRAINT_KEYWORDS
                .iter()
                .any(|k| declared.eq_ignore_ascii_case(k))
            {
                column = column.with_type(declared.to_uppercase());
            }
        }
        if piece.to_uppercase().contains("PRIMARY KEY") {
            column = column.primary_key();
        }
        columns.push(column);
    }
    columns
}

/// Resolves table names against the catalog stored from page 1.
pub struct SchemaResolver<'r> {
    reader: &'r DatabaseReader,
}

impl<'r> SchemaResolver<'r> {
    pub fn new(reader: &'r DatabaseReader) -> Self {
        Self { reader }
    }

    /// Decoded catalog rows. Page 1 must decode as a table b-tree page; a
    /// catalog grown past one page is followed through its interior pages.
    pub fn catalog_rows(&self, log: &DecodeLog) -> Result<Vec<Row>> {
        let root = self.reader.read_page(CATALOG_ROOT_PAGE, log)?;
        let rows = if root.is_leaf() {
            root.cells().iter().filter_map(Row::from_cell).collect()
        } else {
            self.reader
                .collect_leaf_pages(CATALOG_ROOT_PAGE, log)
                .iter()
                .flat_map(|page| page.cells().iter().filter_map(Row::from_cell))
                .collect()
        };
        Ok(rows)
    }

    /// Every well-formed catalog entry; malformed rows are logged and skipped.
    pub fn entries(&self, log: &DecodeLog) -> Result<Vec<TableEntry>> {
        let rows = self.catalog_rows(log)?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            match entry_from_row(row, None) {
                Ok(entry) => entries.push(entry),
                Err(e) => log.warn(format!("Skipping catalog row {}: {}", row.row_id, e)),
            }
        }
        Ok(entries)
    }

    /// User table names, excluding the internal `sqlite_` tables.
    pub fn table_names(&self, log: &DecodeLog) -> Result<Vec<String>> {
        let rows = self.catalog_rows(log)?;
        Ok(rows
            .iter()
            .filter(|row| is_table_row(row))
            .filter_map(|row| row.get_value(2).and_then(Value::as_text))
            .filter(|name| !name.starts_with("sqlite_"))
            .map(str::to_string)
            .collect())
    }

    /// Find a table's catalog entry by exact name.
    pub fn find_table(&self, name: &str, log: &DecodeLog) -> Result<TableEntry> {
        let rows = self.catalog_rows(log)?;
        let row = rows
            .iter()
            .filter(|row| is_table_row(row))
            .find(|row| row.get_value(2).and_then(Value::as_text) == Some(name))
            .ok_or_else(|| {
                log.log(format!("Table '{}' not found in sqlite_master.", name));
                DatabaseError::TableNotFound {
                    name: name.to_string(),
                }
            })?;

        let entry = entry_from_row(row, Some(name))?;
        log.log(format!(
            "Table '{}' found: root page {}",
            entry.table_name, entry.root_page
        ));
        Ok(entry)
    }

    pub fn table_schema(&self, name: &str, log: &DecodeLog) -> Result<TableSchema> {
        let entry = self.find_table(name, log)?;
        Ok(TableSchema::from_entry(&entry))
    }
}

// Rows whose type column says something other than "table" (indexes,
// views, triggers) share the tbl_name of their table and are not tables.
fn is_table_row(row: &Row) -> bool {
    match row.get_value(0) {
        Some(Value::Text(kind)) => kind == "table",
        _ => true,
    }
}

fn entry_from_row(row: &Row, wanted: Option<&str>) -> Result<TableEntry> {
    let label = wanted
        .map(str::to_string)
        .or_else(|| row.get_value(2).map(|v| v.to_string()))
        .unwrap_or_default();
    let invalid = |reason: String| DatabaseError::InvalidSchemaEntry {
        name: label.clone(),
        reason,
    };

    if row.len() < 5 {
        return Err(invalid(format!("expected 5 columns, found {}", row.len())));
    }

    let text = |index: usize| {
        row.get_value(index)
            .and_then(Value::as_text)
            .unwrap_or_default()
            .to_string()
    };

    let root_value = &row.values[3];
    let root_page = match root_value.as_integer() {
        Some(root) if (0..=PageNumber::MAX as i64).contains(&root) => root as PageNumber,
        Some(root) => return Err(invalid(format!("root page {} out of range", root))),
        None => {
            return Err(invalid(format!(
                "root page {} is not an integer",
                root_value
            )));
        }
    };

    let sql = match &row.values[4] {
        Value::Text(sql) => sql.clone(),
        Value::Null => String::new(),
        other => return Err(invalid(format!("sql column holds {:?}", other.data_type()))),
    };

    let entry = TableEntry {
        kind: text(0),
        name: text(1),
        table_name: text(2),
        root_page,
        sql,
    };

    if wanted.is_some() && (entry.root_page == 0 || entry.sql.is_empty()) {
        return Err(invalid(format!(
            "table entry without root page or CREATE statement (root page {})",
            entry.root_page
        )));
    }
    Ok(entry)
}
