use crate::{
    storage::schema::TableSchema,
    types::{error::DatabaseError, row::Row},
};

/// A predicate expression for filtering rows
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = 'literal'`, compared on the value's display text
    Equals { column_name: String, literal: String },
    /// Always true predicate
    True,
}

impl Predicate {
    /// Create an equality predicate
    pub fn eq(column_name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self::Equals {
            column_name: column_name.into(),
            literal: literal.into(),
        }
    }

    /// Check that every referenced column exists in the table.
    pub fn validate_against_schema(&self, schema: &TableSchema) -> Result<(), DatabaseError> {
        match self {
            Predicate::Equals { column_name, .. } => {
                if schema.column_index(column_name).is_none() {
                    return Err(DatabaseError::ColumnNotFound {
                        name: column_name.clone(),
                        table: schema.table_name.clone(),
                    });
                }
                Ok(())
            }
            Predicate::True => Ok(()),
        }
    }

    /// Evaluate against a row already shaped to `schema`.
    pub fn evaluate(&self, row: &Row, schema: &TableSchema) -> Result<bool, DatabaseError> {
        match self {
            Predicate::Equals {
                column_name,
                literal,
            } => {
                let index = schema.column_index(column_name).ok_or_else(|| {
                    DatabaseError::ColumnNotFound {
                        name: column_name.clone(),
                        table: schema.table_name.clone(),
                    }
                })?;
                Ok(row
                    .get_value(index)
                    .is_some_and(|value| value.to_string() == *literal))
            }
            Predicate::True => Ok(true),
        }
    }
}
