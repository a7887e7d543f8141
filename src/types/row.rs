use serde::Serialize;

use crate::types::{
    RowId,
    cell::Cell,
    error::{DatabaseError, Result},
    value::Value,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub row_id: RowId,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(row_id: RowId, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }

    /// The row stored in a leaf cell; `None` for routing cells.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::LeafTable { row_id, record, .. } => Some(Self::new(*row_id, record.values.clone())),
            Cell::InteriorTable { .. } => None,
        }
    }

    pub fn get_value(&self, column_index: usize) -> Option<&Value> {
        self.values.get(column_index)
    }

    pub fn set_value(&mut self, column_index: usize, value: Value) -> Result<()> {
        if column_index >= self.values.len() {
            return Err(DatabaseError::ColumnIndexOutOfBounds {
                index: column_index,
            });
        }
        self.values[column_index] = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitute the row id for an `INTEGER PRIMARY KEY` column.
    ///
    /// SQLite stores `NULL` in the alias position, and rows written before an
    /// `ALTER TABLE ... ADD COLUMN` are simply shorter than the schema. Only a
    /// short record with a non-null value in the alias position is taken to
    /// have omitted the column, in which case the row id is inserted there.
    pub fn apply_rowid_alias(&mut self, alias_index: usize, column_count: usize) {
        let row_id = Value::Integer(self.row_id);
        if let Some(value) = self.values.get_mut(alias_index).filter(|value| value.is_null()) {
            *value = row_id;
        } else if self.values.len() < column_count && alias_index <= self.values.len() {
            self.values.insert(alias_index, row_id);
        }
    }

    /// Pad with `Null` or cut so the row has exactly `column_count` values.
    pub fn fit_to(&mut self, column_count: usize) {
        self.values.resize(column_count, Value::Null);
    }
}
