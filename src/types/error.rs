use thiserror::Error;

use crate::types::PageNumber;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database header too short: need {expected} bytes, got {actual}")]
    HeaderTooShort { expected: usize, actual: usize },

    #[error("Invalid page number {page_number} (file holds {file_length} bytes)")]
    InvalidPageNumber {
        page_number: PageNumber,
        file_length: usize,
    },

    #[error("Unsupported page type {page_type} on page {page_number}")]
    UnsupportedPageType {
        page_number: PageNumber,
        page_type: u8,
    },

    #[error("Invalid page type: {0}")]
    InvalidPageType(u8),

    #[error("Insufficient bytes at offset {offset}: needed {needed}, {available} available")]
    InsufficientBytes {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Column index {index} out of bounds")]
    ColumnIndexOutOfBounds { index: usize },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Invalid schema entry for '{name}': {reason}")]
    InvalidSchemaEntry { name: String, reason: String },
}

impl DatabaseError {
    /// Errors raised by the page-level guard when a page is not a table b-tree page.
    pub fn is_unsupported_page(&self) -> bool {
        matches!(
            self,
            DatabaseError::UnsupportedPageType { .. } | DatabaseError::InvalidPageType(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
