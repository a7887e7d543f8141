use crate::types::{error::DatabaseError, row::Row};

/// Row source over a table b-tree, consumed one row or one batch at a time.
pub trait Scanner {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError>;
    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError>;
    /// Rewind to the first row.
    fn reset(&mut self) -> Result<(), DatabaseError>;

    /// Drain every remaining row.
    fn scan_remaining(&mut self) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::new();
        while let Some(row) = self.scan()? {
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Adapts a `Scanner` to `Iterator`. Iteration ends after the first error.
pub struct ScanIterator<S: Scanner> {
    scanner: S,
    failed: bool,
}

impl<S: Scanner> ScanIterator<S> {
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            failed: false,
        }
    }
}

impl<S: Scanner> Iterator for ScanIterator<S> {
    type Item = Result<Row, DatabaseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.scanner.scan() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
