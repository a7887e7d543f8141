use crate::{
    executor::scan::Scanner,
    storage::{
        database::DatabaseReader,
        schema::{SchemaResolver, TableSchema},
    },
    types::{PageNumber, error::DatabaseError, page::Page, row::Row},
    utils::log::DecodeLog,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub limit: Option<usize>,
}

/// Walks every leaf page of a table b-tree and yields its rows in key order.
///
/// With a schema attached, rows are shaped to it: the row id fills an
/// `INTEGER PRIMARY KEY` column and each row has exactly one value per
/// declared column.
pub struct SequentialScanner<'r> {
    root_page: PageNumber,
    leaf_pages: Vec<Page<'r>>,
    schema: Option<TableSchema>,
    options: ScanOptions,
    current_page: usize,
    current_cell: usize,
    returned: usize,
    is_exhausted: bool,
}

impl<'r> SequentialScanner<'r> {
    pub fn new(
        reader: &'r DatabaseReader,
        table_name: &str,
        options: ScanOptions,
        log: &DecodeLog,
    ) -> Result<Self, DatabaseError> {
        let schema = SchemaResolver::new(reader).table_schema(table_name, log)?;
        let root_page = schema.root_page;
        Ok(Self::from_root(reader, root_page, Some(schema), options, log))
    }

    /// Scan the tree under `root_page` without a catalog lookup.
    pub fn from_root(
        reader: &'r DatabaseReader,
        root_page: PageNumber,
        schema: Option<TableSchema>,
        options: ScanOptions,
        log: &DecodeLog,
    ) -> Self {
        let leaf_pages = reader.collect_leaf_pages(root_page, log);
        log.log(format!(
            "Root page {} has {} leaf page(s): [{}]",
            root_page,
            leaf_pages.len(),
            leaf_pages
                .iter()
                .map(|p| p.page_number.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        Self {
            root_page,
            leaf_pages,
            schema,
            options,
            current_page: 0,
            current_cell: 0,
            returned: 0,
            is_exhausted: false,
        }
    }

    pub fn root_page(&self) -> PageNumber {
        self.root_page
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    pub fn leaf_page_numbers(&self) -> Vec<PageNumber> {
        self.leaf_pages.iter().map(|p| p.page_number).collect()
    }

    fn shape(&self, mut row: Row) -> Row {
        if let Some(schema) = &self.schema {
            let column_count = schema.columns.len();
            if column_count > 0 {
                if let Some(alias) = schema.rowid_alias_index() {
                    row.apply_rowid_alias(alias, column_count);
                }
                row.fit_to(column_count);
            }
        }
        row
    }
}

impl Scanner for SequentialScanner<'_> {
    fn scan(&mut self) -> Result<Option<Row>, DatabaseError> {
        if self.is_exhausted {
            return Ok(None);
        }
        if self.options.limit.is_some_and(|limit| self.returned >= limit) {
            self.is_exhausted = true;
            return Ok(None);
        }

        while let Some(page) = self.leaf_pages.get(self.current_page) {
            match page.get_cell(self.current_cell) {
                Some(cell) => {
                    self.current_cell += 1;
                    if let Some(row) = Row::from_cell(cell) {
                        self.returned += 1;
                        return Ok(Some(self.shape(row)));
                    }
                }
                None => {
                    self.current_page += 1;
                    self.current_cell = 0;
                }
            }
        }

        self.is_exhausted = true;
        Ok(None)
    }

    fn scan_batch(&mut self, batch_size: usize) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = Vec::with_capacity(batch_size);
        for _ in 0..batch_size {
            match self.scan()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    fn reset(&mut self) -> Result<(), DatabaseError> {
        self.current_page = 0;
        self.current_cell = 0;
        self.returned = 0;
        self.is_exhausted = false;
        Ok(())
    }
}
