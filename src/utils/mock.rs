//! In-memory construction of database images for tests and benchmarks.

use std::{collections::BTreeMap, io::Write, path::Path};

use tempfile::NamedTempFile;

use crate::{
    storage::header::FileHeader,
    types::{
        CELL_POINTER_SIZE, HEADER_SIZE, MAX_PAGE_SIZE, PageNumber, RowId,
        page::PageType,
        record::Record,
        value::Value,
        varint::encode_varint,
    },
};

enum PageLayout {
    Leaf(Vec<(RowId, Vec<Value>)>),
    Interior {
        children: Vec<(PageNumber, RowId)>,
        right_most: PageNumber,
    },
    Raw(Vec<u8>),
}

/// Builds a well-formed file image page by page. Page 1 is an empty catalog
/// unless something else is placed there.
pub struct DatabaseBuilder {
    page_size: u32,
    header: FileHeader,
    pages: BTreeMap<PageNumber, PageLayout>,
}

impl DatabaseBuilder {
    pub fn new(page_size: u32) -> Self {
        let mut pages = BTreeMap::new();
        pages.insert(1, PageLayout::Leaf(Vec::new()));
        Self {
            page_size,
            header: FileHeader::default(),
            pages,
        }
    }

    pub fn with_header(mut self, edit: impl FnOnce(&mut FileHeader)) -> Self {
        edit(&mut self.header);
        self
    }

    /// Fill page 1 with `table` rows: `(name, root page, CREATE statement)`.
    pub fn catalog(self, tables: &[(&str, PageNumber, &str)]) -> Self {
        let rows = tables
            .iter()
            .enumerate()
            .map(|(i, (name, root, sql))| {
                (
                    i as RowId + 1,
                    vec![
                        Value::Text("table".to_string()),
                        Value::Text(name.to_string()),
                        Value::Text(name.to_string()),
                        Value::Integer(*root as i64),
                        Value::Text(sql.to_string()),
                    ],
                )
            })
            .collect();
        self.leaf_page(1, rows)
    }

    pub fn leaf_page(mut self, page_number: PageNumber, rows: Vec<(RowId, Vec<Value>)>) -> Self {
        self.pages.insert(page_number, PageLayout::Leaf(rows));
        self
    }

    /// Interior table page; each child is `(page, largest row id below it)`.
    pub fn interior_page(
        mut self,
        page_number: PageNumber,
        children: Vec<(PageNumber, RowId)>,
        right_most: PageNumber,
    ) -> Self {
        self.pages.insert(
            page_number,
            PageLayout::Interior {
                children,
                right_most,
            },
        );
        self
    }

    /// Place `bytes` verbatim at the start of the page.
    pub fn raw_page(mut self, page_number: PageNumber, bytes: Vec<u8>) -> Self {
        self.pages.insert(page_number, PageLayout::Raw(bytes));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let page_size = self.page_size as usize;
        let page_count = self.pages.keys().next_back().copied().unwrap_or(1);
        let mut image = vec![0u8; page_count as usize * page_size];

        for (&page_number, layout) in &self.pages {
            let start = (page_number as usize - 1) * page_size;
            let btree_offset = if page_number == 1 { HEADER_SIZE } else { 0 };
            let bytes = match layout {
                PageLayout::Leaf(rows) => leaf_page_bytes(page_size, btree_offset, rows),
                PageLayout::Interior {
                    children,
                    right_most,
                } => interior_page_bytes(page_size, btree_offset, children, *right_most),
                PageLayout::Raw(bytes) => bytes.clone(),
            };
            let len = bytes.len().min(page_size);
            image[start..start + len].copy_from_slice(&bytes[..len]);
        }

        let mut header = self.header.clone();
        header.page_size = if self.page_size == MAX_PAGE_SIZE {
            1
        } else {
            self.page_size as u16
        };
        header.database_size_pages = page_count;
        image[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        image
    }
}

/// `payload_length | row_id | record`
pub fn leaf_cell(row_id: RowId, values: &[Value]) -> Vec<u8> {
    let record = Record::encode(values);
    let mut cell = encode_varint(record.len() as u64);
    cell.extend_from_slice(&encode_varint(row_id as u64));
    cell.extend_from_slice(&record);
    cell
}

pub fn interior_cell(left_child: PageNumber, row_id: RowId) -> Vec<u8> {
    let mut cell = left_child.to_be_bytes().to_vec();
    cell.extend_from_slice(&encode_varint(row_id as u64));
    cell
}

fn assemble_page(
    page_size: usize,
    btree_offset: usize,
    page_type: PageType,
    right_most: Option<PageNumber>,
    cells: Vec<Vec<u8>>,
) -> Vec<u8> {
    let mut page = vec![0u8; page_size];
    let header_size = page_type.header_size();
    let pointer_start = btree_offset + header_size;

    let mut content_start = page_size;
    for (i, cell) in cells.iter().enumerate() {
        let pointer_at = pointer_start + i * CELL_POINTER_SIZE;
        assert!(
            pointer_at + CELL_POINTER_SIZE + cell.len() <= content_start,
            "cells do not fit in a {} byte page",
            page_size
        );
        content_start -= cell.len();
        page[content_start..content_start + cell.len()].copy_from_slice(cell);
        page[pointer_at..pointer_at + CELL_POINTER_SIZE]
            .copy_from_slice(&(content_start as u16).to_be_bytes());
    }

    page[btree_offset] = page_type.as_u8();
    page[btree_offset + 3..btree_offset + 5].copy_from_slice(&(cells.len() as u16).to_be_bytes());
    // 65536 is stored as 0
    page[btree_offset + 5..btree_offset + 7].copy_from_slice(&(content_start as u16).to_be_bytes());
    if let Some(right_most) = right_most {
        page[btree_offset + 8..btree_offset + 12].copy_from_slice(&right_most.to_be_bytes());
    }
    page
}

pub fn leaf_page_bytes(page_size: usize, btree_offset: usize, rows: &[(RowId, Vec<Value>)]) -> Vec<u8> {
    let cells = rows
        .iter()
        .map(|(row_id, values)| leaf_cell(*row_id, values))
        .collect();
    assemble_page(page_size, btree_offset, PageType::LeafTable, None, cells)
}

pub fn interior_page_bytes(
    page_size: usize,
    btree_offset: usize,
    children: &[(PageNumber, RowId)],
    right_most: PageNumber,
) -> Vec<u8> {
    let cells = children
        .iter()
        .map(|(child, row_id)| interior_cell(*child, *row_id))
        .collect();
    assemble_page(
        page_size,
        btree_offset,
        PageType::InteriorTable,
        Some(right_most),
        cells,
    )
}

/// A database image written to a temporary file, removed on drop.
pub struct TempDatabase {
    file: NamedTempFile,
}

impl TempDatabase {
    pub fn new(image: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("lontar_test_")
            .suffix(".db")
            .tempfile()?;
        file.write_all(image)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
