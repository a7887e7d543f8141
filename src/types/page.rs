use crate::{
    types::{
        CELL_POINTER_SIZE, INTERIOR_PAGE_HEADER_SIZE, LEAF_PAGE_HEADER_SIZE, PageNumber,
        cell::Cell,
        error::{DatabaseError, Result},
    },
    utils::log::DecodeLog,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    InteriorIndex = 2,
    InteriorTable = 5,
    LeafIndex = 10,
    LeafTable = 13,
}

impl PageType {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            2 => Ok(PageType::InteriorIndex),
            5 => Ok(PageType::InteriorTable),
            10 => Ok(PageType::LeafIndex),
            13 => Ok(PageType::LeafTable),
            _ => Err(DatabaseError::InvalidPageType(value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            PageType::InteriorIndex => 2,
            PageType::InteriorTable => 5,
            PageType::LeafIndex => 10,
            PageType::LeafTable => 13,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, PageType::LeafIndex | PageType::LeafTable)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, PageType::InteriorTable | PageType::LeafTable)
    }

    pub fn header_size(&self) -> usize {
        if self.is_leaf() {
            LEAF_PAGE_HEADER_SIZE
        } else {
            INTERIOR_PAGE_HEADER_SIZE
        }
    }
}

/*
 * B-tree page layout (page 1 starts at byte 100, after the file header)
 * ┌─────────────────────────────────────────────────────────────────┐
 * │          PAGE HEADER (8 bytes leaf / 12 bytes interior)         │
 * │  type(1) | first_freeblock(2) | cell_count(2) |                 │
 * │  cell_content_start(2) | fragmented(1) | right_most(4, interior)│
 * ├─────────────────────────────────────────────────────────────────┤
 * │                  CELL POINTER ARRAY                             │
 * │  [cell0: offset(2)] [cell1: offset(2)] ...                      │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                  UNALLOCATED SPACE                              │
 * ├─────────────────────────────────────────────────────────────────┤
 * │                   CELL CONTENT AREA                             │
 * └─────────────────────────────────────────────────────────────────┘
 * Cell pointers are offsets from the start of the page, not of the header.
 */

/// The page header exactly as declared on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub first_freeblock: u16,
    pub cell_count: u16,
    pub cell_content_start: u16,
    pub fragmented_free_bytes: u8,
    /// Interior pages only; `None` when the header was cut short.
    pub right_most_pointer: Option<PageNumber>,
}

impl PageHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEAF_PAGE_HEADER_SIZE {
            return Err(DatabaseError::InsufficientBytes {
                offset: 0,
                needed: LEAF_PAGE_HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let page_type = PageType::from_u8(bytes[0])?;
        let first_freeblock = u16::from_be_bytes([bytes[1], bytes[2]]);
        let cell_count = u16::from_be_bytes([bytes[3], bytes[4]]);
        let cell_content_start = u16::from_be_bytes([bytes[5], bytes[6]]);
        let fragmented_free_bytes = bytes[7];

        let right_most_pointer = if page_type.is_leaf() || bytes.len() < INTERIOR_PAGE_HEADER_SIZE {
            None
        } else {
            Some(u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]))
        };

        Ok(Self {
            page_type,
            first_freeblock,
            cell_count,
            cell_content_start,
            fragmented_free_bytes,
            right_most_pointer,
        })
    }

    pub fn size(&self) -> usize {
        self.page_type.header_size()
    }
}

/// A decoded view over one table b-tree page of a borrowed file image.
#[derive(Debug)]
pub struct Page<'a> {
    pub page_number: PageNumber,
    pub page_size: u32,
    /// Where the b-tree header starts inside `data`: 100 on page 1, else 0.
    pub btree_offset: usize,
    pub header: PageHeader,
    /// `header.cell_count` clamped to what the buffer can actually hold.
    pub effective_cell_count: usize,
    data: &'a [u8],
    cell_pointers: Vec<usize>,
    cells: Vec<Cell>,
}

impl<'a> Page<'a> {
    /// Parse a table b-tree page.
    ///
    /// Index pages and unknown type bytes are rejected with
    /// `UnsupportedPageType`. Within a supported page, damage is recovered:
    /// the cell count is clamped to the pointers that fit, pointers outside the
    /// buffer are skipped, and damaged cells decode as truncated records.
    pub fn parse(
        data: &'a [u8],
        page_number: PageNumber,
        page_size: u32,
        btree_offset: usize,
        log: &DecodeLog,
    ) -> Result<Self> {
        let header_bytes = data.get(btree_offset..).unwrap_or(&[]);
        let header = match PageHeader::parse(header_bytes) {
            Ok(header) => header,
            Err(DatabaseError::InvalidPageType(page_type)) => {
                return Err(DatabaseError::UnsupportedPageType {
                    page_number,
                    page_type,
                });
            }
            Err(e) => {
                log.error(format!(
                    "PageHeader buffer too short on page {}: {} bytes.",
                    page_number,
                    header_bytes.len()
                ));
                return Err(e);
            }
        };

        if !header.page_type.is_table() {
            return Err(DatabaseError::UnsupportedPageType {
                page_number,
                page_type: header.page_type.as_u8(),
            });
        }

        if header.page_type == PageType::InteriorTable && header.right_most_pointer.is_none() {
            log.warn(format!(
                "Not enough bytes to read right-most child pointer on page {}.",
                page_number
            ));
        }

        let pointer_array_start = btree_offset + header.size();
        let max_cells = data.len().saturating_sub(pointer_array_start) / CELL_POINTER_SIZE;
        let declared = header.cell_count as usize;
        let effective_cell_count = declared.min(max_cells);
        if effective_cell_count < declared {
            log.warn(format!(
                "Cell pointer array extends beyond page buffer bounds. Page: {}, Type: {}, Cells: {}, Buffer Length: {}. Adjusting number of cells to {}.",
                page_number,
                header.page_type.as_u8(),
                declared,
                data.len(),
                effective_cell_count
            ));
        }

        let mut cell_pointers = Vec::with_capacity(effective_cell_count);
        for i in 0..effective_cell_count {
            let at = pointer_array_start + i * CELL_POINTER_SIZE;
            let pointer = u16::from_be_bytes([data[at], data[at + 1]]) as usize;
            if pointer < data.len() {
                cell_pointers.push(pointer);
            } else {
                log.warn(format!(
                    "Invalid cell pointer {} at offset {} on page {}. Skipping.",
                    pointer, at, page_number
                ));
            }
        }

        let mut cells = Vec::with_capacity(cell_pointers.len());
        for &pointer in &cell_pointers {
            match header.page_type {
                PageType::LeafTable => cells.push(Cell::decode_leaf(data, pointer, log)),
                _ => match Cell::decode_interior(data, pointer) {
                    Ok(cell) => cells.push(cell),
                    Err(e) => log.warn(format!(
                        "Not enough bytes to read child page number at pointer {} on page {}: {}. Skipping.",
                        pointer, page_number, e
                    )),
                },
            }
        }

        log.log(format!(
            "Page {}: type={}, cells={}, pointers=[{}]",
            page_number,
            header.page_type.as_u8(),
            cells.len(),
            cell_pointers
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        Ok(Self {
            page_number,
            page_size,
            btree_offset,
            header,
            effective_cell_count,
            data,
            cell_pointers,
            cells,
        })
    }

    pub fn page_type(&self) -> PageType {
        self.header.page_type
    }

    pub fn is_leaf(&self) -> bool {
        self.header.page_type == PageType::LeafTable
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn cell_pointers(&self) -> &[usize] {
        &self.cell_pointers
    }

    /// Rows of a leaf page; routing entries of an interior page.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get_cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Children of an interior page in key order: one per cell, then the
    /// right-most pointer. Empty for leaf pages.
    pub fn child_page_numbers(&self) -> Vec<PageNumber> {
        if self.header.page_type != PageType::InteriorTable {
            return Vec::new();
        }
        let mut children: Vec<PageNumber> =
            self.cells.iter().filter_map(Cell::left_child).collect();
        if let Some(right_most) = self.header.right_most_pointer {
            children.push(right_most);
        }
        children
    }
}
