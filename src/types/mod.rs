pub mod cell;
pub mod error;
pub mod page;
pub mod record;
pub mod row;
pub mod serial_type;
pub mod value;
pub mod varint;

// Common type aliases
pub type PageNumber = u32;
pub type RowId = i64;
pub type SerialTypeCode = u64;

// SQLite file format constants
pub const HEADER_SIZE: usize = 100; // Database header size, page 1 only
pub const LEAF_PAGE_HEADER_SIZE: usize = 8;
pub const INTERIOR_PAGE_HEADER_SIZE: usize = 12;
pub const CELL_POINTER_SIZE: usize = 2; // u16 offset into the page
pub const CHILD_POINTER_SIZE: usize = 4; // u32 page number
pub const MAX_VARINT_SIZE: usize = 9;

pub const MIN_PAGE_SIZE: u32 = 512;
pub const MAX_PAGE_SIZE: u32 = 65536;
