pub mod database;
pub mod header;
pub mod schema;

pub(crate) const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";
