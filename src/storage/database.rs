use std::{collections::HashSet, fs, path::Path};

use crate::{
    storage::header::FileHeader,
    types::{
        HEADER_SIZE, PageNumber,
        error::{DatabaseError, Result},
        page::Page,
    },
    utils::log::DecodeLog,
};

/// Read-only access to an in-memory database image.
///
/// The image is a private snapshot: pages borrow from it and are decoded
/// fresh on every call, nothing is cached or written back.
pub struct DatabaseReader {
    bytes: Vec<u8>,
    header: FileHeader,
}

impl DatabaseReader {
    pub fn open(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let header = FileHeader::from_bytes(&bytes)?;

        if !header.has_valid_magic() {
            tracing::warn!(target: "lontar::decode", "database header magic is not 'SQLite format 3'");
        }
        if !header.has_valid_page_size() {
            tracing::warn!(
                target: "lontar::decode",
                page_size = header.page_size(),
                "page size is not a power of two between 512 and 65536"
            );
        }

        Ok(Self { bytes, header })
    }

    /// Load a file into memory and open it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(target: "lontar::decode", path = %path.display(), "loading database file");
        let bytes = fs::read(path)?;
        Self::open(bytes)
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn page_size(&self) -> u32 {
        self.header.page_size()
    }

    pub fn file_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Pages present in the image, counting a trailing partial page.
    pub fn page_count(&self) -> u32 {
        self.bytes.len().div_ceil(self.page_size().max(1) as usize) as u32
    }

    /// Byte range of a page's b-tree content within the file.
    ///
    /// Page 1 starts after the 100-byte file header; the end never passes
    /// the end of the page or of the file. A page lying wholly past the end
    /// of the file yields an empty range starting at or beyond the file length.
    pub fn page_byte_range(&self, page_number: PageNumber) -> (usize, usize) {
        let page_size = self.page_size() as usize;
        let page_start = (page_number.saturating_sub(1) as usize).saturating_mul(page_size);
        let start = page_start + if page_number == 1 { HEADER_SIZE } else { 0 };
        let end = page_start.saturating_add(page_size).min(self.bytes.len());
        (start, end.max(start))
    }

    /// Decode one table b-tree page.
    pub fn read_page(&self, page_number: PageNumber, log: &DecodeLog) -> Result<Page<'_>> {
        let (start, end) = self.page_byte_range(page_number);
        log.log(format!(
            "Reading page {}: offset={}, endOffset={}, buffer.length={}",
            page_number,
            start,
            end,
            self.bytes.len()
        ));

        if page_number < 1 || start >= self.bytes.len() {
            log.error(format!(
                "Attempted to read invalid page number: {}",
                page_number
            ));
            return Err(DatabaseError::InvalidPageNumber {
                page_number,
                file_length: self.bytes.len(),
            });
        }

        // Cell pointers are relative to the page start, which on page 1 is the
        // start of the file; the b-tree header itself sits after the file header.
        let page_start = (page_number as usize - 1) * self.page_size() as usize;
        let btree_offset = if page_number == 1 { HEADER_SIZE } else { 0 };
        Page::parse(
            &self.bytes[page_start..end],
            page_number,
            self.page_size(),
            btree_offset,
            log,
        )
    }

    /// All leaf table pages reachable from `root`, in key order.
    ///
    /// Interior pages are expanded depth-first, children in the order
    /// `child_page_numbers` returns them. Pages that fail to decode or are
    /// not table pages contribute nothing, and a page number seen twice is
    /// not expanded again, so a cyclic tree still terminates.
    pub fn collect_leaf_pages(&self, root: PageNumber, log: &DecodeLog) -> Vec<Page<'_>> {
        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];

        while let Some(page_number) = stack.pop() {
            if !visited.insert(page_number) {
                log.warn(format!(
                    "Page {} reached twice while walking from root {}. Skipping.",
                    page_number, root
                ));
                continue;
            }

            match self.read_page(page_number, log) {
                Ok(page) if page.is_leaf() => leaves.push(page),
                Ok(page) => {
                    // Reverse so the left-most child is expanded first.
                    stack.extend(page.child_page_numbers().into_iter().rev());
                }
                Err(e) => log.warn(format!(
                    "Page {} contributes no rows: {}",
                    page_number, e
                )),
            }
        }

        leaves
    }
}
