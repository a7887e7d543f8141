use crate::{
    types::{
        CHILD_POINTER_SIZE, PageNumber, RowId,
        error::{DatabaseError, Result},
        record::Record,
        varint::decode_varint,
    },
    utils::log::DecodeLog,
};

/// One entry of a table b-tree page.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A row: `payload_length (varint) | row_id (varint) | record`.
    LeafTable {
        offset: usize,
        payload_length: i64,
        row_id: RowId,
        record: Record,
    },
    /// A routing entry: `left_child (u32 BE) | row_id (varint)`.
    InteriorTable {
        offset: usize,
        left_child: PageNumber,
        row_id: RowId,
    },
}

impl Cell {
    /// Decode a leaf table cell starting at `offset` within `buffer`.
    ///
    /// A declared payload length that is not positive or that runs past the
    /// buffer is clamped to the bytes actually available, so one damaged cell
    /// yields a truncated record instead of aborting the page.
    pub fn decode_leaf(buffer: &[u8], offset: usize, log: &DecodeLog) -> Self {
        let (payload_length, length_len) = decode_varint(buffer, offset);
        let (row_id, row_id_len) = decode_varint(buffer, offset + length_len);
        let record_start = offset + length_len + row_id_len;
        let available = buffer.len().saturating_sub(record_start);

        let effective = if payload_length <= 0 || payload_length as u64 > available as u64 {
            log.warn(format!(
                "Record payload size ({}) exceeds available bytes ({}) at recordStart {} for cell starting at offset {}. Truncating record.",
                payload_length, available, record_start, offset
            ));
            available
        } else {
            payload_length as usize
        };

        let record = if effective == 0 {
            Record::empty()
        } else {
            Record::decode(&buffer[record_start..record_start + effective], log)
        };

        Cell::LeafTable {
            offset,
            payload_length,
            row_id,
            record,
        }
    }

    /// Decode an interior table cell; only the child pointer must be present.
    pub fn decode_interior(buffer: &[u8], offset: usize) -> Result<Self> {
        let end = offset + CHILD_POINTER_SIZE;
        if end > buffer.len() {
            return Err(DatabaseError::InsufficientBytes {
                offset,
                needed: CHILD_POINTER_SIZE,
                available: buffer.len().saturating_sub(offset),
            });
        }
        let left_child = u32::from_be_bytes([
            buffer[offset],
            buffer[offset + 1],
            buffer[offset + 2],
            buffer[offset + 3],
        ]);
        let (row_id, _) = decode_varint(buffer, end);

        Ok(Cell::InteriorTable {
            offset,
            left_child,
            row_id,
        })
    }

    pub fn row_id(&self) -> RowId {
        match self {
            Cell::LeafTable { row_id, .. } | Cell::InteriorTable { row_id, .. } => *row_id,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Cell::LeafTable { offset, .. } | Cell::InteriorTable { offset, .. } => *offset,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Cell::LeafTable { record, .. } => Some(record),
            Cell::InteriorTable { .. } => None,
        }
    }

    pub fn left_child(&self) -> Option<PageNumber> {
        match self {
            Cell::InteriorTable { left_child, .. } => Some(*left_child),
            Cell::LeafTable { .. } => None,
        }
    }
}
