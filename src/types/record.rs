use crate::{
    types::{
        serial_type::{SerialType, encode_value},
        value::Value,
        varint::{decode_varint, encode_varint, varint_len},
    },
    utils::log::DecodeLog,
};

/*
 * Record format
 * ┌──────────────────────────── header ─────────────────────────┬──────── body ────────┐
 * │ header_size (varint) │ serial type 0 │ ... │ serial type N-1 │ col 0 │ ... │ col N-1 │
 * └─────────────────────────────────────────────────────────────┴──────────────────────┘
 * header_size counts its own varint. Column widths follow from the serial types.
 */

#[derive(Debug, Clone, PartialEq)]
pub struct RecordHeader {
    /// Header length as declared in the payload, before any clamping.
    pub declared_size: i64,
    pub serial_types: Vec<SerialType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub header: RecordHeader,
    pub values: Vec<Value>,
    /// Set when a column ran past the end of the payload; that column and
    /// every column after it are `Null`.
    pub truncated: bool,
}

impl Record {
    /// Decode a cell payload into its typed columns.
    ///
    /// Never fails: a header that claims more bytes than the payload holds is
    /// clamped, and the first column that cannot be read in full ends decoding
    /// with the remaining columns set to `Null`.
    pub fn decode(payload: &[u8], log: &DecodeLog) -> Self {
        if payload.is_empty() {
            return Self::empty();
        }

        let (declared_size, size_len) = decode_varint(payload, 0);
        let header_end = if declared_size < 0 || declared_size as u64 > payload.len() as u64 {
            log.warn(format!(
                "Record header size {} exceeds payload length {}. Clamping.",
                declared_size,
                payload.len()
            ));
            payload.len()
        } else {
            declared_size as usize
        };

        let mut serial_types = Vec::new();
        let mut pos = size_len;
        while pos < header_end {
            let (code, used) = decode_varint(&payload[..header_end], pos);
            if used == 0 {
                break;
            }
            pos += used;
            serial_types.push(SerialType::from_code(code as u64));
        }

        let mut values = Vec::with_capacity(serial_types.len());
        let mut truncated = false;
        let mut pos = header_end.max(size_len);
        for serial_type in &serial_types {
            if truncated {
                values.push(Value::Null);
                continue;
            }
            match serial_type.decode(payload, pos) {
                Ok(value) => {
                    pos += serial_type.width();
                    values.push(value);
                }
                Err(e) => {
                    log.warn(format!(
                        "Column {} (serial type {}) skipped: {}",
                        values.len(),
                        serial_type.code(),
                        e
                    ));
                    truncated = true;
                    values.push(Value::Null);
                }
            }
        }

        Self {
            header: RecordHeader {
                declared_size,
                serial_types,
            },
            values,
            truncated,
        }
    }

    pub fn empty() -> Self {
        Self {
            header: RecordHeader {
                declared_size: 0,
                serial_types: Vec::new(),
            },
            values: Vec::new(),
            truncated: false,
        }
    }

    pub fn column_count(&self) -> usize {
        self.values.len()
    }

    /// Serialize `values` in the record format.
    pub fn encode(values: &[Value]) -> Vec<u8> {
        let mut type_bytes = Vec::new();
        let mut body = Vec::new();
        for value in values {
            let (serial_type, bytes) = encode_value(value);
            type_bytes.extend_from_slice(&encode_varint(serial_type.code()));
            body.extend_from_slice(&bytes);
        }

        // The size varint counts itself, so its own length may grow the total.
        let mut header_size = type_bytes.len() + 1;
        while type_bytes.len() + varint_len(header_size as u64) != header_size {
            header_size = type_bytes.len() + varint_len(header_size as u64);
        }

        let mut buffer = encode_varint(header_size as u64);
        buffer.extend_from_slice(&type_bytes);
        buffer.extend_from_slice(&body);
        buffer
    }
}
